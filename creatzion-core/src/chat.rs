//! One chat turn: history, special replies, transaction lookup, prompt, model.
//!
//! Transaction retrieval and the model are supplied by the caller so the
//! turn logic stays free of I/O. Retrieval failure degrades to a plain chat
//! turn; a model failure becomes an error reply rather than an `Err`.

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::context;
use crate::engine::{QueryEngine, QueryOutcome};
use crate::history::ConversationHistory;
use crate::special::{EasterEggs, SpecialResponder};
use crate::transaction::Transaction;

pub const APOLOGY: &str = "😔 Sorry, I’m having trouble replying right now. Please try again later.";
pub const CONNECTION_ERROR: &str = "❌ Something went wrong while connecting to Creatzion AI.";

/// Stand-in for an empty message
pub const DEFAULT_MESSAGE: &str = "How can I manage my salary?";

/// Anything that turns a prompt into text
pub trait LanguageModel {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Result of everything that happens before the model call
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedTurn {
    Special(String),
    Prompt { prompt: String, outcome: QueryOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplySource {
    Special,
    Model,
    Apology,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub source: ReplySource,
    pub text: String,
    /// Engine result, absent for special replies
    pub outcome: Option<QueryOutcome>,
}

pub struct ChatService<'h> {
    engine: QueryEngine,
    history: &'h ConversationHistory,
    special: Box<dyn SpecialResponder + Send + Sync>,
}

impl<'h> ChatService<'h> {
    pub fn new(engine: QueryEngine, history: &'h ConversationHistory) -> Self {
        Self {
            engine,
            history,
            special: Box::new(EasterEggs::default()),
        }
    }

    pub fn with_special(mut self, special: impl SpecialResponder + Send + Sync + 'static) -> Self {
        self.special = Box::new(special);
        self
    }

    /// Record the message and build the prompt. `fetch` is only called when
    /// no special reply applies.
    pub fn prepare<F>(&self, message: &str, now: NaiveDateTime, fetch: F) -> PreparedTurn
    where
        F: FnOnce() -> Result<Vec<Transaction>>,
    {
        let message = normalize(message);
        self.history.push(message);

        if let Some(reply) = self.special.lookup(message) {
            debug!("special reply");
            return PreparedTurn::Special(reply);
        }

        let outcome = match fetch() {
            Ok(history) => {
                debug!(rows = history.len(), "fetched transactions");
                self.engine.run(message, &history, now)
            }
            Err(e) => {
                warn!(error = %e, "transaction lookup failed; answering without data");
                QueryOutcome::NotAQuery
            }
        };

        let ctx = context::context_string(&outcome);
        let prompt = context::build_prompt(&self.history.snapshot(), ctx.as_deref(), message);
        PreparedTurn::Prompt { prompt, outcome }
    }

    /// Full turn including the model call
    pub fn respond<F>(
        &self,
        message: &str,
        now: NaiveDateTime,
        fetch: F,
        model: &dyn LanguageModel,
    ) -> ChatReply
    where
        F: FnOnce() -> Result<Vec<Transaction>>,
    {
        let (prompt, outcome) = match self.prepare(message, now, fetch) {
            PreparedTurn::Special(text) => {
                return ChatReply {
                    source: ReplySource::Special,
                    text,
                    outcome: None,
                };
            }
            PreparedTurn::Prompt { prompt, outcome } => (prompt, outcome),
        };

        let (source, text) = match model.complete(&prompt) {
            Ok(raw) => match clean_reply(&raw) {
                Some(text) => (ReplySource::Model, text),
                None => (ReplySource::Apology, APOLOGY.to_string()),
            },
            Err(e) => {
                warn!(error = %e, "model call failed");
                (ReplySource::Error, CONNECTION_ERROR.to_string())
            }
        };

        ChatReply {
            source,
            text,
            outcome: Some(outcome),
        }
    }
}

fn normalize(message: &str) -> &str {
    let trimmed = message.trim();
    if trimmed.is_empty() { DEFAULT_MESSAGE } else { trimmed }
}

/// Strip `*` emphasis and surrounding whitespace; `None` when nothing is left
pub fn clean_reply(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| *c != '*').collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
