//! creatzion-core: transaction query engine and chat glue for Creatzion AI

pub mod aggregate;
pub mod chat;
pub mod classifier;
pub mod context;
pub mod engine;
pub mod history;
pub mod keyword;
pub mod rank;
pub mod refine;
pub mod special;
pub mod taxonomy;
pub mod temporal;
pub mod time;
pub mod transaction;

pub use aggregate::{DetailResult, MonthTotal, MonthlyRollup, ResultPayload, Summary, YearSummary};
pub use chat::{ChatReply, ChatService, LanguageModel, PreparedTurn, ReplySource};
pub use engine::{EngineOptions, QueryEngine, QueryIntent, QueryOutcome};
pub use history::ConversationHistory;
pub use rank::{SortDirection, SortField, SortSpec};
pub use refine::SeedPolicy;
pub use special::{EasterEggs, SpecialResponder};
pub use taxonomy::Category;
pub use temporal::{DateWindow, RelativePeriod, TemporalMatch};
pub use transaction::{AccountRef, RecurringInterval, Transaction, TransactionType};
