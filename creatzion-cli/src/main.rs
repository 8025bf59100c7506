use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use creatzion_core::time::{local_now, parse_reference_time};
use creatzion_core::{
    ChatService, ConversationHistory, EasterEggs, PreparedTurn, QueryEngine, SpecialResponder,
    Transaction,
};
use creatzion_store::TransactionStore;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod llm;
mod render;
mod state;

use config::Config;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CREATZION_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "creatzion", version = VERSION, about = "Ask questions about your transactions in plain language")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer one question from the transaction file, without a model
    Query {
        /// User id (default: [chat] user)
        #[arg(long)]
        user: Option<String>,

        /// CSV or JSON transaction file (default: [store] path, then ~/.creatzion/transactions.csv)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Reference time "YYYY-MM-DD HH:MM" in the configured timezone (default: now)
        #[arg(long)]
        now: Option<String>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,

        /// The question
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Chat line by line on stdin; /reset clears the history, /quit exits
    Chat {
        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        data: Option<PathBuf>,

        /// Print the prompt instead of calling the model
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage ~/.creatzion/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();

    match cli.command {
        Command::Query {
            user,
            data,
            now,
            json,
            message,
        } => {
            let cfg = config::load_config()?;
            run_query(&cfg, user, data, now.as_deref(), json, &message.join(" "))?;
        }

        Command::Chat { user, data, dry_run } => {
            let cfg = config::load_config()?;
            run_chat(&cfg, user, data, dry_run)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn data_path(cfg: &Config, data: Option<PathBuf>) -> Result<PathBuf> {
    match data.or_else(|| cfg.store.path.clone()) {
        Some(p) => Ok(p),
        None => state::default_data_path(),
    }
}

fn reference_time(cfg: &Config, now: Option<&str>) -> Result<NaiveDateTime> {
    match now {
        Some(s) => parse_reference_time(s, &cfg.chat.timezone),
        None => local_now(&cfg.chat.timezone),
    }
}

fn run_query(
    cfg: &Config,
    user: Option<String>,
    data: Option<PathBuf>,
    now: Option<&str>,
    json: bool,
    message: &str,
) -> Result<()> {
    if let Some(reply) = EasterEggs::default().lookup(message) {
        println!("{reply}");
        return Ok(());
    }

    let user = user.unwrap_or_else(|| cfg.chat.user.clone());
    let path = data_path(cfg, data)?;
    if !path.exists() {
        bail!("Transaction file not found: {} (pass --data <file>)", path.display());
    }
    let now = reference_time(cfg, now)?;

    let store = creatzion_store::open(&path)?;
    let history = store
        .recent(&user, cfg.engine.fetch_limit)
        .with_context(|| format!("reading {}", path.display()))?;
    info!(user = %user, rows = history.len(), "loaded transactions");

    let outcome = QueryEngine::new(cfg.engine.options()).run(message, &history, now);
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", render::render_outcome(&outcome));
    }
    Ok(())
}

fn run_chat(cfg: &Config, user: Option<String>, data: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let user = user.unwrap_or_else(|| cfg.chat.user.clone());
    let path = data_path(cfg, data)?;
    let store = if path.exists() {
        Some(creatzion_store::open(&path)?)
    } else {
        warn!(path = %path.display(), "transaction file not found; chatting without data");
        None
    };

    let model = if dry_run {
        None
    } else {
        Some(llm::LlmClient::from_config(&cfg.llm)?)
    };

    let history = ConversationHistory::new(cfg.chat.history_capacity);
    let service = ChatService::new(QueryEngine::new(cfg.engine.options()), &history);
    let limit = cfg.engine.fetch_limit;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("you> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let line = line.trim();
        match line {
            "/quit" | "/exit" => break,
            "/reset" => {
                history.reset();
                println!("(history cleared)");
                continue;
            }
            _ => {}
        }

        let now = reference_time(cfg, None)?;
        let fetch = || -> Result<Vec<Transaction>> {
            match &store {
                Some(s) => Ok(s.recent(&user, limit)?),
                None => bail!("no transaction file"),
            }
        };

        match &model {
            Some(model) => {
                let reply = service.respond(line, now, fetch, model);
                println!("creatzion> {}\n", reply.text);
            }
            None => match service.prepare(line, now, fetch) {
                PreparedTurn::Special(text) => println!("creatzion> {text}\n"),
                PreparedTurn::Prompt { prompt, .. } => println!("--- prompt ---\n{prompt}\n--------------\n"),
            },
        }
    }

    Ok(())
}
