use anyhow::{Context, Result};
use creatzion_core::history::DEFAULT_CAPACITY;
use creatzion_core::time::DEFAULT_TIMEZONE;
use creatzion_core::{EngineOptions, SeedPolicy};
use creatzion_store::DEFAULT_FETCH_LIMIT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_creatzion_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub chat: ChatSection,
    pub engine: EngineSection,
    pub store: StoreSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    OpenAI,
    Anthropic,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-1.5-flash",
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-sonnet-latest",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::OpenAI => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub provider: Provider,
    pub model: String,
    /// Empty means the provider's public endpoint
    pub base_url: String,
    pub temperature: f32,
    /// Environment variable holding the API key; empty means the provider default
    pub api_key_env: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        let provider = Provider::Gemini;
        Self {
            provider,
            model: provider.default_model().to_string(),
            base_url: String::new(),
            temperature: 0.7,
            api_key_env: String::new(),
        }
    }
}

impl LlmSection {
    pub fn base_url(&self) -> &str {
        let url = self.base_url.trim().trim_end_matches('/');
        if url.is_empty() { self.provider.default_base_url() } else { url }
    }

    pub fn api_key_env(&self) -> &str {
        let name = self.api_key_env.trim();
        if name.is_empty() { self.provider.default_api_key_env() } else { name }
    }

    pub fn api_key(&self) -> Result<String> {
        let name = self.api_key_env();
        std::env::var(name)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("{name} is not set (or use `creatzion chat --dry-run`)"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSection {
    pub history_capacity: usize,
    /// User whose transactions are queried when `--user` is absent
    pub user: String,
    pub timezone: String,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            user: "default".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub fetch_limit: usize,
    pub display_rows: usize,
    pub fallback_rows: usize,
    pub default_rank_limit: usize,
    /// Re-seed an emptied candidate set from the full history when a later
    /// filter fires
    pub restart_from_history: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        let opts = EngineOptions::default();
        Self {
            fetch_limit: DEFAULT_FETCH_LIMIT,
            display_rows: opts.display_rows,
            fallback_rows: opts.fallback_rows,
            default_rank_limit: opts.default_rank_limit,
            restart_from_history: opts.seed_policy == SeedPolicy::RestartFromHistory,
        }
    }
}

impl EngineSection {
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            display_rows: self.display_rows,
            fallback_rows: self.fallback_rows,
            default_rank_limit: self.default_rank_limit,
            seed_policy: if self.restart_from_history {
                SeedPolicy::RestartFromHistory
            } else {
                SeedPolicy::KeepEmpty
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// CSV or JSON transaction file
    pub path: Option<PathBuf>,
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_creatzion_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    let source = if p.exists() { p.display().to_string() } else { "defaults".to_string() };
    println!("# {source}");
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
