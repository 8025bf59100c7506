use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn creatzion_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".creatzion"))
}

pub fn ensure_creatzion_home() -> Result<PathBuf> {
    let dir = creatzion_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Transaction file used when neither `--data` nor `[store] path` is given
pub fn default_data_path() -> Result<PathBuf> {
    Ok(creatzion_home()?.join("transactions.csv"))
}
