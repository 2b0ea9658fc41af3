use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use qsolog_core::ImportPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub import: ImportPolicy,
    #[serde(default)]
    pub lotw: LotwConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LotwConfig {
    #[serde(default = "default_lotw_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_start_date")]
    pub default_start_date: String,
}

impl Default for LotwConfig {
    fn default() -> Self {
        Self {
            base_url: default_lotw_base_url(),
            username: None,
            timeout_secs: default_timeout_secs(),
            default_start_date: default_start_date(),
        }
    }
}

fn default_lotw_base_url() -> String {
    "https://lotw.arrl.org".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_start_date() -> String {
    "1945-01-01".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_program_id")]
    pub program_id: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            program_id: default_program_id(),
        }
    }
}

fn default_program_id() -> String {
    "QsoLog".to_string()
}

/// Parse a `YYYY-MM-DD` date, naming `what` in the error.
pub fn parse_date(value: &str, what: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("{} must be a YYYY-MM-DD date, got '{}'", what, value))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate lotw
    if config.lotw.timeout_secs == 0 {
        anyhow::bail!("lotw.timeout_secs must be > 0");
    }
    if !config.lotw.base_url.starts_with("http://")
        && !config.lotw.base_url.starts_with("https://")
    {
        anyhow::bail!(
            "lotw.base_url must start with http:// or https://, got '{}'",
            config.lotw.base_url
        );
    }
    parse_date(&config.lotw.default_start_date, "lotw.default_start_date")?;

    // Validate export
    if config.export.program_id.trim().is_empty() {
        anyhow::bail!("export.program_id must not be empty");
    }

    Ok(config)
}
