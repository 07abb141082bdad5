use crate::options::ParsingConfiguration;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub parsing: ParsingConfiguration,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(raw).with_context(|| "parsing TOML")?;
        cfg.service
            .validate()
            .with_context(|| "validating [service]")?;
        cfg.parsing
            .validate()
            .with_context(|| "validating [parsing]")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub request_timeout_seconds: u64,
    pub poll_interval_seconds: u64,
}
impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tensorlake.ai/documents/v2".into(),
            api_key_env: "TENSORLAKE_API_KEY".into(),
            request_timeout_seconds: 120,
            poll_interval_seconds: 5,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than zero"));
        }
        if self.poll_interval_seconds == 0 {
            return Err(anyhow!("poll_interval_seconds must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub normalize_newlines: bool,
    pub trim_trailing_whitespace: bool,
    pub normalize_unicode: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            normalize_newlines: true,
            trim_trailing_whitespace: false,
            normalize_unicode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
