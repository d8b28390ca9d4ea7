use crate::constants;
use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Driver configuration. Everything has a compiled-in default so the
/// pipeline runs with no config file at all; `config.toml` overrides
/// individual fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Thread count passed to the downloader, converter and quantifier.
    pub threads: u32,
    pub tools: ToolsConfig,
    pub quant: QuantConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub downloader: String,
    pub converter: String,
    pub quantifier: String,
    pub sync: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuantConfig {
    pub index: String,
    pub t2g: String,
    pub technology: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub bucket: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: constants::DEFAULT_THREADS,
            tools: ToolsConfig::default(),
            quant: QuantConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            downloader: constants::DOWNLOADER_BIN.to_string(),
            converter: constants::CONVERTER_BIN.to_string(),
            quantifier: constants::QUANTIFIER_BIN.to_string(),
            sync: constants::SYNC_BIN.to_string(),
        }
    }
}

impl Default for QuantConfig {
    fn default() -> Self {
        Self {
            index: constants::DEFAULT_INDEX.to_string(),
            t2g: constants::DEFAULT_T2G.to_string(),
            technology: constants::DEFAULT_TECHNOLOGY.to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            bucket: constants::DEFAULT_BUCKET.to_string(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to the
    /// defaults when the file does not exist. A present but malformed file
    /// is an error.
    pub fn load_or_default() -> Result<Self> {
        let config_path = "config.toml";
        if !Path::new(config_path).exists() {
            debug!("No {config_path} found, using built-in defaults");
            return Ok(Config::default());
        }
        let config_content = fs::read_to_string(config_path)?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
