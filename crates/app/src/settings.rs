//! Settings for the `billsplit` binary.
//!
//! Read from a TOML file (default `config/billsplit.toml`, missing is fine)
//! and overridden by `BILLSPLIT__<SECTION>__<KEY>` environment variables.

use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/billsplit.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_bytes: server::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Recognizer {
    /// Falls back to `GOOGLE_API_KEY` when unset.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub recognizer: Option<Recognizer>,
}

#[derive(Debug, Parser)]
#[command(name = "billsplit", version)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let args = Args::parse();
        Self::from_path(args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH))
    }

    fn from_path(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("BILLSPLIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Recognizer API key from the settings or from `GOOGLE_API_KEY`.
    pub fn recognizer_api_key(&self) -> Option<String> {
        self.recognizer
            .as_ref()
            .and_then(|r| r.api_key.clone())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}
