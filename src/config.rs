//! Runtime configuration from environment variables.
//!
//! Every setting has a default, so `pdfchat` runs with no environment at all
//! against a local Ollama and a `source_documents/` directory.

use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

use crate::ollama::{DEFAULT_EMBED_MODEL, DEFAULT_LLM_MODEL};
use crate::{DB_PATH, SOURCE_DIR};

pub const DEFAULT_BIND: &str = "127.0.0.1:5001";
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434/";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5001/";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    Bind { var: &'static str, value: String },
    #[error("{var} is not a valid URL: {value} ({source})")]
    Url {
        var: &'static str,
        value: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source_dir: PathBuf,
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub ollama_url: Url,
    pub llm_model: String,
    pub embed_model: String,
    /// Server the terminal client talks to.
    pub server_url: Url,
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    // Relative joins need a trailing slash on the base
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{}/", value)
    };
    Url::parse(&normalized).map_err(|source| ConfigError::Url {
        var,
        value: value.to_string(),
        source,
    })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let bind_raw = get("PDFCHAT_BIND", DEFAULT_BIND);
        let bind = bind_raw.parse().map_err(|_| ConfigError::Bind {
            var: "PDFCHAT_BIND",
            value: bind_raw.clone(),
        })?;

        Ok(Self {
            source_dir: PathBuf::from(get("PDFCHAT_SOURCE_DIR", SOURCE_DIR)),
            bind,
            db_path: PathBuf::from(get("PDFCHAT_DB", DB_PATH)),
            ollama_url: parse_url("OLLAMA_URL", &get("OLLAMA_URL", DEFAULT_OLLAMA_URL))?,
            llm_model: get("PDFCHAT_LLM_MODEL", DEFAULT_LLM_MODEL),
            embed_model: get("PDFCHAT_EMBED_MODEL", DEFAULT_EMBED_MODEL),
            server_url: parse_url("PDFCHAT_SERVER", &get("PDFCHAT_SERVER", DEFAULT_SERVER_URL))?,
        })
    }

    pub fn with_server_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.server_url = parse_url("server-url", raw)?;
        Ok(self)
    }
}
