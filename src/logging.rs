//! Tracing subscriber setup.
//!
//! Filter comes from `RUST_LOG` when set, otherwise [`DEFAULT_FILTER`].

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_FILTER: &str = "pdfchat=info,tower_http=info";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing_subscriber::util::TryInitError),
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init() -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(build_env_filter())
        .with(fmt::layer().with_target(false))
        .try_init()?;
    Ok(())
}
