//! Tracing subscriber setup.
//!
//! Production environments log structured JSON; everything else gets
//! human-readable coloured output. `RUST_LOG` overrides the default `info`
//! filter in both cases.

use crate::config::get_environment;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "production" | "prod" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

pub fn init_logging() {
    init_with_format(LogFormat::for_environment(&get_environment()));
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init_with_format(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
    };
    // Already installed, e.g. by an earlier test.
    let _ = result;
}
