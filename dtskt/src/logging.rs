//! Tracing subscriber setup
//!
//! The filter comes from `DTSKT_LOG`, then `RUST_LOG`, then the verbosity
//! flag (`info`, or `debug` with `-v`). `DTSKT_LOG_FORMAT=json` switches to
//! one JSON object per event. All output goes to stderr so `--dry-run` and
//! `--dump-ast` keep stdout clean.

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("DTSKT_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    if let Ok(val) = std::env::var("DTSKT_LOG") {
        return EnvFilter::builder().parse_lossy(val);
    }
    if let Ok(val) = std::env::var("RUST_LOG") {
        return EnvFilter::builder().parse_lossy(val);
    }
    EnvFilter::new(if verbose { "debug" } else { "info" })
}

/// Install the global subscriber
pub fn init_tracing(verbose: bool) {
    let filter = build_filter(verbose);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match LogFormat::from_env() {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}
