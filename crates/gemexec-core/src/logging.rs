//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for the rendered document.
//! `GEMEXEC_LOG` takes an `EnvFilter` directive (e.g. `debug`,
//! `gemexec_core=trace`); the default is `warn`.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "GEMEXEC_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber. Calling it twice is harmless; the second
/// call keeps the first subscriber.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
