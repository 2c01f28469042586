//! Logging bootstrap.
//!
//! # Responsibility
//! - Install one `tracing` fmt subscriber per process, writing to stderr so
//!   machine-readable stdout stays clean.
//!
//! # Invariants
//! - Init is idempotent for the same level and never panics.
//! - `RUST_LOG`, when set, overrides the configured level.
//! - Re-initialization with a different level is rejected.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INITIALIZED_LEVEL: OnceLock<String> = OnceLock::new();

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Initialize logging at `level` (one of trace, debug, info, warn, error,
/// off).
///
/// # Errors
/// - `level` is not a known level name.
/// - Logging was already initialized with a different level.
/// - Another global subscriber was installed outside this function.
pub fn init_logging(level: &str) -> Result<(), String> {
    let level = normalize_level(level)?;

    if let Some(current) = INITIALIZED_LEVEL.get() {
        if *current == level {
            return Ok(());
        }
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            current, level
        ));
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("failed to install log subscriber: {e}"))?;

    let _ = INITIALIZED_LEVEL.set(level);
    Ok(())
}

fn normalize_level(level: &str) -> Result<String, String> {
    let normalized = level.trim().to_ascii_lowercase();
    if LEVELS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(format!(
            "unsupported log level `{}` (expected one of {})",
            level,
            LEVELS.join(", ")
        ))
    }
}
