//! Tracing setup for Overtime
//!
//! Console-only subscriber with the usual `RUST_LOG` override. Playback
//! sessions log strategy choices, recovery attempts, and swallowed
//! autoplay rejections; nothing here is load-bearing for correctness.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize console tracing at `console_level` unless `RUST_LOG` is set.
///
/// # Errors
///
/// - `Box<dyn std::error::Error>` - A global subscriber is already installed
pub fn init_tracing(console_level: Level) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    Ok(())
}
