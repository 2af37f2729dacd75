//! Configuration module for Cascade
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (CASCADE_*)
//! 3. Project config (`./cascade.toml`)
//! 4. User config (`~/.config/cascade/config.toml`)
//! 5. Built-in defaults (lowest priority)

mod loader;
#[cfg(test)]
mod tests;
mod types;

pub use loader::{ConfigWarning, PROJECT_CONFIG_FILE};
pub use types::{Config, PathsConfig, WatchConfig, DEFAULT_POLL_INTERVAL_MS};
