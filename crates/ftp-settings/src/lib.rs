//! # ftp-settings
//!
//! Layered configuration for the FTP analyzer.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`AnalyzerSettings::default()`]
//! 2. **Settings file**: `~/.ftp-analyzer/settings.json` or an explicit path
//! 3. **Environment variables**: `FTP_*` overrides (highest priority)
//!
//! Settings are built once at startup and passed by reference; there is no
//! global instance.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    deep_merge, load_settings, load_settings_from_path, load_settings_with, settings_path,
};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_path_is_under_home_dir() {
        let path = settings_path();
        assert!(path.ends_with(".ftp-analyzer/settings.json"));
    }
}
