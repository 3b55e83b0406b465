//! Mouse configuration.
//!
//! Consolidates the knobs of the event pipeline into a single typed struct
//! with thread-safe access via RwLock.

use std::path::Path;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::MouseResult;

/// Double-click window used when the OS does not report one (Windows default).
pub const DEFAULT_DOUBLE_CLICK_TIME_MS: u64 = 500;

/// Polling interval for the polling provider (60Hz).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;

/// Centralized mouse configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MouseConfig {
    /// Emit every move message instead of coalescing bursts into one event.
    pub full_move_resolution: bool,

    /// Maximum gap between two clicks of the same button for a double click (50-5000 ms).
    pub double_click_time_ms: u64,

    /// Sampling interval of the polling provider (1-1000 ms).
    pub poll_interval_ms: u64,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            full_move_resolution: false,
            double_click_time_ms: DEFAULT_DOUBLE_CLICK_TIME_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl MouseConfig {
    /// Validate and clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        self.double_click_time_ms = self.double_click_time_ms.clamp(50, 5000);
        self.poll_interval_ms = self.poll_interval_ms.clamp(1, 1000);
    }

    /// Reset all settings to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load_from_file(path: &Path) -> MouseResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let mut config: MouseConfig = serde_json::from_str(&json)?;
        config.validate();
        Ok(config)
    }

    /// Save this configuration to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> MouseResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

lazy_static! {
    /// Global mouse configuration.
    ///
    /// # Example
    /// ```ignore
    /// {
    ///     let mut config = MOUSE_CONFIG.write();
    ///     config.full_move_resolution = true;
    /// }
    /// ```
    pub static ref MOUSE_CONFIG: RwLock<MouseConfig> = RwLock::new(MouseConfig::default());
}

/// Get the current full move resolution setting.
pub fn get_full_move_resolution() -> bool {
    MOUSE_CONFIG.read().full_move_resolution
}

/// Get the current double-click window in milliseconds.
pub fn get_double_click_time_ms() -> u64 {
    MOUSE_CONFIG.read().double_click_time_ms
}

/// Get the current polling interval in milliseconds.
pub fn get_poll_interval_ms() -> u64 {
    MOUSE_CONFIG.read().poll_interval_ms
}

/// Replace the whole configuration (batch update).
pub fn set_mouse_config(config: MouseConfig) {
    let mut current = MOUSE_CONFIG.write();
    *current = config;
    current.validate();
    log::debug!("[CONFIG] Mouse config updated: {:?}", *current);
}

/// Get a copy of the current configuration.
pub fn get_mouse_config() -> MouseConfig {
    MOUSE_CONFIG.read().clone()
}

/// Reset mouse settings to defaults.
pub fn reset_mouse_config() {
    MOUSE_CONFIG.write().reset();
    log::debug!("[CONFIG] Mouse settings reset to defaults");
}

/// Load the configuration from disk and make it current.
pub fn load_mouse_config(path: &Path) -> MouseResult<()> {
    let config = MouseConfig::load_from_file(path)?;
    log::info!("[CONFIG] Loaded mouse config from {}", path.display());
    *MOUSE_CONFIG.write() = config;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MouseConfig::default();
        assert!(!config.full_move_resolution);
        assert_eq!(config.double_click_time_ms, 500);
        assert_eq!(config.poll_interval_ms, 16);
    }

    #[test]
    fn test_config_validation() {
        let mut config = MouseConfig {
            double_click_time_ms: 0,
            poll_interval_ms: 60_000,
            ..Default::default()
        };
        config.validate();

        assert_eq!(config.double_click_time_ms, 50);
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_json_uses_camel_case_and_defaults() {
        let config: MouseConfig = serde_json::from_str(r#"{"fullMoveResolution":true}"#).unwrap();
        assert!(config.full_move_resolution);
        assert_eq!(config.double_click_time_ms, DEFAULT_DOUBLE_CLICK_TIME_MS);

        let json = serde_json::to_string(&MouseConfig::default()).unwrap();
        assert!(json.contains("\"doubleClickTimeMs\":500"));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir()
            .join(format!("shared-mouse-config-{}.json", std::process::id()));
        let config = MouseConfig {
            full_move_resolution: true,
            double_click_time_ms: 10_000,
            poll_interval_ms: 8,
        };
        config.save_to_file(&path).unwrap();

        let loaded = MouseConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(loaded.full_move_resolution);
        // Clamped on load
        assert_eq!(loaded.double_click_time_ms, 5000);
        assert_eq!(loaded.poll_interval_ms, 8);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let path = std::env::temp_dir().join("shared-mouse-does-not-exist.json");
        let err = MouseConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, crate::error::MouseError::ConfigError(_)));
    }

    #[test]
    fn test_global_setters() {
        set_mouse_config(MouseConfig {
            full_move_resolution: true,
            double_click_time_ms: 1,
            poll_interval_ms: 20,
        });
        assert!(get_full_move_resolution());
        assert_eq!(get_double_click_time_ms(), 50);
        assert_eq!(get_poll_interval_ms(), 20);

        reset_mouse_config();
        assert_eq!(get_mouse_config(), MouseConfig::default());
    }
}
