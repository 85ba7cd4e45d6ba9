//! # Application Configuration
//!
//! Per-installation settings that live outside the snapshot store: where the
//! data goes, how money is displayed, receipt printer layout, login delay.
//! Tenant settings (segments, auto-accept, VIP threshold) are business data
//! and live in the `business_config` snapshot instead.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BIZDESK_DATA_DIR=/srv/bizdesk                                      │
//! │     BIZDESK_LOGIN_DELAY_MS=0                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bizdesk/bizdesk.toml (Linux)                             │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [display]
//! currency_symbol = "R$"
//! currency_decimals = 2
//! sound_enabled = true
//!
//! [storage]
//! data_dir = "/srv/bizdesk"
//!
//! [access]
//! login_delay_ms = 800
//!
//! [printer]
//! paperWidthMm = 58
//! fontSize = "small"
//! copies = 2
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bizdesk_core::{Money, PrinterConfig};
use bizdesk_store::{StoreConfig, StoreResult};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u8,

    /// Play a sound on new orders.
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_currency_decimals() -> u8 {
    2
}

fn default_true() -> bool {
    true
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
            currency_decimals: default_currency_decimals(),
            sound_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Snapshot directory. `None` uses the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSettings {
    /// Simulated PIN check latency.
    #[serde(default = "default_login_delay")]
    pub login_delay_ms: u64,
}

fn default_login_delay() -> u64 {
    800
}

impl Default for AccessSettings {
    fn default() -> Self {
        AccessSettings {
            login_delay_ms: default_login_delay(),
        }
    }
}

const MAX_LOGIN_DELAY_MS: u64 = 10_000;
const MAX_CURRENCY_DECIMALS: u8 = 4;

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub access: AccessSettings,

    #[serde(default)]
    pub printer: PrinterConfig,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (bizdesk.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Defaults suited to tests: no login delay, in-memory friendly.
    pub fn for_tests() -> Self {
        let mut config = Self::default();
        config.access.login_delay_ms = 0;
        config
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.display.currency_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "currency_symbol must not be empty".into(),
            ));
        }
        if self.display.currency_decimals > MAX_CURRENCY_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "currency_decimals must be at most {}",
                MAX_CURRENCY_DECIMALS
            )));
        }
        if self.access.login_delay_ms > MAX_LOGIN_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "login_delay_ms must be at most {}",
                MAX_LOGIN_DELAY_MS
            )));
        }
        if !(40..=120).contains(&self.printer.paper_width_mm) {
            return Err(ConfigError::Invalid(format!(
                "paper width must be between 40 and 120 mm, got {}",
                self.printer.paper_width_mm
            )));
        }
        if self.printer.copies == 0 {
            return Err(ConfigError::Invalid("copies must be at least 1".into()));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `BIZDESK_*` overrides from any lookup; unparsable values
    /// are ignored with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("BIZDESK_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data directory from environment");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(symbol) = lookup("BIZDESK_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }

        if let Some(delay) = lookup("BIZDESK_LOGIN_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => self.access.login_delay_ms = ms,
                Err(_) => warn!(value = %delay, "Ignoring invalid BIZDESK_LOGIN_DELAY_MS"),
            }
        }

        if let Some(width) = lookup("BIZDESK_PAPER_WIDTH_MM") {
            match width.parse::<u16>() {
                Ok(mm) => self.printer.paper_width_mm = mm,
                Err(_) => warn!(value = %width, "Ignoring invalid BIZDESK_PAPER_WIDTH_MM"),
            }
        }

        if let Some(sound) = lookup("BIZDESK_SOUND_ENABLED") {
            match sound.to_lowercase().as_str() {
                "1" | "true" | "on" => self.display.sound_enabled = true,
                "0" | "false" | "off" => self.display.sound_enabled = false,
                _ => warn!(value = %sound, "Ignoring invalid BIZDESK_SOUND_ENABLED"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bizdesk", "bizdesk")
            .map(|dirs| dirs.config_dir().join("bizdesk.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Where the snapshot store lives.
    pub fn store_config(&self) -> StoreResult<StoreConfig> {
        match &self.storage.data_dir {
            Some(dir) => Ok(StoreConfig::new(dir.clone())),
            None => StoreConfig::default_location(),
        }
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.access.login_delay_ms)
    }

    /// Formats an amount with the configured symbol and decimals.
    ///
    /// Amounts are always held in cents; with fewer than two decimals the
    /// extra digits are dropped, with more they are zero-padded.
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let sign = if cents < 0 { "-" } else { "" };
        let whole = (cents / 100).abs();
        let frac = (cents % 100).abs();
        let decimals = self.display.currency_decimals as usize;

        let fraction = match decimals {
            0 => String::new(),
            1 => format!(".{}", frac / 10),
            _ => format!(".{:02}{}", frac, "0".repeat(decimals - 2)),
        };
        format!("{}{}{}{}", sign, self.display.currency_symbol, whole, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdesk_core::FontSize;
    use std::collections::HashMap;

    #[test]
    fn test_format_currency_positive() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
        assert_eq!(config.format_currency(Money::from_cents(100)), "$1.00");
        assert_eq!(config.format_currency(Money::from_cents(1)), "$0.01");
        assert_eq!(config.format_currency(Money::zero()), "$0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(-550)), "-$5.50");
    }

    #[test]
    fn test_format_currency_custom_symbol() {
        let mut config = AppConfig::default();
        config.display.currency_symbol = "R$".to_string();
        config.display.currency_decimals = 0;
        assert_eq!(config.format_currency(Money::from_cents(2599)), "R$25");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.display, DisplaySettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bizdesk.toml");

        let mut config = AppConfig::default();
        config.storage.data_dir = Some(dir.path().join("data"));
        config.printer.paper_width_mm = 58;
        config.printer.font_size = FontSize::Small;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: AppConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("[access]\nlogin_delay_ms = 0\n").unwrap();
        assert_eq!(config.access.login_delay_ms, 0);
        assert_eq!(config.display.currency_symbol, "$");
        assert_eq!(config.printer.copies, 1);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bizdesk.toml");
        std::fs::write(&path, "[display\ncurrency_symbol = ").unwrap();
        assert!(matches!(
            AppConfig::load(Some(path)),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_paper_width() {
        let mut config = AppConfig::default();
        config.printer.paper_width_mm = 10;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BIZDESK_DATA_DIR", "/srv/bizdesk"),
            ("BIZDESK_LOGIN_DELAY_MS", "0"),
            ("BIZDESK_PAPER_WIDTH_MM", "wide"),
            ("BIZDESK_SOUND_ENABLED", "off"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/srv/bizdesk")));
        assert_eq!(config.login_delay(), Duration::ZERO);
        assert_eq!(config.printer.paper_width_mm, 80);
        assert!(!config.display.sound_enabled);
    }

    #[test]
    fn test_store_config_prefers_explicit_dir() {
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/tmp/bizdesk-data"));
        assert_eq!(
            config.store_config().unwrap().data_dir,
            PathBuf::from("/tmp/bizdesk-data")
        );
    }
}
