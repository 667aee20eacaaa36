use std::fs;
use std::path::{Path, PathBuf};

use batterytop_core::TrendSource;
use serde::{Deserialize, Serialize};

use crate::app_state::AppError;

pub const DEFAULT_POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";
pub const DEFAULT_HWMON_ROOT: &str = "/sys/class/hwmon";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Host configuration, read from an optional TOML file.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Delay between two telemetry deliveries
    pub poll_interval_ms: u64,
    pub power_supply_root: PathBuf,
    pub hwmon_root: PathBuf,
    /// Power supply directory name, e.g. `BAT1`. Auto-discovered when unset.
    pub battery: Option<String>,
    pub track: TrendSource,
    pub show_sensors: bool,
    pub output: OutputMode,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Rendered report, redrawn in place
    #[default]
    Text,
    /// One JSON object per delivery
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            power_supply_root: PathBuf::from(DEFAULT_POWER_SUPPLY_ROOT),
            hwmon_root: PathBuf::from(DEFAULT_HWMON_ROOT),
            battery: None,
            track: TrendSource::Level,
            show_sensors: true,
            output: OutputMode::Text,
        }
    }
}

impl Config {
    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| AppError::Config {
                    path: path.to_path_buf(),
                    details: source.to_string(),
                })?;
                Self::from_toml(&text).map_err(|e| match e {
                    AppError::Config { details, .. } => AppError::Config {
                        path: path.to_path_buf(),
                        details,
                    },
                    other => other,
                })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(text).map_err(|e| AppError::Config {
            path: PathBuf::new(),
            details: e.to_string(),
        })?;
        if config.poll_interval_ms == 0 {
            return Err(AppError::Config {
                path: PathBuf::new(),
                details: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = Config::from_toml(
            r#"
            poll_interval_ms = 250
            battery = "BAT1"
            track = "voltage"
            output = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.battery.as_deref(), Some("BAT1"));
        assert_eq!(config.track, TrendSource::Voltage);
        assert_eq!(config.output, OutputMode::Json);
        assert!(config.show_sensors);
        assert_eq!(
            config.power_supply_root,
            PathBuf::from(DEFAULT_POWER_SUPPLY_ROOT)
        );
    }

    #[test]
    fn test_rejects_unknown_fields_and_zero_interval() {
        assert!(matches!(
            Config::from_toml("colour = \"blue\""),
            Err(AppError::Config { .. })
        ));
        assert!(matches!(
            Config::from_toml("poll_interval_ms = 0"),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn test_load_from_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "track = \"sideways\"").unwrap();

        match Config::load(Some(file.path())) {
            Err(AppError::Config { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_without_path() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
