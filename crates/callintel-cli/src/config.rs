use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_REPORT_FROM_DAYS: i64 = -30;
const FROM_DAYS_ENV: &str = "CALLINTEL_DEFAULT_REPORT_FROM_DAYS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Days added to "now" when a report has no `--since`. Negative.
    pub default_report_from_days: i64,
    /// Call data file used when `--data` is not given.
    pub data_path: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_report_from_days: DEFAULT_REPORT_FROM_DAYS,
            data_path: None,
        }
    }
}

impl CliConfig {
    fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".callintel"))
    }

    /// Loads `explicit` if given (it must exist), else `~/.callintel` if
    /// present, else defaults.
    /// Lookback priority: CALLINTEL_DEFAULT_REPORT_FROM_DAYS env var > file >
    /// default (-30).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        if let Ok(raw) = std::env::var(FROM_DAYS_ENV) {
            match raw.trim().parse::<i64>() {
                Ok(days) => config.default_report_from_days = days,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {}", FROM_DAYS_ENV),
            }
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        let config: CliConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
