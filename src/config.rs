//! User configuration (`config.toml`)
//!
//! Looked up at `<config dir>/cdi-calc/config.toml` unless a path is given.
//! Every key is optional; a missing default file means defaults, while a
//! path given explicitly must exist.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::calendar::CalendarKind;
use crate::projection::{HolidayYearPolicy, ProjectionOptions, DEFAULT_BUSINESS_DAYS_PER_MONTH};
use crate::rates::bcb::DEFAULT_SGS_BASE_URL;
use crate::rates::CDI_SERIES_ID;

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub series_id: u32,
    pub sgs_base_url: String,
    pub request_timeout_secs: u64,
    pub calendar: CalendarKind,
    pub holiday_year_policy: HolidayYearPolicy,
    pub business_days_per_month: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            series_id: CDI_SERIES_ID,
            sgs_base_url: DEFAULT_SGS_BASE_URL.to_string(),
            request_timeout_secs: 10,
            calendar: CalendarKind::National,
            holiday_year_policy: HolidayYearPolicy::StartYear,
            business_days_per_month: DEFAULT_BUSINESS_DAYS_PER_MONTH,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid config file")?;
        if config.business_days_per_month == 0 {
            return Err(anyhow!("business_days_per_month must be greater than zero"));
        }
        Ok(config)
    }

    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(anyhow!("Config file {} does not exist", p.display()));
                }
                p.to_path_buf()
            }
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                Some(p) => {
                    debug!("No config at {}, using defaults", p.display());
                    return Ok(Self::default());
                }
                None => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            series_id: self.series_id,
            calendar: self.calendar,
            holiday_year_policy: self.holiday_year_policy,
            business_days_per_month: self.business_days_per_month,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .map(|dir| dir.join("cdi-calc").join(CONFIG_FILENAME))
}
