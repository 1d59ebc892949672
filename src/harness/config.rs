use std::env;
use std::time::Duration;

use crate::harness::date_entry::DateEntryStyle;
use crate::harness::error::{HarnessError, HarnessResult};

/// Settings of a scripted browser session.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// How long a wait polls before failing with `HarnessError::Timeout`.
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub date_entry: DateEntryStyle,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            date_entry: DateEntryStyle::Combined,
        }
    }
}

impl HarnessConfig {
    /// Reads `HARNESS_TIMEOUT_SECS`, `HARNESS_POLL_MILLIS` and `HARNESS_DATE_ENTRY`, keeping
    /// the defaults for unset variables.
    pub fn from_env() -> HarnessResult<Self> {
        let defaults = HarnessConfig::default();

        let timeout = match env::var("HARNESS_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(parse_number("HARNESS_TIMEOUT_SECS", &raw)?),
            Err(_) => defaults.timeout,
        };
        let poll_interval = match env::var("HARNESS_POLL_MILLIS") {
            Ok(raw) => Duration::from_millis(parse_number("HARNESS_POLL_MILLIS", &raw)?),
            Err(_) => defaults.poll_interval,
        };
        let date_entry = match env::var("HARNESS_DATE_ENTRY") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.date_entry,
        };

        Ok(HarnessConfig {
            timeout,
            poll_interval,
            date_entry,
        })
    }

    pub fn with_date_entry(mut self, style: DateEntryStyle) -> Self {
        self.date_entry = style;
        self
    }
}

fn parse_number(name: &str, raw: &str) -> HarnessResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| HarnessError::InvalidInput(format!("{} must be a whole number, got \"{}\"", name, raw)))
}
