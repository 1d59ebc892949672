use chrono::NaiveDate;

use crate::harness::error::{HarnessError, HarnessResult};

/// How a due date typed as `dd-mm-yyyy` is filled into the add-task form.
pub trait DateEntry: Send + Sync {
    /// Form fields carrying `date`.
    fn fields(&self, date: NaiveDate) -> Vec<(&'static str, String)>;
}

/// One `due_date` field holding the whole date.
#[derive(Debug, Clone, Copy, Default)]
pub struct Combined;

impl DateEntry for Combined {
    fn fields(&self, date: NaiveDate) -> Vec<(&'static str, String)> {
        vec![("due_date", date.format("%d-%m-%Y").to_string())]
    }
}

/// Day, month and year in separate fields, the way segmented date widgets submit them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmented;

impl DateEntry for Segmented {
    fn fields(&self, date: NaiveDate) -> Vec<(&'static str, String)> {
        vec![
            ("due_date_day", date.format("%d").to_string()),
            ("due_date_month", date.format("%m").to_string()),
            ("due_date_year", date.format("%Y").to_string()),
        ]
    }
}

/// Selects a [`DateEntry`] strategy by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateEntryStyle {
    #[default]
    Combined,
    Segmented,
}

impl DateEntryStyle {
    pub fn strategy(self) -> Box<dyn DateEntry> {
        match self {
            DateEntryStyle::Combined => Box::new(Combined),
            DateEntryStyle::Segmented => Box::new(Segmented),
        }
    }
}

impl std::str::FromStr for DateEntryStyle {
    type Err = HarnessError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(DateEntryStyle::Combined),
            "segmented" => Ok(DateEntryStyle::Segmented),
            other => Err(HarnessError::InvalidInput(format!(
                "Unknown date entry style \"{}\" (expected combined or segmented)",
                other
            ))),
        }
    }
}

/// Parses a `dd-mm-yyyy` date as typed in a scenario.
pub fn parse_scenario_date(raw: &str) -> HarnessResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d-%m-%Y")
        .map_err(|_| HarnessError::InvalidInput(format!("\"{}\" is not a dd-mm-yyyy date", raw)))
}
