//! Season presets used as date-range shortcuts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DateRange;

/// A named competitive season. An open `end` means it is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub name: String,
    pub begin: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl Season {
    pub fn new(name: impl Into<String>, begin: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self {
            name: name.into(),
            begin,
            end,
        }
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(Some(self.begin), self.end)
    }

    pub fn is_current(&self) -> bool {
        self.end.is_none()
    }
}

/// Find a season by name, ignoring case.
pub fn find_season<'a>(seasons: &'a [Season], name: &str) -> Option<&'a Season> {
    seasons.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}
