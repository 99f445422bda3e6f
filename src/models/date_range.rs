//! Inclusive day-granularity date filter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid {bound} date '{value}' (expected YYYY-MM-DD)")]
pub struct DateRangeError {
    pub bound: &'static str,
    pub value: String,
}

/// Date range filter. A `None` bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { begin, end }
    }

    /// Range with no bounds at all.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parse the raw bounds of a request. Missing or blank strings mean unbounded.
    pub fn parse(begin: Option<&str>, end: Option<&str>) -> Result<Self, DateRangeError> {
        Ok(Self {
            begin: parse_bound("begin", begin)?,
            end: parse_bound("end", end)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.begin.map_or(true, |b| date >= b) && self.end.map_or(true, |e| date <= e)
    }
}

fn parse_bound(bound: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, DateRangeError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| DateRangeError {
                bound,
                value: s.to_string(),
            }),
    }
}
