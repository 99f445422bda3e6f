//! Statistics calculation engine.
//!
//! Turns the chronological match log into chart-ready series:
//! - Daily win rate and fun score
//! - Win/lose streak end points on a shared date axis
//! - Win rate pivots over one or two categorical dimensions
//!
//! Every computation is a pure function of the records it is given. The
//! [`Engine`] wrapper pulls those records from a [`RecordSource`] once per
//! call and keeps nothing between calls.

pub mod daily;
pub mod pivot;
pub mod streaks;

use thiserror::Error;
use tracing::debug;

use crate::models::{
    DailySeries, DateRange, DateRangeError, Dimension, LegacyGroupSizeTiers, MatchRecord,
    PivotTable, StreakSeries, UnknownDimension,
};
use crate::storage::{RecordSource, StorageError};

pub use daily::{daily_series, DayTally};
pub use pivot::{legacy_group_size_tiers, pivot};
pub use streaks::{detect_streaks, StreakDetector, MIN_STREAK};

/// Errors from a statistics request.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    InvalidDateRange(#[from] DateRangeError),

    #[error(transparent)]
    UnknownDimension(#[from] UnknownDimension),

    #[error("Dimension {0} cannot be used for both the first and second axis")]
    DuplicateDimension(Dimension),

    #[error("Record source unavailable: {0}")]
    SourceUnavailable(#[from] StorageError),
}

impl StatsError {
    /// True when the caller sent bad input, as opposed to a source failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StatsError::SourceUnavailable(_))
    }
}

/// Round to the nearest hundredth, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole`, or 0.0 for an empty whole.
pub fn ratio(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Parse pivot dimension names from a request.
pub fn parse_dimensions(
    first: &str,
    second: Option<&str>,
) -> Result<(Dimension, Option<Dimension>), StatsError> {
    let first: Dimension = first.parse()?;
    let second = match second.map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(s.parse::<Dimension>()?),
    };
    pivot::validate_dimensions(first, second)?;
    Ok((first, second))
}

/// Runs aggregations against a record source.
#[derive(Clone, Copy)]
pub struct Engine<'a> {
    source: &'a dyn RecordSource,
}

impl<'a> Engine<'a> {
    pub fn new(source: &'a dyn RecordSource) -> Self {
        Self { source }
    }

    /// The filtered match log itself, oldest first.
    pub fn games(&self, range: &DateRange) -> Result<Vec<MatchRecord>, StatsError> {
        Ok(self.source.fetch_records(range)?)
    }

    pub fn daily(&self, range: &DateRange) -> Result<DailySeries, StatsError> {
        let records = self.games(range)?;
        let series = daily_series(&records);
        debug!(records = records.len(), days = series.len(), "Computed daily series");
        Ok(series)
    }

    pub fn streaks(&self, range: &DateRange) -> Result<StreakSeries, StatsError> {
        let records = self.games(range)?;
        let series = detect_streaks(&records);
        debug!(records = records.len(), streaks = series.len(), "Computed streaks");
        Ok(series)
    }

    /// Pivot by one or two dimensions. Dimensions are checked before any
    /// records are read.
    pub fn pivot(
        &self,
        range: &DateRange,
        first: Dimension,
        second: Option<Dimension>,
    ) -> Result<PivotTable, StatsError> {
        pivot::validate_dimensions(first, second)?;
        let records = self.games(range)?;
        debug!(records = records.len(), %first, ?second, "Computing pivot");
        pivot(&records, first, second)
    }

    pub fn legacy_group_size(&self, range: &DateRange) -> Result<LegacyGroupSizeTiers, StatsError> {
        let records = self.games(range)?;
        Ok(legacy_group_size_tiers(&records))
    }
}
