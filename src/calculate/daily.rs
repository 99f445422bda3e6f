//! Per-day win rate and fun score.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailySeries, MatchRecord};

use super::{ratio, round2};

/// Outcome counts for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTally {
    pub wins: u32,
    /// Losses not marked one-sided (including unknown)
    pub normal_losses: u32,
    pub one_sided_losses: u32,
    pub total: u32,
}

impl DayTally {
    pub fn add(&mut self, record: &MatchRecord) {
        self.total += 1;
        if record.win {
            self.wins += 1;
        } else if record.is_one_sided_loss() {
            self.one_sided_losses += 1;
        } else {
            self.normal_losses += 1;
        }
    }

    /// Share of games won, rounded to hundredths.
    pub fn win_rate(&self) -> f64 {
        round2(ratio(self.wins, self.total))
    }

    /// Fun score: win share with one-sided losses counted twice, centred on
    /// 0.5 and scaled by the day's volume. Not rounded.
    pub fn fun(&self) -> f64 {
        let denominator = self.total + self.one_sided_losses;
        (ratio(self.wins, denominator) - 0.5) * self.total as f64
    }
}

/// Group matches by date.
pub fn tally_by_day(records: &[MatchRecord]) -> BTreeMap<NaiveDate, DayTally> {
    let mut days: BTreeMap<NaiveDate, DayTally> = BTreeMap::new();
    for record in records {
        days.entry(record.date).or_default().add(record);
    }
    days
}

/// Build the daily series, one entry per day that has matches, oldest first.
pub fn daily_series(records: &[MatchRecord]) -> DailySeries {
    let days = tally_by_day(records);
    let mut series = DailySeries::default();

    for (date, tally) in days {
        series.dates.push(date);
        series.win_rate.push(tally.win_rate());
        series.total_games.push(tally.total);
        series.fun.push(tally.fun());
    }

    series
}
