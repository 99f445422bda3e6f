//! Win and lose streak detection.
//!
//! Scans matches one game at a time (not per day) and records every run of
//! at least [`MIN_STREAK`] identical outcomes at the date its last game was
//! played.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{MatchRecord, StreakKind, StreakSeries};

/// Shortest run that counts as a streak.
pub const MIN_STREAK: u32 = 3;

/// The run currently being extended.
#[derive(Debug, Clone, Copy)]
struct Run {
    kind: StreakKind,
    length: u32,
    start: NaiveDate,
    end: NaiveDate,
}

impl Run {
    fn start(kind: StreakKind, date: NaiveDate) -> Self {
        Self {
            kind,
            length: 1,
            start: date,
            end: date,
        }
    }
}

impl StreakSeries {
    /// Record a finished streak of `kind` ending on `date`.
    ///
    /// When the last entry is already on `date` and has no value for
    /// `kind`, the value is written into that entry so both kinds share
    /// one point on the date axis. Otherwise a new entry is appended.
    pub(crate) fn push_streak(&mut self, kind: StreakKind, date: NaiveDate, length: u32) {
        if let Some(last) = self.dates.len().checked_sub(1) {
            if self.dates[last] == date && self.length_at(kind, last).is_none() {
                match kind {
                    StreakKind::Win => self.win_streak_length[last] = Some(length),
                    StreakKind::Lose => self.lose_streak_length[last] = Some(length),
                }
                return;
            }
        }

        self.dates.push(date);
        let (win, lose) = match kind {
            StreakKind::Win => (Some(length), None),
            StreakKind::Lose => (None, Some(length)),
        };
        self.win_streak_length.push(win);
        self.lose_streak_length.push(lose);
    }
}

/// Streak detector with a configurable threshold.
#[derive(Debug, Clone)]
pub struct StreakDetector {
    min_streak: u32,
    current: Option<Run>,
    series: StreakSeries,
}

impl Default for StreakDetector {
    fn default() -> Self {
        Self::new(MIN_STREAK)
    }
}

impl StreakDetector {
    pub fn new(min_streak: u32) -> Self {
        Self {
            min_streak,
            current: None,
            series: StreakSeries::default(),
        }
    }

    /// Feed the next game in chronological order.
    pub fn push(&mut self, date: NaiveDate, win: bool) {
        let kind = if win {
            StreakKind::Win
        } else {
            StreakKind::Lose
        };

        if let Some(run) = self.current.as_mut().filter(|r| r.kind == kind) {
            run.length += 1;
            run.end = date;
            return;
        }

        self.close();
        self.current = Some(Run::start(kind, date));
    }

    fn close(&mut self) {
        let Some(run) = self.current.take() else {
            return;
        };
        if run.length < self.min_streak {
            return;
        }
        debug!(
            kind = ?run.kind,
            length = run.length,
            start = %run.start,
            end = %run.end,
            "Streak closed"
        );
        self.series.push_streak(run.kind, run.end, run.length);
    }

    /// Close any open run and return the series.
    pub fn finish(mut self) -> StreakSeries {
        self.close();
        self.series
    }
}

/// Detect streaks in matches sorted ascending by date.
pub fn detect_streaks(records: &[MatchRecord]) -> StreakSeries {
    let mut detector = StreakDetector::default();
    for record in records {
        detector.push(record.date, record.win);
    }
    detector.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, n).unwrap()
    }

    /// Run the detector over `(day, outcome)` pairs, `W` or `L`.
    fn scan(games: &[(u32, char)]) -> StreakSeries {
        let mut detector = StreakDetector::default();
        for (day, outcome) in games {
            detector.push(d(*day), *outcome == 'W');
        }
        detector.finish()
    }

    #[test]
    fn test_trailing_short_run_dropped() {
        let series = scan(&[(1, 'W'), (2, 'W'), (3, 'W'), (4, 'L'), (5, 'L')]);

        assert_eq!(
            series,
            StreakSeries {
                dates: vec![d(3)],
                win_streak_length: vec![Some(3)],
                lose_streak_length: vec![None],
            }
        );
    }

    #[test]
    fn test_threshold_boundary() {
        let below = scan(&[(1, 'L'), (2, 'L'), (3, 'W')]);
        assert!(below.is_empty());

        let at = scan(&[(1, 'L'), (2, 'L'), (3, 'L'), (4, 'W')]);
        assert_eq!(at.len(), 1);
        assert_eq!(at.lose_streak_length, vec![Some(3)]);
        assert_eq!(at.dates, vec![d(3)]);
    }

    #[test]
    fn test_open_run_closed_at_end() {
        let series = scan(&[(1, 'L'), (2, 'W'), (3, 'W'), (4, 'W'), (5, 'W')]);

        assert_eq!(series.dates, vec![d(5)]);
        assert_eq!(series.win_streak_length, vec![Some(4)]);
    }

    #[test]
    fn test_same_day_streaks_share_entry() {
        // Three wins then three losses, all on one evening.
        let series = scan(&[
            (1, 'W'),
            (1, 'W'),
            (1, 'W'),
            (1, 'L'),
            (1, 'L'),
            (1, 'L'),
        ]);

        assert_eq!(
            series,
            StreakSeries {
                dates: vec![d(1)],
                win_streak_length: vec![Some(3)],
                lose_streak_length: vec![Some(3)],
            }
        );
    }

    #[test]
    fn test_games_within_a_day_are_counted_individually() {
        // Day 1 is 1-2 overall but still holds a two-game loss run that
        // continues into day 2.
        let series = scan(&[(1, 'W'), (1, 'L'), (1, 'L'), (2, 'L'), (2, 'W')]);

        assert_eq!(series.dates, vec![d(2)]);
        assert_eq!(series.lose_streak_length, vec![Some(3)]);
        assert_eq!(series.win_streak_length, vec![None]);
    }

    #[test]
    fn test_different_days_get_separate_entries() {
        let series = scan(&[
            (1, 'W'),
            (1, 'W'),
            (2, 'W'),
            (3, 'L'),
            (3, 'L'),
            (4, 'L'),
            (4, 'L'),
        ]);

        assert_eq!(series.dates, vec![d(2), d(4)]);
        assert_eq!(series.win_streak_length, vec![Some(3), None]);
        assert_eq!(series.lose_streak_length, vec![None, Some(4)]);
    }

    #[test]
    fn test_repeat_kind_on_same_day_appends() {
        let series = scan(&[
            (1, 'W'),
            (1, 'W'),
            (1, 'W'),
            (1, 'L'),
            (1, 'L'),
            (1, 'L'),
            (1, 'W'),
            (1, 'W'),
            (1, 'W'),
        ]);

        assert_eq!(series.dates, vec![d(1), d(1)]);
        assert_eq!(series.win_streak_length, vec![Some(3), Some(3)]);
        assert_eq!(series.lose_streak_length, vec![Some(3), None]);
    }

    #[test]
    fn test_no_entry_has_both_slots_empty() {
        let pattern = "WWWLLWLLLLWWWWWLWLLL";
        let games: Vec<(u32, char)> = pattern
            .chars()
            .enumerate()
            .map(|(i, c)| (1 + i as u32 / 3, c))
            .collect();

        let series = scan(&games);
        assert!(!series.is_empty());
        for i in 0..series.len() {
            assert!(
                series.win_streak_length[i].is_some() || series.lose_streak_length[i].is_some()
            );
        }
        assert!(series.dates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_custom_threshold() {
        let mut detector = StreakDetector::new(2);
        detector.push(d(1), false);
        detector.push(d(2), false);
        detector.push(d(3), true);

        assert_eq!(detector.finish().lose_streak_length, vec![Some(2)]);
    }

    #[test]
    fn test_detect_streaks_from_records() {
        let records: Vec<MatchRecord> = (1..=4)
            .map(|n| MatchRecord::new(d(n), vec!["Ann".to_string()], true))
            .collect();

        let series = detect_streaks(&records);
        assert_eq!(series.dates, vec![d(4)]);
        assert_eq!(series.win_streak_length, vec![Some(4)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_streaks(&[]).is_empty());
    }
}
