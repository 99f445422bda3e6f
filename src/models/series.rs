//! Derived, chart-ready statistics.
//!
//! All of these are plain values, rebuilt from the match log on every
//! request and never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Category, Dimension};

/// Per-day win rate, volume and fun score.
///
/// The vectors are parallel: index `i` of each belongs to `dates[i]`.
/// Days without matches are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub dates: Vec<NaiveDate>,
    pub win_rate: Vec<f64>,
    pub total_games: Vec<u32>,
    pub fun: Vec<f64>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Which outcome a streak is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Win,
    Lose,
}

/// Streak end points on a shared date axis.
///
/// Each entry has at least one of the two lengths set. A win streak and a
/// lose streak ending on the same day share one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSeries {
    pub dates: Vec<NaiveDate>,
    pub win_streak_length: Vec<Option<u32>>,
    pub lose_streak_length: Vec<Option<u32>>,
}

impl StreakSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Slot for the given kind at `index`.
    pub fn length_at(&self, kind: StreakKind, index: usize) -> Option<u32> {
        let column = match kind {
            StreakKind::Win => &self.win_streak_length,
            StreakKind::Lose => &self.lose_streak_length,
        };
        column.get(index).copied().flatten()
    }
}

/// Win rate per category along a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotSeries {
    pub dimension: Dimension,
    pub categories: Vec<Category>,
    pub win_rate: Vec<f64>,
    pub total_games: Vec<u32>,
}

/// Dense cross-tab of two dimensions, indexed `[second][first]`.
///
/// A cell with no matches is `(0.0, 0)`, which reads the same as a
/// measured 0% win rate except for its game count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotMatrix {
    pub first: Dimension,
    pub second: Dimension,
    pub first_categories: Vec<Category>,
    pub second_categories: Vec<Category>,
    pub win_rate: Vec<Vec<f64>>,
    pub total_games: Vec<Vec<u32>>,
}

/// Result of a pivot request: one or two dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PivotTable {
    Single(PivotSeries),
    Cross(PivotMatrix),
}

/// Historical "wins over group size" output. See
/// [`crate::calculate::pivot::legacy_group_size_tiers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyGroupSizeTiers {
    pub group_size: Vec<u32>,
    /// `None` for tiers that never accumulated a game
    pub win_rate: Vec<Option<f64>>,
    pub total_games: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_length_at() {
        let d = NaiveDate::from_ymd_opt(2023, 2, 7).unwrap();
        let series = StreakSeries {
            dates: vec![d],
            win_streak_length: vec![Some(3)],
            lose_streak_length: vec![None],
        };

        assert_eq!(series.length_at(StreakKind::Win, 0), Some(3));
        assert_eq!(series.length_at(StreakKind::Lose, 0), None);
        assert_eq!(series.length_at(StreakKind::Win, 1), None);
    }

    #[test]
    fn test_streak_series_serialization_keeps_nulls() {
        let d = NaiveDate::from_ymd_opt(2023, 2, 7).unwrap();
        let series = StreakSeries {
            dates: vec![d],
            win_streak_length: vec![Some(4)],
            lose_streak_length: vec![None],
        };

        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["dates"][0], "2023-02-07");
        assert_eq!(json["win_streak_length"][0], 4);
        assert!(json["lose_streak_length"][0].is_null());
    }

    #[test]
    fn test_pivot_table_untagged_shape() {
        let table = PivotTable::Single(PivotSeries {
            dimension: Dimension::Map,
            categories: vec![Category::Label("A".into())],
            win_rate: vec![0.75],
            total_games: vec![4],
        });

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["dimension"], "Map");
        assert_eq!(json["categories"][0], "A");
        assert!(json.get("Single").is_none());
    }
}
