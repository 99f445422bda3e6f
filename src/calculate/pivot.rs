//! Win rate pivots over categorical dimensions.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    Category, Dimension, LegacyGroupSizeTiers, MatchRecord, PivotMatrix, PivotSeries, PivotTable,
    MAX_PLAYERS,
};

use super::{ratio, round2, StatsError};

#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    wins: u32,
    total: u32,
}

impl Cell {
    fn add(&mut self, win: bool) {
        self.total += 1;
        if win {
            self.wins += 1;
        }
    }

    fn win_rate(&self) -> f64 {
        round2(ratio(self.wins, self.total))
    }
}

/// Reject a second dimension equal to the first.
pub fn validate_dimensions(first: Dimension, second: Option<Dimension>) -> Result<(), StatsError> {
    match second {
        Some(second) if second == first => Err(StatsError::DuplicateDimension(first)),
        _ => Ok(()),
    }
}

/// Pivot over one dimension, or two when `second` is given.
pub fn pivot(
    records: &[MatchRecord],
    first: Dimension,
    second: Option<Dimension>,
) -> Result<PivotTable, StatsError> {
    validate_dimensions(first, second)?;
    Ok(match second {
        None => PivotTable::Single(pivot_single(records, first)),
        Some(second) => PivotTable::Cross(pivot_cross(records, first, second)),
    })
}

/// Win rate and game count per category, categories ascending.
pub fn pivot_single(records: &[MatchRecord], dimension: Dimension) -> PivotSeries {
    let mut cells: BTreeMap<Category, Cell> = BTreeMap::new();
    for record in records {
        cells
            .entry(dimension.category_of(record))
            .or_default()
            .add(record.win);
    }

    let mut series = PivotSeries {
        dimension,
        categories: Vec::with_capacity(cells.len()),
        win_rate: Vec::with_capacity(cells.len()),
        total_games: Vec::with_capacity(cells.len()),
    };
    for (category, cell) in cells {
        series.categories.push(category);
        series.win_rate.push(cell.win_rate());
        series.total_games.push(cell.total);
    }
    series
}

/// Dense `[second][first]` cross-tab. Empty cells are zero-filled.
pub fn pivot_cross(records: &[MatchRecord], first: Dimension, second: Dimension) -> PivotMatrix {
    let mut cells: BTreeMap<(Category, Category), Cell> = BTreeMap::new();
    let mut first_categories: BTreeSet<Category> = BTreeSet::new();
    let mut second_categories: BTreeSet<Category> = BTreeSet::new();

    for record in records {
        let a = first.category_of(record);
        let b = second.category_of(record);
        first_categories.insert(a.clone());
        second_categories.insert(b.clone());
        cells.entry((a, b)).or_default().add(record.win);
    }

    let first_categories: Vec<Category> = first_categories.into_iter().collect();
    let second_categories: Vec<Category> = second_categories.into_iter().collect();

    let mut win_rate = Vec::with_capacity(second_categories.len());
    let mut total_games = Vec::with_capacity(second_categories.len());
    for b in &second_categories {
        let mut rate_row = Vec::with_capacity(first_categories.len());
        let mut total_row = Vec::with_capacity(first_categories.len());
        for a in &first_categories {
            let cell = cells
                .get(&(a.clone(), b.clone()))
                .copied()
                .unwrap_or_default();
            rate_row.push(cell.win_rate());
            total_row.push(cell.total);
        }
        win_rate.push(rate_row);
        total_games.push(total_row);
    }

    PivotMatrix {
        first,
        second,
        first_categories,
        second_categories,
        win_rate,
        total_games,
    }
}

/// Compatibility mode: the historical "wins over group size" chart.
///
/// Reproduces the old tiering exactly, including its over-counting: a
/// match with `k` players adds one game to each tier below `k` and
/// `6 - k` games to tier `k`. Use [`pivot_single`] with
/// [`Dimension::GroupSize`] for real per-size win rates.
pub fn legacy_group_size_tiers(records: &[MatchRecord]) -> LegacyGroupSizeTiers {
    let mut wins = [0u32; MAX_PLAYERS];
    let mut totals = [0u32; MAX_PLAYERS];

    for record in records {
        let mut group_size = 0usize;
        for slot in record.player_slots() {
            if slot.is_some() {
                group_size += 1;
            }
            if group_size == 0 {
                continue;
            }
            if record.win {
                wins[group_size - 1] += 1;
            }
            totals[group_size - 1] += 1;
        }
    }

    LegacyGroupSizeTiers {
        group_size: (1..=MAX_PLAYERS as u32).collect(),
        win_rate: wins
            .iter()
            .zip(totals.iter())
            .map(|(&w, &t)| (t > 0).then(|| round2(ratio(w, t))))
            .collect(),
        total_games: totals.to_vec(),
    }
}
