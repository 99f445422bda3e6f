//! The record source: where the statistics engine reads matches from.

use std::str::FromStr;

use tracing::{debug, info};

use crate::models::{DateRange, MatchRecord, Season};

use super::{EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError};

/// Read-only access to the match log and its reference lists.
pub trait RecordSource: Send + Sync {
    /// Matches inside `range`, ascending by date. Matches on the same day
    /// keep their storage order.
    fn fetch_records(&self, range: &DateRange) -> Result<Vec<MatchRecord>, StorageError>;

    /// Known names for a reference list, sorted.
    fn reference_list(&self, list: ReferenceList) -> Result<Vec<String>, StorageError>;

    /// Season presets sorted by start date.
    fn seasons(&self) -> Result<Vec<Season>, StorageError>;
}

/// Plain name lists offered by the add-match form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceList {
    Queues,
    Modes,
    Maps,
    Players,
}

impl ReferenceList {
    pub fn entity(&self) -> EntityType {
        match self {
            ReferenceList::Queues => EntityType::Queue,
            ReferenceList::Modes => EntityType::Mode,
            ReferenceList::Maps => EntityType::Map,
            ReferenceList::Players => EntityType::Player,
        }
    }
}

impl FromStr for ReferenceList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().trim_end_matches('s') {
            "queue" => Ok(ReferenceList::Queues),
            "mode" => Ok(ReferenceList::Modes),
            "map" => Ok(ReferenceList::Maps),
            "player" => Ok(ReferenceList::Players),
            _ => Err(format!(
                "Unknown reference list '{}' (expected queue, mode, map or player)",
                s
            )),
        }
    }
}

fn sort_by_date(mut records: Vec<MatchRecord>) -> Vec<MatchRecord> {
    // Stable, so same-day matches stay in insertion order.
    records.sort_by_key(|r| r.date);
    records
}

/// Record source backed by the JSONL data lake.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    config: StorageConfig,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Append a match to the log.
    pub fn append_match(&self, record: &MatchRecord) -> Result<(), StorageError> {
        JsonlWriter::<MatchRecord>::for_entity(&self.config, EntityType::Match).append(record)?;
        info!(id = %record.id, date = %record.date, win = record.win, "Stored match");
        Ok(())
    }

    /// Add a name to a reference list. Returns false if it was already there.
    pub fn add_reference(&self, list: ReferenceList, name: &str) -> Result<bool, StorageError> {
        let mut names = self.reference_list(list)?;
        let name = name.trim().to_string();
        if names.contains(&name) {
            return Ok(false);
        }
        names.push(name);
        names.sort();
        JsonlWriter::<String>::for_entity(&self.config, list.entity()).write_all(&names)?;
        Ok(true)
    }

    /// Add or replace a season preset, keeping the file sorted by start date.
    pub fn upsert_season(&self, season: Season) -> Result<(), StorageError> {
        let mut seasons = self.seasons()?;
        seasons.retain(|s| !s.name.eq_ignore_ascii_case(&season.name));
        seasons.push(season);
        seasons.sort_by_key(|s| s.begin);
        JsonlWriter::<Season>::for_entity(&self.config, EntityType::Season).write_all(&seasons)?;
        Ok(())
    }
}

impl RecordSource for JsonlStore {
    fn fetch_records(&self, range: &DateRange) -> Result<Vec<MatchRecord>, StorageError> {
        let reader = JsonlReader::<MatchRecord>::for_entity(&self.config, EntityType::Match);
        let records = reader.read_where(|r| range.contains(r.date))?;
        debug!(count = records.len(), ?range, "Fetched matches");
        Ok(sort_by_date(records))
    }

    fn reference_list(&self, list: ReferenceList) -> Result<Vec<String>, StorageError> {
        let mut names = JsonlReader::<String>::for_entity(&self.config, list.entity()).read_all()?;
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn seasons(&self) -> Result<Vec<Season>, StorageError> {
        let mut seasons =
            JsonlReader::<Season>::for_entity(&self.config, EntityType::Season).read_all()?;
        seasons.sort_by_key(|s| s.begin);
        Ok(seasons)
    }
}

/// In-memory record source.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub records: Vec<MatchRecord>,
    pub seasons: Vec<Season>,
}

impl MemorySource {
    pub fn new(records: Vec<MatchRecord>) -> Self {
        Self {
            records,
            seasons: Vec::new(),
        }
    }
}

impl RecordSource for MemorySource {
    fn fetch_records(&self, range: &DateRange) -> Result<Vec<MatchRecord>, StorageError> {
        let records = self
            .records
            .iter()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect();
        Ok(sort_by_date(records))
    }

    fn reference_list(&self, list: ReferenceList) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = match list {
            ReferenceList::Players => self.records.iter().flat_map(|r| r.players.clone()).collect(),
            ReferenceList::Queues => self.records.iter().filter_map(|r| r.queue.clone()).collect(),
            ReferenceList::Modes => self.records.iter().filter_map(|r| r.mode.clone()).collect(),
            ReferenceList::Maps => self.records.iter().filter_map(|r| r.map.clone()).collect(),
        };
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn seasons(&self) -> Result<Vec<Season>, StorageError> {
        Ok(self.seasons.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(date: &str, player: &str, win: bool) -> MatchRecord {
        MatchRecord::new(day(date), vec![player.to_string()], win)
    }

    fn test_store(temp_dir: &TempDir) -> JsonlStore {
        JsonlStore::new(StorageConfig::new(temp_dir.path().to_path_buf()))
    }

    #[test]
    fn test_fetch_records_sorted_and_stable() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.append_match(&record("2023-02-08", "late", true)).unwrap();
        store.append_match(&record("2023-02-07", "first", true)).unwrap();
        store.append_match(&record("2023-02-07", "second", false)).unwrap();

        let records = store.fetch_records(&DateRange::unbounded()).unwrap();
        let players: Vec<&str> = records.iter().map(|r| r.players[0].as_str()).collect();
        assert_eq!(players, vec!["first", "second", "late"]);
    }

    #[test]
    fn test_fetch_records_survives_corrupt_line() {
        use std::io::Write;

        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.append_match(&record("2023-02-07", "a", true)).unwrap();
        let path = store.config().entity_path(EntityType::Match);
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"\xff\xfe garbage\n").unwrap();
        store.append_match(&record("2023-02-08", "b", false)).unwrap();

        let records = store.fetch_records(&DateRange::unbounded()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_fetch_records_filters_by_range() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.append_match(&record("2023-02-06", "a", true)).unwrap();
        store.append_match(&record("2023-02-07", "b", true)).unwrap();
        store.append_match(&record("2023-02-08", "c", true)).unwrap();

        let range = DateRange::new(Some(day("2023-02-07")), None);
        let records = store.fetch_records(&range).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.date >= day("2023-02-07")));
    }

    #[test]
    fn test_fetch_records_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        assert!(store.fetch_records(&DateRange::unbounded()).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_records_unreadable_store_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        std::fs::create_dir_all(store.config().entity_path(EntityType::Match)).unwrap();

        assert!(store.fetch_records(&DateRange::unbounded()).is_err());
    }

    #[test]
    fn test_add_reference_sorted_and_deduplicated() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(store.add_reference(ReferenceList::Maps, "Split").unwrap());
        assert!(store.add_reference(ReferenceList::Maps, "Ascent").unwrap());
        assert!(!store.add_reference(ReferenceList::Maps, " Ascent ").unwrap());

        assert_eq!(
            store.reference_list(ReferenceList::Maps).unwrap(),
            vec!["Ascent", "Split"]
        );
        assert!(store.reference_list(ReferenceList::Players).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_season_replaces_by_name() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store
            .upsert_season(Season::new("S2", day("2022-12-06"), None))
            .unwrap();
        store
            .upsert_season(Season::new("S1", day("2022-10-04"), Some(day("2022-12-05"))))
            .unwrap();
        store
            .upsert_season(Season::new("s2", day("2022-12-06"), Some(day("2023-02-06"))))
            .unwrap();

        let seasons = store.seasons().unwrap();
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[0].name, "S1");
        assert_eq!(seasons[1].end, Some(day("2023-02-06")));
    }

    #[test]
    fn test_reference_list_parse() {
        assert_eq!("maps".parse::<ReferenceList>(), Ok(ReferenceList::Maps));
        assert_eq!("Player".parse::<ReferenceList>(), Ok(ReferenceList::Players));
        assert!("season".parse::<ReferenceList>().is_err());
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new(vec![
            record("2023-02-08", "Bo", true).with_map("Split"),
            record("2023-02-07", "Ann", false).with_map("Ascent"),
        ]);

        let records = source.fetch_records(&DateRange::unbounded()).unwrap();
        assert_eq!(records[0].date, day("2023-02-07"));
        assert_eq!(
            source.reference_list(ReferenceList::Maps).unwrap(),
            vec!["Ascent", "Split"]
        );
    }
}
