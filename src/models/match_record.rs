//! Match record model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::MatchId;

/// Label used by the front end and older data for "not recorded".
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Maximum number of participants in one match.
pub const MAX_PLAYERS: usize = 5;

/// Whether a match was one-sided.
///
/// Serialized as `true`, `false` or `null`. `Unknown` is a distinct state,
/// never folded into `No`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum OneSided {
    Yes,
    No,
    #[default]
    Unknown,
}

impl OneSided {
    pub fn is_yes(&self) -> bool {
        matches!(self, OneSided::Yes)
    }
}

impl From<Option<bool>> for OneSided {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => OneSided::Yes,
            Some(false) => OneSided::No,
            None => OneSided::Unknown,
        }
    }
}

impl From<OneSided> for Option<bool> {
    fn from(value: OneSided) -> Self {
        match value {
            OneSided::Yes => Some(true),
            OneSided::No => Some(false),
            OneSided::Unknown => None,
        }
    }
}

impl std::fmt::Display for OneSided {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OneSided::Yes => write!(f, "yes"),
            OneSided::No => write!(f, "no"),
            OneSided::Unknown => write!(f, "unknown"),
        }
    }
}

/// Map the "Unknown" sentinel and blank labels to `None`.
pub fn normalize_label(label: Option<String>) -> Option<String> {
    label
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != UNKNOWN_LABEL)
}

fn deserialize_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_label(raw))
}

/// A single recorded match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Unique identifier (derived from date + insertion time + players)
    pub id: MatchId,

    /// Session day the match counts for
    pub date: NaiveDate,

    /// Matchmaking queue (e.g. "Ranked")
    #[serde(default, deserialize_with = "deserialize_label")]
    pub queue: Option<String>,

    /// Game mode
    #[serde(default, deserialize_with = "deserialize_label")]
    pub mode: Option<String>,

    /// Map name
    #[serde(default, deserialize_with = "deserialize_label")]
    pub map: Option<String>,

    /// Participants, 1 to 5 distinct names
    pub players: Vec<String>,

    pub win: bool,

    #[serde(default)]
    pub one_sided: OneSided,

    /// When this record was stored
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Create a new MatchRecord with auto-generated ID.
    pub fn new(date: NaiveDate, players: Vec<String>, win: bool) -> Self {
        let created_at = Utc::now();
        let id = MatchId::for_match(date, created_at, &players);

        Self {
            id,
            date,
            queue: None,
            mode: None,
            map: None,
            players,
            win,
            one_sided: OneSided::Unknown,
            created_at,
        }
    }

    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = normalize_label(Some(queue.into()));
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = normalize_label(Some(mode.into()));
        self
    }

    pub fn with_map(mut self, map: impl Into<String>) -> Self {
        self.map = normalize_label(Some(map.into()));
        self
    }

    pub fn with_one_sided(mut self, one_sided: OneSided) -> Self {
        self.one_sided = one_sided;
        self
    }

    /// Number of participants that are actually filled in.
    pub fn group_size(&self) -> u32 {
        self.players
            .iter()
            .filter(|p| !p.trim().is_empty())
            .count() as u32
    }

    pub fn is_one_sided_loss(&self) -> bool {
        !self.win && self.one_sided.is_yes()
    }

    /// Filled-in player names padded out to the five display slots.
    /// Blank names are skipped, matching [`MatchRecord::group_size`].
    pub fn player_slots(&self) -> [Option<String>; MAX_PLAYERS] {
        let mut slots: [Option<String>; MAX_PLAYERS] = Default::default();
        let names = self.players.iter().filter(|p| !p.trim().is_empty());
        for (slot, name) in slots.iter_mut().zip(names) {
            *slot = Some(name.clone());
        }
        slots
    }
}
