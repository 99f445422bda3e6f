//! Intake of newly played matches.
//!
//! Validates a submitted match and assigns it to a session day. Play that
//! runs past midnight stays on the evening it started.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{normalize_label, MatchRecord, OneSided, MAX_PLAYERS};

/// Validation errors for a submitted match.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("Between 1 and 5 players must be given, got {0}")]
    PlayerCount(usize),

    #[error("Player names must not be blank")]
    BlankPlayer,

    #[error("Player '{0}' is listed more than once")]
    DuplicatePlayer(String),
}

/// A match as submitted by the add-match form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMatch {
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub map: Option<String>,
    pub players: Vec<String>,
    pub win: bool,
    /// `null` when nobody judged it
    #[serde(default, alias = "onesided")]
    pub one_sided: Option<bool>,
}

impl NewMatch {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.players.is_empty() || self.players.len() > MAX_PLAYERS {
            return Err(IngestError::PlayerCount(self.players.len()));
        }

        let mut seen = HashSet::new();
        for player in &self.players {
            let name = player.trim();
            if name.is_empty() {
                return Err(IngestError::BlankPlayer);
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(IngestError::DuplicatePlayer(name.to_string()));
            }
        }

        Ok(())
    }

    /// Validate and turn into a stored record for `date`.
    pub fn into_record(self, date: NaiveDate) -> Result<MatchRecord, IngestError> {
        self.validate()?;

        let players = self.players.iter().map(|p| p.trim().to_string()).collect();
        let mut record = MatchRecord::new(date, players, self.win)
            .with_one_sided(OneSided::from(self.one_sided));
        record.queue = normalize_label(self.queue);
        record.mode = normalize_label(self.mode);
        record.map = normalize_label(self.map);
        Ok(record)
    }
}

/// Session rules for dating a match.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    /// Hours subtracted from UTC to reach local time
    pub timezone_offset_hours: i32,
    /// Local hours up to and including this one belong to the previous day
    pub rollover_hour: u32,
}

impl SessionClock {
    pub fn new(timezone_offset_hours: i32, rollover_hour: u32) -> Self {
        Self {
            timezone_offset_hours,
            rollover_hour,
        }
    }

    /// The session day a match played at `now` counts for.
    pub fn session_date(&self, now: DateTime<Utc>) -> NaiveDate {
        let local = now.naive_utc() - Duration::hours(self.timezone_offset_hours as i64);
        if local.hour() <= self.rollover_hour {
            (local - Duration::days(1)).date()
        } else {
            local.date()
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.session_date(Utc::now())
    }
}
