//! Match identifiers.
//!
//! A match id is a short hash of when the match was stored and who played,
//! so two identical results entered a second apart still get distinct ids.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

const ID_LEN: usize = 16;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(String);

impl MatchId {
    /// Id for a match on session day `date`, stored at `created_at`.
    ///
    /// Player order is ignored and names are compared case-insensitively,
    /// so the same group entered in a different order hashes the same.
    pub fn for_match(date: NaiveDate, created_at: DateTime<Utc>, players: &[String]) -> Self {
        let mut names: Vec<String> = players
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        names.sort();

        let mut hasher = Sha256::new();
        hasher.update(date.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(
            created_at
                .to_rfc3339_opts(SecondsFormat::Micros, true)
                .as_bytes(),
        );
        for name in &names {
            hasher.update(b"|");
            hasher.update(name.as_bytes());
        }

        let hash = hex::encode(hasher.finalize());
        Self(hash[..ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchId({})", self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 2, 7).unwrap()
    }

    fn stored_at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 2, 7, 21, 0, secs).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_same_match_same_id() {
        let a = MatchId::for_match(day(), stored_at(0), &names(&["Ann", "Bo"]));
        let b = MatchId::for_match(day(), stored_at(0), &names(&["Ann", "Bo"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_player_order_and_case_ignored() {
        let a = MatchId::for_match(day(), stored_at(0), &names(&["Ann", "Bo"]));
        let b = MatchId::for_match(day(), stored_at(0), &names(&["bo", " ANN "]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeat_result_gets_new_id() {
        let a = MatchId::for_match(day(), stored_at(0), &names(&["Ann"]));
        let b = MatchId::for_match(day(), stored_at(1), &names(&["Ann"]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_group_different_id() {
        let a = MatchId::for_match(day(), stored_at(0), &names(&["Ann", "Bo"]));
        let b = MatchId::for_match(day(), stored_at(0), &names(&["Ann", "Cy"]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_shape_and_serialization() {
        let id = MatchId::for_match(day(), stored_at(0), &names(&["Ann"]));
        assert_eq!(id.as_str().len(), ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        assert_eq!(format!("{:?}", MatchId::from("abc")), "MatchId(abc)");
    }
}
