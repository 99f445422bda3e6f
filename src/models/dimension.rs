//! Categorical dimensions for pivot tables.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::MatchRecord;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown dimension '{0}' (expected one of Queue, Map, Mode, GroupSize)")]
pub struct UnknownDimension(pub String);

/// Attribute a pivot can group matches by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Queue,
    Map,
    Mode,
    GroupSize,
}

impl Dimension {
    /// Every selectable dimension, in display order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Queue,
        Dimension::Map,
        Dimension::Mode,
        Dimension::GroupSize,
    ];

    /// The value of this dimension for a record.
    pub fn category_of(&self, record: &MatchRecord) -> Category {
        let label = match self {
            Dimension::Queue => &record.queue,
            Dimension::Map => &record.map,
            Dimension::Mode => &record.mode,
            Dimension::GroupSize => return Category::Size(record.group_size()),
        };
        label
            .as_ref()
            .map_or(Category::Unknown, |l| Category::Label(l.clone()))
    }
}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "queue" => Ok(Dimension::Queue),
            "map" => Ok(Dimension::Map),
            "mode" => Ok(Dimension::Mode),
            "groupsize" => Ok(Dimension::GroupSize),
            _ => Err(UnknownDimension(s.to_string())),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Queue => write!(f, "Queue"),
            Dimension::Map => write!(f, "Map"),
            Dimension::Mode => write!(f, "Mode"),
            Dimension::GroupSize => write!(f, "GroupSize"),
        }
    }
}

/// One value along a dimension.
///
/// Orders unknowns first, then group sizes numerically, then labels.
/// Serializes as `null`, a number, or a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Unknown,
    Size(u32),
    Label(String),
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Unknown => write!(f, "{}", super::UNKNOWN_LABEL),
            Category::Size(n) => write!(f, "{}", n),
            Category::Label(l) => write!(f, "{}", l),
        }
    }
}
