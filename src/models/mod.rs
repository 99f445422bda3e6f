//! Core data models for the match tracker.

mod date_range;
mod dimension;
mod ids;
mod match_record;
mod season;
mod series;

pub use date_range::*;
pub use dimension::*;
pub use ids::*;
pub use match_record::*;
pub use season::*;
pub use series::*;
