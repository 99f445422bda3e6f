//! # Match Tracker
//!
//! Records matches played by a small group and turns the log into
//! chart-ready statistics.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (match records, dimensions, derived series)
//! - **storage**: Filesystem data lake operations (JSONL) and the record source
//! - **calculate**: Daily aggregates, streak detection and pivot tables
//! - **ingest**: Validation and session dating of newly played matches
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod storage;

pub use models::*;
