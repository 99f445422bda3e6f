//! Chart data for the dashboard.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{parse_dimensions, Engine};
use crate::models::{DailySeries, DateRange, Dimension, MatchRecord, PivotTable, StreakSeries};

#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeParams {
    fn range(&self) -> Result<DateRange, ApiError> {
        DateRange::parse(self.start.as_deref(), self.end.as_deref())
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct PivotParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub first: Option<String>,
    pub second: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroupSizeParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub legacy: Option<String>,
}

/// Query flag: absent or blank is false.
fn parse_flag(name: &str, value: Option<&str>) -> Result<bool, ApiError> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => Err(ApiError::BadRequest(format!(
            "Invalid value '{}' for '{}' (expected true or false)",
            other, name
        ))),
    }
}

/// Column names of the games table, in row order.
pub const GAME_COLUMNS: [&str; 11] = [
    "date",
    "queue",
    "mode",
    "map",
    "player1",
    "player2",
    "player3",
    "player4",
    "player5",
    "win",
    "one_sided",
];

#[derive(Debug, Serialize)]
pub struct GamesTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

fn game_row(record: &MatchRecord) -> Vec<Value> {
    let mut row = vec![
        json!(record.date),
        json!(record.queue),
        json!(record.mode),
        json!(record.map),
    ];
    row.extend(record.player_slots().iter().map(|p| json!(p)));
    row.push(json!(record.win));
    row.push(json!(record.one_sided));
    row
}

/// The filtered match log, newest first.
pub async fn games(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<GamesTable>, ApiError> {
    let records = Engine::new(&*state.store).games(&params.range()?)?;
    let rows = records.iter().rev().map(game_row).collect();

    Ok(Json(GamesTable {
        columns: GAME_COLUMNS.to_vec(),
        rows,
    }))
}

pub async fn daily(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<DailySeries>, ApiError> {
    Ok(Json(Engine::new(&*state.store).daily(&params.range()?)?))
}

#[derive(Debug, Serialize)]
pub struct WinsOverTime {
    pub dates: Vec<NaiveDate>,
    pub win_rate: Vec<f64>,
    pub total_games: Vec<u32>,
}

pub async fn wins_over_time(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<WinsOverTime>, ApiError> {
    let series = Engine::new(&*state.store).daily(&params.range()?)?;
    Ok(Json(WinsOverTime {
        dates: series.dates,
        win_rate: series.win_rate,
        total_games: series.total_games,
    }))
}

#[derive(Debug, Serialize)]
pub struct FunOverTime {
    pub dates: Vec<NaiveDate>,
    pub fun: Vec<f64>,
}

pub async fn fun_over_time(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<FunOverTime>, ApiError> {
    let series = Engine::new(&*state.store).daily(&params.range()?)?;
    Ok(Json(FunOverTime {
        dates: series.dates,
        fun: series.fun,
    }))
}

pub async fn streaks(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<StreakSeries>, ApiError> {
    Ok(Json(Engine::new(&*state.store).streaks(&params.range()?)?))
}

pub async fn pivot(
    State(state): State<AppState>,
    Query(params): Query<PivotParams>,
) -> Result<Json<PivotTable>, ApiError> {
    let first = params
        .first
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing query parameter 'first'".to_string()))?;
    let (first, second) = parse_dimensions(first, params.second.as_deref())?;
    let range = RangeParams {
        start: params.start,
        end: params.end,
    }
    .range()?;

    Ok(Json(Engine::new(&*state.store).pivot(&range, first, second)?))
}

pub async fn dimensions() -> Json<Vec<Dimension>> {
    Json(Dimension::ALL.to_vec())
}

pub async fn wins_over_group_size(
    State(state): State<AppState>,
    Query(params): Query<GroupSizeParams>,
) -> Result<Response, ApiError> {
    let legacy = parse_flag("legacy", params.legacy.as_deref())?;
    let range = RangeParams {
        start: params.start,
        end: params.end,
    }
    .range()?;
    let engine = Engine::new(&*state.store);

    if legacy {
        Ok(Json(engine.legacy_group_size(&range)?).into_response())
    } else {
        Ok(Json(engine.pivot(&range, Dimension::GroupSize, None)?).into_response())
    }
}

pub async fn wins_over_mode(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<PivotTable>, ApiError> {
    let range = params.range()?;
    Ok(Json(
        Engine::new(&*state.store).pivot(&range, Dimension::Mode, None)?,
    ))
}
