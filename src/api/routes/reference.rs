//! Reference lists behind the add-match form and the season presets.

use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::Season;
use crate::storage::{RecordSource, ReferenceList};

async fn names(state: &AppState, list: ReferenceList) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.store.reference_list(list)?))
}

pub async fn queues(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    names(&state, ReferenceList::Queues).await
}

pub async fn modes(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    names(&state, ReferenceList::Modes).await
}

pub async fn maps(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    names(&state, ReferenceList::Maps).await
}

pub async fn players(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    names(&state, ReferenceList::Players).await
}

pub async fn seasons(State(state): State<AppState>) -> Result<Json<Vec<Season>>, ApiError> {
    Ok(Json(state.store.seasons()?))
}
