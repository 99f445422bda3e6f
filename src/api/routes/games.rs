//! Recording new matches.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::warn;

use crate::api::state::AppState;
use crate::api::{client_ip, ApiError};
use crate::ingest::NewMatch;
use crate::models::MatchRecord;

fn caller_ip(
    state: &AppState,
    headers: &HeaderMap,
    connect: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    client_ip(headers, connect, state.config.server.trust_proxy)
}

fn is_allowed(state: &AppState, headers: &HeaderMap, connect: Option<&ConnectInfo<SocketAddr>>) -> bool {
    caller_ip(state, headers, connect).is_some_and(|ip| state.config.ingest.allows(&ip))
}

/// Whether the caller may add matches.
pub async fn allowed(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Json<bool> {
    Json(is_allowed(&state, &headers, connect.as_ref()))
}

pub async fn add_game(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(submitted): Json<NewMatch>,
) -> Result<(StatusCode, Json<MatchRecord>), ApiError> {
    if !is_allowed(&state, &headers, connect.as_ref()) {
        let ip = caller_ip(&state, &headers, connect.as_ref());
        warn!(?ip, "Rejected match from client outside the allowlist");
        return Err(ApiError::Forbidden(
            "This client is not allowed to add matches".to_string(),
        ));
    }

    let date = state.config.ingest.session_clock().today();
    let record = submitted.into_record(date)?;
    state.store.append_match(&record)?;

    Ok((StatusCode::CREATED, Json(record)))
}
