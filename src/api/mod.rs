//! REST API endpoints.
//!
//! Axum-based HTTP API serving reference lists, the add-match form and
//! the derived statistics behind the dashboard charts.

pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::calculate::StatsError;
use crate::ingest::IngestError;
use crate::storage::StorageError;

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SOURCE_UNAVAILABLE"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StatsError> for ApiError {
    fn from(e: StatsError) -> Self {
        if e.is_client_error() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::Unavailable(e.to_string())
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Unavailable(e.to_string())
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

/// The client address. Proxy headers are only consulted when
/// `trust_proxy` is set; otherwise the socket address is used.
pub fn client_ip(
    headers: &HeaderMap,
    connect: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> Option<String> {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            return Some(ip);
        }
    }

    connect.map(|ConnectInfo(addr)| addr.ip().to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    headers
        .get("cf-connecting-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        "*" => layer.allow_origin(Any),
        other => match HeaderValue::from_str(other) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", other);
                layer
            }
        },
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors = cors_layer(&server.cors_origin);
    let static_dir = server.static_dir.clone();

    let api = Router::new()
        .route("/api/queues", get(routes::reference::queues))
        .route("/api/modes", get(routes::reference::modes))
        .route("/api/maps", get(routes::reference::maps))
        .route("/api/players", get(routes::reference::players))
        .route("/api/seasons", get(routes::reference::seasons))
        .route("/api/allowed", get(routes::games::allowed))
        .route("/api/game", post(routes::games::add_game))
        .route("/api/plot/games", get(routes::plot::games))
        .route("/api/plot/daily", get(routes::plot::daily))
        .route("/api/plot/wins-over-time", get(routes::plot::wins_over_time))
        .route("/api/plot/fun-over-time", get(routes::plot::fun_over_time))
        .route("/api/plot/streaks", get(routes::plot::streaks))
        .route("/api/plot/pivot", get(routes::plot::pivot))
        .route("/api/plot/dimensions", get(routes::plot::dimensions))
        .route(
            "/api/plot/wins-over-group-size",
            get(routes::plot::wins_over_group_size),
        )
        .route("/api/plot/wins-over-mode", get(routes::plot::wins_over_mode))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(cors).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    use crate::config::AppConfig;
    use crate::storage::{JsonlStore, StorageConfig};

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.2, 172.16.0.1".parse().unwrap());
        let connect = ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000)));

        assert_eq!(
            client_ip(&headers, Some(&connect), true).as_deref(),
            Some("10.0.0.2")
        );
    }

    #[test]
    fn test_client_ip_ignores_headers_without_trusted_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.2".parse().unwrap());
        headers.insert("cf-connecting-ip", "10.0.0.3".parse().unwrap());
        let connect = ConnectInfo(SocketAddr::from(([203, 0, 113, 9], 4000)));

        assert_eq!(
            client_ip(&headers, Some(&connect), false).as_deref(),
            Some("203.0.113.9")
        );
        assert_eq!(client_ip(&headers, None, false), None);
    }

    #[test]
    fn test_client_ip_cloudflare_header() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", " 10.0.0.3 ".parse().unwrap());

        assert_eq!(client_ip(&headers, None, true).as_deref(), Some("10.0.0.3"));
    }

    #[test]
    fn test_client_ip_falls_back_to_socket() {
        let headers = HeaderMap::new();
        let connect = ConnectInfo(SocketAddr::from(([192, 168, 1, 5], 4000)));

        assert_eq!(
            client_ip(&headers, Some(&connect), true).as_deref(),
            Some("192.168.1.5")
        );
        assert_eq!(client_ip(&headers, None, true), None);
    }

    #[test]
    fn test_stats_error_mapping() {
        let bad: ApiError = StatsError::DuplicateDimension(crate::models::Dimension::Map).into();
        assert!(matches!(bad, ApiError::BadRequest(_)));

        let down: ApiError = StatsError::SourceUnavailable(StorageError::Io(
            std::io::Error::new(std::io::ErrorKind::Other, "disk gone"),
        ))
        .into();
        assert!(matches!(down, ApiError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let resp = ApiError::BadRequest("nope".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "Bad request: nope");
    }

    #[tokio::test]
    async fn test_static_dir_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let web = tmp.path().join("web");
        std::fs::create_dir_all(&web).unwrap();
        std::fs::write(web.join("index.html"), "<h1>dashboard</h1>").unwrap();

        let mut config = AppConfig::default();
        config.server.static_dir = Some(web);
        let state = AppState {
            store: Arc::new(JsonlStore::new(StorageConfig::new(tmp.path().join("data")))),
            config: Arc::new(config),
        };

        let resp = build_router(state)
            .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
