//! Health check endpoints
//!
//! - /health, /healthz - liveness probe with MongoDB connectivity status
//! - /version - version info for deployment verification

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;

/// Health response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health status, false when MongoDB is unreachable
    pub healthy: bool,
    /// Service version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Node identifier
    pub node_id: String,
    /// Current timestamp
    pub timestamp: String,
    /// MongoDB connection status
    pub mongo: MongoHealth,
}

/// MongoDB connectivity details
#[derive(Serialize)]
pub struct MongoHealth {
    /// Whether the last ping succeeded
    pub connected: bool,
    /// Database name
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Version info response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
}

/// GET /health - liveness probe
pub async fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let ping = state.mongo.ping().await.map_err(|e| e.to_string());

    let response = build_health_response(
        ping,
        state.started.elapsed().as_secs(),
        state.args.node_id.to_string(),
        state.mongo.db_name().to_string(),
    );

    json_response(StatusCode::OK, &response)
}

/// Assemble the health payload; overall health follows the ping outcome
fn build_health_response(
    ping: Result<(), String>,
    uptime: u64,
    node_id: String,
    database: String,
) -> HealthResponse {
    let (connected, error) = match ping {
        Ok(()) => (true, None),
        Err(e) => (false, Some(e)),
    };

    HealthResponse {
        healthy: connected,
        version: env!("CARGO_PKG_VERSION"),
        uptime,
        node_id,
        timestamp: chrono::Utc::now().to_rfc3339(),
        mongo: MongoHealth {
            connected,
            database,
            error,
        },
    }
}

/// GET /version - build metadata
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
    };

    json_response(StatusCode::OK, &response)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}
