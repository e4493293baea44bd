//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Route handlers return
//! typed errors; the dispatch layer here is the shared error-handling stage
//! that turns them into HTTP responses.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::db::{MongoClient, UserStore};
use crate::routes;
use crate::types::RosterError;

type FullBody = Full<Bytes>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Database client handle, owned here and injected at startup
    pub mongo: MongoClient,
    /// Data-access layer for the users collection
    pub users: UserStore,
    /// Startup instant for uptime reporting
    pub started: Instant,
}

impl AppState {
    pub fn new(args: Args, mongo: MongoClient, users: UserStore) -> Self {
        Self {
            args,
            mongo,
            users,
            started: Instant::now(),
        }
    }
}

/// Run the HTTP server until the process is stopped
pub async fn run(state: Arc<AppState>) -> Result<(), RosterError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Roster listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<FullBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    // CORS preflight, for any path
    if method == Method::OPTIONS {
        return Ok(preflight_response());
    }

    // User resource - the handler consumes the request
    if path == "/users" || path.starts_with("/users/") {
        let response = match routes::handle_users_request(req, Arc::clone(&state), &path).await {
            Ok(resp) => resp,
            Err(e) => error_response(&e),
        };
        return Ok(response);
    }

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state)).await
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        _ => not_found_response(&path),
    };

    Ok(response)
}

/// Error body shape shared by all failure responses
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// Translate a typed error into the user-visible failure response
fn error_response(err: &RosterError) -> Response<FullBody> {
    let (status, code) = match err {
        RosterError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        RosterError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RosterError::Duplicate(_) => (StatusCode::CONFLICT, "DUPLICATE_KEY"),
        RosterError::Database(_) | RosterError::Io(_) | RosterError::Config(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR")
        }
    };

    if status.is_server_error() {
        warn!("Request failed: {}", err);
    }

    let body = serde_json::to_string(&ErrorBody {
        error: err.to_string(),
        code,
    })
    .unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn preflight_response() -> Response<FullBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, PATCH, DELETE, OPTIONS",
        )
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn not_found_response(path: &str) -> Response<FullBody> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                RosterError::BadRequest("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (RosterError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (RosterError::Duplicate("x".into()), StatusCode::CONFLICT),
            (
                RosterError::Database("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(error_response(&err).status(), status, "{:?}", err);
        }
    }

    #[test]
    fn test_not_found_echoes_path() {
        let resp = not_found_response("/nope");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_preflight_allows_mutating_methods() {
        let resp = preflight_response();
        let methods = resp
            .headers()
            .get("Access-Control-Allow-Methods")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("DELETE"));
        assert!(methods.contains("PATCH"));
    }
}
