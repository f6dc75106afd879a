use serde::Serialize;
use warp::reply::{self, Json};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Liveness probe. Always returns `{"status":"ok"}` while the process runs.
pub fn health() -> Json {
    reply::json(&HealthResponse { status: "ok" })
}
