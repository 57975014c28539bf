use axum::Json;
use serde::Serialize;

/// Body returned by the health endpoints.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Handler for `GET /healthz` — liveness. Answers as long as the process is
/// serving requests.
pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

/// Handler for `GET /readyz` — readiness. Services with external
/// dependencies replace this with their own probe; the default reports ready.
pub async fn readyz() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ready" })
}
