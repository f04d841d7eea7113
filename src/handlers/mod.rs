use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod ticket;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

/// Liveness probe. Does not touch the stores.
pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "ticket-purchase-api",
    };

    success(StatusCode::OK, payload)
}
