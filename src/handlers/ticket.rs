use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

use crate::dto::{TicketCreateRequest, TicketPurchaseRequest};
use crate::i18n::AcceptLanguage;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

/// `POST /v1/tickets`
pub async fn create_ticket(
    State(state): State<AppState>,
    AcceptLanguage(locale): AcceptLanguage,
    payload: Result<Json<TicketCreateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::malformed_body(e.body_text(), locale))?;

    let ticket = state
        .ticket_service
        .create(request)
        .await
        .map_err(|e| AppError::new(e, locale))?;

    Ok(success(StatusCode::CREATED, ticket))
}

/// `GET /v1/tickets`
pub async fn list_tickets(
    State(state): State<AppState>,
    AcceptLanguage(locale): AcceptLanguage,
) -> Result<Response, AppError> {
    let tickets = state
        .ticket_service
        .list()
        .await
        .map_err(|e| AppError::new(e, locale))?;

    Ok(success(StatusCode::OK, tickets))
}

/// `GET /v1/tickets/:id`
pub async fn get_ticket(
    State(state): State<AppState>,
    AcceptLanguage(locale): AcceptLanguage,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let ticket = state
        .ticket_service
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::new(e, locale))?;

    Ok(success(StatusCode::OK, ticket))
}

/// `POST /v1/tickets/:id/purchase`
pub async fn purchase_ticket(
    State(state): State<AppState>,
    AcceptLanguage(locale): AcceptLanguage,
    Path(id): Path<String>,
    payload: Result<Json<TicketPurchaseRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(mut request) =
        payload.map_err(|e| AppError::malformed_body(e.body_text(), locale))?;
    request.ticket_id = id;

    state
        .ticket_service
        .ticket_purchase(request)
        .await
        .map_err(|e| AppError::new(e, locale))?;

    Ok(empty_success(StatusCode::OK))
}
