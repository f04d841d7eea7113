use std::any::Any;

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::health_check;
use crate::handlers::ticket::{create_ticket, get_ticket, list_tickets, purchase_ticket};
use crate::i18n::Locale;
use crate::services::TicketError;
use crate::state::AppState;
use crate::utils::error::AppError;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/v1/health", get(health_check))
        .route("/v1/tickets", post(create_ticket).get(list_tickets))
        .route("/v1/tickets/:id", get(get_ticket))
        .route("/v1/tickets/:id/purchase", post(purchase_ticket))
        .with_state(state);

    with_middleware(router, config)
}

/// Wraps `router` in the middleware stack shared by every endpoint.
pub fn with_middleware(router: Router, config: &Config) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        // Allocations change with every purchase.
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config))
        .layer(create_cors_layer(config))
}

/// Turns a handler panic into the regular `unexpected_error` response. The
/// request carries no usable locale at this point.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = %detail, "Handler panicked");

    AppError::new(TicketError::UnexpectedError, Locale::En).into_response()
}
