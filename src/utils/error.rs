use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::i18n::{self, Locale};
use crate::services::TicketError;
use crate::utils::response::error as error_response;

/// A [`TicketError`] bound to the locale of the request that caused it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AppError {
    error: TicketError,
    locale: Locale,
}

impl AppError {
    pub fn new(error: TicketError, locale: Locale) -> Self {
        Self { error, locale }
    }

    pub fn malformed_body(reason: impl Into<String>, locale: Locale) -> Self {
        Self::new(TicketError::BadRequest(reason.into()), locale)
    }

    pub fn status_code(&self) -> StatusCode {
        match self.error {
            TicketError::BadRequest(_) => StatusCode::BAD_REQUEST,
            TicketError::NotFound => StatusCode::NOT_FOUND,
            TicketError::InsufficientAllocation => StatusCode::BAD_REQUEST,
            TicketError::TicketCreateFailed => StatusCode::INTERNAL_SERVER_ERROR,
            TicketError::TicketUpdateFailed => StatusCode::INTERNAL_SERVER_ERROR,
            TicketError::PurchaseFailed => StatusCode::INTERNAL_SERVER_ERROR,
            TicketError::UnexpectedError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self, status: StatusCode) {
        if status.is_server_error() {
            error!(error = %self.error, status = status.as_u16(), "Request failed");
        } else {
            warn!(error = %self.error, status = status.as_u16(), "Request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let key = self.error.message_key();

        self.log(status);

        // Only the localized catalog message leaves the process.
        error_response(key.as_str(), i18n::message(key, self.locale), None, status)
    }
}
