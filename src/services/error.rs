use thiserror::Error;

use crate::i18n::MessageKey;

/// Every way a ticket operation can fail. Underlying storage errors are
/// logged where they occur and never carried in here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TicketError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Ticket not found")]
    NotFound,

    #[error("Insufficient ticket allocation")]
    InsufficientAllocation,

    #[error("Ticket create failed")]
    TicketCreateFailed,

    #[error("Ticket update failed")]
    TicketUpdateFailed,

    #[error("Purchase failed")]
    PurchaseFailed,

    #[error("Unexpected error")]
    UnexpectedError,
}

impl TicketError {
    pub fn message_key(&self) -> MessageKey {
        match self {
            TicketError::BadRequest(_) => MessageKey::BadRequest,
            TicketError::NotFound => MessageKey::NotFound,
            TicketError::InsufficientAllocation => MessageKey::ErrorTicketAllocations,
            TicketError::TicketCreateFailed => MessageKey::ErrorTicketCreate,
            TicketError::TicketUpdateFailed => MessageKey::ErrorTicketUpdate,
            TicketError::PurchaseFailed => MessageKey::ErrorPurchase,
            TicketError::UnexpectedError => MessageKey::UnexpectedError,
        }
    }
}
