#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    UnexpectedError,
    BadRequest,
    NotFound,
    ErrorTicketCreate,
    ErrorTicketUpdate,
    ErrorPurchase,
    ErrorTicketAllocations,
}

impl MessageKey {
    pub const ALL: [MessageKey; 7] = [
        MessageKey::UnexpectedError,
        MessageKey::BadRequest,
        MessageKey::NotFound,
        MessageKey::ErrorTicketCreate,
        MessageKey::ErrorTicketUpdate,
        MessageKey::ErrorPurchase,
        MessageKey::ErrorTicketAllocations,
    ];

    /// Stable identifier, also used as the `code` of error responses.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::UnexpectedError => "unexpected_error",
            MessageKey::BadRequest => "bad_request",
            MessageKey::NotFound => "not_found",
            MessageKey::ErrorTicketCreate => "error_ticket_create",
            MessageKey::ErrorTicketUpdate => "error_ticket_update",
            MessageKey::ErrorPurchase => "error_purchase",
            MessageKey::ErrorTicketAllocations => "error_ticket_allocations",
        }
    }
}

pub(super) fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::UnexpectedError => "An unexpected error occurred",
        MessageKey::BadRequest => "The request payload is invalid",
        MessageKey::NotFound => "Ticket not found",
        MessageKey::ErrorTicketCreate => "The ticket could not be created",
        MessageKey::ErrorTicketUpdate => "The ticket could not be updated",
        MessageKey::ErrorPurchase => "The purchase could not be completed",
        MessageKey::ErrorTicketAllocations => "Not enough tickets left for this purchase",
    }
}

pub(super) fn turkish(key: MessageKey) -> &'static str {
    match key {
        MessageKey::UnexpectedError => "Beklenmeyen bir hata oluştu",
        MessageKey::BadRequest => "İstek içeriği geçersiz",
        MessageKey::NotFound => "Bilet bulunamadı",
        MessageKey::ErrorTicketCreate => "Bilet oluşturulamadı",
        MessageKey::ErrorTicketUpdate => "Bilet güncellenemedi",
        MessageKey::ErrorPurchase => "Satın alma işlemi tamamlanamadı",
        MessageKey::ErrorTicketAllocations => "Bu satın alma için yeterli bilet kalmadı",
    }
}
