use std::sync::Arc;

use crate::services::TicketService;

/// Shared by every handler; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub ticket_service: Arc<dyn TicketService>,
}

impl AppState {
    pub fn new(ticket_service: Arc<dyn TicketService>) -> Self {
        Self { ticket_service }
    }
}
