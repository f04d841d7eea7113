use serde::{Deserialize, Serialize};

use crate::models::Ticket;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCreateRequest {
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: Option<String>,
    pub allocation: i32,
}

/// Body of `POST /v1/tickets/{id}/purchase`. The ticket id is taken from
/// the path, never from the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPurchaseRequest {
    #[serde(skip)]
    pub ticket_id: String,
    pub user_id: String,
    pub quantity: i32,
}

/// The externally visible projection of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketView {
    pub id: String,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub allocation: i32,
}

impl From<Ticket> for TicketView {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id.to_string(),
            name: ticket.name,
            description: ticket.description,
            allocation: ticket.allocation,
        }
    }
}
