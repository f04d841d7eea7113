use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `tickets` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Remaining purchasable units. Never negative.
    pub allocation: i32,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Fields supplied by the caller when inserting a ticket. The store assigns
/// the id and the timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub name: String,
    pub description: Option<String>,
    pub allocation: i32,
    pub created_by: String,
}
