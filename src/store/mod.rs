//! Persistence contracts for tickets and purchases.
//!
//! Stores hold no business rules. The one exception is
//! [`TicketStore::reserve_allocation`], which has to be a single atomic step
//! at the storage boundary so that concurrent purchases cannot both spend
//! the same seats.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewPurchase, NewTicket, Ticket};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryPurchaseStore, InMemoryTicketStore};
pub use postgres::{PgPurchaseStore, PgTicketStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("insufficient allocation")]
    InsufficientAllocation,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Every ticket, in storage order.
    async fn find_all(&self) -> Result<Vec<Ticket>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Ticket, StoreError>;

    /// Inserts a ticket under a freshly generated id.
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, StoreError>;

    /// Full-record replace keyed by `ticket.id`. Refreshes `updated_at`.
    async fn update(&self, ticket: &Ticket) -> Result<Ticket, StoreError>;

    /// Atomically subtracts `quantity` from the ticket's allocation if, and
    /// only if, at least `quantity` units remain.
    async fn reserve_allocation(
        &self,
        id: Uuid,
        quantity: i32,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<Ticket, StoreError>;

    /// Gives back units taken by [`TicketStore::reserve_allocation`].
    async fn release_allocation(&self, id: Uuid, quantity: i32) -> Result<(), StoreError>;
}

/// Append-only purchase log.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    async fn create(&self, purchase: NewPurchase) -> Result<(), StoreError>;
}
