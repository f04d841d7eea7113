//! Process-local stores, used by `STORE_BACKEND=memory` and by tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PurchaseStore, StoreError, TicketStore};
use crate::models::{NewPurchase, NewTicket, Purchase, Ticket};

#[derive(Clone, Default)]
pub struct InMemoryTicketStore {
    tickets: Arc<RwLock<Vec<Ticket>>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn find_all(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.tickets.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Ticket, StoreError> {
        self.tickets
            .read()
            .await
            .iter()
            .find(|ticket| ticket.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        let now = Utc::now();
        let stored = Ticket {
            id: Uuid::new_v4(),
            name: ticket.name,
            description: ticket.description,
            allocation: ticket.allocation,
            updated_by: ticket.created_by.clone(),
            created_by: ticket.created_by,
            created_at: now,
            updated_at: now,
            is_active: true,
        };
        self.tickets.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.write().await;
        let slot = tickets
            .iter_mut()
            .find(|existing| existing.id == ticket.id)
            .ok_or(StoreError::NotFound)?;

        *slot = Ticket {
            updated_at: Utc::now(),
            ..ticket.clone()
        };
        Ok(slot.clone())
    }

    async fn reserve_allocation(
        &self,
        id: Uuid,
        quantity: i32,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        // The write guard spans both the check and the decrement.
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .iter_mut()
            .find(|ticket| ticket.id == id)
            .ok_or(StoreError::NotFound)?;

        if ticket.allocation < quantity {
            return Err(StoreError::InsufficientAllocation);
        }

        ticket.allocation -= quantity;
        ticket.updated_by = actor.to_string();
        ticket.updated_at = at;
        Ok(ticket.clone())
    }

    async fn release_allocation(&self, id: Uuid, quantity: i32) -> Result<(), StoreError> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .iter_mut()
            .find(|ticket| ticket.id == id)
            .ok_or(StoreError::NotFound)?;

        ticket.allocation += quantity;
        ticket.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPurchaseStore {
    purchases: Arc<RwLock<Vec<Purchase>>>,
}

impl InMemoryPurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded purchase, oldest first.
    pub async fn purchases(&self) -> Vec<Purchase> {
        self.purchases.read().await.clone()
    }
}

#[async_trait]
impl PurchaseStore for InMemoryPurchaseStore {
    async fn create(&self, purchase: NewPurchase) -> Result<(), StoreError> {
        self.purchases.write().await.push(Purchase {
            id: Uuid::new_v4(),
            ticket_id: purchase.ticket_id,
            user_id: purchase.user_id,
            quantity: purchase.quantity,
            created_by: purchase.created_by,
            updated_by: purchase.updated_by,
            created_at: purchase.created_at,
            updated_at: purchase.updated_at,
            is_active: true,
        });
        Ok(())
    }
}
