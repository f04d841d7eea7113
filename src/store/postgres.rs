use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{PurchaseStore, StoreError, TicketStore};
use crate::models::{NewPurchase, NewTicket, Ticket};

const TICKET_COLUMNS: &str =
    "id, name, description, allocation, created_by, updated_by, created_at, updated_at, is_active";

#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tickets WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn find_all(&self) -> Result<Vec<Ticket>, StoreError> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets");
        let tickets = sqlx::query_as::<_, Ticket>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Ticket, StoreError> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        let query = format!(
            "INSERT INTO tickets \
                (id, name, description, allocation, created_by, updated_by, created_at, updated_at, is_active) \
             VALUES ($1, $2, $3, $4, $5, $5, $6, $6, TRUE) \
             RETURNING {TICKET_COLUMNS}"
        );
        let stored = sqlx::query_as::<_, Ticket>(&query)
            .bind(Uuid::new_v4())
            .bind(&ticket.name)
            .bind(&ticket.description)
            .bind(ticket.allocation)
            .bind(&ticket.created_by)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    async fn update(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        let query = format!(
            "UPDATE tickets SET \
                name = $2, description = $3, allocation = $4, created_by = $5, \
                updated_by = $6, created_at = $7, updated_at = $8, is_active = $9 \
             WHERE id = $1 \
             RETURNING {TICKET_COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket.id)
            .bind(&ticket.name)
            .bind(&ticket.description)
            .bind(ticket.allocation)
            .bind(&ticket.created_by)
            .bind(&ticket.updated_by)
            .bind(ticket.created_at)
            .bind(Utc::now())
            .bind(ticket.is_active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn reserve_allocation(
        &self,
        id: Uuid,
        quantity: i32,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        let query = format!(
            "UPDATE tickets SET \
                allocation = allocation - $2, updated_by = $3, updated_at = $4 \
             WHERE id = $1 AND allocation >= $2 \
             RETURNING {TICKET_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(quantity)
            .bind(actor)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(ticket) => Ok(ticket),
            None if self.exists(id).await? => Err(StoreError::InsufficientAllocation),
            None => Err(StoreError::NotFound),
        }
    }

    async fn release_allocation(&self, id: Uuid, quantity: i32) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE tickets SET allocation = allocation + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgPurchaseStore {
    pool: PgPool,
}

impl PgPurchaseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseStore for PgPurchaseStore {
    async fn create(&self, purchase: NewPurchase) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO purchases \
                (id, ticket_id, user_id, quantity, created_by, updated_by, created_at, updated_at, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)",
        )
        .bind(Uuid::new_v4())
        .bind(purchase.ticket_id)
        .bind(&purchase.user_id)
        .bind(purchase.quantity)
        .bind(&purchase.created_by)
        .bind(&purchase.updated_by)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
