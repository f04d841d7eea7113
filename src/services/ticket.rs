//! Ticket creation, lookup and the purchase workflow.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::TicketError;
use crate::dto::{TicketCreateRequest, TicketPurchaseRequest, TicketView};
use crate::models::{NewPurchase, NewTicket};
use crate::store::{PurchaseStore, StoreError, TicketStore};

/// Source of "now" for purchase audit fields.
pub type Clock = fn() -> DateTime<Utc>;

/// Audit actor recorded for tickets created through the API, which carries
/// no user identity on creation.
pub const SYSTEM_ACTOR: &str = "system";

#[async_trait]
pub trait TicketService: Send + Sync {
    async fn create(&self, request: TicketCreateRequest) -> Result<TicketView, TicketError>;

    async fn find_by_id(&self, id: &str) -> Result<TicketView, TicketError>;

    async fn list(&self) -> Result<Vec<TicketView>, TicketError>;

    async fn ticket_purchase(&self, request: TicketPurchaseRequest) -> Result<(), TicketError>;
}

pub struct TicketServiceImpl {
    ticket_store: Arc<dyn TicketStore>,
    purchase_store: Arc<dyn PurchaseStore>,
    clock: Clock,
}

impl TicketServiceImpl {
    pub fn new(ticket_store: Arc<dyn TicketStore>, purchase_store: Arc<dyn PurchaseStore>) -> Self {
        Self::with_clock(ticket_store, purchase_store, Utc::now)
    }

    pub fn with_clock(
        ticket_store: Arc<dyn TicketStore>,
        purchase_store: Arc<dyn PurchaseStore>,
        clock: Clock,
    ) -> Self {
        Self {
            ticket_store,
            purchase_store,
            clock,
        }
    }
}

/// Ids that do not parse can never have been issued, so they are simply
/// unknown tickets.
fn parse_ticket_id(id: &str) -> Result<Uuid, TicketError> {
    Uuid::parse_str(id).map_err(|_| TicketError::NotFound)
}

#[async_trait]
impl TicketService for TicketServiceImpl {
    async fn create(&self, request: TicketCreateRequest) -> Result<TicketView, TicketError> {
        if request.name.trim().is_empty() {
            return Err(TicketError::BadRequest("name is required".to_string()));
        }
        if request.allocation < 0 {
            return Err(TicketError::BadRequest(
                "allocation must not be negative".to_string(),
            ));
        }

        let ticket = NewTicket {
            name: request.name,
            description: request.description,
            allocation: request.allocation,
            created_by: SYSTEM_ACTOR.to_string(),
        };

        let stored = self.ticket_store.create(ticket).await.map_err(|e| {
            error!(error = %e, "Failed to create ticket");
            TicketError::TicketCreateFailed
        })?;

        info!(ticket_id = %stored.id, allocation = stored.allocation, "Ticket created");
        Ok(stored.into())
    }

    async fn find_by_id(&self, id: &str) -> Result<TicketView, TicketError> {
        let ticket_id = parse_ticket_id(id)?;

        match self.ticket_store.find_by_id(ticket_id).await {
            Ok(ticket) => Ok(ticket.into()),
            Err(StoreError::NotFound) => Err(TicketError::NotFound),
            Err(e) => {
                error!(error = %e, %ticket_id, "Failed to load ticket");
                Err(TicketError::UnexpectedError)
            }
        }
    }

    async fn list(&self) -> Result<Vec<TicketView>, TicketError> {
        let tickets = self.ticket_store.find_all().await.map_err(|e| {
            error!(error = %e, "Failed to list tickets");
            TicketError::UnexpectedError
        })?;

        Ok(tickets.into_iter().map(TicketView::from).collect())
    }

    async fn ticket_purchase(&self, request: TicketPurchaseRequest) -> Result<(), TicketError> {
        if request.user_id.trim().is_empty() {
            return Err(TicketError::BadRequest("user_id is required".to_string()));
        }
        if request.quantity <= 0 {
            return Err(TicketError::BadRequest(
                "quantity must be positive".to_string(),
            ));
        }
        let ticket_id = parse_ticket_id(&request.ticket_id)?;
        let now = (self.clock)();

        // Check-and-decrement happens in one step inside the store, so two
        // purchases can never spend the same seats.
        let ticket = self
            .ticket_store
            .reserve_allocation(ticket_id, request.quantity, &request.user_id, now)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => TicketError::NotFound,
                StoreError::InsufficientAllocation => {
                    warn!(
                        %ticket_id,
                        quantity = request.quantity,
                        "Purchase rejected, not enough allocation"
                    );
                    TicketError::InsufficientAllocation
                }
                StoreError::Database(_) => {
                    error!(error = %e, %ticket_id, "Failed to reserve ticket allocation");
                    TicketError::TicketUpdateFailed
                }
            })?;

        let purchase = NewPurchase {
            ticket_id,
            user_id: request.user_id.clone(),
            quantity: request.quantity,
            created_by: request.user_id.clone(),
            updated_by: request.user_id,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.purchase_store.create(purchase).await {
            error!(error = %e, %ticket_id, "Failed to record purchase, releasing allocation");
            if let Err(release_err) = self
                .ticket_store
                .release_allocation(ticket_id, request.quantity)
                .await
            {
                error!(
                    error = %release_err,
                    %ticket_id,
                    quantity = request.quantity,
                    "Failed to release allocation after purchase failure"
                );
            }
            return Err(TicketError::PurchaseFailed);
        }

        info!(
            %ticket_id,
            quantity = request.quantity,
            remaining = ticket.allocation,
            "Ticket purchased"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ticket;
    use crate::store::{InMemoryPurchaseStore, InMemoryTicketStore};
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap()
    }

    fn database_error() -> StoreError {
        StoreError::Database(sqlx::Error::PoolTimedOut)
    }

    struct FailingTicketStore;

    #[async_trait]
    impl TicketStore for FailingTicketStore {
        async fn find_all(&self) -> Result<Vec<Ticket>, StoreError> {
            Err(database_error())
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Ticket, StoreError> {
            Err(database_error())
        }

        async fn create(&self, _ticket: NewTicket) -> Result<Ticket, StoreError> {
            Err(database_error())
        }

        async fn update(&self, _ticket: &Ticket) -> Result<Ticket, StoreError> {
            Err(database_error())
        }

        async fn reserve_allocation(
            &self,
            _id: Uuid,
            _quantity: i32,
            _actor: &str,
            _at: DateTime<Utc>,
        ) -> Result<Ticket, StoreError> {
            Err(database_error())
        }

        async fn release_allocation(&self, _id: Uuid, _quantity: i32) -> Result<(), StoreError> {
            Err(database_error())
        }
    }

    struct FailingPurchaseStore;

    #[async_trait]
    impl PurchaseStore for FailingPurchaseStore {
        async fn create(&self, _purchase: NewPurchase) -> Result<(), StoreError> {
            Err(database_error())
        }
    }

    struct Fixture {
        service: TicketServiceImpl,
        tickets: InMemoryTicketStore,
        purchases: InMemoryPurchaseStore,
    }

    fn setup() -> Fixture {
        let tickets = InMemoryTicketStore::new();
        let purchases = InMemoryPurchaseStore::new();
        let service = TicketServiceImpl::with_clock(
            Arc::new(tickets.clone()),
            Arc::new(purchases.clone()),
            fixed_clock,
        );
        Fixture {
            service,
            tickets,
            purchases,
        }
    }

    fn create_request(allocation: i32) -> TicketCreateRequest {
        TicketCreateRequest {
            name: "Concert".to_string(),
            description: Some("Main stage".to_string()),
            allocation,
        }
    }

    fn purchase_request(ticket_id: &str, user_id: &str, quantity: i32) -> TicketPurchaseRequest {
        TicketPurchaseRequest {
            ticket_id: ticket_id.to_string(),
            user_id: user_id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_create_returns_request_fields() {
        let fx = setup();

        let first = fx.service.create(create_request(100)).await.unwrap();
        let second = fx.service.create(create_request(100)).await.unwrap();

        assert_eq!(first.name, "Concert");
        assert_eq!(first.description.as_deref(), Some("Main stage"));
        assert_eq!(first.allocation, 100);
        assert!(!first.id.is_empty());
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let fx = setup();

        let mut blank = create_request(1);
        blank.name = "   ".to_string();
        assert!(matches!(
            fx.service.create(blank).await,
            Err(TicketError::BadRequest(_))
        ));
        assert!(matches!(
            fx.service.create(create_request(-1)).await,
            Err(TicketError::BadRequest(_))
        ));
        assert!(fx.tickets.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_hides_storage_error() {
        let service = TicketServiceImpl::new(
            Arc::new(FailingTicketStore),
            Arc::new(InMemoryPurchaseStore::new()),
        );

        let result = service.create(create_request(1)).await;
        assert_eq!(result, Err(TicketError::TicketCreateFailed));
    }

    #[tokio::test]
    async fn test_find_by_id_round_trips_created_ticket() {
        let fx = setup();
        let created = fx.service.create(create_request(100)).await.unwrap();

        let found = fx.service.find_by_id(&created.id).await.unwrap();
        let again = fx.service.find_by_id(&created.id).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(again, found);
    }

    #[tokio::test]
    async fn test_find_by_id_unknown_is_not_found() {
        let fx = setup();

        assert_eq!(
            fx.service.find_by_id(&Uuid::new_v4().to_string()).await,
            Err(TicketError::NotFound)
        );
        assert_eq!(
            fx.service.find_by_id("not-a-uuid").await,
            Err(TicketError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_find_by_id_storage_failure_is_unexpected() {
        let service = TicketServiceImpl::new(
            Arc::new(FailingTicketStore),
            Arc::new(InMemoryPurchaseStore::new()),
        );

        let result = service.find_by_id(&Uuid::new_v4().to_string()).await;
        assert_eq!(result, Err(TicketError::UnexpectedError));
    }

    #[tokio::test]
    async fn test_list_returns_every_ticket() {
        let fx = setup();
        let a = fx.service.create(create_request(1)).await.unwrap();
        let b = fx.service.create(create_request(2)).await.unwrap();

        assert_eq!(fx.service.list().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_list_storage_failure_is_unexpected() {
        let service = TicketServiceImpl::new(
            Arc::new(FailingTicketStore),
            Arc::new(InMemoryPurchaseStore::new()),
        );
        assert_eq!(service.list().await, Err(TicketError::UnexpectedError));
    }

    #[tokio::test]
    async fn test_purchase_decrements_allocation_and_records_purchase() {
        let fx = setup();
        let ticket = fx.service.create(create_request(100)).await.unwrap();

        fx.service
            .ticket_purchase(purchase_request(&ticket.id, "u1", 30))
            .await
            .unwrap();

        assert_eq!(fx.service.find_by_id(&ticket.id).await.unwrap().allocation, 70);

        let purchases = fx.purchases.purchases().await;
        assert_eq!(purchases.len(), 1);
        let purchase = &purchases[0];
        assert_eq!(purchase.ticket_id.to_string(), ticket.id);
        assert_eq!(purchase.user_id, "u1");
        assert_eq!(purchase.quantity, 30);
        assert_eq!(purchase.created_by, "u1");
        assert_eq!(purchase.updated_by, "u1");
        assert_eq!(purchase.created_at, fixed_clock());
        assert_eq!(purchase.updated_at, fixed_clock());

        let stored = fx.tickets.find_all().await.unwrap();
        assert_eq!(stored[0].updated_by, "u1");
        assert_eq!(stored[0].updated_at, fixed_clock());
    }

    #[tokio::test]
    async fn test_concert_scenario() {
        let fx = setup();
        let ticket = fx.service.create(create_request(100)).await.unwrap();
        assert_eq!(ticket.allocation, 100);

        fx.service
            .ticket_purchase(purchase_request(&ticket.id, "u1", 30))
            .await
            .unwrap();
        assert_eq!(fx.service.find_by_id(&ticket.id).await.unwrap().allocation, 70);

        let result = fx
            .service
            .ticket_purchase(purchase_request(&ticket.id, "u2", 80))
            .await;
        assert_eq!(result, Err(TicketError::InsufficientAllocation));
        assert_eq!(fx.service.find_by_id(&ticket.id).await.unwrap().allocation, 70);
    }

    #[tokio::test]
    async fn test_rejected_purchase_leaves_no_record() {
        let fx = setup();
        let ticket = fx.service.create(create_request(5)).await.unwrap();

        let result = fx
            .service
            .ticket_purchase(purchase_request(&ticket.id, "u1", 6))
            .await;

        assert_eq!(result, Err(TicketError::InsufficientAllocation));
        assert!(fx.purchases.purchases().await.is_empty());
    }

    #[tokio::test]
    async fn test_purchase_of_unknown_ticket_is_not_found() {
        let fx = setup();

        let unknown = fx
            .service
            .ticket_purchase(purchase_request(&Uuid::new_v4().to_string(), "u1", 1))
            .await;
        let malformed = fx
            .service
            .ticket_purchase(purchase_request("42", "u1", 1))
            .await;

        assert_eq!(unknown, Err(TicketError::NotFound));
        assert_eq!(malformed, Err(TicketError::NotFound));
        assert!(fx.purchases.purchases().await.is_empty());
    }

    #[tokio::test]
    async fn test_purchase_rejects_invalid_input() {
        let fx = setup();
        let ticket = fx.service.create(create_request(5)).await.unwrap();

        for request in [
            purchase_request(&ticket.id, "u1", 0),
            purchase_request(&ticket.id, "u1", -3),
            purchase_request(&ticket.id, "", 1),
        ] {
            assert!(matches!(
                fx.service.ticket_purchase(request).await,
                Err(TicketError::BadRequest(_))
            ));
        }
        assert_eq!(fx.service.find_by_id(&ticket.id).await.unwrap().allocation, 5);
    }

    #[tokio::test]
    async fn test_purchase_record_failure_releases_allocation() {
        let tickets = InMemoryTicketStore::new();
        let service = TicketServiceImpl::new(
            Arc::new(tickets.clone()),
            Arc::new(FailingPurchaseStore),
        );
        let ticket = service.create(create_request(10)).await.unwrap();

        let result = service
            .ticket_purchase(purchase_request(&ticket.id, "u1", 4))
            .await;

        assert_eq!(result, Err(TicketError::PurchaseFailed));
        assert_eq!(service.find_by_id(&ticket.id).await.unwrap().allocation, 10);
    }

    #[tokio::test]
    async fn test_allocation_storage_failure_is_update_failure() {
        let purchases = InMemoryPurchaseStore::new();
        let service =
            TicketServiceImpl::new(Arc::new(FailingTicketStore), Arc::new(purchases.clone()));

        let result = service
            .ticket_purchase(purchase_request(&Uuid::new_v4().to_string(), "u1", 1))
            .await;

        assert_eq!(result, Err(TicketError::TicketUpdateFailed));
        assert!(purchases.purchases().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_purchases_cannot_oversell() {
        let fx = setup();
        let ticket = fx.service.create(create_request(100)).await.unwrap();
        let service = Arc::new(fx.service);

        let first = tokio::spawn({
            let service = Arc::clone(&service);
            let id = ticket.id.clone();
            async move { service.ticket_purchase(purchase_request(&id, "u1", 60)).await }
        });
        let second = tokio::spawn({
            let service = Arc::clone(&service);
            let id = ticket.id.clone();
            async move { service.ticket_purchase(purchase_request(&id, "u2", 60)).await }
        });

        let results = [first.await.unwrap(), second.await.unwrap()];
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| **r == Err(TicketError::InsufficientAllocation))
            .count();

        assert_eq!(succeeded, 1);
        assert_eq!(rejected, 1);
        assert_eq!(service.find_by_id(&ticket.id).await.unwrap().allocation, 40);
        assert_eq!(fx.purchases.purchases().await.len(), 1);
    }
}
