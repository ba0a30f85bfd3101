pub mod activity_logs;
pub mod common;
pub mod customers;
pub mod deliveries;
pub mod equipment;
pub mod item_designs;
pub mod orders;
pub mod reviews;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::ledger::LifecycleVariant;
use crate::services;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<services::orders::OrderService>,
    pub deliveries: Arc<services::deliveries::DeliveryService>,
    pub reviews: Arc<services::reviews::ReviewService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender, lifecycle: LifecycleVariant) -> Self {
        Self {
            orders: Arc::new(services::orders::OrderService::new(
                db.clone(),
                event_sender.clone(),
            )),
            deliveries: Arc::new(services::deliveries::DeliveryService::new(
                db.clone(),
                event_sender.clone(),
                lifecycle,
            )),
            reviews: Arc::new(services::reviews::ReviewService::new(db, event_sender)),
        }
    }
}
