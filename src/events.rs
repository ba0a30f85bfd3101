//! Domain events and the audit-trail worker.
//!
//! Services emit an [`AuditEvent`] after every accepted mutation; a
//! background worker drains the channel and appends one `activity_logs` row
//! per event. Event delivery is best-effort: a full channel or a failed
//! insert is logged and dropped, it never fails the request that produced
//! it.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::entities::activity_log;

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderCreated {
        order_id: i64,
        so_no: String,
    },
    OrderUpdated {
        order_id: i64,
        old: Value,
        new: Value,
    },
    OrderDeleted {
        order_id: i64,
        so_no: String,
    },

    // Delivery events
    DeliveryCreated {
        delivery_id: i64,
        order_id: i64,
        mp_no: String,
    },
    DeliveryUpdated {
        delivery_id: i64,
        order_id: i64,
        old: Value,
        new: Value,
    },
    DeliveryStatusChanged {
        delivery_id: i64,
        order_id: i64,
        old_status: String,
        new_status: String,
    },
    DeliveryDeleted {
        delivery_id: i64,
        order_id: i64,
    },

    // Catalog events
    CustomerCreated {
        customer_id: i64,
    },
    CustomerUpdated {
        customer_id: i64,
        old: Value,
        new: Value,
    },
    CustomerDeleted {
        customer_id: i64,
    },
    EquipmentCreated {
        equipment_id: i64,
    },
    EquipmentUpdated {
        equipment_id: i64,
        old: Value,
        new: Value,
    },
    EquipmentDeleted {
        equipment_id: i64,
    },
    ItemDesignCreated {
        item_design_id: i64,
    },
    ItemDesignUpdated {
        item_design_id: i64,
        old: Value,
        new: Value,
    },
    ItemDesignDeleted {
        item_design_id: i64,
    },

    // Review events
    ReviewSubmitted {
        review_id: i64,
        customer_id: i64,
    },
    ReviewStatusChanged {
        review_id: i64,
        old_status: String,
        new_status: String,
    },
    ReviewDeleted {
        review_id: i64,
    },
}

impl Event {
    fn action(&self) -> &'static str {
        match self {
            Event::OrderCreated { .. }
            | Event::DeliveryCreated { .. }
            | Event::CustomerCreated { .. }
            | Event::EquipmentCreated { .. }
            | Event::ItemDesignCreated { .. } => "created",
            Event::OrderUpdated { .. }
            | Event::DeliveryUpdated { .. }
            | Event::CustomerUpdated { .. }
            | Event::EquipmentUpdated { .. }
            | Event::ItemDesignUpdated { .. } => "updated",
            Event::DeliveryStatusChanged { .. } | Event::ReviewStatusChanged { .. } => {
                "status_changed"
            }
            Event::OrderDeleted { .. }
            | Event::DeliveryDeleted { .. }
            | Event::CustomerDeleted { .. }
            | Event::EquipmentDeleted { .. }
            | Event::ItemDesignDeleted { .. }
            | Event::ReviewDeleted { .. } => "deleted",
            Event::ReviewSubmitted { .. } => "submitted",
        }
    }

    fn module(&self) -> &'static str {
        match self {
            Event::OrderCreated { .. } | Event::OrderUpdated { .. } | Event::OrderDeleted { .. } => {
                "orders"
            }
            Event::DeliveryCreated { .. }
            | Event::DeliveryUpdated { .. }
            | Event::DeliveryStatusChanged { .. }
            | Event::DeliveryDeleted { .. } => "deliveries",
            Event::CustomerCreated { .. }
            | Event::CustomerUpdated { .. }
            | Event::CustomerDeleted { .. } => "customers",
            Event::EquipmentCreated { .. }
            | Event::EquipmentUpdated { .. }
            | Event::EquipmentDeleted { .. } => "equipment",
            Event::ItemDesignCreated { .. }
            | Event::ItemDesignUpdated { .. }
            | Event::ItemDesignDeleted { .. } => "item_designs",
            Event::ReviewSubmitted { .. }
            | Event::ReviewStatusChanged { .. }
            | Event::ReviewDeleted { .. } => "reviews",
        }
    }

    fn record_id(&self) -> Option<i64> {
        match self {
            Event::OrderCreated { order_id, .. }
            | Event::OrderUpdated { order_id, .. }
            | Event::OrderDeleted { order_id, .. } => Some(*order_id),
            Event::DeliveryCreated { delivery_id, .. }
            | Event::DeliveryUpdated { delivery_id, .. }
            | Event::DeliveryStatusChanged { delivery_id, .. }
            | Event::DeliveryDeleted { delivery_id, .. } => Some(*delivery_id),
            Event::CustomerCreated { customer_id }
            | Event::CustomerUpdated { customer_id, .. }
            | Event::CustomerDeleted { customer_id } => Some(*customer_id),
            Event::EquipmentCreated { equipment_id }
            | Event::EquipmentUpdated { equipment_id, .. }
            | Event::EquipmentDeleted { equipment_id } => Some(*equipment_id),
            Event::ItemDesignCreated { item_design_id }
            | Event::ItemDesignUpdated { item_design_id, .. }
            | Event::ItemDesignDeleted { item_design_id } => Some(*item_design_id),
            Event::ReviewSubmitted { review_id, .. }
            | Event::ReviewStatusChanged { review_id, .. }
            | Event::ReviewDeleted { review_id } => Some(*review_id),
        }
    }

    fn description(&self) -> String {
        match self {
            Event::OrderCreated { so_no, .. } => format!("Created order {}", so_no),
            Event::OrderUpdated { order_id, .. } => format!("Updated order {}", order_id),
            Event::OrderDeleted { so_no, .. } => format!("Deleted order {}", so_no),
            Event::DeliveryCreated { mp_no, order_id, .. } => {
                format!("Added delivery {} to order {}", mp_no, order_id)
            }
            Event::DeliveryUpdated { delivery_id, .. } => {
                format!("Updated delivery {}", delivery_id)
            }
            Event::DeliveryStatusChanged {
                delivery_id,
                old_status,
                new_status,
                ..
            } => format!(
                "Delivery {} moved from '{}' to '{}'",
                delivery_id, old_status, new_status
            ),
            Event::DeliveryDeleted { delivery_id, .. } => {
                format!("Deleted delivery {}", delivery_id)
            }
            Event::CustomerCreated { customer_id } => format!("Created customer {}", customer_id),
            Event::CustomerUpdated { customer_id, .. } => {
                format!("Updated customer {}", customer_id)
            }
            Event::CustomerDeleted { customer_id } => format!("Deleted customer {}", customer_id),
            Event::EquipmentCreated { equipment_id } => {
                format!("Registered equipment {}", equipment_id)
            }
            Event::EquipmentUpdated { equipment_id, .. } => {
                format!("Updated equipment {}", equipment_id)
            }
            Event::EquipmentDeleted { equipment_id } => {
                format!("Retired equipment {}", equipment_id)
            }
            Event::ItemDesignCreated { item_design_id } => {
                format!("Added design mix {}", item_design_id)
            }
            Event::ItemDesignUpdated { item_design_id, .. } => {
                format!("Updated design mix {}", item_design_id)
            }
            Event::ItemDesignDeleted { item_design_id } => {
                format!("Removed design mix {}", item_design_id)
            }
            Event::ReviewSubmitted { review_id, customer_id } => {
                format!("Customer {} submitted review {}", customer_id, review_id)
            }
            Event::ReviewStatusChanged {
                review_id,
                old_status,
                new_status,
            } => format!(
                "Review {} moved from '{}' to '{}'",
                review_id, old_status, new_status
            ),
            Event::ReviewDeleted { review_id } => format!("Deleted review {}", review_id),
        }
    }

    fn old_values(&self) -> Option<Value> {
        match self {
            Event::OrderUpdated { old, .. }
            | Event::DeliveryUpdated { old, .. }
            | Event::CustomerUpdated { old, .. }
            | Event::EquipmentUpdated { old, .. }
            | Event::ItemDesignUpdated { old, .. } => Some(old.clone()),
            Event::DeliveryStatusChanged { old_status, .. } => {
                Some(json!({ "delivery_status": old_status }))
            }
            Event::ReviewStatusChanged { old_status, .. } => {
                Some(json!({ "status": old_status }))
            }
            _ => None,
        }
    }

    fn new_values(&self) -> Option<Value> {
        match self {
            Event::OrderUpdated { new, .. }
            | Event::DeliveryUpdated { new, .. }
            | Event::CustomerUpdated { new, .. }
            | Event::EquipmentUpdated { new, .. }
            | Event::ItemDesignUpdated { new, .. } => Some(new.clone()),
            Event::DeliveryStatusChanged { new_status, .. } => {
                Some(json!({ "delivery_status": new_status }))
            }
            Event::ReviewStatusChanged { new_status, .. } => {
                Some(json!({ "status": new_status }))
            }
            _ => None,
        }
    }
}

/// An event plus the actor that caused it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor_name: String,
    pub actor_id: Option<i64>,
    pub event: Event,
}

impl AuditEvent {
    pub fn by(actor: &crate::actor::Actor, event: Event) -> Self {
        Self {
            actor_name: actor.name.clone(),
            actor_id: actor.id,
            event,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<AuditEvent>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<AuditEvent>) -> Self {
        Self { sender }
    }

    /// Sends an event, logging and dropping it if the worker cannot keep up.
    pub async fn emit(&self, event: AuditEvent) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Dropping audit event, channel closed: {}", e);
        }
    }
}

/// Drains the event channel and appends activity-log rows until every sender
/// is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<AuditEvent>, db: Arc<DatabaseConnection>) {
    info!("Activity-log event worker started");

    while let Some(audit) = rx.recv().await {
        let entry = activity_log::ActiveModel {
            actor_name: Set(audit.actor_name.clone()),
            actor_id: Set(audit.actor_id),
            action: Set(audit.event.action().to_string()),
            module: Set(audit.event.module().to_string()),
            record_id: Set(audit.event.record_id()),
            description: Set(audit.event.description()),
            old_values: Set(audit.event.old_values()),
            new_values: Set(audit.event.new_values()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        if let Err(e) = entry.insert(&*db).await {
            error!("Failed to persist activity log entry: {}", e);
        }
    }

    info!("Activity-log event worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_events_carry_old_and_new_values() {
        let event = Event::DeliveryStatusChanged {
            delivery_id: 9,
            order_id: 4,
            old_status: "Batching on Process".to_string(),
            new_status: "Out for Delivery".to_string(),
        };

        assert_eq!(event.action(), "status_changed");
        assert_eq!(event.module(), "deliveries");
        assert_eq!(event.record_id(), Some(9));
        assert_eq!(
            event.old_values(),
            Some(json!({ "delivery_status": "Batching on Process" }))
        );
        assert_eq!(
            event.new_values(),
            Some(json!({ "delivery_status": "Out for Delivery" }))
        );
    }

    #[test]
    fn create_events_have_no_value_snapshots() {
        let event = Event::OrderCreated {
            order_id: 1,
            so_no: "SO-1001".to_string(),
        };
        assert_eq!(event.action(), "created");
        assert!(event.old_values().is_none());
        assert!(event.new_values().is_none());
    }
}
