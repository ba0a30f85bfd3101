use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, Value,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use crate::actor::Actor;
use crate::db::DbPool;
use crate::entities::delivery::{self, DeliveryStatus};
use crate::entities::{equipment, order};
use crate::errors::ServiceError;
use crate::events::{AuditEvent, Event, EventSender};
use crate::ledger::{
    self, request_status_transition, LedgerEntry, LifecycleVariant, OrderTotals,
};

/// Fields accepted when creating or editing a delivery. Status is absent on
/// purpose: status only moves through [`DeliveryService::transition_status`].
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryInput {
    pub mp_no: String,
    pub equipment_id: Option<i64>,
    pub volume: Decimal,
    pub schedule_date: Option<NaiveDate>,
    pub schedule_time: Option<NaiveTime>,
}

/// An order's deliveries in ledger order, with the order itself and its
/// contracted-versus-delivered totals.
#[derive(Debug, Clone)]
pub struct OrderLedger {
    pub order: order::Model,
    pub entries: Vec<LedgerEntry>,
    pub totals: OrderTotals,
}

/// Service for managing deliveries and their lifecycle
#[derive(Clone)]
pub struct DeliveryService {
    db: Arc<DbPool>,
    event_sender: EventSender,
    lifecycle: LifecycleVariant,
}

impl DeliveryService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender, lifecycle: LifecycleVariant) -> Self {
        Self {
            db,
            event_sender,
            lifecycle,
        }
    }

    pub fn lifecycle(&self) -> LifecycleVariant {
        self.lifecycle
    }

    fn check_input(&self, input: &DeliveryInput) -> Result<(), ServiceError> {
        if input.mp_no.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "MP number cannot be empty".to_string(),
            ));
        }
        if input.volume < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Delivery volume cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    async fn check_equipment(&self, equipment_id: Option<i64>) -> Result<(), ServiceError> {
        if let Some(id) = equipment_id {
            equipment::Entity::find_by_id(id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::InvalidInput(format!("Equipment {} not found", id))
                })?;
        }
        Ok(())
    }

    async fn load(&self, delivery_id: i64) -> Result<delivery::Model, ServiceError> {
        delivery::Entity::find_by_id(delivery_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Delivery {} not found", delivery_id)))
    }

    /// Gets a delivery by ID
    #[instrument(skip(self))]
    pub async fn get_delivery(
        &self,
        delivery_id: i64,
    ) -> Result<Option<delivery::Model>, ServiceError> {
        Ok(delivery::Entity::find_by_id(delivery_id)
            .one(&*self.db)
            .await?)
    }

    /// Loads one order's deliveries and annotates them with running volumes
    /// and totals. Always computed from current rows, never cached.
    #[instrument(skip(self))]
    pub async fn order_ledger(&self, order_id: i64) -> Result<OrderLedger, ServiceError> {
        let order = order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let records = delivery::Entity::find()
            .filter(delivery::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?;

        let entries = ledger::compute_running_volumes(records)?;
        let totals = ledger::order_totals(order.total_delivery, &entries);

        Ok(OrderLedger {
            order,
            entries,
            totals,
        })
    }

    /// Lists deliveries across orders with pagination and optional filters
    #[instrument(skip(self))]
    pub async fn list_deliveries(
        &self,
        page: u64,
        limit: u64,
        order_id: Option<i64>,
        status: Option<DeliveryStatus>,
    ) -> Result<(Vec<delivery::Model>, u64), ServiceError> {
        let mut query = delivery::Entity::find();

        if let Some(order_id) = order_id {
            query = query.filter(delivery::Column::OrderId.eq(order_id));
        }
        if let Some(status) = status {
            query = query.filter(delivery::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(delivery::Column::CreatedAt)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let deliveries = paginator.fetch_page(page - 1).await?;

        Ok((deliveries, total))
    }

    /// Creates a delivery under an order at the next sequence position.
    ///
    /// Two racing creates may pick the same sequence_key; the ledger breaks
    /// that tie by id, so the running totals stay deterministic either way.
    #[instrument(skip(self, actor))]
    pub async fn create_delivery(
        &self,
        order_id: i64,
        input: DeliveryInput,
        actor: &Actor,
    ) -> Result<delivery::Model, ServiceError> {
        self.check_input(&input)?;
        self.check_equipment(input.equipment_id).await?;

        order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let last = delivery::Entity::find()
            .filter(delivery::Column::OrderId.eq(order_id))
            .order_by_desc(delivery::Column::SequenceKey)
            .one(&*self.db)
            .await?;
        let sequence_key = last.map(|d| d.sequence_key + 1).unwrap_or(1);

        let model = delivery::ActiveModel {
            order_id: Set(order_id),
            mp_no: Set(input.mp_no),
            equipment_id: Set(input.equipment_id),
            volume: Set(input.volume),
            status: Set(self.lifecycle.initial_status()),
            sequence_key: Set(sequence_key),
            schedule_date: Set(input.schedule_date),
            schedule_time: Set(input.schedule_time),
            version: Set(0),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await?;

        self.event_sender
            .emit(AuditEvent::by(
                actor,
                Event::DeliveryCreated {
                    delivery_id: created.id,
                    order_id,
                    mp_no: created.mp_no.clone(),
                },
            ))
            .await;

        Ok(created)
    }

    /// Edits a delivery's trip fields. The owning order and the status are
    /// immutable here; later running totals shift automatically because
    /// they are recomputed on read.
    #[instrument(skip(self, actor))]
    pub async fn update_delivery(
        &self,
        delivery_id: i64,
        input: DeliveryInput,
        actor: &Actor,
    ) -> Result<delivery::Model, ServiceError> {
        self.check_input(&input)?;
        self.check_equipment(input.equipment_id).await?;

        let existing = self.load(delivery_id).await?;
        let old_snapshot = serde_json::to_value(&existing).unwrap_or_default();
        let order_id = existing.order_id;
        let version = existing.version;

        let mut active: delivery::ActiveModel = existing.into();
        active.mp_no = Set(input.mp_no);
        active.equipment_id = Set(input.equipment_id);
        active.volume = Set(input.volume);
        active.schedule_date = Set(input.schedule_date);
        active.schedule_time = Set(input.schedule_time);
        // Bumping the version invalidates any in-flight status CAS.
        active.version = Set(version + 1);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .emit(AuditEvent::by(
                actor,
                Event::DeliveryUpdated {
                    delivery_id,
                    order_id,
                    old: old_snapshot,
                    new: serde_json::to_value(&updated).unwrap_or_default(),
                },
            ))
            .await;

        Ok(updated)
    }

    /// Moves a delivery to `requested` if the lifecycle and the actor's role
    /// allow it, with a compare-and-swap on the version column.
    ///
    /// `expected_version` lets a client pin the snapshot it acted on; when
    /// absent, the version read here is used. Either way the UPDATE is
    /// guarded, so two racing transitions cannot both win: the loser gets
    /// `ConcurrentModification` and decides for itself whether to reload.
    #[instrument(skip(self, actor))]
    pub async fn transition_status(
        &self,
        delivery_id: i64,
        requested: DeliveryStatus,
        actor: &Actor,
        expected_version: Option<i32>,
    ) -> Result<delivery::Model, ServiceError> {
        let current = self.load(delivery_id).await?;

        // Clients may only act on deliveries of their own orders; staff
        // identity is vouched for by the gateway.
        if actor.role == crate::actor::ActorRole::Client {
            let owner = order::Entity::find_by_id(current.order_id)
                .one(&*self.db)
                .await?
                .map(|o| o.customer_id);
            if owner != actor.id {
                return Err(ServiceError::Forbidden(
                    "Delivery does not belong to this client".to_string(),
                ));
            }
        }

        if let Some(expected) = expected_version {
            if expected != current.version {
                return Err(ServiceError::ConcurrentModification(delivery_id));
            }
        }

        request_status_transition(current.status, requested, actor.role, self.lifecycle)?;

        let result = delivery::Entity::update_many()
            .col_expr(
                delivery::Column::Status,
                Expr::value(Value::from(requested.to_value())),
            )
            .col_expr(
                delivery::Column::Version,
                Expr::col(delivery::Column::Version).add(1),
            )
            .col_expr(
                delivery::Column::UpdatedAt,
                Expr::value(Value::from(Some(Utc::now()))),
            )
            .filter(delivery::Column::Id.eq(delivery_id))
            .filter(delivery::Column::Version.eq(current.version))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(delivery_id));
        }

        let updated = self.load(delivery_id).await?;

        self.event_sender
            .emit(AuditEvent::by(
                actor,
                Event::DeliveryStatusChanged {
                    delivery_id,
                    order_id: updated.order_id,
                    old_status: current.status.to_string(),
                    new_status: updated.status.to_string(),
                },
            ))
            .await;

        Ok(updated)
    }

    /// The client-facing receipt confirmation.
    #[instrument(skip(self, actor))]
    pub async fn mark_delivered(
        &self,
        delivery_id: i64,
        actor: &Actor,
        expected_version: Option<i32>,
    ) -> Result<delivery::Model, ServiceError> {
        self.transition_status(delivery_id, DeliveryStatus::Delivered, actor, expected_version)
            .await
    }

    /// The client-facing step back out of `Delivered`.
    #[instrument(skip(self, actor))]
    pub async fn mark_out_for_delivery(
        &self,
        delivery_id: i64,
        actor: &Actor,
        expected_version: Option<i32>,
    ) -> Result<delivery::Model, ServiceError> {
        self.transition_status(
            delivery_id,
            DeliveryStatus::OutForDelivery,
            actor,
            expected_version,
        )
        .await
    }

    /// Removes a delivery; later trips' running totals shrink on next read.
    #[instrument(skip(self, actor))]
    pub async fn delete_delivery(
        &self,
        delivery_id: i64,
        actor: &Actor,
    ) -> Result<(), ServiceError> {
        let existing = self.load(delivery_id).await?;
        let order_id = existing.order_id;

        delivery::Entity::delete_by_id(delivery_id)
            .exec(&*self.db)
            .await?;

        self.event_sender
            .emit(AuditEvent::by(
                actor,
                Event::DeliveryDeleted {
                    delivery_id,
                    order_id,
                },
            ))
            .await;

        Ok(())
    }
}
