use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use crate::actor::Actor;
use crate::db::DbPool;
use crate::entities::{customer, item_design, order};
use crate::errors::ServiceError;
use crate::events::{AuditEvent, Event, EventSender};

/// Fields accepted when creating or replacing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderInput {
    pub so_no: String,
    pub customer_id: i64,
    pub item_design_id: Option<i64>,
    pub total_delivery: Decimal,
    pub site_address: Option<String>,
    pub schedule_date: Option<NaiveDate>,
    pub schedule_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Service for managing sales orders
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    async fn check_references(&self, input: &OrderInput) -> Result<(), ServiceError> {
        if input.total_delivery < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Total delivery volume cannot be negative".to_string(),
            ));
        }

        customer::Entity::find_by_id(input.customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!("Customer {} not found", input.customer_id))
            })?;

        if let Some(item_design_id) = input.item_design_id {
            item_design::Entity::find_by_id(item_design_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::InvalidInput(format!("Design mix {} not found", item_design_id))
                })?;
        }

        Ok(())
    }

    /// Creates a new order
    #[instrument(skip(self, actor))]
    pub async fn create_order(
        &self,
        input: OrderInput,
        actor: &Actor,
    ) -> Result<order::Model, ServiceError> {
        self.check_references(&input).await?;

        let existing = order::Entity::find()
            .filter(order::Column::SoNo.eq(input.so_no.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "SO number '{}' already exists",
                input.so_no
            )));
        }

        let model = order::ActiveModel {
            so_no: Set(input.so_no),
            customer_id: Set(input.customer_id),
            item_design_id: Set(input.item_design_id),
            total_delivery: Set(input.total_delivery),
            site_address: Set(input.site_address),
            schedule_date: Set(input.schedule_date),
            schedule_time: Set(input.schedule_time),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await?;

        self.event_sender
            .emit(AuditEvent::by(
                actor,
                Event::OrderCreated {
                    order_id: created.id,
                    so_no: created.so_no.clone(),
                },
            ))
            .await;

        Ok(created)
    }

    /// Gets an order by ID
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i64) -> Result<Option<order::Model>, ServiceError> {
        Ok(order::Entity::find_by_id(order_id).one(&*self.db).await?)
    }

    /// Lists orders with pagination, an optional SO-number search filter,
    /// and an optional owning-customer scope (client dashboards).
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        limit: u64,
        search: Option<String>,
        customer_id: Option<i64>,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let mut query = order::Entity::find();

        if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(order::Column::SoNo.contains(term));
        }
        if let Some(customer_id) = customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page - 1).await?;

        Ok((orders, total))
    }

    /// Replaces an order's mutable fields
    #[instrument(skip(self, actor))]
    pub async fn update_order(
        &self,
        order_id: i64,
        input: OrderInput,
        actor: &Actor,
    ) -> Result<order::Model, ServiceError> {
        self.check_references(&input).await?;

        let existing = order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let duplicate = order::Entity::find()
            .filter(order::Column::SoNo.eq(input.so_no.clone()))
            .filter(order::Column::Id.ne(order_id))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "SO number '{}' already exists",
                input.so_no
            )));
        }

        let old_snapshot = serde_json::to_value(&existing).unwrap_or_default();

        let mut active: order::ActiveModel = existing.into();
        active.so_no = Set(input.so_no);
        active.customer_id = Set(input.customer_id);
        active.item_design_id = Set(input.item_design_id);
        active.total_delivery = Set(input.total_delivery);
        active.site_address = Set(input.site_address);
        active.schedule_date = Set(input.schedule_date);
        active.schedule_time = Set(input.schedule_time);
        active.notes = Set(input.notes);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .emit(AuditEvent::by(
                actor,
                Event::OrderUpdated {
                    order_id: updated.id,
                    old: old_snapshot,
                    new: serde_json::to_value(&updated).unwrap_or_default(),
                },
            ))
            .await;

        Ok(updated)
    }

    /// Deletes an order and, through the schema's cascade, its deliveries.
    /// An explicit administrative action.
    #[instrument(skip(self, actor))]
    pub async fn delete_order(&self, order_id: i64, actor: &Actor) -> Result<(), ServiceError> {
        let existing = order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let so_no = existing.so_no.clone();
        order::Entity::delete_by_id(order_id).exec(&*self.db).await?;

        self.event_sender
            .emit(AuditEvent::by(
                actor,
                Event::OrderDeleted { order_id, so_no },
            ))
            .await;

        Ok(())
    }
}
