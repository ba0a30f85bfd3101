use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use crate::actor::Actor;
use crate::db::DbPool;
use crate::entities::customer;
use crate::errors::ServiceError;
use crate::events::{AuditEvent, Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 255))]
    pub customer_name: String,
    #[validate(length(min = 1, max = 255))]
    pub contact_person: String,
    #[validate(length(min = 1, max = 64))]
    pub contact_number: String,
    #[validate(length(min = 1, max = 512))]
    pub address: String,
    #[validate(email)]
    pub email: String,
}

#[instrument(skip(db, events, actor, input))]
pub async fn create_customer(
    db: &DbPool,
    events: &EventSender,
    actor: &Actor,
    input: CustomerInput,
) -> Result<customer::Model, ServiceError> {
    input.validate()?;

    let existing = customer::Entity::find()
        .filter(customer::Column::Email.eq(input.email.clone()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!(
            "A customer with email '{}' already exists",
            input.email
        )));
    }

    let created = customer::ActiveModel {
        customer_name: Set(input.customer_name),
        contact_person: Set(input.contact_person),
        contact_number: Set(input.contact_number),
        address: Set(input.address),
        email: Set(input.email),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    events
        .emit(AuditEvent::by(
            actor,
            Event::CustomerCreated {
                customer_id: created.id,
            },
        ))
        .await;

    Ok(created)
}

#[instrument(skip(db))]
pub async fn get_customer(
    db: &DbPool,
    customer_id: i64,
) -> Result<Option<customer::Model>, ServiceError> {
    Ok(customer::Entity::find_by_id(customer_id).one(db).await?)
}

#[instrument(skip(db))]
pub async fn list_customers(
    db: &DbPool,
    page: u64,
    limit: u64,
    search: Option<String>,
) -> Result<(Vec<customer::Model>, u64), ServiceError> {
    let mut query = customer::Entity::find();

    if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(customer::Column::CustomerName.contains(term));
    }

    let paginator = query
        .order_by_asc(customer::Column::CustomerName)
        .paginate(db, limit);

    let total = paginator.num_items().await?;
    let customers = paginator.fetch_page(page - 1).await?;

    Ok((customers, total))
}

#[instrument(skip(db, events, actor, input))]
pub async fn update_customer(
    db: &DbPool,
    events: &EventSender,
    actor: &Actor,
    customer_id: i64,
    input: CustomerInput,
) -> Result<customer::Model, ServiceError> {
    input.validate()?;

    let existing = customer::Entity::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))?;

    let duplicate = customer::Entity::find()
        .filter(customer::Column::Email.eq(input.email.clone()))
        .filter(customer::Column::Id.ne(customer_id))
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ServiceError::Conflict(format!(
            "A customer with email '{}' already exists",
            input.email
        )));
    }

    let old_snapshot = serde_json::to_value(&existing).unwrap_or_default();

    let mut active: customer::ActiveModel = existing.into();
    active.customer_name = Set(input.customer_name);
    active.contact_person = Set(input.contact_person);
    active.contact_number = Set(input.contact_number);
    active.address = Set(input.address);
    active.email = Set(input.email);
    active.updated_at = Set(Some(Utc::now()));

    let updated = active.update(db).await?;

    events
        .emit(AuditEvent::by(
            actor,
            Event::CustomerUpdated {
                customer_id,
                old: old_snapshot,
                new: serde_json::to_value(&updated).unwrap_or_default(),
            },
        ))
        .await;

    Ok(updated)
}

#[instrument(skip(db, events, actor))]
pub async fn delete_customer(
    db: &DbPool,
    events: &EventSender,
    actor: &Actor,
    customer_id: i64,
) -> Result<(), ServiceError> {
    customer::Entity::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))?;

    customer::Entity::delete_by_id(customer_id).exec(db).await?;

    events
        .emit(AuditEvent::by(actor, Event::CustomerDeleted { customer_id }))
        .await;

    Ok(())
}
