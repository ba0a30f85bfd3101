use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use crate::actor::Actor;
use crate::db::DbPool;
use crate::entities::item_design;
use crate::errors::ServiceError;
use crate::events::{AuditEvent, Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ItemDesignInput {
    #[validate(length(min = 1, max = 255))]
    pub item_name: String,
}

#[instrument(skip(db, events, actor, input))]
pub async fn create_item_design(
    db: &DbPool,
    events: &EventSender,
    actor: &Actor,
    input: ItemDesignInput,
) -> Result<item_design::Model, ServiceError> {
    input.validate()?;

    let existing = item_design::Entity::find()
        .filter(item_design::Column::ItemName.eq(input.item_name.clone()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!(
            "Design mix '{}' already exists",
            input.item_name
        )));
    }

    let created = item_design::ActiveModel {
        item_name: Set(input.item_name),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    events
        .emit(AuditEvent::by(
            actor,
            Event::ItemDesignCreated {
                item_design_id: created.id,
            },
        ))
        .await;

    Ok(created)
}

#[instrument(skip(db))]
pub async fn get_item_design(
    db: &DbPool,
    item_design_id: i64,
) -> Result<Option<item_design::Model>, ServiceError> {
    Ok(item_design::Entity::find_by_id(item_design_id).one(db).await?)
}

#[instrument(skip(db))]
pub async fn list_item_designs(
    db: &DbPool,
    page: u64,
    limit: u64,
    search: Option<String>,
) -> Result<(Vec<item_design::Model>, u64), ServiceError> {
    let mut query = item_design::Entity::find();

    if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(item_design::Column::ItemName.contains(term));
    }

    let paginator = query
        .order_by_asc(item_design::Column::ItemName)
        .paginate(db, limit);

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok((items, total))
}

#[instrument(skip(db, events, actor, input))]
pub async fn update_item_design(
    db: &DbPool,
    events: &EventSender,
    actor: &Actor,
    item_design_id: i64,
    input: ItemDesignInput,
) -> Result<item_design::Model, ServiceError> {
    input.validate()?;

    let existing = item_design::Entity::find_by_id(item_design_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Design mix {} not found", item_design_id))
        })?;

    let duplicate = item_design::Entity::find()
        .filter(item_design::Column::ItemName.eq(input.item_name.clone()))
        .filter(item_design::Column::Id.ne(item_design_id))
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ServiceError::Conflict(format!(
            "Design mix '{}' already exists",
            input.item_name
        )));
    }

    let old_snapshot = serde_json::to_value(&existing).unwrap_or_default();

    let mut active: item_design::ActiveModel = existing.into();
    active.item_name = Set(input.item_name);

    let updated = active.update(db).await?;

    events
        .emit(AuditEvent::by(
            actor,
            Event::ItemDesignUpdated {
                item_design_id: updated.id,
                old: old_snapshot,
                new: serde_json::to_value(&updated).unwrap_or_default(),
            },
        ))
        .await;

    Ok(updated)
}

#[instrument(skip(db, events, actor))]
pub async fn delete_item_design(
    db: &DbPool,
    events: &EventSender,
    actor: &Actor,
    item_design_id: i64,
) -> Result<(), ServiceError> {
    item_design::Entity::find_by_id(item_design_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Design mix {} not found", item_design_id))
        })?;

    item_design::Entity::delete_by_id(item_design_id)
        .exec(db)
        .await?;

    events
        .emit(AuditEvent::by(
            actor,
            Event::ItemDesignDeleted { item_design_id },
        ))
        .await;

    Ok(())
}
