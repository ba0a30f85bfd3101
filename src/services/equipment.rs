use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use crate::actor::Actor;
use crate::db::DbPool;
use crate::entities::equipment;
use crate::errors::ServiceError;
use crate::events::{AuditEvent, Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EquipmentInput {
    #[validate(length(min = 1, max = 255))]
    pub equipment_name: String,
    #[validate(length(min = 1, max = 32))]
    pub plate_no: String,
    pub operator_name: Option<String>,
}

#[instrument(skip(db, events, actor, input))]
pub async fn create_equipment(
    db: &DbPool,
    events: &EventSender,
    actor: &Actor,
    input: EquipmentInput,
) -> Result<equipment::Model, ServiceError> {
    input.validate()?;

    let existing = equipment::Entity::find()
        .filter(equipment::Column::PlateNo.eq(input.plate_no.clone()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!(
            "Equipment with plate number '{}' already exists",
            input.plate_no
        )));
    }

    let created = equipment::ActiveModel {
        equipment_name: Set(input.equipment_name),
        plate_no: Set(input.plate_no),
        operator_name: Set(input.operator_name),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    events
        .emit(AuditEvent::by(
            actor,
            Event::EquipmentCreated {
                equipment_id: created.id,
            },
        ))
        .await;

    Ok(created)
}

#[instrument(skip(db))]
pub async fn get_equipment(
    db: &DbPool,
    equipment_id: i64,
) -> Result<Option<equipment::Model>, ServiceError> {
    Ok(equipment::Entity::find_by_id(equipment_id).one(db).await?)
}

#[instrument(skip(db))]
pub async fn list_equipment(
    db: &DbPool,
    page: u64,
    limit: u64,
    search: Option<String>,
) -> Result<(Vec<equipment::Model>, u64), ServiceError> {
    let mut query = equipment::Entity::find();

    if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(equipment::Column::EquipmentName.contains(term));
    }

    let paginator = query
        .order_by_asc(equipment::Column::EquipmentName)
        .paginate(db, limit);

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok((items, total))
}

#[instrument(skip(db, events, actor, input))]
pub async fn update_equipment(
    db: &DbPool,
    events: &EventSender,
    actor: &Actor,
    equipment_id: i64,
    input: EquipmentInput,
) -> Result<equipment::Model, ServiceError> {
    input.validate()?;

    let existing = equipment::Entity::find_by_id(equipment_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Equipment {} not found", equipment_id)))?;

    let duplicate = equipment::Entity::find()
        .filter(equipment::Column::PlateNo.eq(input.plate_no.clone()))
        .filter(equipment::Column::Id.ne(equipment_id))
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ServiceError::Conflict(format!(
            "Equipment with plate number '{}' already exists",
            input.plate_no
        )));
    }

    let old_snapshot = serde_json::to_value(&existing).unwrap_or_default();

    let mut active: equipment::ActiveModel = existing.into();
    active.equipment_name = Set(input.equipment_name);
    active.plate_no = Set(input.plate_no);
    active.operator_name = Set(input.operator_name);

    let updated = active.update(db).await?;

    events
        .emit(AuditEvent::by(
            actor,
            Event::EquipmentUpdated {
                equipment_id,
                old: old_snapshot,
                new: serde_json::to_value(&updated).unwrap_or_default(),
            },
        ))
        .await;

    Ok(updated)
}

#[instrument(skip(db, events, actor))]
pub async fn delete_equipment(
    db: &DbPool,
    events: &EventSender,
    actor: &Actor,
    equipment_id: i64,
) -> Result<(), ServiceError> {
    equipment::Entity::find_by_id(equipment_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Equipment {} not found", equipment_id)))?;

    equipment::Entity::delete_by_id(equipment_id).exec(db).await?;

    events
        .emit(AuditEvent::by(actor, Event::EquipmentDeleted { equipment_id }))
        .await;

    Ok(())
}
