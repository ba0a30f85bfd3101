use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::json;

use super::common::{page_limits, total_pages};
use crate::actor::Actor;
use crate::entities::equipment::Model as Equipment;
use crate::errors::ServiceError;
use crate::services::equipment::{
    create_equipment as create_equipment_service, delete_equipment as delete_equipment_service,
    get_equipment as get_equipment_service, list_equipment as list_equipment_service,
    update_equipment as update_equipment_service, EquipmentInput,
};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, Default)]
pub struct EquipmentListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

pub async fn create_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<EquipmentInput>,
) -> ApiResult<Equipment> {
    actor.require_staff()?;
    let created = create_equipment_service(&state.db, &state.event_sender, &actor, input).await?;
    Ok(Json(ApiResponse::success(created)))
}

pub async fn get_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Equipment> {
    actor.require_staff()?;
    match get_equipment_service(&state.db, id).await? {
        Some(equipment) => Ok(Json(ApiResponse::success(equipment))),
        None => Err(ServiceError::NotFound(format!(
            "Equipment {} not found",
            id
        ))),
    }
}

pub async fn list_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<EquipmentListQuery>,
) -> ApiResult<PaginatedResponse<Equipment>> {
    actor.require_staff()?;
    let (page, limit) = page_limits(query.page, query.limit);

    let (items, total) = list_equipment_service(&state.db, page, limit, query.search).await?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages: total_pages(total, limit),
    })))
}

pub async fn update_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(input): Json<EquipmentInput>,
) -> ApiResult<Equipment> {
    actor.require_staff()?;
    let updated =
        update_equipment_service(&state.db, &state.event_sender, &actor, id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    actor.require_staff()?;
    delete_equipment_service(&state.db, &state.event_sender, &actor, id).await?;
    Ok(Json(ApiResponse::success(json!({ "deleted": id }))))
}
