use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::json;

use super::common::{page_limits, total_pages};
use crate::actor::Actor;
use crate::entities::item_design::Model as ItemDesign;
use crate::errors::ServiceError;
use crate::services::item_designs::{
    create_item_design as create_item_design_service,
    delete_item_design as delete_item_design_service, get_item_design as get_item_design_service,
    list_item_designs as list_item_designs_service,
    update_item_design as update_item_design_service, ItemDesignInput,
};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, Default)]
pub struct ItemDesignListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

pub async fn create_item_design(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<ItemDesignInput>,
) -> ApiResult<ItemDesign> {
    actor.require_staff()?;
    let created = create_item_design_service(&state.db, &state.event_sender, &actor, input).await?;
    Ok(Json(ApiResponse::success(created)))
}

pub async fn get_item_design(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<ItemDesign> {
    actor.require_staff()?;
    match get_item_design_service(&state.db, id).await? {
        Some(item) => Ok(Json(ApiResponse::success(item))),
        None => Err(ServiceError::NotFound(format!(
            "Design mix {} not found",
            id
        ))),
    }
}

pub async fn list_item_designs(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ItemDesignListQuery>,
) -> ApiResult<PaginatedResponse<ItemDesign>> {
    actor.require_staff()?;
    let (page, limit) = page_limits(query.page, query.limit);

    let (items, total) = list_item_designs_service(&state.db, page, limit, query.search).await?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages: total_pages(total, limit),
    })))
}

pub async fn update_item_design(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(input): Json<ItemDesignInput>,
) -> ApiResult<ItemDesign> {
    actor.require_staff()?;
    let updated =
        update_item_design_service(&state.db, &state.event_sender, &actor, id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_item_design(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    actor.require_staff()?;
    delete_item_design_service(&state.db, &state.event_sender, &actor, id).await?;
    Ok(Json(ApiResponse::success(json!({ "deleted": id }))))
}
