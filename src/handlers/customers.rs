use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::json;

use super::common::{page_limits, total_pages};
use crate::actor::Actor;
use crate::entities::customer::Model as Customer;
use crate::errors::ServiceError;
use crate::services::customers::{
    create_customer as create_customer_service, delete_customer as delete_customer_service,
    get_customer as get_customer_service, list_customers as list_customers_service,
    update_customer as update_customer_service, CustomerInput,
};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, Default)]
pub struct CustomerListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

pub async fn create_customer(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CustomerInput>,
) -> ApiResult<Customer> {
    actor.require_staff()?;
    let created = create_customer_service(&state.db, &state.event_sender, &actor, input).await?;
    Ok(Json(ApiResponse::success(created)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Customer> {
    actor.require_staff()?;
    match get_customer_service(&state.db, id).await? {
        Some(customer) => Ok(Json(ApiResponse::success(customer))),
        None => Err(ServiceError::NotFound(format!("Customer {} not found", id))),
    }
}

pub async fn list_customers(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<CustomerListQuery>,
) -> ApiResult<PaginatedResponse<Customer>> {
    actor.require_staff()?;
    let (page, limit) = page_limits(query.page, query.limit);

    let (items, total) = list_customers_service(&state.db, page, limit, query.search).await?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages: total_pages(total, limit),
    })))
}

pub async fn update_customer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(input): Json<CustomerInput>,
) -> ApiResult<Customer> {
    actor.require_staff()?;
    let updated =
        update_customer_service(&state.db, &state.event_sender, &actor, id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    actor.require_staff()?;
    delete_customer_service(&state.db, &state.event_sender, &actor, id).await?;
    Ok(Json(ApiResponse::success(json!({ "deleted": id }))))
}
