use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::{page_limits, total_pages};
use super::deliveries::LedgerRow;
use crate::actor::{Actor, ActorRole};
use crate::entities::order;
use crate::errors::ServiceError;
use crate::ledger::OrderTotals;
use crate::services::orders::OrderInput;
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Filters by SO number, substring match.
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 12,
    "so_no": "SO-2026-0112",
    "customer_id": 3,
    "item_design_id": 5,
    "total_delivery": "120.00",
    "site_address": "Riverside warehouse extension, Block 4",
    "schedule_date": "2026-03-18",
    "schedule_time": "07:30:00",
    "notes": null,
    "created_at": "2026-03-09T10:30:00Z",
    "updated_at": null
}))]
pub struct OrderSummary {
    pub id: i64,
    /// Sales-order number
    #[schema(example = "SO-2026-0112")]
    pub so_no: String,
    pub customer_id: i64,
    pub item_design_id: Option<i64>,
    /// Contracted volume in cubic meters
    pub total_delivery: Decimal,
    pub site_address: Option<String>,
    pub schedule_date: Option<NaiveDate>,
    pub schedule_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<order::Model> for OrderSummary {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            so_no: model.so_no,
            customer_id: model.customer_id,
            item_design_id: model.item_design_id,
            total_delivery: model.total_delivery,
            site_address: model.site_address,
            schedule_date: model.schedule_date,
            schedule_time: model.schedule_time,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Contracted-versus-delivered block computed from the delivery ledger.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "contracted": "120.00",
    "delivered": "45.50",
    "remaining": "74.50",
    "over_delivered": false
}))]
pub struct TotalsSummary {
    pub contracted: Decimal,
    pub delivered: Decimal,
    /// Clamped at zero; `over_delivered` carries the unclamped condition.
    pub remaining: Decimal,
    pub over_delivered: bool,
}

impl From<OrderTotals> for TotalsSummary {
    fn from(totals: OrderTotals) -> Self {
        Self {
            contracted: totals.contracted,
            delivered: totals.delivered,
            remaining: totals.remaining,
            over_delivered: totals.over_delivered,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDeliveriesResponse {
    pub order: OrderSummary,
    pub totals: TotalsSummary,
    pub deliveries: Vec<LedgerRow>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "so_no": "SO-2026-0112",
    "customer_id": 3,
    "item_design_id": 5,
    "total_delivery": "120.00",
    "site_address": "Riverside warehouse extension, Block 4",
    "schedule_date": "2026-03-18",
    "schedule_time": "07:30:00"
}))]
pub struct OrderRequest {
    #[validate(length(min = 1, max = 50))]
    pub so_no: String,
    pub customer_id: i64,
    pub item_design_id: Option<i64>,
    /// Contracted volume in cubic meters; must not be negative.
    pub total_delivery: Decimal,
    pub site_address: Option<String>,
    pub schedule_date: Option<NaiveDate>,
    pub schedule_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

impl From<OrderRequest> for OrderInput {
    fn from(req: OrderRequest) -> Self {
        Self {
            so_no: req.so_no,
            customer_id: req.customer_id,
            item_design_id: req.item_design_id,
            total_delivery: req.total_delivery,
            site_address: req.site_address,
            schedule_date: req.schedule_date,
            schedule_time: req.schedule_time,
            notes: req.notes,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders listed", body = ApiResponse<PaginatedResponse<OrderSummary>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<PaginatedResponse<OrderSummary>> {
    let (page, limit) = page_limits(query.page, query.limit);

    // Clients only ever see their own orders.
    let customer_scope = match actor.role {
        ActorRole::Client => Some(actor.id.ok_or_else(|| {
            ServiceError::Unauthorized("Client actor id is required".to_string())
        })?),
        _ => None,
    };

    let (records, total) = state
        .services
        .orders
        .list_orders(page, limit, query.search, customer_scope)
        .await?;

    let items: Vec<OrderSummary> = records.into_iter().map(OrderSummary::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages: total_pages(total, limit),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/:id",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order fetched", body = ApiResponse<OrderSummary>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<OrderSummary> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

    // A foreign order is indistinguishable from a missing one for clients.
    if actor.role == ActorRole::Client && Some(order.customer_id) != actor.id {
        return Err(ServiceError::NotFound(format!("Order {} not found", id)));
    }

    Ok(Json(ApiResponse::success(OrderSummary::from(order))))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order created", body = ApiResponse<OrderSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate SO number", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<OrderRequest>,
) -> ApiResult<OrderSummary> {
    actor.require_staff()?;
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state
        .services
        .orders
        .create_order(payload.into(), &actor)
        .await?;

    Ok(Json(ApiResponse::success(OrderSummary::from(created))))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/:id",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<OrderSummary>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<OrderRequest>,
) -> ApiResult<OrderSummary> {
    actor.require_staff()?;
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let updated = state
        .services
        .orders
        .update_order(id, payload.into(), &actor)
        .await?;

    Ok(Json(ApiResponse::success(OrderSummary::from(updated))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/:id",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order and its deliveries deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    actor.require_staff()?;
    state.services.orders.delete_order(id, &actor).await?;
    Ok(Json(ApiResponse::success(json!({ "deleted": id }))))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/:id/deliveries",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Deliveries in trip order with running volumes", body = ApiResponse<OrderDeliveriesResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order_deliveries(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<OrderDeliveriesResponse> {
    let ledger = state.services.deliveries.order_ledger(id).await?;

    if actor.role == ActorRole::Client && Some(ledger.order.customer_id) != actor.id {
        return Err(ServiceError::NotFound(format!("Order {} not found", id)));
    }

    Ok(Json(ApiResponse::success(OrderDeliveriesResponse {
        order: OrderSummary::from(ledger.order),
        totals: TotalsSummary::from(ledger.totals),
        deliveries: ledger.entries.into_iter().map(LedgerRow::from).collect(),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/:id/totals",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Contracted-versus-delivered totals", body = ApiResponse<TotalsSummary>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order_totals(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<TotalsSummary> {
    let ledger = state.services.deliveries.order_ledger(id).await?;

    if actor.role == ActorRole::Client && Some(ledger.order.customer_id) != actor.id {
        return Err(ServiceError::NotFound(format!("Order {} not found", id)));
    }

    Ok(Json(ApiResponse::success(TotalsSummary::from(ledger.totals))))
}
