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
use crate::actor::Actor;
use crate::entities::delivery::{self, DeliveryStatus};
use crate::errors::ServiceError;
use crate::ledger::LedgerEntry;
use crate::services::deliveries::DeliveryInput;
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeliveryListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Restrict to one order.
    pub order_id: Option<i64>,
    /// Lifecycle label, e.g. "Out for Delivery".
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 31,
    "order_id": 12,
    "mp_no": "MP-0458",
    "equipment_id": 2,
    "volume": "9.50",
    "delivery_status": "Out for Delivery",
    "sequence_key": 4,
    "schedule_date": "2026-03-18",
    "schedule_time": "07:30:00",
    "version": 2,
    "created_at": "2026-03-18T06:55:00Z",
    "updated_at": "2026-03-18T08:10:00Z"
}))]
pub struct DeliverySummary {
    pub id: i64,
    pub order_id: i64,
    /// Batch ticket reference
    #[schema(example = "MP-0458")]
    pub mp_no: String,
    pub equipment_id: Option<i64>,
    /// This trip's volume in cubic meters
    pub volume: Decimal,
    /// Lifecycle label
    #[schema(example = "Out for Delivery")]
    pub delivery_status: String,
    pub sequence_key: i64,
    pub schedule_date: Option<NaiveDate>,
    pub schedule_time: Option<NaiveTime>,
    /// Optimistic-lock counter; echo it back when requesting a transition
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<delivery::Model> for DeliverySummary {
    fn from(model: delivery::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            mp_no: model.mp_no,
            equipment_id: model.equipment_id,
            volume: model.volume,
            delivery_status: model.status.to_string(),
            sequence_key: model.sequence_key,
            schedule_date: model.schedule_date,
            schedule_time: model.schedule_time,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A delivery in ledger order: its trip position and running volume.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "trip_no": 4,
    "overall_volume": "38.00",
    "delivery": {
        "id": 31,
        "order_id": 12,
        "mp_no": "MP-0458",
        "volume": "9.50",
        "delivery_status": "Out for Delivery"
    }
}))]
pub struct LedgerRow {
    /// 1-based position in delivery order
    pub trip_no: u32,
    /// Cumulative volume up to and including this trip
    pub overall_volume: Decimal,
    #[serde(flatten)]
    pub delivery: DeliverySummary,
}

impl From<LedgerEntry> for LedgerRow {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            trip_no: entry.trip_no,
            overall_volume: entry.running_volume,
            delivery: DeliverySummary::from(entry.delivery),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "mp_no": "MP-0458",
    "equipment_id": 2,
    "volume": "9.50",
    "schedule_date": "2026-03-18",
    "schedule_time": "07:30:00"
}))]
pub struct DeliveryRequest {
    #[validate(length(min = 1, max = 255))]
    pub mp_no: String,
    pub equipment_id: Option<i64>,
    /// Trip volume in cubic meters; must not be negative.
    pub volume: Decimal,
    pub schedule_date: Option<NaiveDate>,
    pub schedule_time: Option<NaiveTime>,
}

impl From<DeliveryRequest> for DeliveryInput {
    fn from(req: DeliveryRequest) -> Self {
        Self {
            mp_no: req.mp_no,
            equipment_id: req.equipment_id,
            volume: req.volume,
            schedule_date: req.schedule_date,
            schedule_time: req.schedule_time,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "status": "Out for Delivery", "version": 2 }))]
pub struct UpdateStatusRequest {
    /// Target lifecycle label.
    pub status: String,
    /// Expected version of the record acted on; the transition fails with
    /// 409 if the record has moved since.
    pub version: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[schema(example = json!({ "version": 2 }))]
pub struct MarkRequest {
    pub version: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/deliveries",
    params(DeliveryListQuery),
    responses(
        (status = 200, description = "Deliveries listed", body = ApiResponse<PaginatedResponse<DeliverySummary>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn list_deliveries(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<DeliveryListQuery>,
) -> ApiResult<PaginatedResponse<DeliverySummary>> {
    actor.require_staff()?;
    let (page, limit) = page_limits(query.page, query.limit);

    let status = query
        .status
        .as_deref()
        .map(|raw| {
            raw.parse::<DeliveryStatus>()
                .map_err(ServiceError::InvalidInput)
        })
        .transpose()?;

    let (records, total) = state
        .services
        .deliveries
        .list_deliveries(page, limit, query.order_id, status)
        .await?;

    let items: Vec<DeliverySummary> = records.into_iter().map(DeliverySummary::from).collect();

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
    path = "/api/v1/deliveries/:id",
    params(("id" = i64, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Delivery fetched", body = ApiResponse<DeliverySummary>),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn get_delivery(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<DeliverySummary> {
    actor.require_staff()?;

    match state.services.deliveries.get_delivery(id).await? {
        Some(model) => Ok(Json(ApiResponse::success(DeliverySummary::from(model)))),
        None => Err(ServiceError::NotFound(format!("Delivery {} not found", id))),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/:id/deliveries",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = DeliveryRequest,
    responses(
        (status = 200, description = "Delivery created at the next sequence position", body = ApiResponse<DeliverySummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn create_delivery(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<i64>,
    Json(payload): Json<DeliveryRequest>,
) -> ApiResult<DeliverySummary> {
    actor.require_staff()?;
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state
        .services
        .deliveries
        .create_delivery(order_id, payload.into(), &actor)
        .await?;

    Ok(Json(ApiResponse::success(DeliverySummary::from(created))))
}

#[utoipa::path(
    put,
    path = "/api/v1/deliveries/:id",
    params(("id" = i64, Path, description = "Delivery ID")),
    request_body = DeliveryRequest,
    responses(
        (status = 200, description = "Delivery updated; later running totals shift on next read", body = ApiResponse<DeliverySummary>),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn update_delivery(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<DeliveryRequest>,
) -> ApiResult<DeliverySummary> {
    actor.require_staff()?;
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let updated = state
        .services
        .deliveries
        .update_delivery(id, payload.into(), &actor)
        .await?;

    Ok(Json(ApiResponse::success(DeliverySummary::from(updated))))
}

#[utoipa::path(
    put,
    path = "/api/v1/deliveries/:id/status",
    params(("id" = i64, Path, description = "Delivery ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status transitioned", body = ApiResponse<DeliverySummary>),
        (status = 400, description = "Not a lifecycle edge", body = crate::errors::ErrorResponse),
        (status = 403, description = "Edge not permitted for this role", body = crate::errors::ErrorResponse),
        (status = 409, description = "Record moved concurrently", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn update_delivery_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<DeliverySummary> {
    let requested = payload
        .status
        .parse::<DeliveryStatus>()
        .map_err(ServiceError::InvalidInput)?;

    let updated = state
        .services
        .deliveries
        .transition_status(id, requested, &actor, payload.version)
        .await?;

    Ok(Json(ApiResponse::success(DeliverySummary::from(updated))))
}

#[utoipa::path(
    put,
    path = "/api/v1/deliveries/:id/mark-delivered",
    params(("id" = i64, Path, description = "Delivery ID")),
    request_body = MarkRequest,
    responses(
        (status = 200, description = "Delivery confirmed received", body = ApiResponse<DeliverySummary>),
        (status = 403, description = "Not this actor's move", body = crate::errors::ErrorResponse),
        (status = 409, description = "Record moved concurrently", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn mark_delivered(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    payload: Option<Json<MarkRequest>>,
) -> ApiResult<DeliverySummary> {
    let version = payload.and_then(|Json(p)| p.version);
    let updated = state
        .services
        .deliveries
        .mark_delivered(id, &actor, version)
        .await?;

    Ok(Json(ApiResponse::success(DeliverySummary::from(updated))))
}

#[utoipa::path(
    put,
    path = "/api/v1/deliveries/:id/mark-out-for-delivery",
    params(("id" = i64, Path, description = "Delivery ID")),
    request_body = MarkRequest,
    responses(
        (status = 200, description = "Delivery reverted to out-for-delivery", body = ApiResponse<DeliverySummary>),
        (status = 403, description = "Not this actor's move", body = crate::errors::ErrorResponse),
        (status = 409, description = "Record moved concurrently", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn mark_out_for_delivery(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    payload: Option<Json<MarkRequest>>,
) -> ApiResult<DeliverySummary> {
    let version = payload.and_then(|Json(p)| p.version);
    let updated = state
        .services
        .deliveries
        .mark_out_for_delivery(id, &actor, version)
        .await?;

    Ok(Json(ApiResponse::success(DeliverySummary::from(updated))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/deliveries/:id",
    params(("id" = i64, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Delivery deleted; later running totals shrink on next read", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn delete_delivery(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    actor.require_staff()?;
    state.services.deliveries.delete_delivery(id, &actor).await?;
    Ok(Json(ApiResponse::success(json!({ "deleted": id }))))
}
