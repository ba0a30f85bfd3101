use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::json;

use super::common::{page_limits, total_pages};
use crate::actor::{Actor, ActorRole};
use crate::entities::review::{Model as Review, ReviewStatus};
use crate::errors::ServiceError;
use crate::services::reviews::ReviewInput;
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, Default)]
pub struct ReviewListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// "pending", "approved" or "rejected"
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewStatusRequest {
    pub status: String,
}

/// Client submits the satisfaction form; it enters moderation as pending.
pub async fn submit_review(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<ReviewInput>,
) -> ApiResult<Review> {
    if actor.role != ActorRole::Client {
        return Err(ServiceError::Forbidden(
            "Only clients submit reviews".to_string(),
        ));
    }

    let created = state.services.reviews.submit_review(input, &actor).await?;
    Ok(Json(ApiResponse::success(created)))
}

pub async fn get_review(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Review> {
    let review = state
        .services
        .reviews
        .get_review(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Review {} not found", id)))?;

    if actor.role == ActorRole::Client && Some(review.customer_id) != actor.id {
        return Err(ServiceError::NotFound(format!("Review {} not found", id)));
    }

    Ok(Json(ApiResponse::success(review)))
}

/// Staff see every review; clients see only their own submissions.
pub async fn list_reviews(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ReviewListQuery>,
) -> ApiResult<PaginatedResponse<Review>> {
    let (page, limit) = page_limits(query.page, query.limit);

    let status = query
        .status
        .as_deref()
        .map(|raw| {
            raw.parse::<ReviewStatus>()
                .map_err(ServiceError::InvalidInput)
        })
        .transpose()?;

    let customer_scope = match actor.role {
        ActorRole::Client => Some(actor.id.ok_or_else(|| {
            ServiceError::Unauthorized("Client actor id is required".to_string())
        })?),
        _ => None,
    };

    let (items, total) = state
        .services
        .reviews
        .list_reviews(page, limit, status, customer_scope)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages: total_pages(total, limit),
    })))
}

/// Staff moderation: approve or reject.
pub async fn update_review_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(payload): Json<ReviewStatusRequest>,
) -> ApiResult<Review> {
    actor.require_staff()?;

    let status = payload
        .status
        .parse::<ReviewStatus>()
        .map_err(ServiceError::InvalidInput)?;

    let updated = state
        .services
        .reviews
        .update_status(id, status, &actor)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_review(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    actor.require_staff()?;
    state.services.reviews.delete_review(id, &actor).await?;
    Ok(Json(ApiResponse::success(json!({ "deleted": id }))))
}
