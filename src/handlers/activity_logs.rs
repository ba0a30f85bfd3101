use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;

use super::common::{page_limits, total_pages};
use crate::actor::{Actor, ActorRole};
use crate::entities::activity_log::Model as ActivityLog;
use crate::errors::ServiceError;
use crate::services::activity_log::list_activity_logs as list_activity_logs_service;
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, Default)]
pub struct ActivityLogListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Restrict to one module, e.g. "deliveries".
    pub module: Option<String>,
}

/// The audit trail is superadmin-only, like the original back office.
pub async fn list_activity_logs(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ActivityLogListQuery>,
) -> ApiResult<PaginatedResponse<ActivityLog>> {
    if actor.role != ActorRole::Superadmin {
        return Err(ServiceError::Forbidden(
            "Activity logs require the superadmin role".to_string(),
        ));
    }

    let (page, limit) = page_limits(query.page, query.limit);

    let (items, total) =
        list_activity_logs_service(&state.db, page, limit, query.module).await?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages: total_pages(total, limit),
    })))
}
