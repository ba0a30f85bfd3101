//! Readymix API Library
//!
//! Back-office services for a ready-mix concrete supplier: customers, sales
//! orders, per-trip delivery tracking with running volumes, fleet equipment,
//! design mixes, satisfaction reviews, and an audit trail.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod actor;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod ledger;
pub mod middleware_helpers;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Full v1 API surface
pub fn api_v1_routes() -> Router<AppState> {
    // Orders, including the ledger views
    let orders = Router::new()
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route(
            "/orders/:id",
            get(handlers::orders::get_order)
                .put(handlers::orders::update_order)
                .delete(handlers::orders::delete_order),
        )
        .route(
            "/orders/:id/deliveries",
            get(handlers::orders::get_order_deliveries)
                .post(handlers::deliveries::create_delivery),
        )
        .route("/orders/:id/totals", get(handlers::orders::get_order_totals));

    // Deliveries and their lifecycle actions
    let deliveries = Router::new()
        .route("/deliveries", get(handlers::deliveries::list_deliveries))
        .route(
            "/deliveries/:id",
            get(handlers::deliveries::get_delivery)
                .put(handlers::deliveries::update_delivery)
                .delete(handlers::deliveries::delete_delivery),
        )
        .route(
            "/deliveries/:id/status",
            axum::routing::put(handlers::deliveries::update_delivery_status),
        )
        .route(
            "/deliveries/:id/mark-delivered",
            axum::routing::put(handlers::deliveries::mark_delivered),
        )
        .route(
            "/deliveries/:id/mark-out-for-delivery",
            axum::routing::put(handlers::deliveries::mark_out_for_delivery),
        );

    // Back-office catalogs
    let customers = Router::new()
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        );

    let equipment = Router::new()
        .route(
            "/equipment",
            get(handlers::equipment::list_equipment).post(handlers::equipment::create_equipment),
        )
        .route(
            "/equipment/:id",
            get(handlers::equipment::get_equipment)
                .put(handlers::equipment::update_equipment)
                .delete(handlers::equipment::delete_equipment),
        );

    let item_designs = Router::new()
        .route(
            "/item-designs",
            get(handlers::item_designs::list_item_designs)
                .post(handlers::item_designs::create_item_design),
        )
        .route(
            "/item-designs/:id",
            get(handlers::item_designs::get_item_design)
                .put(handlers::item_designs::update_item_design)
                .delete(handlers::item_designs::delete_item_design),
        );

    // Reviews and the audit trail
    let reviews = Router::new()
        .route(
            "/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::submit_review),
        )
        .route(
            "/reviews/:id",
            get(handlers::reviews::get_review).delete(handlers::reviews::delete_review),
        )
        .route(
            "/reviews/:id/status",
            axum::routing::put(handlers::reviews::update_review_status),
        );

    let activity_logs = Router::new().route(
        "/activity-logs",
        get(handlers::activity_logs::list_activity_logs),
    );

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(orders)
        .merge(deliveries)
        .merge(customers)
        .merge(equipment)
        .merge(item_designs)
        .merge(reviews)
        .merge(activity_logs)
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "readymix-api",
        "environment": state.config.environment,
        "delivery_lifecycle": state.config.delivery_lifecycle,
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }
}
