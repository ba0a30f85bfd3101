use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Readymix API",
        version = "1.0.0",
        description = r#"
# Readymix Delivery Back-Office API

Order and delivery tracking for a ready-mix concrete supplier.

Every delivery listing computed for an order carries `trip_no` and
`overall_volume`: the running cumulative volume in trip order, recomputed
from current rows on every read. Delivery statuses walk a fixed lifecycle;
which slice of it is active (`full` or `condensed`) is a deployment
constant.

## Actor headers

The upstream gateway authenticates callers and forwards identity as:

```
x-actor-role: superadmin | admin | prd | client
x-actor-id: <numeric id, required for clients>
x-actor-name: <display name, optional>
```

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20, max 100).
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "orders", description = "Sales orders and their delivery ledger"),
        (name = "deliveries", description = "Delivery trips and lifecycle transitions")
    ),
    paths(
        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::get_order_deliveries,
        crate::handlers::orders::get_order_totals,

        // Deliveries
        crate::handlers::deliveries::list_deliveries,
        crate::handlers::deliveries::get_delivery,
        crate::handlers::deliveries::create_delivery,
        crate::handlers::deliveries::update_delivery,
        crate::handlers::deliveries::update_delivery_status,
        crate::handlers::deliveries::mark_delivered,
        crate::handlers::deliveries::mark_out_for_delivery,
        crate::handlers::deliveries::delete_delivery,

        // Catalog, review and audit endpoints are intentionally omitted
        // from the OpenAPI paths for now
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,

            // Order types
            crate::handlers::orders::OrderSummary,
            crate::handlers::orders::OrderRequest,
            crate::handlers::orders::TotalsSummary,
            crate::handlers::orders::OrderDeliveriesResponse,

            // Delivery types
            crate::handlers::deliveries::DeliverySummary,
            crate::handlers::deliveries::LedgerRow,
            crate::handlers::deliveries::DeliveryRequest,
            crate::handlers::deliveries::UpdateStatusRequest,
            crate::handlers::deliveries::MarkRequest,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
