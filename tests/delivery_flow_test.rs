mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{body_json, TestApp};

async fn seed_order(app: &TestApp, total_delivery: &str) -> (i64, i64) {
    let response = app
        .as_admin(
            Method::POST,
            "/api/v1/customers",
            Some(json!({
                "customer_name": "Hillside Builders",
                "contact_person": "R. Santos",
                "contact_number": "0917-555-0101",
                "address": "14 Quarry Road",
                "email": "projects@hillside.example"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let customer_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .as_admin(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "so_no": "SO-2026-0001",
                "customer_id": customer_id,
                "total_delivery": total_delivery
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let order_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    (customer_id, order_id)
}

async fn add_delivery(app: &TestApp, order_id: i64, mp_no: &str, volume: &str) -> i64 {
    let response = app
        .as_admin(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/deliveries"),
            Some(json!({ "mp_no": mp_no, "volume": volume })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn overall_volumes(payload: &Value) -> Vec<String> {
    payload["data"]["deliveries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["overall_volume"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn running_totals_follow_trip_order() {
    let app = TestApp::new().await;
    let (_customer_id, order_id) = seed_order(&app, "25.00").await;

    add_delivery(&app, order_id, "MP-0001", "5.00").await;
    add_delivery(&app, order_id, "MP-0002", "3.25").await;
    add_delivery(&app, order_id, "MP-0003", "7.00").await;

    let response = app
        .as_admin(
            Method::GET,
            &format!("/api/v1/orders/{order_id}/deliveries"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;

    assert_eq!(overall_volumes(&payload), vec!["5.00", "8.25", "15.25"]);

    let totals = &payload["data"]["totals"];
    assert_eq!(totals["delivered"].as_str().unwrap(), "15.25");
    assert_eq!(totals["remaining"].as_str().unwrap(), "9.75");
    assert_eq!(totals["over_delivered"].as_bool().unwrap(), false);

    let trip_nos: Vec<u64> = payload["data"]["deliveries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["trip_no"].as_u64().unwrap())
        .collect();
    assert_eq!(trip_nos, vec![1, 2, 3]);
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn deleting_a_mid_sequence_trip_recomputes_later_totals() {
    let app = TestApp::new().await;
    let (_customer_id, order_id) = seed_order(&app, "25.00").await;

    add_delivery(&app, order_id, "MP-0001", "5.00").await;
    let middle = add_delivery(&app, order_id, "MP-0002", "3.25").await;
    add_delivery(&app, order_id, "MP-0003", "7.00").await;

    let response = app
        .as_admin(Method::DELETE, &format!("/api/v1/deliveries/{middle}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_admin(
            Method::GET,
            &format!("/api/v1/orders/{order_id}/deliveries"),
            None,
        )
        .await;
    let payload = body_json(response).await;
    assert_eq!(overall_volumes(&payload), vec!["5.00", "12.00"]);
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn staff_walk_the_lifecycle_forward_only() {
    let app = TestApp::new().await;
    let (_customer_id, order_id) = seed_order(&app, "25.00").await;
    let delivery_id = add_delivery(&app, order_id, "MP-0001", "9.50").await;

    // Skipping straight to Delivered is not a lifecycle edge.
    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/deliveries/{delivery_id}/status"),
            Some(json!({ "status": "Delivered" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // One step forward is.
    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/deliveries/{delivery_id}/status"),
            Some(json!({ "status": "Out for Delivery" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(
        payload["data"]["delivery_status"].as_str().unwrap(),
        "Out for Delivery"
    );
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn client_confirms_receipt_and_may_take_it_back() {
    let app = TestApp::new().await;
    let (customer_id, order_id) = seed_order(&app, "25.00").await;
    let delivery_id = add_delivery(&app, order_id, "MP-0001", "9.50").await;

    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/deliveries/{delivery_id}/status"),
            Some(json!({ "status": "Out for Delivery" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_client(
            customer_id,
            Method::PUT,
            &format!("/api/v1/deliveries/{delivery_id}/mark-delivered"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_client(
            customer_id,
            Method::PUT,
            &format!("/api/v1/deliveries/{delivery_id}/mark-out-for-delivery"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Jumping back to Batching is not the sanctioned step.
    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/deliveries/{delivery_id}/status"),
            Some(json!({ "status": "Batching on Process" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn a_foreign_client_sees_nothing_and_moves_nothing() {
    let app = TestApp::new().await;
    let (customer_id, order_id) = seed_order(&app, "25.00").await;
    let delivery_id = add_delivery(&app, order_id, "MP-0001", "9.50").await;
    let stranger = customer_id + 1000;

    let response = app
        .as_client(
            stranger,
            Method::GET,
            &format!("/api/v1/orders/{order_id}/deliveries"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .as_client(
            stranger,
            Method::PUT,
            &format!("/api/v1/deliveries/{delivery_id}/mark-delivered"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn a_stale_version_is_rejected_with_conflict() {
    let app = TestApp::new().await;
    let (_customer_id, order_id) = seed_order(&app, "25.00").await;
    let delivery_id = add_delivery(&app, order_id, "MP-0001", "9.50").await;

    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/deliveries/{delivery_id}/status"),
            Some(json!({ "status": "Out for Delivery", "version": 99 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The record did not move.
    let response = app
        .as_admin(Method::GET, &format!("/api/v1/deliveries/{delivery_id}"), None)
        .await;
    let payload = body_json(response).await;
    assert_eq!(
        payload["data"]["delivery_status"].as_str().unwrap(),
        "Batching on Process"
    );
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn over_delivery_is_surfaced_not_hidden() {
    let app = TestApp::new().await;
    let (_customer_id, order_id) = seed_order(&app, "10.00").await;

    add_delivery(&app, order_id, "MP-0001", "30.00").await;

    let response = app
        .as_admin(Method::GET, &format!("/api/v1/orders/{order_id}/totals"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;

    let totals = &payload["data"];
    assert_eq!(totals["remaining"].as_str().unwrap(), "0");
    assert_eq!(totals["over_delivered"].as_bool().unwrap(), true);
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn editing_a_trip_volume_shifts_later_running_totals() {
    let app = TestApp::new().await;
    let (_customer_id, order_id) = seed_order(&app, "25.00").await;

    let first = add_delivery(&app, order_id, "MP-0001", "5.00").await;
    add_delivery(&app, order_id, "MP-0002", "3.25").await;

    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/deliveries/{first}"),
            Some(json!({ "mp_no": "MP-0001", "volume": "6.00" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_admin(
            Method::GET,
            &format!("/api/v1/orders/{order_id}/deliveries"),
            None,
        )
        .await;
    let payload = body_json(response).await;
    assert_eq!(overall_volumes(&payload), vec!["6.00", "9.25"]);
}
