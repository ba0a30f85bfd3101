mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{body_json, TestApp};

async fn seed_customer(app: &TestApp) -> i64 {
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
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn review_form() -> serde_json::Value {
    json!({
        "q1": true,
        "q2": true,
        "q3": false,
        "q4": true,
        "q5": 4,
        "q6": 5,
        "q7": "Trips arrived within the scheduled windows.",
        "q8": "Batch tickets matched the delivered volumes.",
        "q9": "Drivers coordinated site access well.",
        "q10": "Would order again for the next phase."
    })
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn a_review_walks_through_moderation() {
    let app = TestApp::new().await;
    let customer_id = seed_customer(&app).await;

    // Staff cannot submit on a client's behalf.
    let response = app
        .as_admin(Method::POST, "/api/v1/reviews", Some(review_form()))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .as_client(customer_id, Method::POST, "/api/v1/reviews", Some(review_form()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    let review_id = payload["data"]["id"].as_i64().unwrap();
    assert_eq!(payload["data"]["status"].as_str().unwrap(), "pending");

    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/reviews/{review_id}/status"),
            Some(json!({ "status": "approved" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["data"]["status"].as_str().unwrap(), "approved");

    // The owning client sees it; a stranger does not.
    let response = app
        .as_client(customer_id, Method::GET, &format!("/api/v1/reviews/{review_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_client(
            customer_id + 1000,
            Method::GET,
            &format!("/api/v1/reviews/{review_id}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn ratings_outside_the_scale_are_rejected() {
    let app = TestApp::new().await;
    let customer_id = seed_customer(&app).await;

    let mut form = review_form();
    form["q5"] = json!(9);

    let response = app
        .as_client(customer_id, Method::POST, "/api/v1/reviews", Some(form))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires the SQLite integration environment"]
async fn mutations_land_in_the_activity_log() {
    let app = TestApp::new().await;
    let customer_id = seed_customer(&app).await;
    let _ = customer_id;

    // The worker drains the channel asynchronously.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let response = app
        .request_as(Method::GET, "/api/v1/activity-logs", "superadmin", Some(1), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;

    let items = payload["data"]["items"].as_array().unwrap();
    assert!(items
        .iter()
        .any(|entry| entry["module"] == "customers" && entry["action"] == "created"));

    // Admins are kept out of the audit trail.
    let response = app
        .as_admin(Method::GET, "/api/v1/activity-logs", None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
