//! End-to-end tests for the property directory API

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use wealthmap_server::{create_router, AppState};

fn app() -> Router {
    create_router(Arc::new(AppState::in_memory().unwrap()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(value.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn property_payload(name: &str, income: f64, lng: f64, lat: f64) -> Value {
    json!({
        "name": name,
        "address": {
            "street": "12 Ocean Drive",
            "city": "San Francisco",
            "state": "CA",
            "zipCode": "94110"
        },
        "location": { "longitude": lng, "latitude": lat },
        "ownerDetails": {
            "ownerName": "Ada Byron",
            "age": 41,
            "sex": "Female",
            "email": "ada@example.com",
            "mobileNumber": "555-0100",
            "occupation": "Engineer",
            "monthlyIncome": income,
            "totalWealth": 250000.0
        }
    })
}

async fn seed_property(app: &Router, name: &str, income: f64, lng: f64, lat: f64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/properties",
        Some(property_payload(name, income, lng, lat)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_empty_listing() {
    let app = app();
    let (status, body) = send(&app, "GET", "/properties", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["properties"], json!([]));
    assert_eq!(body["total"], 0);
    assert_eq!(body["totalPages"], 0);
    assert_eq!(body["currentPage"], 1);
}

#[tokio::test]
async fn test_created_property_carries_derived_fields() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/properties",
        Some(property_payload("Sunset Estates", 7500.0, -122.42, 37.77)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["formattedAddress"], "12 Ocean Drive, San Francisco, CA 94110");
    assert_eq!(body["incomeTier"], "Medium");
    assert_eq!(body["ownerDetails"]["sex"], "Female");
    // placeholder applied when no image supplied
    assert!(body["propertyImage"].as_str().unwrap().contains("placeholder"));
}

#[tokio::test]
async fn test_get_property_by_id() {
    let app = app();
    let id = seed_property(&app, "Sunset Estates", 21000.0, -122.42, 37.77).await;

    let (status, body) = send(&app, "GET", &format!("/properties/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Sunset Estates");
    assert_eq!(body["incomeTier"], "Very High");

    // unknown id -> 404
    let (status, _) = send(
        &app,
        "GET",
        "/properties/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // malformed id -> 400
    let (status, body) = send(&app, "GET", "/properties/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid"));
}

#[tokio::test]
async fn test_income_filter_and_pagination() {
    let app = app();
    for i in 0..5 {
        seed_property(&app, &format!("P{i}"), 4000.0 + 2000.0 * i as f64, 0.0, 0.0).await;
    }

    // incomes: 4000, 6000, 8000, 10000, 12000 -> [5000, 10000] keeps three
    let (status, body) = send(
        &app,
        "GET",
        "/properties?minIncome=5000&maxIncome=10000&pageSize=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["properties"].as_array().unwrap().len(), 2);

    // a page past the end is empty, not an error
    let (status, body) = send(
        &app,
        "GET",
        "/properties?minIncome=5000&maxIncome=10000&pageSize=2&page=9",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["properties"], json!([]));

    // an absurdly large page is still just an empty page
    let (status, body) = send(
        &app,
        "GET",
        "/properties?page=4294967295&pageSize=4294967295",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["properties"], json!([]));

    // non-positive page is rejected
    let (status, _) = send(&app, "GET", "/properties?page=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // malformed income bound is ignored, not rejected
    let (status, body) = send(&app, "GET", "/properties?minIncome=expensive", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
}

#[tokio::test]
async fn test_near_query_filters_and_orders_by_distance() {
    let app = app();
    seed_property(&app, "LA Loft", 1.0, -118.2437, 34.0522).await;
    seed_property(&app, "Oakland Flat", 1.0, -122.2712, 37.8044).await;
    seed_property(&app, "Downtown SF", 1.0, -122.4194, 37.7749).await;

    let (status, body) = send(
        &app,
        "GET",
        "/properties?near=-122.42,37.77,50000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Downtown SF", "Oakland Flat"]);

    // malformed near is ignored, returning the full set
    let (status, body) = send(&app, "GET", "/properties?near=oops", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_bookmark_lifecycle() {
    let app = app();
    let property_id = seed_property(&app, "Sunset Estates", 7500.0, -122.42, 37.77).await;

    // create
    let (status, body) = send(
        &app,
        "POST",
        "/bookmarks",
        Some(json!({ "propertyId": property_id, "userEmail": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userEmail"], "a@x.com");
    assert_eq!(body["property"]["name"], "Sunset Estates");
    let bookmark_id = body["id"].as_str().unwrap().to_string();

    // duplicate -> 400 conflict
    let (status, body) = send(
        &app,
        "POST",
        "/bookmarks",
        Some(json!({ "propertyId": property_id, "userEmail": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Property already bookmarked");

    // list -> exactly one, expanded
    let (status, body) = send(&app, "GET", "/bookmarks?email=a@x.com", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["property"]["formattedAddress"], "12 Ocean Drive, San Francisco, CA 94110");

    // delete
    let (status, _) = send(&app, "DELETE", &format!("/bookmarks/{bookmark_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/bookmarks/{bookmark_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bookmark_requires_email_and_existing_property() {
    let app = app();

    // listing without email -> 400
    let (status, body) = send(&app, "GET", "/bookmarks", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is required");

    // create with missing fields -> 400
    let (status, _) = send(
        &app,
        "POST",
        "/bookmarks",
        Some(json!({ "userEmail": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // create against a property that does not exist -> 404
    let (status, _) = send(
        &app,
        "POST",
        "/bookmarks",
        Some(json!({
            "propertyId": "00000000-0000-0000-0000-000000000000",
            "userEmail": "a@x.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // and creates no record
    let (_, body) = send(&app, "GET", "/bookmarks?email=a@x.com", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_property_delete_cascades_bookmarks() {
    let app = app();
    let property_id = seed_property(&app, "Sunset Estates", 7500.0, -122.42, 37.77).await;

    let (status, _) = send(
        &app,
        "POST",
        "/bookmarks",
        Some(json!({ "propertyId": property_id, "userEmail": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, "DELETE", &format!("/properties/{property_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    // no orphaned bookmark is exposed to listers
    let (status, body) = send(&app, "GET", "/bookmarks?email=a@x.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
