mod common;

use common::{TestSetup, TEST_API_KEY};
use http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_create_roast_derives_pascal_case_id() {
    let context = TestSetup::new();

    let response = context
        .send_admin_request(
            "/roast",
            Some(TEST_API_KEY),
            json!({
                "name": "  Sunday Carvery ",
                "imageURL": "https://example.com/carvery.jpg",
                "priceRange": 3,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = TestSetup::parse_response_body(response).await;
    assert_eq!(body["roastID"], "SundayCarvery");
    assert_eq!(body["name"], "Sunday Carvery");
    assert_eq!(body["imageURL"], "https://example.com/carvery.jpg");
    assert_eq!(body["priceRange"], 3);
    assert_eq!(body["reviewCount"], 0);
    assert_eq!(body["overallRating"], 0.0);
    assert!(body.get("location").is_none());
}

#[tokio::test]
async fn test_get_roast_by_id() {
    let context = TestSetup::new();
    context.create_roast("Sunday Carvery").await;

    let response = context
        .send_get_request("/roast/SundayCarvery", Some("user-1"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = TestSetup::parse_response_body(response).await;
    assert_eq!(body["roastID"], "SundayCarvery");
    assert_eq!(body["location"], "London");
}

#[tokio::test]
async fn test_get_missing_roast_returns_404() {
    let context = TestSetup::new();

    let response = context
        .send_get_request("/roast/Nonexistent", Some("user-1"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = TestSetup::parse_response_body(response).await;
    assert_eq!(body["code"], "roast_not_found");
}

#[tokio::test]
async fn test_get_roast_requires_token() {
    let context = TestSetup::new();
    context.create_roast("Sunday Carvery").await;

    let response = context.send_get_request("/roast/SundayCarvery", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_roasts() {
    let context = TestSetup::new();

    let response = context.send_get_request("/roasts", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(TestSetup::parse_response_body(response).await, json!([]));

    context.create_roast("Sunday Carvery").await;
    context.create_roast("Toby Carvery").await;

    let response = context.send_get_request("/roasts", None).await;
    let body = TestSetup::parse_response_body(response).await;
    let mut ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|roast| roast["roastID"].as_str().unwrap().to_string())
        .collect();
    ids.sort();

    assert_eq!(ids, vec!["SundayCarvery", "TobyCarvery"]);
}

#[tokio::test]
async fn test_create_roast_twice_overwrites() {
    let context = TestSetup::new();
    context.create_roast("Sunday Carvery").await;
    context.create_roast("sunday carvery").await;

    let response = context.send_get_request("/roasts", None).await;
    let body = TestSetup::parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_roast_with_unusable_name() {
    let context = TestSetup::new();

    for name in ["", "   ", "Roast#1"] {
        let response = context
            .send_admin_request(
                "/roast",
                Some(TEST_API_KEY),
                json!({"name": name, "imageURL": "", "priceRange": 1}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{name:?}");
    }

    assert!(context.store.is_empty().await);
}

#[tokio::test]
async fn test_create_roast_with_malformed_body() {
    let context = TestSetup::new();

    let response = context
        .send_admin_request("/roast", Some(TEST_API_KEY), json!({"name": 42}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = TestSetup::parse_response_body(response).await;
    assert_eq!(body["code"], "binding_error");
}

#[tokio::test]
async fn test_delete_roast() {
    let context = TestSetup::new();
    context.create_roast("Sunday Carvery").await;

    let response = context
        .send_admin_request(
            "/deleteRoast",
            Some(TEST_API_KEY),
            json!({"name": "Sunday Carvery"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = TestSetup::parse_response_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("Sunday Carvery"));

    let response = context
        .send_get_request("/roast/SundayCarvery", Some("user-1"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_roast_returns_404() {
    let context = TestSetup::new();

    let response = context
        .send_admin_request(
            "/deleteRoast",
            Some(TEST_API_KEY),
            json!({"name": "Nowhere"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_roast_keeps_its_reviews() {
    let context = TestSetup::new();
    let roast_id = context.create_roast("Sunday Carvery").await;
    let response = context.post_review("user-1", &roast_id, 8).await;
    assert_eq!(response.status(), StatusCode::OK);

    context
        .send_admin_request(
            "/deleteRoast",
            Some(TEST_API_KEY),
            json!({"name": "Sunday Carvery"}),
        )
        .await;

    let response = context
        .send_get_request("/reviews/SundayCarvery", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
