use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};

use catalog_cell::router::create_catalog_router;
use catalog_cell::services::CatalogService;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils};

fn create_test_app(config: &TestConfig) -> Router {
    create_catalog_router(config.to_arc(), Arc::new(CatalogService::new()))
}

fn put_price(uri: &str, auth: Option<&str>, price: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(json!({ "price": price }).to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_list_services() {
    let config = TestConfig::default();
    let app = create_test_app(&config);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let services = body_json(response).await;
    assert_eq!(services.as_array().unwrap().len(), 6);
    assert_eq!(services[0], json!({ "id": 1, "name": "Manicure Semipermanente", "price": "$60.000" }));
}

#[tokio::test]
async fn test_admin_updates_price() {
    let config = TestConfig::default();
    let app = create_test_app(&config);
    let admin = JwtTestUtils::bearer(&TestUser::admin("admin@nails.test"), &config);

    let response = app.clone().oneshot(put_price("/2", Some(&admin), "$85.000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json_response = body_json(response).await;
    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["service"]["price"], "$85.000");

    let response = app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(body_json(response).await[1]["price"], "$85.000");
}

#[tokio::test]
async fn test_price_update_rules() {
    let config = TestConfig::default();
    let app = create_test_app(&config);
    let admin = JwtTestUtils::bearer(&TestUser::admin("admin@nails.test"), &config);
    let client = JwtTestUtils::bearer(&TestUser::client("ana@example.com"), &config);

    let response = app.clone().oneshot(put_price("/2", None, "$1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.clone().oneshot(put_price("/2", Some(&client), "$1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.clone().oneshot(put_price("/99", Some(&admin), "$1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(put_price("/2", Some(&admin), "  ")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
