use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};

use appointment_cell::router::create_appointment_router;
use appointment_cell::services::{
    AppointmentBookingService, AppointmentLifecycleService, InMemoryAppointmentStore,
};
use catalog_cell::services::CatalogService;
use schedule_cell::services::{InMemoryScheduleStore, ScheduleService};
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils};

fn create_test_app(config: &TestConfig) -> (Router, Arc<ScheduleService>) {
    let schedule = Arc::new(ScheduleService::new(Arc::new(InMemoryScheduleStore::new())));
    let booking = Arc::new(AppointmentBookingService::new(
        Arc::new(InMemoryAppointmentStore::new()),
        schedule.clone(),
        Arc::new(CatalogService::new()),
        AppointmentLifecycleService::new(),
    ));
    (create_appointment_router(config.to_arc(), booking), schedule)
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn booking(date: &str, time: &str, email: &str) -> Value {
    json!({
        "client_name": "Isabella Gómez",
        "service": "Manicure Semipermanente",
        "date": date,
        "time": time,
        "phone": "3157778899",
        "email": email
    })
}

async fn book(app: &Router, date: &str, time: &str, email: &str) -> Value {
    let response = app.clone()
        .oneshot(json_request("POST", "/appointments", None, booking(date, time, email)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_book_appointment_ignores_client_status() {
    let config = TestConfig::default();
    let (app, _) = create_test_app(&config);

    let mut body = booking("2099-06-01", "10:00 AM", "isabella@example.com");
    body["status"] = json!("approved");

    let response = app.oneshot(json_request("POST", "/appointments", None, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json_response = body_json(response).await;
    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["appointment"]["status"], "pending");
    assert_eq!(json_response["appointment"]["time"], "10:00:00");
}

#[tokio::test]
async fn test_book_missing_fields() {
    let config = TestConfig::default();
    let (app, _) = create_test_app(&config);

    let response = app
        .oneshot(json_request("POST", "/appointments", None, json!({ "client_name": "Ana" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json_response = body_json(response).await;
    assert!(json_response["error"].as_str().unwrap().starts_with("Datos incompletos"));
}

#[tokio::test]
async fn test_double_booking_conflicts() {
    let config = TestConfig::default();
    let (app, _) = create_test_app(&config);

    book(&app, "2099-06-01", "10:00 AM", "isabella@example.com").await;

    let response = app
        .oneshot(json_request("POST", "/appointments", None, booking("2099-06-01", "10:00:00", "otra@example.com")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_blocked_date_refuses_booking_and_shows_in_availability() {
    let config = TestConfig::default();
    let (app, schedule) = create_test_app(&config);
    schedule.block_date("2099-06-02").await.unwrap();

    let response = app.clone()
        .oneshot(json_request("POST", "/appointments", None, booking("2099-06-02", "9:00 AM", "a@example.com")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.oneshot(get("/availability?date=2099-06-02", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let day = body_json(response).await;
    assert_eq!(day["blocked"], true);
    assert!(day["slots"].as_array().unwrap().iter().all(|slot| slot["bookable"] == false));
}

#[tokio::test]
async fn test_list_is_ordered_and_filterable() {
    let config = TestConfig::default();
    let (app, _) = create_test_app(&config);

    book(&app, "2099-06-03", "9:00 AM", "b@example.com").await;
    book(&app, "2099-06-01", "4:00 PM", "a@example.com").await;
    book(&app, "2099-06-01", "11:00 AM", "a@example.com").await;

    let response = app.clone().oneshot(get("/appointments", None)).await.unwrap();
    let all = body_json(response).await;
    let slots: Vec<(String, String)> = all.as_array().unwrap().iter()
        .map(|a| (a["date"].as_str().unwrap().to_string(), a["time"].as_str().unwrap().to_string()))
        .collect();
    assert_eq!(slots, vec![
        ("2099-06-01".to_string(), "11:00:00".to_string()),
        ("2099-06-01".to_string(), "16:00:00".to_string()),
        ("2099-06-03".to_string(), "09:00:00".to_string()),
    ]);

    let response = app.oneshot(get("/appointments?email=a@example.com", None)).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_rejects_then_cannot_approve() {
    let config = TestConfig::default();
    let (app, _) = create_test_app(&config);
    let admin = JwtTestUtils::bearer(&TestUser::admin("admin@nails.test"), &config);

    let created = book(&app, "2099-06-01", "2:00 PM", "isabella@example.com").await;
    let uri = format!("/appointments/{}", created["appointment"]["id"].as_str().unwrap());

    let response = app.clone()
        .oneshot(json_request("PUT", &uri, Some(&admin), json!({ "status": "rejected", "reason": "Agenda llena" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json_response = body_json(response).await;
    assert_eq!(json_response["appointment"]["status"], "rejected");
    assert_eq!(json_response["appointment"]["rejectionReason"], "Agenda llena");

    let response = app
        .oneshot(json_request("PUT", &uri, Some(&admin), json!({ "status": "approved" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_status_update_requires_token_and_right_role() {
    let config = TestConfig::default();
    let (app, _) = create_test_app(&config);
    let created = book(&app, "2099-06-01", "5:00 PM", "isabella@example.com").await;
    let uri = format!("/appointments/{}", created["appointment"]["id"].as_str().unwrap());

    let response = app.clone()
        .oneshot(json_request("PUT", &uri, None, json!({ "status": "approved" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let owner = JwtTestUtils::bearer(&TestUser::client("isabella@example.com"), &config);
    let response = app.clone()
        .oneshot(json_request("PUT", &uri, Some(&owner), json!({ "status": "approved" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let stranger = JwtTestUtils::bearer(&TestUser::client("otra@example.com"), &config);
    let response = app.clone()
        .oneshot(json_request("PUT", &uri, Some(&stranger), json!({ "status": "cancelled", "reason": "x" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(json_request("PUT", &uri, Some(&owner), json!({ "status": "cancelled", "reason": "Viaje" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["appointment"]["cancellationReason"], "Viaje");
}

#[tokio::test]
async fn test_stats_are_admin_only() {
    let config = TestConfig::default();
    let (app, _) = create_test_app(&config);
    book(&app, "2099-06-01", "9:00 AM", "a@example.com").await;

    let client = JwtTestUtils::bearer(&TestUser::client("a@example.com"), &config);
    let response = app.clone().oneshot(get("/appointments/stats", Some(&client))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = JwtTestUtils::bearer(&TestUser::admin("admin@nails.test"), &config);
    let response = app.oneshot(get("/appointments/stats", Some(&admin))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["pending"], 1);
}

#[tokio::test]
async fn test_notifications_feed_per_role() {
    let config = TestConfig::default();
    let (app, _) = create_test_app(&config);
    book(&app, "2099-06-01", "9:00 AM", "a@example.com").await;
    book(&app, "2099-06-01", "10:00 AM", "b@example.com").await;

    let client = JwtTestUtils::bearer(&TestUser::client("a@example.com"), &config);
    let response = app.clone().oneshot(get("/notifications", Some(&client))).await.unwrap();
    let own = body_json(response).await;
    assert_eq!(own.as_array().unwrap().len(), 1);
    assert_eq!(own[0]["type"], "pending");
    assert_eq!(own[0]["title"], "Cita Solicitada");

    let admin = JwtTestUtils::bearer(&TestUser::admin("admin@nails.test"), &config);
    let response = app.oneshot(get("/notifications", Some(&admin))).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_unknown_appointment() {
    let config = TestConfig::default();
    let (app, _) = create_test_app(&config);

    let response = app
        .oneshot(get("/appointments/6f1c2c1e-8d4e-4b4a-9a65-3f5a3f0d9c11", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
