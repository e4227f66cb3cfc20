mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, Utc};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_station(app: &TestApp, name: &str, sort_order: i32) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/stations")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"name": name, "sort_order": sort_order}).to_string())).unwrap()
    ).await.unwrap();
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn create_customer(app: &TestApp, name: &str, pet_name: &str) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/customers")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"name": name, "pet_name": pet_name}).to_string())).unwrap()
    ).await.unwrap();
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

fn slot_on(days_ahead: i64, hour: u32, duration_min: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = (Utc::now() + Duration::days(days_ahead)).date_naive();
    let start = day.and_hms_opt(hour, 0, 0).unwrap().and_utc();
    (start, start + Duration::minutes(duration_min))
}

async fn book(app: &TestApp, station_id: &str, customer_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/schedule/meetings")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "service_type": "BASIC_WASH",
                "start_at": start.to_rfc3339(),
                "end_at": end.to_rfc3339(),
                "station_id": station_id,
                "invites": [customer_id]
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await["appointment_ids"][0].as_str().unwrap().to_string()
}

async fn post(app: &TestApp, uri: String) -> (StatusCode, Value) {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
    ).await.unwrap();
    let status = res.status();
    (status, parse_body(res).await)
}

#[tokio::test]
async fn test_cancel_is_idempotent_and_stops_notifications() {
    let app = TestApp::new().await;
    let station_id = create_station(&app, "Table 1", 1).await;
    let customer_id = create_customer(&app, "Anna", "Rex").await;
    let (start, end) = slot_on(10, 10, 30);
    let appointment_id = book(&app, &station_id, &customer_id, start, end).await;

    let (status, body) = post(&app, format!("/api/v1/appointments/{}/cancel", appointment_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(body["version"], 2);

    // Cancelling again changes nothing.
    let (status, body) = post(&app, format!("/api/v1/appointments/{}/cancel", appointment_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(body["version"], 2);

    // Both queued messages for it are dead. The confirmation may already
    // have slipped through a worker tick on a slow run, but the reminder is
    // days away and must be cancelled.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/jobs").body(Body::empty()).unwrap()
    ).await.unwrap();
    let jobs = parse_body(res).await;
    let for_appointment: Vec<&Value> = jobs.as_array().unwrap().iter()
        .filter(|j| j["payload"]["appointment_id"].as_str().unwrap() == appointment_id)
        .collect();
    assert_eq!(for_appointment.len(), 2);
    for job in &for_appointment {
        assert!(job["status"] == "CANCELLED" || job["status"] == "COMPLETED");
    }
    let reminder = for_appointment.iter().find(|j| j["job_type"] == "REMINDER").unwrap();
    assert_eq!(reminder["status"], "CANCELLED");

    // The record itself is kept.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/appointments/{}", appointment_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // And the window is open for the next booking.
    let other = create_customer(&app, "Ben", "Luna").await;
    book(&app, &station_id, &other, start, end).await;
}

#[tokio::test]
async fn test_complete_lifecycle_transitions() {
    let app = TestApp::new().await;
    let station_id = create_station(&app, "Table 1", 1).await;
    let customer_id = create_customer(&app, "Cara", "Milo").await;
    let (start, end) = slot_on(10, 10, 30);
    let appointment_id = book(&app, &station_id, &customer_id, start, end).await;

    let (status, body) = post(&app, format!("/api/v1/appointments/{}/complete", appointment_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");

    let (status, body) = post(&app, format!("/api/v1/appointments/{}/complete", appointment_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");

    // A completed visit cannot be cancelled afterwards.
    let (status, _) = post(&app, format!("/api/v1/appointments/{}/cancel", appointment_id)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // And a cancelled one cannot be completed.
    let (s2, e2) = slot_on(10, 14, 30);
    let second = book(&app, &station_id, &customer_id, s2, e2).await;
    post(&app, format!("/api/v1/appointments/{}/cancel", second)).await;
    let (status, _) = post(&app, format!("/api/v1/appointments/{}/complete", second)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/api/v1/appointments/ghost/complete".to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_filters() {
    let app = TestApp::new().await;
    let station_a = create_station(&app, "Table A", 1).await;
    let station_b = create_station(&app, "Table B", 2).await;
    let c1 = create_customer(&app, "Dana", "Nori").await;
    let c2 = create_customer(&app, "Eva", "Olli").await;

    let (s1, e1) = slot_on(10, 10, 30);
    let a1 = book(&app, &station_a, &c1, s1, e1).await;
    let (s2, e2) = slot_on(10, 11, 30);
    let a2 = book(&app, &station_b, &c2, s2, e2).await;
    let (s3, e3) = slot_on(11, 10, 30);
    let a3 = book(&app, &station_a, &c1, s3, e3).await;

    let day = s1.date_naive().to_string();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/appointments?date={}", day))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed = parse_body(res).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"].as_str().unwrap(), a1);
    assert_eq!(listed[1]["id"].as_str().unwrap(), a2);

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/appointments?date={}&station_id={}", day, station_a))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let listed = parse_body(res).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"].as_str().unwrap(), a1);

    // Customer history, newest first.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/appointments?customer_id={}", c1))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let listed = parse_body(res).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"].as_str().unwrap(), a3);
    assert_eq!(listed[1]["id"].as_str().unwrap(), a1);

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/appointments")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_day_schedule_groups_by_station() {
    let app = TestApp::new().await;
    let station_a = create_station(&app, "Table A", 1).await;
    let station_b = create_station(&app, "Table B", 2).await;
    let customer_id = create_customer(&app, "Finn", "Pip").await;

    let (s1, e1) = slot_on(10, 10, 30);
    let a1 = book(&app, &station_a, &customer_id, s1, e1).await;
    let (s2, e2) = slot_on(10, 11, 30);
    let a2 = book(&app, &station_b, &customer_id, s2, e2).await;

    let day = s1.date_naive().to_string();
    let res = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/stations/{}/constraints", station_a))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "date": day, "start_time": "12:00", "end_time": "14:00", "kind": "FULL_BLOCK"
            }).to_string())).unwrap()
    ).await.unwrap();
    let constraint_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/schedule/day?date={}", day))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["date"].as_str().unwrap(), day);

    let stations = body["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 2);
    // Display order follows station sort_order.
    assert_eq!(stations[0]["station"]["id"].as_str().unwrap(), station_a);
    assert_eq!(stations[1]["station"]["id"].as_str().unwrap(), station_b);

    assert_eq!(stations[0]["appointments"].as_array().unwrap().len(), 1);
    assert_eq!(stations[0]["appointments"][0]["id"].as_str().unwrap(), a1);
    assert_eq!(stations[0]["constraints"].as_array().unwrap().len(), 1);
    assert_eq!(stations[0]["constraints"][0]["id"].as_str().unwrap(), constraint_id);

    assert_eq!(stations[1]["appointments"][0]["id"].as_str().unwrap(), a2);
    assert!(stations[1]["constraints"].as_array().unwrap().is_empty());

    // Another day is empty but still lists every station.
    let other_day = (Utc::now() + Duration::days(11)).date_naive();
    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/schedule/day?date={}", other_day))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let body = parse_body(res).await;
    let stations = body["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 2);
    assert!(stations[0]["appointments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_enqueues_confirmation_and_reminder() {
    let app = TestApp::new().await;
    let station_id = create_station(&app, "Table 1", 1).await;
    let customer_id = create_customer(&app, "Gina", "Quark").await;
    let (start, end) = slot_on(10, 10, 30);
    let appointment_id = book(&app, &station_id, &customer_id, start, end).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/jobs").body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let jobs = parse_body(res).await;
    let for_appointment: Vec<&Value> = jobs.as_array().unwrap().iter()
        .filter(|j| j["payload"]["appointment_id"].as_str().unwrap() == appointment_id)
        .collect();
    assert_eq!(for_appointment.len(), 2);

    let confirmation = for_appointment.iter()
        .find(|j| j["job_type"] == "CONFIRMATION")
        .expect("confirmation job missing");
    let reminder = for_appointment.iter()
        .find(|j| j["job_type"] == "REMINDER")
        .expect("reminder job missing");

    // The confirmation goes out right away, the reminder a day ahead.
    let confirmation_due: DateTime<Utc> = confirmation["execute_at"].as_str().unwrap().parse().unwrap();
    assert!(confirmation_due <= Utc::now());
    let reminder_due: DateTime<Utc> = reminder["execute_at"].as_str().unwrap().parse().unwrap();
    assert_eq!(reminder_due, start - Duration::minutes(1440));
}

#[tokio::test]
async fn test_get_unknown_appointment() {
    let app = TestApp::new().await;
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/appointments/ghost")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
