mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, Utc};
use common::TestApp;
use grooming_backend::{
    domain::models::job::Job,
    domain::ports::JobRepository,
    infra::repositories::sqlite_job_repo::SqliteJobRepo,
};
use rand::Rng;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinSet;
use tower::ServiceExt;
use uuid::Uuid;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn slot(hour: u32, duration_min: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = (Utc::now() + Duration::days(10)).date_naive();
    let start = day.and_hms_opt(hour, 0, 0).unwrap().and_utc();
    (start, start + Duration::minutes(duration_min))
}

#[tokio::test]
async fn test_concurrent_proposals_single_winner() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/stations")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"name": "Table 1", "sort_order": 1}).to_string())).unwrap()
    ).await.unwrap();
    let station_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let contender_count = 6;
    let mut customers = Vec::new();
    for i in 0..contender_count {
        let res = app.router.clone().oneshot(
            Request::builder().method("POST").uri("/api/v1/customers")
                .header("Content-Type", "application/json")
                .body(Body::from(json!({
                    "name": format!("Customer {}", i), "pet_name": format!("Pet {}", i)
                }).to_string())).unwrap()
        ).await.unwrap();
        customers.push(parse_body(res).await["id"].as_str().unwrap().to_string());
    }

    let (start, end) = slot(10, 30);
    let mut set = JoinSet::new();
    for customer_id in customers {
        let router = app.router.clone();
        let station = station_id.clone();
        let payload = json!({
            "service_type": "BASIC_WASH",
            "start_at": start.to_rfc3339(),
            "end_at": end.to_rfc3339(),
            "station_id": station,
            "invites": [customer_id]
        });
        set.spawn(async move {
            let res = router.oneshot(
                Request::builder().method("POST").uri("/api/v1/schedule/meetings")
                    .header("Content-Type", "application/json")
                    .body(Body::from(payload.to_string())).unwrap()
            ).await.unwrap();
            let status = res.status();
            let body = parse_body(res).await;
            (status, body)
        });
    }

    let mut committed = 0;
    while let Some(res) = set.join_next().await {
        let (status, body) = res.unwrap();
        if status == StatusCode::CREATED {
            committed += 1;
        } else {
            assert_eq!(status, StatusCode::CONFLICT, "Losers must get a conflict: {:?}", body);
            let reason = body["reason"].as_str().unwrap();
            assert!(
                reason == "CONFLICT_APPOINTMENT" || reason == "CONCURRENT_BOOKING_CONFLICT",
                "Unexpected rejection {}",
                reason
            );
        }
    }
    assert_eq!(committed, 1, "Exactly one proposal may win the window");

    // The store agrees with the responses.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/appointments?date={}", start.date_naive()))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let listed = parse_body(res).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_burst_preserves_station_invariant() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/stations")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"name": "Table 1", "sort_order": 1}).to_string())).unwrap()
    ).await.unwrap();
    let station_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let contender_count = 12;
    let mut customers = Vec::new();
    for i in 0..contender_count {
        let res = app.router.clone().oneshot(
            Request::builder().method("POST").uri("/api/v1/customers")
                .header("Content-Type", "application/json")
                .body(Body::from(json!({
                    "name": format!("Customer {}", i), "pet_name": format!("Pet {}", i)
                }).to_string())).unwrap()
        ).await.unwrap();
        customers.push(parse_body(res).await["id"].as_str().unwrap().to_string());
    }

    // Random 30-minute windows on a quarter-hour grid, dense enough that
    // most of them collide with each other.
    let day_base = slot(8, 0).0;
    let mut set = JoinSet::new();
    for customer_id in customers {
        let offset = rand::thread_rng().gen_range(0..12) * 15;
        let start = day_base + Duration::minutes(offset);
        let end = start + Duration::minutes(30);
        let router = app.router.clone();
        let station = station_id.clone();
        let payload = json!({
            "service_type": "BASIC_WASH",
            "start_at": start.to_rfc3339(),
            "end_at": end.to_rfc3339(),
            "station_id": station,
            "invites": [customer_id]
        });
        set.spawn(async move {
            let res = router.oneshot(
                Request::builder().method("POST").uri("/api/v1/schedule/meetings")
                    .header("Content-Type", "application/json")
                    .body(Body::from(payload.to_string())).unwrap()
            ).await.unwrap();
            let status = res.status();
            let body = parse_body(res).await;
            (status, body)
        });
    }

    let mut committed = 0;
    while let Some(res) = set.join_next().await {
        let (status, body) = res.unwrap();
        if status == StatusCode::CREATED {
            committed += body["appointment_ids"].as_array().unwrap().len();
        } else {
            assert_eq!(status, StatusCode::CONFLICT, "Losers must get a conflict: {:?}", body);
            let reason = body["reason"].as_str().unwrap();
            assert!(
                reason == "CONFLICT_APPOINTMENT" || reason == "CONCURRENT_BOOKING_CONFLICT",
                "Unexpected rejection {}",
                reason
            );
        }
    }
    assert!(committed >= 1, "At least the first window through the gate must land");

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!(
                "/api/v1/appointments?date={}&station_id={}",
                day_base.date_naive(),
                station_id
            ))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let listed = parse_body(res).await;
    let mut windows: Vec<(DateTime<Utc>, DateTime<Utc>)> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|appointment| {
            (
                DateTime::parse_from_rfc3339(appointment["start_at"].as_str().unwrap())
                    .unwrap()
                    .with_timezone(&Utc),
                DateTime::parse_from_rfc3339(appointment["end_at"].as_str().unwrap())
                    .unwrap()
                    .with_timezone(&Utc),
            )
        })
        .collect();
    assert_eq!(windows.len(), committed, "Store and responses must agree");

    windows.sort();
    for pair in windows.windows(2) {
        assert!(
            pair[0].1 <= pair[1].0,
            "Overlapping appointments survived the commit gate: {:?}",
            pair
        );
    }
}

#[tokio::test]
async fn test_concurrent_reschedules_of_same_original() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/stations")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"name": "Table 1", "sort_order": 1}).to_string())).unwrap()
    ).await.unwrap();
    let station_id = parse_body(res).await["id"].as_str().unwrap().to_string();
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/customers")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"name": "Anna", "pet_name": "Rex"}).to_string())).unwrap()
    ).await.unwrap();
    let customer_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let (start, end) = slot(10, 30);
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/schedule/meetings")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "service_type": "FULL_GROOM",
                "start_at": start.to_rfc3339(),
                "end_at": end.to_rfc3339(),
                "station_id": station_id,
                "invites": [customer_id]
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let original_id = parse_body(res).await["appointment_ids"][0].as_str().unwrap().to_string();

    // Two managers move the same booking to different afternoons at once.
    let mut set = JoinSet::new();
    for hour in [14, 16] {
        let router = app.router.clone();
        let station = station_id.clone();
        let customer = customer_id.clone();
        let original = original_id.clone();
        let (new_start, new_end) = slot(hour, 30);
        set.spawn(async move {
            let res = router.oneshot(
                Request::builder().method("POST").uri("/api/v1/schedule/meetings")
                    .header("Content-Type", "application/json")
                    .body(Body::from(json!({
                        "service_type": "FULL_GROOM",
                        "start_at": new_start.to_rfc3339(),
                        "end_at": new_end.to_rfc3339(),
                        "station_id": station,
                        "invites": [customer],
                        "reschedule_of": original
                    }).to_string())).unwrap()
            ).await.unwrap();
            let status = res.status();
            let body = parse_body(res).await;
            (status, body)
        });
    }

    let mut committed = 0;
    while let Some(res) = set.join_next().await {
        let (status, body) = res.unwrap();
        if status == StatusCode::CREATED {
            committed += 1;
        } else {
            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(body["reason"], "ORIGINAL_ALREADY_RESOLVED");
        }
    }
    assert_eq!(committed, 1, "The original can be superseded exactly once");

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/appointments/{}", original_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let original = parse_body(res).await;
    assert_eq!(original["status"], "CANCELLED");
    assert_eq!(original["version"], 2, "Only one supersession may bump the version");
}

#[tokio::test]
async fn test_job_claims_are_exclusive_across_workers() {
    let db_filename = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", db_filename);
    let options = SqliteConnectOptions::from_str(&db_url)
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to test db");
    sqlx::migrate!("./migrations/sqlite")
        .run(&pool)
        .await
        .expect("Failed to migrate test db");

    let repo = Arc::new(SqliteJobRepo::new(pool.clone()));

    let total_jobs = 40;
    let now = Utc::now();
    for i in 0..total_jobs {
        let job = Job::new(
            "REMINDER",
            Uuid::new_v4().to_string(),
            now - Duration::minutes(1) + Duration::milliseconds(i as i64),
        );
        repo.create(&job).await.unwrap();
    }

    let worker_count = 8;
    let mut set = JoinSet::new();
    for _ in 0..worker_count {
        let repo_clone = repo.clone();
        set.spawn(async move {
            let mut claimed = Vec::new();
            let mut empty_streaks = 0;
            while empty_streaks < 3 {
                let batch = repo_clone.find_pending(5).await.expect("Failed to fetch jobs");
                if batch.is_empty() {
                    empty_streaks += 1;
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                } else {
                    empty_streaks = 0;
                    for job in batch {
                        assert_eq!(job.status, "PROCESSING", "Claim must flip the status");
                        claimed.push(job.id);
                    }
                }
            }
            claimed
        });
    }

    let mut all_claimed = Vec::new();
    while let Some(res) = set.join_next().await {
        all_claimed.extend(res.unwrap());
    }

    let unique: HashSet<String> = all_claimed.iter().cloned().collect();
    assert_eq!(unique.len(), all_claimed.len(), "A job was claimed twice");
    assert_eq!(all_claimed.len(), total_jobs, "Every due job must be claimed");

    drop(pool);
    let _ = std::fs::remove_file(&db_filename);
}
