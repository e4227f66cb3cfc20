use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const DURATION_SECS: u64 = 20;
const BASE_URL: &str = "http://localhost:3000";

struct Target {
    name: &'static str,
    method: &'static str,
    url: String,
    body: Option<serde_json::Value>,
}

#[tokio::main]
async fn main() {
    println!("{}", "🚀 Starting Benchmark Suite".bold().green());
    println!("Target URL: {}", BASE_URL);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    if client.get(format!("{}/health", BASE_URL)).send().await.is_err() {
        eprintln!("{}", "❌ Server is NOT reachable at localhost:3000. Please start it first.".red().bold());
        return;
    }

    println!("\n{}", "⚙️  Setting up benchmark data...".yellow());
    let station_id = setup_station(&client).await;
    let customer_id = setup_customer(&client).await;
    let seed_start = seed_appointment(&client, &station_id, &customer_id).await;

    println!("{}", "✅ Data created successfully.".green());
    println!("   Station ID:  {}", station_id);
    println!("   Customer ID: {}", customer_id);

    let probe_start = seed_start + ChronoDuration::hours(1);
    let probe_end = probe_start + ChronoDuration::minutes(30);
    let schedule_date = seed_start.format("%Y-%m-%d").to_string();

    let targets = vec![
        Target {
            name: "Health Check (Public)",
            method: "GET",
            url: format!("{}/health", BASE_URL),
            body: None,
        },
        Target {
            name: "Day Schedule (Manager Read)",
            method: "GET",
            url: format!("{}/api/v1/schedule/day?date={}", BASE_URL, schedule_date),
            body: None,
        },
        Target {
            name: "Availability Probe (Conflict Scan)",
            method: "GET",
            url: format!(
                "{}/api/v1/stations/{}/availability?start={}&end={}",
                BASE_URL,
                station_id,
                probe_start.format("%Y-%m-%dT%H:%M:%SZ"),
                probe_end.format("%Y-%m-%dT%H:%M:%SZ")
            ),
            body: None,
        },
        Target {
            name: "Customer Create (Write Path)",
            method: "POST",
            url: format!("{}/api/v1/customers", BASE_URL),
            body: Some(json!({
                "name": "Benchmark Bot",
                "pet_name": "Rex",
                "phone": "+49 151 0000 0000"
            })),
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }
}

async fn setup_station(client: &Client) -> String {
    // A fresh station per run keeps the seed proposal from colliding with
    // leftovers of earlier benchmark runs.
    let name = format!("bench-{}", Uuid::new_v4());
    let res = client.post(format!("{}/api/v1/stations", BASE_URL))
        .json(&json!({ "name": name, "sort_order": 999 }))
        .send()
        .await
        .expect("Failed to send station create request");

    if !res.status().is_success() {
        panic!("Failed to create station: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse station response");
    body["id"].as_str().expect("No station id").to_string()
}

async fn setup_customer(client: &Client) -> String {
    let res = client.post(format!("{}/api/v1/customers", BASE_URL))
        .json(&json!({
            "name": "Benchmark Bot",
            "pet_name": "Rex",
            "phone": "+49 151 0000 0000"
        }))
        .send()
        .await
        .expect("Failed to send customer create request");

    if !res.status().is_success() {
        panic!("Failed to create customer: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse customer response");
    body["id"].as_str().expect("No customer id").to_string()
}

async fn seed_appointment(client: &Client, station_id: &str, customer_id: &str) -> chrono::DateTime<Utc> {
    let start = Utc::now() + ChronoDuration::days(1);
    let end = start + ChronoDuration::minutes(30);

    let res = client.post(format!("{}/api/v1/schedule/meetings", BASE_URL))
        .json(&json!({
            "service_type": "BASIC_WASH",
            "start_at": start.to_rfc3339(),
            "end_at": end.to_rfc3339(),
            "station_id": station_id,
            "invites": [customer_id]
        }))
        .send()
        .await
        .expect("Failed to send meeting proposal");

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Failed to seed appointment. Status: {}. Body: {}", status, txt);
    }

    start
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let body = target.body.clone();
            let method = target.method;
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = match method {
                    "GET" => client.get(&url).send().await,
                    "POST" => {
                        let mut req = client.post(&url);
                        if let Some(b) = body {
                            req = req.json(&b);
                        }
                        req.send().await
                    },
                    _ => client.get(&url).send().await,
                };
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
