use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, station, constraint, customer, category, schedule, appointment, job};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Stations
        .route("/api/v1/stations", post(station::create_station).get(station::list_stations))
        .route("/api/v1/stations/{id}", get(station::get_station).put(station::update_station).delete(station::delete_station))

        // Constraints
        .route("/api/v1/stations/{id}/constraints", post(constraint::create_constraint).get(constraint::list_constraints))
        .route("/api/v1/constraints/{id}", put(constraint::update_constraint).delete(constraint::delete_constraint))

        // Customers
        .route("/api/v1/customers", post(customer::create_customer).get(customer::list_customers))
        .route("/api/v1/customers/{id}", get(customer::get_customer).put(customer::update_customer).delete(customer::delete_customer))

        // Categories
        .route("/api/v1/categories", post(category::create_category).get(category::list_categories))
        .route("/api/v1/categories/{id}", get(category::get_category).delete(category::delete_category))
        .route("/api/v1/categories/{id}/members/{customer_id}", post(category::add_member).delete(category::remove_member))

        // Scheduling Core
        .route("/api/v1/schedule/meetings", post(schedule::propose_meeting))
        .route("/api/v1/schedule/day", get(schedule::day_schedule))
        .route("/api/v1/stations/{id}/availability", get(schedule::check_availability))

        // Appointments
        .route("/api/v1/appointments", get(appointment::list_appointments))
        .route("/api/v1/appointments/{id}", get(appointment::get_appointment))
        .route("/api/v1/appointments/{id}/cancel", post(appointment::cancel_appointment))
        .route("/api/v1/appointments/{id}/complete", post(appointment::complete_appointment))

        // Jobs
        .route("/api/v1/jobs", get(job::list_jobs))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
