use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Scheduling-domain failure taxonomy. Every variant is terminal for the
/// resolution attempt that produced it; `ConcurrentBookingConflict` and
/// `OriginalAlreadyResolved` are safe for the caller to retry after
/// re-reading state, the rest need corrected input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Unknown customer category: {0}")]
    UnknownCategory(String),
    #[error("Proposed meeting resolved to an empty invite set")]
    EmptyInviteSet,
    #[error("Constraint window must start before it ends")]
    InvalidConstraintWindow,
    #[error("Window overlaps full-block constraint {0}")]
    OverlappingConstraint(String),
    #[error("Window conflicts with {source} {entity_id}")]
    WindowConflict {
        source: ConflictSource,
        entity_id: String,
    },
    #[error("No station available for the requested window")]
    NoStationAvailable,
    #[error("Invite {0} disappeared during resolution")]
    StaleInviteData(String),
    #[error("Another booking claimed the window first")]
    ConcurrentBookingConflict,
    #[error("Original appointment was already cancelled or superseded")]
    OriginalAlreadyResolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSource {
    Constraint,
    Appointment,
}

impl std::fmt::Display for ConflictSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictSource::Constraint => write!(f, "constraint"),
            ConflictSource::Appointment => write!(f, "appointment"),
        }
    }
}

impl std::error::Error for ConflictSource {}

impl ScheduleError {
    /// Stable machine-readable code carried in rejection payloads.
    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            ScheduleError::EmptyInviteSet => "EMPTY_INVITE_SET",
            ScheduleError::InvalidConstraintWindow => "INVALID_CONSTRAINT_WINDOW",
            ScheduleError::OverlappingConstraint(_) => "OVERLAPPING_CONSTRAINT",
            ScheduleError::WindowConflict {
                source: ConflictSource::Constraint,
                ..
            } => "CONFLICT_CONSTRAINT",
            ScheduleError::WindowConflict {
                source: ConflictSource::Appointment,
                ..
            } => "CONFLICT_APPOINTMENT",
            ScheduleError::NoStationAvailable => "NO_STATION_AVAILABLE",
            ScheduleError::StaleInviteData(_) => "STALE_INVITE_DATA",
            ScheduleError::ConcurrentBookingConflict => "CONCURRENT_BOOKING_CONFLICT",
            ScheduleError::OriginalAlreadyResolved => "ORIGINAL_ALREADY_RESOLVED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ScheduleError::UnknownCategory(_) => StatusCode::NOT_FOUND,
            ScheduleError::EmptyInviteSet | ScheduleError::InvalidConstraintWindow => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::CONFLICT,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 1555 = SQLite Primary Key Constraint
                    // 23505 = PostgreSQL Unique Violation (covers primary keys)
                    if code == "2067" || code == "1555" || code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource already exists (duplicate entry)" })),
                        )
                            .into_response();
                    }

                    // 787 = SQLite Foreign Key Constraint
                    // 23503 = PostgreSQL Foreign Key Violation
                    if code == "787" || code == "23503" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource is referenced by other records" })),
                        )
                            .into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Schedule(e) => {
                let body = Json(json!({
                    "error": e.to_string(),
                    "code": e.code(),
                }));
                return (e.status(), body).into_response();
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
