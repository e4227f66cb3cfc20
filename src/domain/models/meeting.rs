use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScheduleError;

/// Half-open `[start_at, end_at)` interval in absolute time. All scheduling
/// comparisons happen on these instants; local wall-clock formatting is a
/// display concern at the API boundary.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self { start_at, end_at }
    }

    pub fn is_valid(&self) -> bool {
        self.start_at < self.end_at
    }

    /// Touching boundaries do not overlap: 10:00-10:30 and 10:30-11:00
    /// coexist on one station.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start_at < other.end_at && other.start_at < self.end_at
    }
}

/// Marks a proposed meeting as the replacement for an existing appointment.
/// The original's window and version are read back from the store during
/// validation, not trusted from the caller.
#[derive(Debug, Deserialize, Clone)]
pub struct RescheduleLinkage {
    pub appointment_id: String,
}

/// An ephemeral scheduling request. Consumed exactly once by the resolver;
/// only the appointments it materializes are persisted.
#[derive(Debug, Clone)]
pub struct ProposedMeeting {
    pub id: String,
    pub service_type: String,
    pub window: TimeWindow,
    pub station_id: Option<String>,
    pub station_preference: Vec<String>,
    pub invites: Vec<String>,
    pub categories: Vec<String>,
    pub reschedule_of: Option<RescheduleLinkage>,
}

pub struct ProposedMeetingParams {
    pub service_type: String,
    pub window: TimeWindow,
    pub station_id: Option<String>,
    pub station_preference: Vec<String>,
    pub invites: Vec<String>,
    pub categories: Vec<String>,
    pub reschedule_of: Option<RescheduleLinkage>,
}

impl ProposedMeeting {
    /// Parses the loose transport payload into the strict shape the core
    /// operates on. Rejects windows that do not run forward and requests
    /// naming neither invites nor categories.
    pub fn new(params: ProposedMeetingParams) -> Result<Self, ScheduleError> {
        if !params.window.is_valid() {
            return Err(ScheduleError::InvalidConstraintWindow);
        }
        if params.invites.is_empty() && params.categories.is_empty() {
            return Err(ScheduleError::EmptyInviteSet);
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            service_type: params.service_type,
            window: params.window,
            station_id: params.station_id,
            station_preference: params.station_preference,
            invites: params.invites,
            categories: params.categories,
            reschedule_of: params.reschedule_of,
        })
    }
}

/// Why a customer ended up in the resolved invite set.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum InviteSource {
    Manual,
    Category(String),
}

/// One concrete customer in the flattened invite set. First occurrence wins
/// on dedup, so `source` records the earliest reason the customer appears.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ResolvedInvite {
    pub customer_id: String,
    pub source: InviteSource,
}

/// Instruction for the commit transaction to atomically retire the original
/// appointment a reschedule replaces.
#[derive(Debug, Clone)]
pub struct SupersedeDirective {
    pub original_id: String,
    pub original_window: TimeWindow,
    pub expected_version: i64,
}

/// The single structured outcome of one resolution attempt. A meeting either
/// commits as a whole or is rejected as a whole; there is no partial state.
#[derive(Debug, Clone)]
pub enum Resolution {
    Committed { appointment_ids: Vec<String> },
    Rejected(ScheduleError),
}
