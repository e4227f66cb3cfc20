use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::domain::models::appointment::{Appointment, NewAppointmentParams};
use crate::domain::models::job::{Job, JOB_TYPE_CONFIRMATION, JOB_TYPE_REMINDER};
use crate::domain::models::meeting::{
    ProposedMeeting, Resolution, ResolvedInvite, SupersedeDirective, TimeWindow,
};
use crate::domain::ports::{
    AppointmentRepository, CategoryRepository, ConstraintRepository, CustomerRepository,
    StationRepository,
};
use crate::domain::services::conflict::{self, Availability};
use crate::domain::services::{expansion, normalize};
use crate::error::{AppError, ScheduleError};

/// Turns proposed meetings into committed appointments. One instance is
/// shared across requests; every call takes its inputs explicitly and holds
/// no state between submissions.
pub struct SchedulingService {
    station_repo: Arc<dyn StationRepository>,
    constraint_repo: Arc<dyn ConstraintRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    appointment_repo: Arc<dyn AppointmentRepository>,
    timezone: Tz,
    reminder_lead_minutes: i64,
}

impl SchedulingService {
    pub fn new(
        station_repo: Arc<dyn StationRepository>,
        constraint_repo: Arc<dyn ConstraintRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        appointment_repo: Arc<dyn AppointmentRepository>,
        timezone: Tz,
        reminder_lead_minutes: i64,
    ) -> Self {
        Self {
            station_repo,
            constraint_repo,
            customer_repo,
            category_repo,
            appointment_repo,
            timezone,
            reminder_lead_minutes,
        }
    }

    /// Resolves one proposed meeting to a terminal outcome. Scheduling
    /// rejections come back as `Resolution::Rejected`; only infrastructure
    /// failures surface as `Err`. The meeting is consumed either way, the
    /// caller resubmits a fresh one after correcting the input.
    pub async fn submit(&self, meeting: ProposedMeeting) -> Result<Resolution, AppError> {
        info!(
            "resolve_meeting {}: received {} invites, {} categories for {} - {}",
            meeting.id,
            meeting.invites.len(),
            meeting.categories.len(),
            meeting.window.start_at,
            meeting.window.end_at
        );

        match self.resolve(&meeting).await {
            Ok(appointment_ids) => {
                info!(
                    "resolve_meeting {}: committed {} appointment(s)",
                    meeting.id,
                    appointment_ids.len()
                );
                Ok(Resolution::Committed { appointment_ids })
            }
            Err(AppError::Schedule(rejection)) => {
                warn!(
                    "resolve_meeting {}: rejected with {}: {}",
                    meeting.id,
                    rejection.code(),
                    rejection
                );
                Ok(Resolution::Rejected(rejection))
            }
            Err(other) => Err(other),
        }
    }

    /// Read-only probe for UI pre-validation. Runs the same conflict check a
    /// submission would, without committing anything. `exclude_id` mirrors
    /// the reschedule semantics so a dialog editing an appointment does not
    /// see it conflict with itself.
    pub async fn check_station_availability(
        &self,
        station_id: &str,
        window: &TimeWindow,
        exclude_id: Option<&str>,
    ) -> Result<Availability, AppError> {
        if !window.is_valid() {
            return Err(ScheduleError::InvalidConstraintWindow.into());
        }
        self.station_repo
            .find_by_id(station_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Station not found".into()))?;
        self.probe_station(station_id, window, exclude_id).await
    }

    async fn resolve(&self, meeting: &ProposedMeeting) -> Result<Vec<String>, AppError> {
        // Expanding
        let invites = expansion::expand(
            self.customer_repo.as_ref(),
            self.category_repo.as_ref(),
            &meeting.invites,
            &meeting.categories,
        )
        .await?;

        let supersede = match &meeting.reschedule_of {
            Some(linkage) => Some(self.load_supersede_directive(&linkage.appointment_id).await?),
            None => None,
        };
        let exclude_id = supersede.as_ref().map(|d| d.original_id.as_str());

        // Validating
        let station_id = self.select_station(meeting, exclude_id).await?;

        // Committing: re-verify every resolved invite still has a customer
        // record, then build one draft per invite sharing station and window.
        let ids: Vec<String> = invites.iter().map(|i| i.customer_id.clone()).collect();
        let found = self.customer_repo.find_by_ids(&ids).await?;
        let found_ids: HashSet<&str> = found.iter().map(|c| c.id.as_str()).collect();
        for invite in &invites {
            if !found_ids.contains(invite.customer_id.as_str()) {
                return Err(ScheduleError::StaleInviteData(invite.customer_id.clone()).into());
            }
        }

        let drafts = self.draft_appointments(meeting, &invites, &station_id, supersede.as_ref());
        let jobs = self.draft_jobs(&drafts);

        let appointment_ids = self
            .appointment_repo
            .commit(&drafts, supersede.as_ref(), jobs)
            .await?;
        Ok(appointment_ids)
    }

    /// Reads the appointment a reschedule replaces and pins the version the
    /// commit transaction must still observe. An original that is already
    /// cancelled or completed cannot be superseded again.
    async fn load_supersede_directive(
        &self,
        original_id: &str,
    ) -> Result<SupersedeDirective, AppError> {
        let original = self
            .appointment_repo
            .find_by_id(original_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Original appointment not found".into()))?;
        if !original.is_scheduled() {
            return Err(ScheduleError::OriginalAlreadyResolved.into());
        }
        Ok(SupersedeDirective {
            original_id: original.id,
            original_window: TimeWindow::new(original.start_at, original.end_at),
            expected_version: original.version,
        })
    }

    /// Picks the station the meeting lands on. An explicit station is probed
    /// once and its conflict is the rejection; otherwise candidates are tried
    /// in preference order (request field, falling back to the configured
    /// station order) and the first free one wins.
    async fn select_station(
        &self,
        meeting: &ProposedMeeting,
        exclude_id: Option<&str>,
    ) -> Result<String, AppError> {
        if let Some(station_id) = &meeting.station_id {
            self.station_repo
                .find_by_id(station_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Station not found".into()))?;
            let availability = self
                .probe_station(station_id, &meeting.window, exclude_id)
                .await?;
            Result::from(availability)?;
            return Ok(station_id.clone());
        }

        let all_stations = self.station_repo.list().await?;
        let candidates: Vec<String> = if meeting.station_preference.is_empty() {
            all_stations.iter().map(|s| s.id.clone()).collect()
        } else {
            let known: HashSet<&str> = all_stations.iter().map(|s| s.id.as_str()).collect();
            meeting
                .station_preference
                .iter()
                .filter(|id| known.contains(id.as_str()))
                .cloned()
                .collect()
        };

        for candidate in &candidates {
            let availability = self
                .probe_station(candidate, &meeting.window, exclude_id)
                .await?;
            if availability.is_available() {
                return Ok(candidate.clone());
            }
        }
        Err(ScheduleError::NoStationAvailable.into())
    }

    async fn probe_station(
        &self,
        station_id: &str,
        window: &TimeWindow,
        exclude_id: Option<&str>,
    ) -> Result<Availability, AppError> {
        let date = normalize::business_date(self.timezone, window.start_at);
        let constraints = self
            .constraint_repo
            .list_by_station_date(station_id, date)
            .await?;
        let existing = self
            .appointment_repo
            .list_overlapping(station_id, window.start_at, window.end_at)
            .await?;
        Ok(conflict::check_window(
            window,
            &constraints,
            &existing,
            exclude_id,
        ))
    }

    fn draft_appointments(
        &self,
        meeting: &ProposedMeeting,
        invites: &[ResolvedInvite],
        station_id: &str,
        supersede: Option<&SupersedeDirective>,
    ) -> Vec<Appointment> {
        invites
            .iter()
            .map(|invite| {
                Appointment::new(NewAppointmentParams {
                    customer_id: invite.customer_id.clone(),
                    station_id: station_id.to_string(),
                    service_type: meeting.service_type.clone(),
                    start_at: meeting.window.start_at,
                    end_at: meeting.window.end_at,
                    superseded_appointment_id: supersede.map(|d| d.original_id.clone()),
                    reschedule_original_start_at: supersede.map(|d| d.original_window.start_at),
                    reschedule_original_end_at: supersede.map(|d| d.original_window.end_at),
                })
            })
            .collect()
    }

    /// One confirmation (due now) and one reminder per draft. A reminder
    /// whose lead time already passed is enqueued due immediately rather
    /// than dropped.
    fn draft_jobs(&self, drafts: &[Appointment]) -> Vec<Job> {
        let now = Utc::now();
        let mut jobs = Vec::with_capacity(drafts.len() * 2);
        for draft in drafts {
            jobs.push(Job::new(JOB_TYPE_CONFIRMATION, draft.id.clone(), now));
            let reminder_at = draft.start_at - Duration::minutes(self.reminder_lead_minutes);
            jobs.push(Job::new(
                JOB_TYPE_REMINDER,
                draft.id.clone(),
                reminder_at.max(now),
            ));
        }
        jobs
    }
}
