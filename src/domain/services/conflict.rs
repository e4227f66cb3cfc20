use crate::domain::models::appointment::Appointment;
use crate::domain::models::constraint::Constraint;
use crate::domain::models::meeting::TimeWindow;
use crate::error::{ConflictSource, ScheduleError};

/// Outcome of probing one station for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Conflict {
        source: ConflictSource,
        entity_id: String,
    },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

impl From<Availability> for Result<(), ScheduleError> {
    fn from(availability: Availability) -> Self {
        match availability {
            Availability::Available => Ok(()),
            Availability::Conflict { source, entity_id } => {
                Err(ScheduleError::WindowConflict { source, entity_id })
            }
        }
    }
}

/// Pure availability check over pre-fetched day data for one station.
///
/// Full-block constraints are tested first, then non-cancelled appointments;
/// the first intersection wins. Capacity-limit constraints gate admission on
/// a separate path and never produce a conflict here. `exclude_appointment_id`
/// lets a reschedule ignore the appointment it is replacing.
pub fn check_window(
    window: &TimeWindow,
    constraints: &[Constraint],
    appointments: &[Appointment],
    exclude_appointment_id: Option<&str>,
) -> Availability {
    for constraint in constraints {
        if !constraint.is_full_block() {
            continue;
        }
        if TimeWindow::new(constraint.start_at, constraint.end_at).overlaps(window) {
            return Availability::Conflict {
                source: ConflictSource::Constraint,
                entity_id: constraint.id.clone(),
            };
        }
    }

    for appointment in appointments {
        if appointment.is_cancelled() {
            continue;
        }
        if exclude_appointment_id.is_some_and(|id| id == appointment.id) {
            continue;
        }
        if TimeWindow::new(appointment.start_at, appointment.end_at).overlaps(window) {
            return Availability::Conflict {
                source: ConflictSource::Appointment,
                entity_id: appointment.id.clone(),
            };
        }
    }

    Availability::Available
}
