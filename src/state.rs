use std::sync::Arc;
use crate::domain::ports::{
    AppointmentRepository, CategoryRepository, ConstraintRepository,
    CustomerRepository, JobRepository, ReminderService, StationRepository,
};
use crate::domain::services::scheduler::SchedulingService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub station_repo: Arc<dyn StationRepository>,
    pub constraint_repo: Arc<dyn ConstraintRepository>,
    pub customer_repo: Arc<dyn CustomerRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub reminder_service: Arc<dyn ReminderService>,
    pub scheduler: Arc<SchedulingService>,
}
