use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::domain::models::job::{Job, JOB_STATUS_COMPLETED, JOB_STATUS_FAILED, JOB_TYPE_CONFIRMATION};
use crate::domain::services::messages::{self, MessageParams};
use crate::error::AppError;
use crate::state::AppState;

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting reminder job worker...");

    loop {
        match state.job_repo.find_pending(10).await {
            Ok(jobs) => {
                for job in jobs {
                    let span = info_span!(
                        "reminder_job",
                        job_id = %job.id,
                        job_type = %job.job_type,
                        appointment_id = %job.payload.appointment_id,
                    );

                    let state = state.clone();
                    async move {
                        info!("Processing job: {}", job.job_type);
                        match process_job(&state, &job).await {
                            Ok(_) => {
                                info!("Job completed successfully");
                                if let Err(e) = state.job_repo.update_status(&job.id, JOB_STATUS_COMPLETED, None).await {
                                    error!("Failed to mark job as completed: {:?}", e);
                                }
                            },
                            Err(e) => {
                                let err_msg = format!("{}", e);
                                error!("Job failed with error: {}", err_msg);
                                if let Err(up_err) = state.job_repo.update_status(&job.id, JOB_STATUS_FAILED, Some(err_msg)).await {
                                    error!("Failed to mark job as failed: {:?}", up_err);
                                }
                            }
                        }
                    }
                        .instrument(span)
                        .await;
                }
            }
            Err(e) => error!("Failed to fetch pending jobs: {:?}", e),
        }
        sleep(Duration::from_secs(5)).await;
    }
}

async fn process_job(state: &Arc<AppState>, job: &Job) -> Result<(), AppError> {
    let appointment_id = &job.payload.appointment_id;

    let appointment = state.appointment_repo.find_by_id(appointment_id).await?
        .ok_or(AppError::NotFound(format!("Appointment {} not found", appointment_id)))?;

    // Cancelled or completed between enqueue and dispatch; nothing to send.
    if !appointment.is_scheduled() {
        info!("Skipping {} for appointment {} with status {}", job.job_type, appointment.id, appointment.status);
        return Ok(());
    }

    let customer = state.customer_repo.find_by_id(&appointment.customer_id).await?
        .ok_or(AppError::NotFound(format!("Customer {} not found", appointment.customer_id)))?;
    let phone = customer.phone.as_deref()
        .ok_or(AppError::Validation("Customer has no phone number".into()))?;
    let station = state.station_repo.find_by_id(&appointment.station_id).await?
        .ok_or(AppError::NotFound(format!("Station {} not found", appointment.station_id)))?;

    let start_local = messages::format_local(state.config.timezone(), appointment.start_at);
    let params = MessageParams {
        customer_name: &customer.name,
        pet_name: &customer.pet_name,
        service_type: &appointment.service_type,
        start_local: &start_local,
        station_name: &station.name,
        confirmation_code: &appointment.confirmation_code,
    };

    let message = if job.job_type == JOB_TYPE_CONFIRMATION {
        messages::render_confirmation(&params)?
    } else {
        messages::render_reminder(&params)?
    };

    info!("Sending {} to {}", job.job_type, phone);
    state.reminder_service.send(phone, &message).await?;

    Ok(())
}
