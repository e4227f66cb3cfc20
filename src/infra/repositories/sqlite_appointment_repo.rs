use crate::domain::{
    models::{appointment::Appointment, job::Job, meeting::SupersedeDirective},
    ports::AppointmentRepository,
};
use crate::error::{AppError, ScheduleError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteAppointmentRepo {
    pool: SqlitePool,
}

impl SqliteAppointmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_overlapping(&self, station_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE station_id = ? AND status != 'CANCELLED' AND start_at < ? AND end_at > ?"
        )
            .bind(station_id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_station_range(&self, station_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE station_id = ? AND start_at < ? AND end_at > ? ORDER BY start_at ASC"
        )
            .bind(station_id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE start_at < ? AND end_at > ? ORDER BY start_at ASC, station_id ASC"
        )
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE customer_id = ? ORDER BY start_at DESC"
        )
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_status(&self, id: &str, status: &str) -> Result<Appointment, AppError> {
        let updated = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = ?, version = version + 1 WHERE id = ? AND status = 'SCHEDULED' RETURNING *"
        )
            .bind(status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        match updated {
            Some(appointment) => Ok(appointment),
            None => {
                let exists = self.find_by_id(id).await?;
                match exists {
                    Some(_) => Err(AppError::Conflict("Appointment already resolved".into())),
                    None => Err(AppError::NotFound("Appointment not found".into())),
                }
            }
        }
    }

    async fn commit(&self, drafts: &[Appointment], supersede: Option<&SupersedeDirective>, jobs: Vec<Job>) -> Result<Vec<String>, AppError> {
        let Some((first, rest)) = drafts.split_first() else {
            return Ok(Vec::new());
        };
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // The first statement of the transaction is a write, so the write
        // lock is taken before any state is observed and the transaction
        // sees every commit that won the race before it.
        if let Some(directive) = supersede {
            let result = sqlx::query(
                "UPDATE appointments SET status = 'CANCELLED', version = version + 1
                 WHERE id = ? AND status = 'SCHEDULED' AND version = ?"
            )
                .bind(&directive.original_id)
                .bind(directive.expected_version)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            if result.rows_affected() == 0 {
                return Err(ScheduleError::OriginalAlreadyResolved.into());
            }
            sqlx::query(
                "UPDATE jobs SET status = 'CANCELLED' WHERE json_extract(payload, '$.appointment_id') = ? AND status = 'PENDING'"
            )
                .bind(&directive.original_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        // Commit-time recheck: the insert only lands if no outside
        // non-cancelled appointment took the window since validation.
        // Later drafts share the first one's window and station, so one
        // guarded insert covers the whole batch.
        let result = sqlx::query(
            "INSERT INTO appointments (id, customer_id, station_id, service_type, start_at, end_at, status, confirmation_code, superseded_appointment_id, reschedule_original_start_at, reschedule_original_end_at, version, created_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE NOT EXISTS (
                 SELECT 1 FROM appointments
                 WHERE station_id = ? AND status != 'CANCELLED' AND start_at < ? AND end_at > ?
             )"
        )
            .bind(&first.id)
            .bind(&first.customer_id)
            .bind(&first.station_id)
            .bind(&first.service_type)
            .bind(first.start_at)
            .bind(first.end_at)
            .bind(&first.status)
            .bind(&first.confirmation_code)
            .bind(&first.superseded_appointment_id)
            .bind(first.reschedule_original_start_at)
            .bind(first.reschedule_original_end_at)
            .bind(first.version)
            .bind(first.created_at)
            .bind(&first.station_id)
            .bind(first.end_at)
            .bind(first.start_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(ScheduleError::ConcurrentBookingConflict.into());
        }

        for draft in rest {
            sqlx::query(
                "INSERT INTO appointments (id, customer_id, station_id, service_type, start_at, end_at, status, confirmation_code, superseded_appointment_id, reschedule_original_start_at, reschedule_original_end_at, version, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
                .bind(&draft.id)
                .bind(&draft.customer_id)
                .bind(&draft.station_id)
                .bind(&draft.service_type)
                .bind(draft.start_at)
                .bind(draft.end_at)
                .bind(&draft.status)
                .bind(&draft.confirmation_code)
                .bind(&draft.superseded_appointment_id)
                .bind(draft.reschedule_original_start_at)
                .bind(draft.reschedule_original_end_at)
                .bind(draft.version)
                .bind(draft.created_at)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        for job in jobs {
            sqlx::query("INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
                .bind(&job.id)
                .bind(&job.job_type)
                .bind(&job.payload)
                .bind(job.execute_at)
                .bind(&job.status)
                .bind(&job.error_message)
                .bind(job.created_at)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(drafts.iter().map(|d| d.id.clone()).collect())
    }
}
