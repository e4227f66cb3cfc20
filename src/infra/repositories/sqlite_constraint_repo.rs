use crate::domain::{models::constraint::Constraint, ports::ConstraintRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct SqliteConstraintRepo {
    pool: SqlitePool,
}

impl SqliteConstraintRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConstraintRepository for SqliteConstraintRepo {
    async fn create(&self, constraint: &Constraint) -> Result<Constraint, AppError> {
        sqlx::query_as::<_, Constraint>(
            "INSERT INTO station_constraints (id, station_id, date, start_at, end_at, kind, capacity, note, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&constraint.id)
            .bind(&constraint.station_id)
            .bind(constraint.date)
            .bind(constraint.start_at)
            .bind(constraint.end_at)
            .bind(&constraint.kind)
            .bind(constraint.capacity)
            .bind(&constraint.note)
            .bind(constraint.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Constraint>, AppError> {
        sqlx::query_as::<_, Constraint>("SELECT * FROM station_constraints WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_station_date(&self, station_id: &str, date: NaiveDate) -> Result<Vec<Constraint>, AppError> {
        sqlx::query_as::<_, Constraint>(
            "SELECT * FROM station_constraints WHERE station_id = ? AND date = ? ORDER BY start_at ASC"
        )
            .bind(station_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Constraint>, AppError> {
        sqlx::query_as::<_, Constraint>(
            "SELECT * FROM station_constraints WHERE date = ? ORDER BY station_id ASC, start_at ASC"
        )
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_station_range(&self, station_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Constraint>, AppError> {
        sqlx::query_as::<_, Constraint>(
            "SELECT * FROM station_constraints WHERE station_id = ? AND date >= ? AND date <= ? ORDER BY date ASC, start_at ASC"
        )
            .bind(station_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, constraint: &Constraint) -> Result<Constraint, AppError> {
        sqlx::query_as::<_, Constraint>(
            "UPDATE station_constraints SET date = ?, start_at = ?, end_at = ?, kind = ?, capacity = ?, note = ?
             WHERE id = ?
             RETURNING *"
        )
            .bind(constraint.date)
            .bind(constraint.start_at)
            .bind(constraint.end_at)
            .bind(&constraint.kind)
            .bind(constraint.capacity)
            .bind(&constraint.note)
            .bind(&constraint.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM station_constraints WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Constraint not found".into()));
        }
        Ok(())
    }
}
