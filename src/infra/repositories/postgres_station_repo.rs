use crate::domain::{models::station::Station, ports::StationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresStationRepo {
    pool: PgPool,
}

impl PostgresStationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StationRepository for PostgresStationRepo {
    async fn create(&self, station: &Station) -> Result<Station, AppError> {
        sqlx::query_as::<_, Station>(
            "INSERT INTO stations (id, name, sort_order, created_at) VALUES ($1, $2, $3, $4) RETURNING *"
        )
            .bind(&station.id)
            .bind(&station.name)
            .bind(station.sort_order)
            .bind(station.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Station>, AppError> {
        sqlx::query_as::<_, Station>("SELECT * FROM stations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Station>, AppError> {
        sqlx::query_as::<_, Station>("SELECT * FROM stations ORDER BY sort_order ASC, name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, station: &Station) -> Result<Station, AppError> {
        sqlx::query_as::<_, Station>(
            "UPDATE stations SET name = $1, sort_order = $2 WHERE id = $3 RETURNING *"
        )
            .bind(&station.name)
            .bind(station.sort_order)
            .bind(&station.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM station_constraints WHERE station_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        let result = sqlx::query("DELETE FROM stations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Station not found".into()));
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
