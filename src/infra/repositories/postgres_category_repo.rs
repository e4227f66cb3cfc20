use crate::domain::{
    models::{category::Category, customer::Customer},
    ports::CategoryRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresCategoryRepo {
    pool: PgPool,
}

impl PostgresCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepo {
    async fn create(&self, category: &Category) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, created_at) VALUES ($1, $2, $3) RETURNING *"
        )
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM category_members WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".into()));
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn add_member(&self, category_id: &str, customer_id: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO category_members (category_id, customer_id, added_at) VALUES ($1, $2, $3)"
        )
            .bind(category_id)
            .bind(customer_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn remove_member(&self, category_id: &str, customer_id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM category_members WHERE category_id = $1 AND customer_id = $2"
        )
            .bind(category_id)
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category member not found".into()));
        }
        Ok(())
    }

    async fn list_members(&self, category_id: &str) -> Result<Vec<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            "SELECT c.* FROM customers c
             JOIN category_members m ON m.customer_id = c.id
             WHERE m.category_id = $1
             ORDER BY m.added_at ASC, c.id ASC"
        )
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
