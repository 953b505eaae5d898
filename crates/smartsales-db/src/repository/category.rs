//! # Category Repository

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use smartsales_core::Category;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn insert(&self, category: &Category) -> DbResult<Category> {
        debug!(name = %category.name, "Inserting category");

        sqlx::query(
            "INSERT INTO categories (id, name, description, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category.clone())
    }

    pub async fn list_active(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, is_active, created_at FROM categories WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }
}
