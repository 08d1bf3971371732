//! Genres repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{parse_object_id, GenreStore};
use crate::{
    error::AppResult,
    models::{CreateGenre, Genre},
};

/// Byte-wise collation so the order does not depend on the database locale
const LIST_BY_NAME: &str = r#"SELECT id, name FROM genres ORDER BY name COLLATE "C""#;

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreStore for GenresRepository {
    async fn list_by_name(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>(LIST_BY_NAME)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: &str) -> AppResult<Option<Genre>> {
        let id = parse_object_id(id)?;
        let row = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>(
            "SELECT id, name FROM genres WHERE name = $1 ORDER BY crea_date LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, data: &CreateGenre) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let id = parse_object_id(id)?;
        sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_order_ignores_locale() {
        assert!(LIST_BY_NAME.ends_with(r#"ORDER BY name COLLATE "C""#));
    }
}
