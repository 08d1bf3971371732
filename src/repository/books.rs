//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{parse_object_id, BookStore};
use crate::{
    error::AppResult,
    models::{Book, BookTitle},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn list_titles(&self) -> AppResult<Vec<BookTitle>> {
        let rows = sqlx::query_as::<_, BookTitle>("SELECT id, title FROM books ORDER BY crea_date")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_genre(&self, genre_id: &str) -> AppResult<Vec<Book>> {
        let genre_id = parse_object_id(genre_id)?;
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, summary, isbn, genre
            FROM books
            WHERE $1 = ANY(genre)
            ORDER BY crea_date
            "#,
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
