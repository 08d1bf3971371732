//! Repository layer for catalog storage
//!
//! One store trait per entity. Each trait has a Postgres implementation backed
//! by sqlx and an in-memory implementation ([`memory::MemoryStore`]). Stores
//! do not enforce cross-entity rules: deleting a genre still referenced by
//! books is refused by the caller, not here.

pub mod book_instances;
pub mod books;
pub mod genres;
pub mod memory;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Book, BookInstance, BookInstanceDetails, BookTitle, CreateBookInstance, CreateGenre,
        Genre,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    /// All copies with their book resolved
    async fn list_with_book(&self) -> AppResult<Vec<BookInstanceDetails>>;

    async fn get(&self, id: &str) -> AppResult<Option<BookInstance>>;

    async fn get_with_book(&self, id: &str) -> AppResult<Option<BookInstanceDetails>>;

    /// Insert under a fresh id
    async fn create(&self, data: &CreateBookInstance) -> AppResult<BookInstance>;

    /// Remove if present
    async fn delete(&self, id: &str) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreStore: Send + Sync {
    /// All genres, ascending by name
    async fn list_by_name(&self) -> AppResult<Vec<Genre>>;

    async fn get(&self, id: &str) -> AppResult<Option<Genre>>;

    /// Exact, case-sensitive name match
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>>;

    async fn create(&self, data: &CreateGenre) -> AppResult<Genre>;

    async fn delete(&self, id: &str) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list_titles(&self) -> AppResult<Vec<BookTitle>>;

    /// Books referencing the given genre
    async fn find_by_genre(&self, genre_id: &str) -> AppResult<Vec<Book>>;
}

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pub book_instances: Arc<dyn BookInstanceStore>,
    pub genres: Arc<dyn GenreStore>,
    pub books: Arc<dyn BookStore>,
    pool: Option<Pool<Postgres>>,
}

impl Repository {
    /// Create a repository over the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            book_instances: Arc::new(book_instances::BookInstancesRepository::new(pool.clone())),
            genres: Arc::new(genres::GenresRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository over an in-memory store
    pub fn in_memory(store: memory::MemoryStore) -> Self {
        Self {
            book_instances: Arc::new(store.clone()),
            genres: Arc::new(store.clone()),
            books: Arc::new(store),
            pool: None,
        }
    }

    /// Assemble from arbitrary store implementations
    pub fn from_stores(
        book_instances: Arc<dyn BookInstanceStore>,
        genres: Arc<dyn GenreStore>,
        books: Arc<dyn BookStore>,
    ) -> Self {
        Self {
            book_instances,
            genres,
            books,
            pool: None,
        }
    }

    /// Check the database answers; always ready without one
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

/// Parse a stored identifier. A malformed id is a store failure, not a miss.
pub fn parse_object_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::Store(format!("Malformed identifier {:?}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_object_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_object_id("42"), Err(AppError::Store(_))));
        assert!(matches!(parse_object_id(""), Err(AppError::Store(_))));
    }
}
