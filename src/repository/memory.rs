//! In-memory catalog store
//!
//! Collections keep insertion order. Used by the tests and for running the
//! server without a database.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{parse_object_id, BookInstanceStore, BookStore, GenreStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        Book, BookInstance, BookInstanceDetails, BookTitle, CreateBookInstance, CreateGenre,
        Genre,
    },
};

#[derive(Default)]
struct Collections {
    books: IndexMap<Uuid, Book>,
    genres: IndexMap<Uuid, Genre>,
    book_instances: IndexMap<Uuid, BookInstance>,
}

impl Collections {
    fn details(&self, instance: &BookInstance) -> BookInstanceDetails {
        BookInstanceDetails::new(instance.clone(), self.books.get(&instance.book).cloned())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books are read-only through the store traits; this is how they get in
    pub async fn insert_book(&self, book: Book) {
        self.inner.write().await.books.insert(book.id, book);
    }

    /// Load a JSON array of books
    pub async fn seed_books(&self, path: impl AsRef<Path>) -> AppResult<usize> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Store(format!("Cannot read {}: {}", path.display(), e)))?;
        let books: Vec<Book> = serde_json::from_str(&raw)
            .map_err(|e| AppError::Store(format!("Invalid seed file {}: {}", path.display(), e)))?;

        let count = books.len();
        let mut inner = self.inner.write().await;
        for book in books {
            inner.books.insert(book.id, book);
        }
        Ok(count)
    }
}

#[async_trait]
impl BookInstanceStore for MemoryStore {
    async fn list_with_book(&self) -> AppResult<Vec<BookInstanceDetails>> {
        let inner = self.inner.read().await;
        Ok(inner
            .book_instances
            .values()
            .map(|instance| inner.details(instance))
            .collect())
    }

    async fn get(&self, id: &str) -> AppResult<Option<BookInstance>> {
        let id = parse_object_id(id)?;
        Ok(self.inner.read().await.book_instances.get(&id).cloned())
    }

    async fn get_with_book(&self, id: &str) -> AppResult<Option<BookInstanceDetails>> {
        let id = parse_object_id(id)?;
        let inner = self.inner.read().await;
        Ok(inner.book_instances.get(&id).map(|instance| inner.details(instance)))
    }

    async fn create(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let instance = BookInstance {
            id: Uuid::new_v4(),
            book: data.book_id()?,
            imprint: data.imprint.clone(),
            status: data.parsed_status()?,
            due_back: data.due_back,
        };
        self.inner
            .write()
            .await
            .book_instances
            .insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let id = parse_object_id(id)?;
        self.inner.write().await.book_instances.shift_remove(&id);
        Ok(())
    }
}

#[async_trait]
impl GenreStore for MemoryStore {
    async fn list_by_name(&self) -> AppResult<Vec<Genre>> {
        let mut genres: Vec<Genre> = self.inner.read().await.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn get(&self, id: &str) -> AppResult<Option<Genre>> {
        let id = parse_object_id(id)?;
        Ok(self.inner.read().await.genres.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        Ok(self
            .inner
            .read()
            .await
            .genres
            .values()
            .find(|genre| genre.name == name)
            .cloned())
    }

    async fn create(&self, data: &CreateGenre) -> AppResult<Genre> {
        let genre = Genre {
            id: Uuid::new_v4(),
            name: data.name.clone(),
        };
        self.inner.write().await.genres.insert(genre.id, genre.clone());
        Ok(genre)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let id = parse_object_id(id)?;
        self.inner.write().await.genres.shift_remove(&id);
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list_titles(&self) -> AppResult<Vec<BookTitle>> {
        Ok(self
            .inner
            .read()
            .await
            .books
            .values()
            .map(BookTitle::from)
            .collect())
    }

    async fn find_by_genre(&self, genre_id: &str) -> AppResult<Vec<Book>> {
        let genre_id = parse_object_id(genre_id)?;
        Ok(self
            .inner
            .read()
            .await
            .books
            .values()
            .filter(|book| book.has_genre(genre_id))
            .cloned()
            .collect())
    }
}
