//! Catalog management service
//!
//! Independent fetches within one request run concurrently with
//! `tokio::try_join!`; the first failure fails the whole operation.

use crate::{
    error::AppResult,
    models::{
        Book, BookInstance, BookInstanceDetails, BookTitle, CreateBookInstance, CreateGenre,
        Genre,
    },
    repository::Repository,
};

/// Outcome of a genre create request
#[derive(Debug, Clone, PartialEq)]
pub enum GenreCreation {
    /// A genre with that exact name already existed
    Existing(Genre),
    Created(Genre),
}

impl GenreCreation {
    pub fn genre(&self) -> &Genre {
        match self {
            GenreCreation::Existing(genre) | GenreCreation::Created(genre) => genre,
        }
    }
}

/// Outcome of a genre delete request
#[derive(Debug, Clone, PartialEq)]
pub enum GenreDeletion {
    Deleted,
    /// Books still reference the genre; nothing was removed
    Blocked {
        genre: Option<Genre>,
        books: Vec<Book>,
    },
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }

    // ---------------------------------------------------------------------
    // Book instances
    // ---------------------------------------------------------------------

    pub async fn list_book_instances(&self) -> AppResult<Vec<BookInstanceDetails>> {
        self.repository.book_instances.list_with_book().await
    }

    pub async fn get_book_instance_details(
        &self,
        id: &str,
    ) -> AppResult<Option<BookInstanceDetails>> {
        self.repository.book_instances.get_with_book(id).await
    }

    pub async fn get_book_instance(&self, id: &str) -> AppResult<Option<BookInstance>> {
        self.repository.book_instances.get(id).await
    }

    /// Titles for the book selector
    pub async fn book_titles(&self) -> AppResult<Vec<BookTitle>> {
        self.repository.books.list_titles().await
    }

    pub async fn create_book_instance(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let instance = self.repository.book_instances.create(data).await?;
        tracing::info!(id = %instance.id, book = %instance.book, "Created book instance");
        Ok(instance)
    }

    /// Look the copy up again, then remove it unconditionally
    pub async fn delete_book_instance(&self, id: &str) -> AppResult<()> {
        let existing = self.repository.book_instances.get(id).await?;
        if existing.is_none() {
            tracing::debug!(id, "Deleting book instance that does not exist");
        }
        self.repository.book_instances.delete(id).await?;
        tracing::info!(id, "Deleted book instance");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Genres
    // ---------------------------------------------------------------------

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list_by_name().await
    }

    /// The genre and every book referencing it, fetched concurrently
    pub async fn genre_with_books(&self, id: &str) -> AppResult<(Option<Genre>, Vec<Book>)> {
        tokio::try_join!(
            self.repository.genres.get(id),
            self.repository.books.find_by_genre(id),
        )
    }

    /// Reuse a genre with the same name or insert a new one.
    ///
    /// The lookup and the insert are not atomic; concurrent requests can
    /// still produce duplicate names.
    pub async fn find_or_create_genre(&self, data: &CreateGenre) -> AppResult<GenreCreation> {
        if let Some(existing) = self.repository.genres.find_by_name(&data.name).await? {
            tracing::debug!(id = %existing.id, name = %existing.name, "Genre already exists");
            return Ok(GenreCreation::Existing(existing));
        }

        let genre = self.repository.genres.create(data).await?;
        tracing::info!(id = %genre.id, name = %genre.name, "Created genre");
        Ok(GenreCreation::Created(genre))
    }

    /// Delete a genre unless books still reference it
    pub async fn delete_genre(&self, id: &str) -> AppResult<GenreDeletion> {
        let (genre, books) = self.genre_with_books(id).await?;

        if !books.is_empty() {
            tracing::info!(id, dependents = books.len(), "Genre delete blocked by books");
            return Ok(GenreDeletion::Blocked { genre, books });
        }

        self.repository.genres.delete(id).await?;
        tracing::info!(id, "Deleted genre");
        Ok(GenreDeletion::Deleted)
    }
}
