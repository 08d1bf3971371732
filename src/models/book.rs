//! Book model (read-only in the catalog)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full book record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub isbn: String,
    /// Genres this book belongs to
    #[serde(default)]
    pub genre: Vec<Uuid>,
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            summary: String::new(),
            isbn: String::new(),
            genre: Vec::new(),
        }
    }

    pub fn with_genre(mut self, genre_id: Uuid) -> Self {
        self.genre.push(genre_id);
        self
    }

    pub fn has_genre(&self, genre_id: Uuid) -> bool {
        self.genre.contains(&genre_id)
    }
}

/// Id and title only, for selection lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct BookTitle {
    pub id: Uuid,
    pub title: String,
}

impl From<&Book> for BookTitle {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_genre() {
        let genre_id = Uuid::new_v4();
        let book = Book::new("The Name of the Wind").with_genre(genre_id);
        assert!(book.has_genre(genre_id));
        assert!(!book.has_genre(Uuid::new_v4()));
    }

    #[test]
    fn test_seed_json_defaults() {
        let book: Book = serde_json::from_str(
            r#"{"id": "6f0c1d6e-94a4-4d4c-9e8e-0d5b6b1a2c3d", "title": "Dune"}"#,
        )
        .unwrap();
        assert_eq!(book.title, "Dune");
        assert!(book.genre.is_empty());
        assert!(book.summary.is_empty());
    }
}
