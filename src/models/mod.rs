//! Data models for the catalog

pub mod book;
pub mod book_instance;
pub mod genre;

// Re-export commonly used types
pub use book::{Book, BookTitle};
pub use book_instance::{BookInstance, BookInstanceDetails, BookInstanceStatus, CreateBookInstance};
pub use genre::{CreateGenre, Genre};
