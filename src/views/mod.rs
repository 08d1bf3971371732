//! Page data and rendering
//!
//! Handlers describe what to show as a [`Page`]: a view name plus the data it
//! needs. A [`Render`] implementation turns that into a document.

pub mod html;

use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Book, BookInstance, BookInstanceDetails, BookTitle, CreateBookInstance, CreateGenre, Genre},
    validation::FieldError,
};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Page {
    BookinstanceList {
        title: &'static str,
        bookinstance_list: Vec<BookInstanceDetails>,
    },
    BookinstanceDetail {
        title: &'static str,
        bookinstance: BookInstanceDetails,
    },
    BookinstanceForm {
        title: &'static str,
        book_list: Vec<BookTitle>,
        selected_book: Option<String>,
        errors: Vec<FieldError>,
        bookinstance: Option<CreateBookInstance>,
    },
    BookinstanceDelete {
        title: &'static str,
        bookinstance: BookInstance,
    },
    GenreList {
        title: &'static str,
        genre_list: Vec<Genre>,
    },
    GenreDetail {
        title: &'static str,
        genre: Genre,
        genre_books: Vec<Book>,
    },
    GenreForm {
        title: &'static str,
        genre: Option<CreateGenre>,
        errors: Vec<FieldError>,
    },
    GenreDelete {
        title: &'static str,
        genre: Option<Genre>,
        genre_books: Vec<Book>,
    },
    Error {
        message: String,
        status: u16,
    },
}

impl Page {
    /// View identifier
    pub fn view(&self) -> &'static str {
        match self {
            Page::BookinstanceList { .. } => "bookinstance_list",
            Page::BookinstanceDetail { .. } => "bookinstance_detail",
            Page::BookinstanceForm { .. } => "bookinstance_form",
            Page::BookinstanceDelete { .. } => "bookinstance_delete",
            Page::GenreList { .. } => "genre_list",
            Page::GenreDetail { .. } => "genre_detail",
            Page::GenreForm { .. } => "genre_form",
            Page::GenreDelete { .. } => "genre_delete",
            Page::Error { .. } => "error",
        }
    }
}

/// Template renderer
pub trait Render: Send + Sync {
    fn render(&self, page: &Page) -> AppResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_tag_matches_view_name() {
        let page = Page::GenreList {
            title: "类型列表",
            genre_list: vec![],
        };
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["view"], page.view());
        assert_eq!(value["title"], "类型列表");

        let page = Page::Error {
            message: "副本未找到".into(),
            status: 404,
        };
        assert_eq!(serde_json::to_value(&page).unwrap()["view"], "error");
    }
}
