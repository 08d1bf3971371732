//! Genre pages

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

use super::render;
use crate::{
    error::{AppError, AppResult},
    models::CreateGenre,
    services::catalog::GenreDeletion,
    validation::{self, RawForm, GENRE_RULES},
    views::Page,
    AppState,
};

const LIST_URL: &str = "/catalog/genres";
const FORM_TITLE: &str = "添加类型";
const DELETE_TITLE: &str = "删除类型";

/// List genres sorted by name
pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let genre_list = state.services.catalog.list_genres().await?;
    render(
        &state,
        Page::GenreList {
            title: "类型列表",
            genre_list,
        },
    )
}

/// Genre with the books in it
pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let (genre, genre_books) = state.services.catalog.genre_with_books(&id).await?;
    let genre = genre.ok_or_else(|| AppError::NotFound("类型未找到".to_string()))?;

    render(
        &state,
        Page::GenreDetail {
            title: "书籍类型",
            genre,
            genre_books,
        },
    )
}

pub async fn create_form(State(state): State<AppState>) -> AppResult<Response> {
    render(
        &state,
        Page::GenreForm {
            title: FORM_TITLE,
            genre: None,
            errors: Vec::new(),
        },
    )
}

/// Validate, then redirect to an existing genre of the same name or to the new one
pub async fn create(
    State(state): State<AppState>,
    Form(raw): Form<RawForm>,
) -> AppResult<Response> {
    let submission = validation::process(&raw, GENRE_RULES);
    let data = CreateGenre::from_submission(&submission);

    if !submission.is_valid() {
        tracing::debug!(errors = submission.errors.len(), "Genre form rejected");
        return render(
            &state,
            Page::GenreForm {
                title: FORM_TITLE,
                genre: Some(data),
                errors: submission.errors,
            },
        );
    }

    let outcome = state.services.catalog.find_or_create_genre(&data).await?;
    Ok(Redirect::to(&outcome.genre().url()).into_response())
}

/// Confirm page listing dependent books; a missing genre goes back to the list
pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let (genre, genre_books) = state.services.catalog.genre_with_books(&id).await?;
    let Some(genre) = genre else {
        return Ok(Redirect::to(LIST_URL).into_response());
    };

    render(
        &state,
        Page::GenreDelete {
            title: DELETE_TITLE,
            genre: Some(genre),
            genre_books,
        },
    )
}

/// Delete the genre named by the `genreid` form field unless books use it
pub async fn delete(
    State(state): State<AppState>,
    Form(raw): Form<RawForm>,
) -> AppResult<Response> {
    let id = raw.get("genreid").map(String::as_str).unwrap_or("");

    match state.services.catalog.delete_genre(id).await? {
        GenreDeletion::Deleted => Ok(Redirect::to(LIST_URL).into_response()),
        GenreDeletion::Blocked { genre, books } => render(
            &state,
            Page::GenreDelete {
                title: DELETE_TITLE,
                genre,
                genre_books: books,
            },
        ),
    }
}

pub async fn update_form() -> Html<&'static str> {
    Html("未实现：书籍种类更新表单的 GET")
}

pub async fn update() -> Html<&'static str> {
    Html("未实现：更新书籍种类的 POST")
}
