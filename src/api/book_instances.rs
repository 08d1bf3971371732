//! Book instance (copy) pages

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

use super::render;
use crate::{
    error::{AppError, AppResult},
    models::CreateBookInstance,
    validation::{self, RawForm, BOOK_INSTANCE_RULES},
    views::Page,
    AppState,
};

const LIST_URL: &str = "/catalog/bookinstances";
const FORM_TITLE: &str = "添加副本";

/// List every copy with its book
pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let bookinstance_list = state.services.catalog.list_book_instances().await?;
    render(
        &state,
        Page::BookinstanceList {
            title: "副本信息",
            bookinstance_list,
        },
    )
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let bookinstance = state
        .services
        .catalog
        .get_book_instance_details(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("副本未找到".to_string()))?;

    render(
        &state,
        Page::BookinstanceDetail {
            title: "书名:",
            bookinstance,
        },
    )
}

pub async fn create_form(State(state): State<AppState>) -> AppResult<Response> {
    let book_list = state.services.catalog.book_titles().await?;
    render(
        &state,
        Page::BookinstanceForm {
            title: FORM_TITLE,
            book_list,
            selected_book: None,
            errors: Vec::new(),
            bookinstance: None,
        },
    )
}

/// Validate, then either re-render the form or save and redirect
pub async fn create(
    State(state): State<AppState>,
    Form(raw): Form<RawForm>,
) -> AppResult<Response> {
    let submission = validation::process(&raw, BOOK_INSTANCE_RULES);
    let data = CreateBookInstance::from_submission(&submission);

    if !submission.is_valid() {
        tracing::debug!(errors = submission.errors.len(), "Book instance form rejected");
        let book_list = state.services.catalog.book_titles().await?;
        return render(
            &state,
            Page::BookinstanceForm {
                title: FORM_TITLE,
                book_list,
                selected_book: Some(data.book.clone()),
                errors: submission.errors,
                bookinstance: Some(data),
            },
        );
    }

    let instance = state.services.catalog.create_book_instance(&data).await?;
    Ok(Redirect::to(&instance.url()).into_response())
}

/// Confirm page; a missing copy goes back to the list
pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match state.services.catalog.get_book_instance(&id).await? {
        Some(bookinstance) => render(
            &state,
            Page::BookinstanceDelete {
                title: "删除副本",
                bookinstance,
            },
        ),
        None => Ok(Redirect::to(LIST_URL).into_response()),
    }
}

/// Delete the copy named by the `bookinstanceid` form field
pub async fn delete(
    State(state): State<AppState>,
    Form(raw): Form<RawForm>,
) -> AppResult<Response> {
    let id = raw.get("bookinstanceid").map(String::as_str).unwrap_or("");
    state.services.catalog.delete_book_instance(id).await?;
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn update_form() -> Html<&'static str> {
    Html("未实现：书籍副本更新表单的 GET")
}

pub async fn update() -> Html<&'static str> {
    Html("未实现：更新书籍副本的 POST")
}
