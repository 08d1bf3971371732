//! Error types for the catalog server

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::views::{html::HtmlRenderer, Page, Render};

/// Main application error type.
///
/// Only failures that end up on the shared error page live here. Form
/// validation failures and blocked deletions are recovered by the handlers
/// and never become an `AppError`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Store(_) | AppError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown on the error page
    fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                "Database error".to_string()
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {}", msg);
                "Internal server error".to_string()
            }
        }
    }
}

/// Error page data attached to an error response.
///
/// The router renders it again with the configured renderer; the built-in
/// HTML body is what callers outside the router get.
#[derive(Debug, Clone)]
pub struct ErrorPage(pub Page);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let page = Page::Error {
            message: self.public_message(),
            status: status.as_u16(),
        };

        let mut response = match HtmlRenderer.render(&page) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (status, status.to_string()).into_response()
            }
        };
        response.extensions_mut().insert(ErrorPage(page));
        response
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("副本未找到".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Store("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_details_are_hidden() {
        let err = AppError::Store("connection refused".into());
        assert_eq!(err.public_message(), "Database error");

        let err = AppError::NotFound("类型未找到".into());
        assert_eq!(err.public_message(), "类型未找到");
    }

    #[test]
    fn test_response_carries_error_page() {
        let response = AppError::NotFound("副本未找到".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        match response.extensions().get::<ErrorPage>() {
            Some(ErrorPage(Page::Error { message, status })) => {
                assert_eq!(message, "副本未找到");
                assert_eq!(*status, 404);
            }
            other => panic!("unexpected error page: {:?}", other),
        }
    }
}
