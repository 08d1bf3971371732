//! HTTP handlers for the catalog pages

pub mod book_instances;
pub mod genres;
pub mod health;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::{AppResult, ErrorPage},
    views::Page,
    AppState,
};

/// Render a page through the configured renderer
pub(crate) fn render(state: &AppState, page: Page) -> AppResult<Response> {
    tracing::debug!(view = page.view(), "Rendering");
    let body = state.renderer.render(&page)?;
    Ok(Html(body).into_response())
}

/// Re-render error pages with the configured renderer
pub(crate) async fn render_error_page(State(state): State<AppState>, mut response: Response) -> Response {
    let Some(ErrorPage(page)) = response.extensions_mut().remove::<ErrorPage>() else {
        return response;
    };

    match state.renderer.render(&page) {
        Ok(body) => (response.status(), Html(body)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            response
        }
    }
}
