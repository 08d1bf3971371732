//! Catalog Server
//!
//! A server-rendered catalog for a small library: book copies and genres,
//! with books as a read-only reference. Write forms go through a
//! validate/sanitize pipeline before anything is persisted.

use std::sync::Arc;

use axum::{
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
    pub renderer: Arc<dyn views::Render>,
}

impl AppState {
    pub fn new(repository: repository::Repository, renderer: Arc<dyn views::Render>) -> Self {
        Self {
            services: Arc::new(services::Services::new(repository)),
            renderer,
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let catalog = Router::new()
        // Book instances
        .route("/bookinstances", get(api::book_instances::list))
        .route(
            "/bookinstance/create",
            get(api::book_instances::create_form).post(api::book_instances::create),
        )
        .route("/bookinstance/delete", post(api::book_instances::delete))
        .route("/bookinstance/:id", get(api::book_instances::detail))
        .route(
            "/bookinstance/:id/delete",
            get(api::book_instances::delete_form).post(api::book_instances::delete),
        )
        .route(
            "/bookinstance/:id/update",
            get(api::book_instances::update_form).post(api::book_instances::update),
        )
        // Genres
        .route("/genres", get(api::genres::list))
        .route(
            "/genre/create",
            get(api::genres::create_form).post(api::genres::create),
        )
        .route("/genre/:id", get(api::genres::detail))
        .route(
            "/genre/:id/delete",
            get(api::genres::delete_form).post(api::genres::delete),
        )
        .route(
            "/genre/:id/update",
            get(api::genres::update_form).post(api::genres::update),
        );

    Router::new()
        .route("/", get(|| async { Redirect::to("/catalog/genres") }))
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        .nest("/catalog", catalog)
        .layer(middleware::map_response_with_state(
            state.clone(),
            api::render_error_page,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
