//! API integration tests over the in-memory store

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use catalog_server::{
    create_router,
    models::{Book, BookInstanceStatus, CreateGenre},
    repository::{memory::MemoryStore, BookInstanceStore, GenreStore, Repository},
    views::{html::HtmlRenderer, Page, Render},
    AppError, AppResult, AppState,
};

/// Emits the page data as JSON so tests can inspect what would be rendered
struct JsonRenderer;

impl Render for JsonRenderer {
    fn render(&self, page: &Page) -> AppResult<String> {
        serde_json::to_string(page).map_err(|e| AppError::Render(e.to_string()))
    }
}

struct TestApp {
    router: Router,
    store: MemoryStore,
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("Response body is not page JSON")
    }
}

fn setup() -> TestApp {
    setup_with(Arc::new(JsonRenderer))
}

fn setup_with(renderer: Arc<dyn Render>) -> TestApp {
    let store = MemoryStore::new();
    let state = AppState::new(Repository::in_memory(store.clone()), renderer);
    TestApp {
        router: create_router(state),
        store,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn genre(&self, name: &str) -> catalog_server::models::Genre {
        GenreStore::create(&self.store, &CreateGenre { name: name.into() })
            .await
            .unwrap()
    }
}

// ---------------------------------------------------------------------------
// Book instances
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_book_instance_redirects_to_detail() {
    let app = setup();
    let book = Book::new("Dune");
    app.store.insert_book(book.clone()).await;

    let response = app
        .post_form(
            "/catalog/bookinstance/create",
            &format!(
                "book=%20{}%20&imprint=%20%20Chilton%20%3C1965%3E%20&status=Loaned&due_back=2026-10-16",
                book.id
            ),
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let instances = app.store.list_with_book().await.unwrap();
    assert_eq!(instances.len(), 1);
    let saved = &instances[0];
    assert_eq!(
        response.location.as_deref(),
        Some(format!("/catalog/bookinstance/{}", saved.id).as_str())
    );
    assert_eq!(saved.imprint, "Chilton &lt;1965&gt;");
    assert_eq!(saved.status, BookInstanceStatus::Loaned);
    assert_eq!(saved.due_back.unwrap().to_string(), "2026-10-16");
    assert_eq!(saved.book.as_ref().unwrap().id, book.id);

    let detail = app.get(response.location.as_deref().unwrap()).await;
    assert_eq!(detail.status, StatusCode::OK);
    let page = detail.json();
    assert_eq!(page["view"], "bookinstance_detail");
    assert_eq!(page["title"], "书名:");
    assert_eq!(page["bookinstance"]["book"]["title"], "Dune");
}

#[tokio::test]
async fn test_create_book_instance_missing_fields_rerenders() {
    let app = setup();
    let book = Book::new("Dune");
    app.store.insert_book(book.clone()).await;

    let response = app
        .post_form("/catalog/bookinstance/create", "book=&imprint=%20%20&status=Available")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let page = response.json();
    assert_eq!(page["view"], "bookinstance_form");
    assert_eq!(page["title"], "添加副本");
    let messages: Vec<&str> = page["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["Book must be specified", "Imprint must be specified"]);
    assert_eq!(page["book_list"][0]["title"], "Dune");
    assert_eq!(page["selected_book"], "");
    assert_eq!(page["bookinstance"]["status"], "Available");

    assert!(app.store.list_with_book().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_book_instance_missing_imprint_only() {
    let app = setup();
    let book = Book::new("Dune");
    app.store.insert_book(book.clone()).await;

    let response = app
        .post_form(
            "/catalog/bookinstance/create",
            &format!("book={}&imprint=&status=Available", book.id),
        )
        .await;

    let page = response.json();
    assert_eq!(page["errors"].as_array().unwrap().len(), 1);
    assert_eq!(page["errors"][0]["field"], "imprint");
    assert_eq!(page["selected_book"], book.id.to_string());
    assert!(app.store.list_with_book().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_due_back_is_accepted() {
    let app = setup();
    let book = Book::new("Dune");
    app.store.insert_book(book.clone()).await;

    let response = app
        .post_form(
            "/catalog/bookinstance/create",
            &format!("book={}&imprint=Ace&status=Available&due_back=", book.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let instances = app.store.list_with_book().await.unwrap();
    assert_eq!(instances[0].due_back, None);
}

#[tokio::test]
async fn test_invalid_due_back_single_error() {
    let app = setup();
    let book = Book::new("Dune");
    app.store.insert_book(book.clone()).await;

    let response = app
        .post_form(
            "/catalog/bookinstance/create",
            &format!("book={}&imprint=Ace&status=Available&due_back=not-a-date", book.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let page = response.json();
    let errors = page["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["message"], "Invalid date");
    assert!(app.store.list_with_book().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_status_is_store_failure() {
    let app = setup();
    let book = Book::new("Dune");
    app.store.insert_book(book.clone()).await;

    let response = app
        .post_form(
            "/catalog/bookinstance/create",
            &format!("book={}&imprint=Ace&status=Lost", book.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.store.list_with_book().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_book_instance_detail_not_found() {
    let app = setup();
    let response = app
        .get(&format!("/catalog/bookinstance/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let page = response.json();
    assert_eq!(page["view"], "error");
    assert_eq!(page["message"], "副本未找到");
    assert_eq!(page["status"], 404);
}

#[tokio::test]
async fn test_malformed_id_is_server_error() {
    let app = setup();
    let response = app.get("/catalog/bookinstance/12345").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let page = response.json();
    assert_eq!(page["view"], "error");
    assert_eq!(page["message"], "Database error");
}

#[tokio::test]
async fn test_book_instance_list() {
    let app = setup();
    let book = Book::new("Dune");
    app.store.insert_book(book.clone()).await;
    app.post_form(
        "/catalog/bookinstance/create",
        &format!("book={}&imprint=Ace&status=Available", book.id),
    )
    .await;

    let response = app.get("/catalog/bookinstances").await;
    let page = response.json();
    assert_eq!(page["view"], "bookinstance_list");
    assert_eq!(page["title"], "副本信息");
    assert_eq!(page["bookinstance_list"].as_array().unwrap().len(), 1);
    assert_eq!(page["bookinstance_list"][0]["book"]["title"], "Dune");
}

#[tokio::test]
async fn test_book_instance_delete_flow() {
    let app = setup();
    let book = Book::new("Dune");
    app.store.insert_book(book.clone()).await;
    let created = app
        .post_form(
            "/catalog/bookinstance/create",
            &format!("book={}&imprint=Ace&status=Available", book.id),
        )
        .await;
    let url = created.location.unwrap();
    let id = url.rsplit('/').next().unwrap().to_string();

    let confirm = app.get(&format!("{}/delete", url)).await;
    assert_eq!(confirm.status, StatusCode::OK);
    let page = confirm.json();
    assert_eq!(page["view"], "bookinstance_delete");
    assert_eq!(page["bookinstance"]["id"], id);

    let response = app
        .post_form("/catalog/bookinstance/delete", &format!("bookinstanceid={}", id))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/catalog/bookinstances"));
    assert!(app.store.list_with_book().await.unwrap().is_empty());

    let gone = app.get(&format!("{}/delete", url)).await;
    assert_eq!(gone.status, StatusCode::SEE_OTHER);
    assert_eq!(gone.location.as_deref(), Some("/catalog/bookinstances"));
}

#[tokio::test]
async fn test_book_instance_delete_from_confirm_url() {
    let app = setup();
    let book = Book::new("Dune");
    app.store.insert_book(book.clone()).await;
    let created = app
        .post_form(
            "/catalog/bookinstance/create",
            &format!("book={}&imprint=Ace&status=Available", book.id),
        )
        .await;
    let url = created.location.unwrap();
    let id = url.rsplit('/').next().unwrap().to_string();

    let response = app
        .post_form(&format!("{}/delete", url), &format!("bookinstanceid={}", id))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(app.store.list_with_book().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_book_instance_update_placeholders() {
    let app = setup();
    let id = Uuid::new_v4();

    let response = app.get(&format!("/catalog/bookinstance/{}/update", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "未实现：书籍副本更新表单的 GET");

    let response = app
        .post_form(&format!("/catalog/bookinstance/{}/update", id), "imprint=x")
        .await;
    assert_eq!(response.body, "未实现：更新书籍副本的 POST");
    assert!(app.store.list_with_book().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_genre_list_sorted() {
    let app = setup();
    app.genre("Poetry").await;
    app.genre("Fantasy").await;

    let page = app.get("/catalog/genres").await.json();
    assert_eq!(page["view"], "genre_list");
    assert_eq!(page["title"], "类型列表");
    assert_eq!(page["genre_list"][0]["name"], "Fantasy");
    assert_eq!(page["genre_list"][1]["name"], "Poetry");
}

#[tokio::test]
async fn test_create_genre() {
    let app = setup();
    let response = app
        .post_form("/catalog/genre/create", "name=%20Science%20Fiction%20")
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let genres = app.store.list_by_name().await.unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].name, "Science Fiction");
    assert_eq!(response.location, Some(genres[0].url()));
}

#[tokio::test]
async fn test_create_duplicate_genre_redirects_to_existing() {
    let app = setup();
    let existing = app.genre("Fantasy").await;

    let response = app.post_form("/catalog/genre/create", "name=Fantasy").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location, Some(existing.url()));
    assert_eq!(app.store.list_by_name().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_genre_name_match_is_case_sensitive() {
    let app = setup();
    app.genre("Fantasy").await;

    let response = app.post_form("/catalog/genre/create", "name=fantasy").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(app.store.list_by_name().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_genre_empty_name_rerenders() {
    let app = setup();
    let response = app.post_form("/catalog/genre/create", "name=%20%20").await;

    assert_eq!(response.status, StatusCode::OK);
    let page = response.json();
    assert_eq!(page["view"], "genre_form");
    assert_eq!(page["title"], "添加类型");
    assert_eq!(page["errors"][0]["message"], "Genre name required");
    assert_eq!(page["genre"]["name"], "");
    assert!(app.store.list_by_name().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_genre_detail_lists_books() {
    let app = setup();
    let genre = app.genre("Fantasy").await;
    app.store
        .insert_book(Book::new("The Hobbit").with_genre(genre.id))
        .await;
    app.store.insert_book(Book::new("Dune")).await;

    let response = app.get(&genre.url()).await;
    assert_eq!(response.status, StatusCode::OK);
    let page = response.json();
    assert_eq!(page["view"], "genre_detail");
    assert_eq!(page["title"], "书籍类型");
    assert_eq!(page["genre"]["name"], "Fantasy");
    assert_eq!(page["genre_books"].as_array().unwrap().len(), 1);
    assert_eq!(page["genre_books"][0]["title"], "The Hobbit");
}

#[tokio::test]
async fn test_genre_detail_not_found() {
    let app = setup();
    let response = app.get(&format!("/catalog/genre/{}", Uuid::new_v4())).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let page = response.json();
    assert_eq!(page["view"], "error");
    assert_eq!(page["message"], "类型未找到");
}

#[tokio::test]
async fn test_delete_genre_without_books() {
    let app = setup();
    let genre = app.genre("Poetry").await;

    let confirm = app.get(&format!("{}/delete", genre.url())).await;
    assert_eq!(confirm.status, StatusCode::OK);
    let page = confirm.json();
    assert_eq!(page["view"], "genre_delete");
    assert_eq!(page["title"], "删除类型");
    assert!(page["genre_books"].as_array().unwrap().is_empty());

    let response = app
        .post_form(
            &format!("{}/delete", genre.url()),
            &format!("genreid={}", genre.id),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/catalog/genres"));
    assert!(app.store.list_by_name().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_genre_with_books_is_refused() {
    let app = setup();
    let genre = app.genre("Fantasy").await;
    app.store
        .insert_book(Book::new("The Hobbit").with_genre(genre.id))
        .await;

    let response = app
        .post_form(
            &format!("{}/delete", genre.url()),
            &format!("genreid={}", genre.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let page = response.json();
    assert_eq!(page["view"], "genre_delete");
    assert_eq!(page["genre"]["id"], genre.id.to_string());
    assert_eq!(page["genre_books"][0]["title"], "The Hobbit");
    assert_eq!(app.store.list_by_name().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_confirm_missing_genre_redirects() {
    let app = setup();
    let response = app
        .get(&format!("/catalog/genre/{}/delete", Uuid::new_v4()))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/catalog/genres"));
}

#[tokio::test]
async fn test_genre_update_placeholders() {
    let app = setup();
    let genre = app.genre("Fantasy").await;

    let response = app.get(&format!("{}/update", genre.url())).await;
    assert_eq!(response.body, "未实现：书籍种类更新表单的 GET");

    let response = app
        .post_form(&format!("{}/update", genre.url()), "name=Horror")
        .await;
    assert_eq!(response.body, "未实现：更新书籍种类的 POST");

    let genres = app.store.list_by_name().await.unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].name, "Fantasy");
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let response = app.get("/health").await;
    assert!(response.status.is_success());
    assert_eq!(response.json()["status"], "healthy");

    let response = app.get("/ready").await;
    assert_eq!(response.json()["status"], "ready");
}

#[tokio::test]
async fn test_root_redirects_to_genres() {
    let app = setup();
    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/catalog/genres"));
}

// ---------------------------------------------------------------------------
// HTML rendering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_html_genre_list_escapes_unsanitized_names() {
    let app = setup_with(Arc::new(HtmlRenderer));
    app.genre("<b>x</b>").await;

    let response = app.get("/catalog/genres").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("&lt;b&gt;x&lt;/b&gt;"));
    assert!(!response.body.contains("<b>x</b>"));
}

#[tokio::test]
async fn test_html_created_genre_is_escaped_once() {
    let app = setup_with(Arc::new(HtmlRenderer));
    let response = app
        .post_form("/catalog/genre/create", "name=Sci-Fi+%26+Fantasy")
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let response = app.get("/catalog/genres").await;
    assert!(response.body.contains(">Sci-Fi &amp; Fantasy</a>"));
    assert!(!response.body.contains("&amp;amp;"));
}

#[tokio::test]
async fn test_html_error_page() {
    let app = setup_with(Arc::new(HtmlRenderer));
    let response = app
        .get(&format!("/catalog/genre/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.starts_with("<!DOCTYPE html>"));
    assert!(response.body.contains("<h1>类型未找到</h1>"));
}
