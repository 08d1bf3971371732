//! Book instances repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use super::{parse_object_id, BookInstanceStore};
use crate::{
    error::AppResult,
    models::{Book, BookInstance, BookInstanceDetails, BookInstanceStatus, CreateBookInstance},
};

const SELECT_WITH_BOOK: &str = r#"
    SELECT bi.id, bi.book, bi.imprint, bi.status, bi.due_back,
           b.id AS book_id, b.title AS book_title, b.summary AS book_summary,
           b.isbn AS book_isbn, b.genre AS book_genre
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book
"#;

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a `SELECT_WITH_BOOK` row; the book columns are NULL for a dangling reference
fn details_from_row(row: &PgRow) -> BookInstanceDetails {
    let book_id: Option<Uuid> = row.get("book_id");
    let book = book_id.map(|id| Book {
        id,
        title: row.get("book_title"),
        summary: row.get("book_summary"),
        isbn: row.get("book_isbn"),
        genre: row.get("book_genre"),
    });

    BookInstanceDetails {
        id: row.get("id"),
        book,
        imprint: row.get("imprint"),
        status: row.get::<BookInstanceStatus, _>("status"),
        due_back: row.get::<Option<NaiveDate>, _>("due_back"),
    }
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn list_with_book(&self) -> AppResult<Vec<BookInstanceDetails>> {
        let rows = sqlx::query(&format!("{} ORDER BY bi.crea_date", SELECT_WITH_BOOK))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    async fn get(&self, id: &str) -> AppResult<Option<BookInstance>> {
        let id = parse_object_id(id)?;
        let row = sqlx::query_as::<_, BookInstance>(
            "SELECT id, book, imprint, status, due_back FROM book_instances WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_with_book(&self, id: &str) -> AppResult<Option<BookInstanceDetails>> {
        let id = parse_object_id(id)?;
        let row = sqlx::query(&format!("{} WHERE bi.id = $1", SELECT_WITH_BOOK))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(details_from_row))
    }

    async fn create(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let book = data.book_id()?;
        let status = data.parsed_status()?;

        let row = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, book, imprint, status, due_back
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book)
        .bind(&data.imprint)
        .bind(status)
        .bind(data.due_back)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let id = parse_object_id(id)?;
        sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
