//! Book instance (physical copy) model and related types

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::book::Book;
use crate::{
    error::{AppError, AppResult},
    repository::parse_object_id,
    validation::Submission,
};

/// Loan status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "book_instance_status")]
pub enum BookInstanceStatus {
    Available,
    Maintenance,
    Loaned,
    Reserved,
}

impl Default for BookInstanceStatus {
    fn default() -> Self {
        BookInstanceStatus::Maintenance
    }
}

impl BookInstanceStatus {
    pub const ALL: [BookInstanceStatus; 4] = [
        BookInstanceStatus::Maintenance,
        BookInstanceStatus::Available,
        BookInstanceStatus::Loaned,
        BookInstanceStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }
}

impl FromStr for BookInstanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(BookInstanceStatus::Available),
            "Maintenance" => Ok(BookInstanceStatus::Maintenance),
            "Loaned" => Ok(BookInstanceStatus::Loaned),
            "Reserved" => Ok(BookInstanceStatus::Reserved),
            other => Err(AppError::Store(format!(
                "`{}` is not a valid value for status",
                other
            ))),
        }
    }
}

impl fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Book instance record as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct BookInstance {
    pub id: Uuid,
    /// Referenced book
    pub book: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    pub fn url(&self) -> String {
        instance_url(self.id)
    }

    pub fn due_back_formatted(&self) -> String {
        self.due_back.map(format_due_back).unwrap_or_default()
    }
}

/// Book instance with its book reference resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookInstanceDetails {
    pub id: Uuid,
    /// `None` when the referenced book no longer exists
    pub book: Option<Book>,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstanceDetails {
    pub fn new(instance: BookInstance, book: Option<Book>) -> Self {
        Self {
            id: instance.id,
            book,
            imprint: instance.imprint,
            status: instance.status,
            due_back: instance.due_back,
        }
    }

    pub fn url(&self) -> String {
        instance_url(self.id)
    }

    pub fn due_back_formatted(&self) -> String {
        self.due_back.map(format_due_back).unwrap_or_default()
    }
}

/// Create book instance request, built from a sanitized form submission.
///
/// Fields hold the sanitized text exactly as submitted so the form can be
/// echoed back on validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CreateBookInstance {
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: Option<NaiveDate>,
}

impl CreateBookInstance {
    pub fn from_submission(submission: &Submission) -> Self {
        Self {
            book: submission.text("book").to_string(),
            imprint: submission.text("imprint").to_string(),
            status: submission.text("status").to_string(),
            due_back: submission.date("due_back"),
        }
    }

    /// Referenced book id; a malformed id is a store failure
    pub fn book_id(&self) -> AppResult<Uuid> {
        parse_object_id(&self.book)
    }

    /// Status to persist; empty falls back to the default
    pub fn parsed_status(&self) -> AppResult<BookInstanceStatus> {
        if self.status.is_empty() {
            return Ok(BookInstanceStatus::default());
        }
        self.status.parse()
    }
}

fn instance_url(id: Uuid) -> String {
    format!("/catalog/bookinstance/{}", id)
}

/// `Oct 16th, 2026`
fn format_due_back(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", date.format("%b"), day, suffix, date.year())
}
