//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::Submission;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}

/// Create genre request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CreateGenre {
    pub name: String,
}

impl CreateGenre {
    pub fn from_submission(submission: &Submission) -> Self {
        Self {
            name: submission.text("name").to_string(),
        }
    }
}
