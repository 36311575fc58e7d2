//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A catalog entry with a single lendable copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// `true` while the single copy can be borrowed
    pub availability: bool,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be 1 to 255 characters"))]
    pub author: String,
    /// Defaults to `true`
    #[serde(default = "default_availability")]
    pub availability: bool,
}

fn default_availability() -> bool {
    true
}

/// Partial update of a book; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Author must be 1 to 255 characters"))]
    pub author: Option<String>,
    pub availability: Option<bool>,
}

impl UpdateBook {
    /// Apply the present fields onto an existing record
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(availability) = self.availability {
            book.availability = availability;
        }
    }
}
