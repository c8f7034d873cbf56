use bookbank_db::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::LendingError;

/// Countdown a book starts from when it is first exhausted.
pub const DEFAULT_DAYS_AVAILABLE: u32 = 15;

/// A catalog entry and its lending state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Title of the book, unique across the catalog
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Shelf category, e.g. "Fiction"
    pub category: String,
    /// Copies that can currently be lent out
    pub copies: u32,
    /// When the exhaustion countdown was last armed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<DateTime<Utc>>,
    /// Days left before the book is expected back
    #[serde(default = "default_days_available")]
    pub days_available: u32,
}

fn default_days_available() -> u32 {
    DEFAULT_DAYS_AVAILABLE
}

impl Book {
    /// A freshly stocked book that has never been exhausted
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
        copies: u32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            category: category.into(),
            copies,
            requested_at: None,
            days_available: DEFAULT_DAYS_AVAILABLE,
        }
    }
}

impl Record for Book {
    fn key(&self) -> &str {
        &self.title
    }
}

/// Request body for borrowing a book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBook {
    pub title: Option<String>,
}

/// Request body for adding stock; fields stay optional so missing values
/// surface as validation errors instead of decode failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub copies: Option<i64>,
}

/// Validated stock addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCopies {
    pub title: String,
    pub author: String,
    pub category: String,
    pub copies: u32,
}

const ADD_BOOK_INVALID: &str = "All fields are required, and copies must be at least 1";
const TITLE_REQUIRED: &str = "Book title is required";

impl NewCopies {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
        copies: u32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            category: category.into(),
            copies,
        }
    }

    pub fn into_book(self) -> Book {
        Book::new(self.title, self.author, self.category, self.copies)
    }
}

impl TryFrom<AddBook> for NewCopies {
    type Error = LendingError;

    fn try_from(input: AddBook) -> Result<Self, Self::Error> {
        let title = required(input.title, "title", ADD_BOOK_INVALID)?;
        let author = required(input.author, "author", ADD_BOOK_INVALID)?;
        let category = required(input.category, "category", ADD_BOOK_INVALID)?;
        let copies = input
            .copies
            .filter(|copies| *copies >= 1)
            .and_then(|copies| u32::try_from(copies).ok())
            .ok_or_else(|| LendingError::validation("copies", ADD_BOOK_INVALID))?;

        Ok(Self {
            title,
            author,
            category,
            copies,
        })
    }
}

impl RequestBook {
    /// The trimmed title, or a validation error when it is missing or blank
    pub fn title(self) -> Result<String, LendingError> {
        required(self.title, "title", TITLE_REQUIRED)
    }
}

/// Trim a required text field, rejecting missing and blank values
pub fn required(
    value: Option<String>,
    field: &'static str,
    message: &str,
) -> Result<String, LendingError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LendingError::validation(field, message))
}

/// Success payload returned by lending operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}
