use bookbank_db::StoreError;
use bookbank_http::error::AppError;
use serde_json::json;
use thiserror::Error;

/// Failures of the lending operations. Display text is user-facing.
#[derive(Error, Debug)]
pub enum LendingError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Book not found")]
    NotFound { title: String },

    #[error("Server error")]
    Persistence(#[from] StoreError),
}

impl LendingError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(title: impl Into<String>) -> Self {
        Self::NotFound {
            title: title.into(),
        }
    }
}

impl From<LendingError> for AppError {
    fn from(err: LendingError) -> Self {
        match err {
            LendingError::Validation { field, message } => AppError::validation(
                vec![json!({ "field": field, "error": message.clone() })],
                message,
            ),
            not_found @ LendingError::NotFound { .. } => AppError::not_found(not_found.to_string()),
            LendingError::Persistence(source) => {
                AppError::Internal(anyhow::Error::new(source).context("Server error"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn maps_to_http_categories() {
        let validation: AppError = LendingError::validation("title", "Book title is required").into();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let missing: AppError = LendingError::not_found("Dune").into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let store = StoreError::Io {
            path: "books.json".into(),
            source: io,
        };
        let fault: AppError = LendingError::from(store).into();
        assert_eq!(fault.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
