// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use common::ValidationError;

/// The three owner-scoped entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Note,
    TimerSession,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Note => "Note",
            Self::TimerSession => "Timer session",
        }
    }
}

/// Failure of a store operation.
///
/// `NotFound` covers both a missing id and an id owned by someone else;
/// callers cannot tell the two apart.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{} not found", .0.label())]
    NotFound(EntityKind),

    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// --- HTTP error mapping ---

/// Error returned by every handler. Rendered as
/// `{ "success": false, "message": ..., "error": ... }`.
#[derive(Debug)]
pub struct AppError {
    pub(crate) code: StatusCode,
    pub(crate) message: String,
    pub(crate) detail: String,
}

impl AppError {
    pub fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            detail: message.to_string(),
        }
    }

    fn with_detail(code: StatusCode, message: &str, detail: String) -> Self {
        Self {
            code,
            message: message.to_string(),
            detail,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(err) => Self::new(StatusCode::BAD_REQUEST, err.message()),
            StoreError::NotFound(kind) => {
                Self::new(StatusCode::NOT_FOUND, &format!("{} not found", kind.label()))
            }
            StoreError::Persistence(err) => {
                // Log the internal error for debugging.
                tracing::error!("Internal server error: {:?}", err);
                Self::with_detail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred.",
                    err.to_string(),
                )
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        StoreError::from(err).into()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::with_detail(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            rejection.body_text(),
        )
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::with_detail(
            StatusCode::BAD_REQUEST,
            "Invalid query parameters",
            rejection.body_text(),
        )
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        (
            self.code,
            Json(serde_json::json!({
                "success": false,
                "message": self.message,
                "error": self.detail,
            })),
        )
            .into_response()
    }
}
