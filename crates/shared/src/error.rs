//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every operation in the system resolves failures to one of these kinds.
/// Callers branch on the kind (or the stable `error_code`), never on the
/// human-readable message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    /// Authentication failed (missing or invalid credentials).
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Role or tenant-ownership check failed. No side effect occurred.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Referenced entity absent or not tenant-visible.
    ///
    /// Entities belonging to another tenant surface as `NotFound`, never as
    /// `Forbidden`, to avoid leaking cross-tenant existence.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or out-of-range input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Would violate a uniqueness or referential-integrity invariant.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the stable machine-readable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
