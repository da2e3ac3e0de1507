/// Error types for Blog Service
///
/// Services return `AppError`; only the transport layer turns it into an
/// HTTP response. Bodies have the shape `{"error": {"code", "message"}}` and
/// never carry database or internal details.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required input missing or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Bearer token absent, undecodable, expired or carrying a bad subject
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Login failed
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Policy engine denied the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique name or email already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for the response body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::InvalidToken(_) => "INVALID_TOKEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{} {} not found", what, id))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let message = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Forbidden(reason) => {
                tracing::warn!(reason = %reason, "Request denied by policy");
                self.to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        }))
    }
}

/// Unique-constraint losers surface as `Conflict`; everything else is a 500
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation {
                let what = match db_err.constraint() {
                    Some("users_username_key") => "Username",
                    Some("users_email_key") => "Email",
                    Some("blogs_name_key") => "Blog name",
                    Some("tags_name_key") => "Tag name",
                    _ => "Value",
                };
                return AppError::Conflict(format!("{} is already taken", what));
            }
        }
        AppError::Database(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidArgument(errors.to_string())
    }
}

impl From<crypto_core::PasswordError> for AppError {
    fn from(err: crypto_core::PasswordError) -> Self {
        match err {
            crypto_core::PasswordError::Weak(msg) => AppError::InvalidArgument(msg),
            crypto_core::PasswordError::Hash(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<crypto_core::JwtError> for AppError {
    fn from(err: crypto_core::JwtError) -> Self {
        match err {
            crypto_core::JwtError::Invalid(e) => AppError::InvalidToken(e.to_string()),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}
