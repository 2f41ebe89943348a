use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error; // Use thiserror for cleaner error definitions
use uuid::Uuid;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Trophy not found with ID: {0}")]
    NotFound(Uuid), // More specific than just string

    #[error("Stored record is unreadable: {0}")]
    DataCorruption(String),

    #[error("Database backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from DB layer
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("{0}")]
    Validation(String),
    #[error("Invalid trophy id")]
    InvalidId(#[from] uuid::Error),

    // Domain/Service level errors (mapped from RepoError)
    #[error("Trophy not found")]
    TrophyNotFound(Uuid),
    #[error("Could not access trophy data")]
    RepositoryError(#[source] RepoError), // Source allows seeing underlying RepoError

    // Middleware rejections
    #[error("Not allowed by CORS")]
    OriginNotAllowed(String),
    #[error("Too many requests, please try again later.")]
    RateLimitExceeded,
    #[error("Route not found")]
    RouteNotFound,

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String), // Keep simple string for now
    #[error("Initialization error: {0}")]
    InitError(String),

    // Generic Internal Server Error
    #[error("Internal server error: {0}")]
    InternalServerError(String), // Catch-all or specific internal issues
}

// --- Conversions from Domain Errors to AppError ---

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => AppError::TrophyNotFound(id),
            // Corruption and backend failures both surface as a 500
            e @ (RepoError::DataCorruption(_) | RepoError::BackendError(_)) => {
                AppError::RepositoryError(e)
            }
        }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<aws_smithy_types::error::operation::BuildError> for AppError {
    fn from(err: aws_smithy_types::error::operation::BuildError) -> Self {
        AppError::InitError(format!("Failed to build store request: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalServerError(format!("IO error: {}", err))
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::TrophyNotFound(_) | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::RepositoryError(_)
            | AppError::ConfigError(_)
            | AppError::InitError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// --- Axum Response Implementation ---

// Terminal error handler: every AppError leaving a handler or middleware is
// rendered here as `{"message": ...}` with the mapped status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // 5xx details go to the log, not the wire
            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                "Server Error".to_string()
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "Server Error".to_string()
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                "Server Error".to_string()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                "Server Error".to_string()
            }
            other => other.to_string(),
        };

        if status.is_client_error() {
            tracing::warn!(error.message = %message, error.status = %status, "Responding with error");
        }

        let body = Json(serde_json::json!({ "message": message }));
        (status, body).into_response()
    }
}
