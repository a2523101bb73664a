use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    ConfigError(anyhow::Error),
    DatabaseError(anyhow::Error),
    ServerError(anyhow::Error),
    /// Stored credential material could not be parsed. Unexpected and
    /// fatal for the request; never exposed to the client in detail.
    CredentialStoreError(String),
    /// One message per violated input rule.
    ValidationError(Vec<String>),
    /// A well-formed request the current state cannot honor.
    InputError(String),
    ConflictError(String),
    NotFoundError(String),
    AuthenticationError(String),
    AuthorizationError(String),
    RateLimitError {
        detail: String,
        retry_after_secs: u64,
    },
}

impl AppError {
    /// The generic login failure. Identical for unknown usernames and wrong
    /// passwords so responses do not reveal which accounts exist.
    pub fn invalid_credentials() -> Self {
        Self::AuthenticationError("Incorrect username or password".to_string())
    }

    /// The generic bearer-token failure, shared by missing, malformed,
    /// badly signed, and expired tokens.
    pub fn could_not_validate_credentials() -> Self {
        Self::AuthenticationError("Could not validate credentials".to_string())
    }

    pub fn inactive_account() -> Self {
        Self::AuthorizationError("User account is inactive".to_string())
    }

    pub fn username_registered() -> Self {
        Self::ConflictError("Username already registered".to_string())
    }

    pub fn email_registered() -> Self {
        Self::ConflictError("Email already registered".to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(vec![message.into()])
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimitError {
            detail: format!(
                "Rate limit exceeded. Please try again in {} seconds",
                retry_after_secs
            ),
            retry_after_secs,
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self::NotFoundError(format!("{} not found", resource))
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::ServerError(error)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(e) => write!(f, "Configuration error: {}", e),
            Self::DatabaseError(e) => write!(f, "Database error: {}", e),
            Self::ServerError(e) => write!(f, "Server error: {}", e),
            Self::CredentialStoreError(msg) => write!(f, "Credential store error: {}", msg),
            Self::ValidationError(msgs) => write!(f, "Validation error: {}", msgs.join("; ")),
            Self::InputError(msg) => write!(f, "Input error: {}", msg),
            Self::ConflictError(msg) => write!(f, "Conflict: {}", msg),
            Self::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            Self::AuthenticationError(msg) => write!(f, "Authentication error: {}", msg),
            Self::AuthorizationError(msg) => write!(f, "Authorization error: {}", msg),
            Self::RateLimitError { detail, .. } => write!(f, "Rate limit error: {}", detail),
        }
    }
}

/// Wire shape for every error response: `{"detail": <string or list>}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::ConfigError(_) | Self::ServerError(_) | Self::CredentialStoreError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::Value::String("Internal server error".to_string()),
            ),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::Value::String("Internal server error".to_string()),
            ),
            Self::ValidationError(msgs) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::Value::Array(
                    msgs.iter()
                        .map(|m| serde_json::Value::String(m.clone()))
                        .collect(),
                ),
            ),
            Self::InputError(msg) | Self::ConflictError(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::Value::String(msg.clone()),
            ),
            Self::NotFoundError(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::Value::String(msg.clone()),
            ),
            Self::AuthenticationError(msg) => (
                StatusCode::UNAUTHORIZED,
                serde_json::Value::String(msg.clone()),
            ),
            Self::AuthorizationError(msg) => (
                StatusCode::FORBIDDEN,
                serde_json::Value::String(msg.clone()),
            ),
            Self::RateLimitError { detail, .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                serde_json::Value::String(detail.clone()),
            ),
        };

        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = %status.as_u16(), error = %self, "Request rejected");
        }

        let mut response = (status, Json(ErrorBody { detail })).into_response();

        match &self {
            Self::AuthenticationError(_) => {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            Self::RateLimitError {
                retry_after_secs, ..
            } => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
            }
            _ => {}
        }

        response
    }
}

pub type AppResult<T> = Result<T, AppError>;

// Extension trait to wrap anyhow errors with specific context
pub trait AppErrorExt<T> {
    fn config_err(self) -> AppResult<T>;
    fn db_err(self) -> AppResult<T>;
    fn server_err(self) -> AppResult<T>;
}

impl<T, E> AppErrorExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn config_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ConfigError(e.into()))
    }

    fn db_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::DatabaseError(e.into()))
    }

    fn server_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ServerError(e.into()))
    }
}
