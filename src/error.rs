/// Unified Error Handling Module
///
/// Domain-specific error types folded into a single `AppError` used for
/// control flow, plus the HTTP mapping that renders every failure as the
/// API error envelope `{success, statusCode, message, errors?}`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Canonical messages shared between the server gate and the client-side
/// session coordinator. The coordinator keys its retry decision on
/// `TOKEN_EXPIRED`; every other 401 is terminal for it.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const TOKEN_EXPIRED: &str = "Token has expired";
pub const TOKEN_INVALID: &str = "Invalid token";
pub const UNAUTHORIZED: &str = "Unauthorized access";
pub const FORBIDDEN: &str = "Forbidden: insufficient permissions";
pub const ACCOUNT_BLOCKED: &str =
    "Your account has been blocked. Please contact an administrator.";

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// Credential store errors
#[derive(Debug)]
pub enum StoreError {
    Duplicate(String),
    QueryExecution(String),
    ConnectionPool(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Duplicate(msg) => write!(f, "{} already exists", msg),
            StoreError::QueryExecution(msg) => write!(f, "Query error: {}", msg),
            StoreError::ConnectionPool(msg) => write!(f, "Store connection error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            StoreError::Duplicate("Account".to_string())
        } else if error_msg.contains("pool") || error_msg.contains("connect") {
            StoreError::ConnectionPool(error_msg)
        } else {
            StoreError::QueryExecution(error_msg)
        }
    }
}

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login failure. Deliberately generic: absent user, wrong password and
    /// non-admin role on the admin entry point all collapse into this one.
    InvalidCredentials,
    /// Signature valid, clock past `exp`. The only retryable 401.
    TokenExpired,
    /// Bad signature or malformed token. Terminal.
    TokenInvalid,
    /// No bearer token on the request.
    MissingToken,
    /// Account exists, credentials are fine, but the account is blocked.
    AccountBlocked,
    /// Authenticated, but the role is outside the route's allowed set.
    InsufficientRole,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "{}", INVALID_CREDENTIALS),
            AuthError::TokenExpired => write!(f, "{}", TOKEN_EXPIRED),
            AuthError::TokenInvalid => write!(f, "{}", TOKEN_INVALID),
            AuthError::MissingToken => write!(f, "{}", UNAUTHORIZED),
            AuthError::AccountBlocked => write!(f, "{}", ACCOUNT_BLOCKED),
            AuthError::InsufficientRole => write!(f, "{}", FORBIDDEN),
        }
    }
}

impl StdError for AuthError {}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Store(StoreError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::BadRequest(msg) => write!(f, "{}", msg),
            AppError::Unauthorized(msg) => write!(f, "{}", msg),
            AppError::NotFound(resource) => write!(f, "{} not found", resource),
            AppError::Conflict(resource) => write!(f, "{} already exists", resource),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(resource) => AppError::Conflict(resource),
            other => AppError::Store(other),
        }
    }
}

/// Error envelope returned for every failed request.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
}

impl AppError {
    fn log(&self) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "Validation error");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!("Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(error = %e, "Authentication error");
            }
            AppError::BadRequest(msg) | AppError::Unauthorized(msg) => {
                tracing::warn!(error = %msg, "Request rejected");
            }
            AppError::NotFound(_) | AppError::Conflict(_) => {
                tracing::warn!(error = %self, "Request rejected");
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "Store error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
            }
        }
    }

    /// Client-facing message. Store and internal failures are not leaked.
    fn public_message(&self) -> String {
        match self {
            AppError::Store(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(e) => match e {
                AuthError::AccountBlocked | AuthError::InsufficientRole => {
                    StatusCode::FORBIDDEN
                }
                _ => StatusCode::UNAUTHORIZED,
            },
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store(StoreError::ConnectionPool(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();

        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            success: false,
            status_code: status.as_u16(),
            message: self.public_message(),
            errors: None,
        })
    }
}
