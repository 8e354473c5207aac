use actix_web::{error, http::StatusCode, HttpResponse, HttpResponseBuilder};
use derive_more::{Display, Error};

/// Failures surfaced to HTTP clients by the security layer.
///
/// The display text is what the client sees, so `InvalidCredentials`
/// never says whether the username or the password was wrong and
/// `StoreUnavailable` hides the underlying store error.
#[derive(Debug, Display, Error)]
pub enum SecurityError {
    #[display("invalid credentials")]
    InvalidCredentials,
    #[display("service unavailable")]
    StoreUnavailable {
        #[error(source)]
        cause: StoreUnavailable,
    },
    #[display("access denied")]
    AccessDenied,
    #[display("login required")]
    LoginRequired,
    #[display("invalid CSRF token")]
    InvalidCsrfToken,
}

impl error::ResponseError for SecurityError {
    fn status_code(&self) -> StatusCode {
        match *self {
            SecurityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            SecurityError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            SecurityError::AccessDenied => StatusCode::FORBIDDEN,
            SecurityError::LoginRequired => StatusCode::UNAUTHORIZED,
            SecurityError::InvalidCsrfToken => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponseBuilder::new(self.status_code()).body(self.to_string())
    }
}

impl From<StoreUnavailable> for SecurityError {
    fn from(cause: StoreUnavailable) -> Self {
        SecurityError::StoreUnavailable { cause }
    }
}

/// The user store could not be queried.
///
/// Returned by every credential verifier instead of a failed authentication,
/// so callers can tell "wrong password" apart from "store is down".
#[derive(Debug, Display, Error)]
#[display("credential store unavailable: {reason}")]
pub struct StoreUnavailable {
    reason: String,
}

impl StoreUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        StoreUnavailable {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(feature = "jdbc")]
impl From<sqlx::Error> for StoreUnavailable {
    fn from(err: sqlx::Error) -> Self {
        StoreUnavailable::new(err.to_string())
    }
}

/// A password could not be hashed.
#[derive(Debug, Display, Error)]
#[display("password encoding failed: {reason}")]
pub struct EncodingError {
    reason: String,
}

impl EncodingError {
    pub fn new(reason: impl Into<String>) -> Self {
        EncodingError {
            reason: reason.into(),
        }
    }
}

/// Invalid security configuration, detected at startup.
#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("invalid settings: {reason}")]
    InvalidSettings { reason: String },
    #[display("unknown access expression `{value}`")]
    InvalidRequirement { value: String },
    #[display("unknown HTTP method `{value}`")]
    InvalidMethod { value: String },
    #[display("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
