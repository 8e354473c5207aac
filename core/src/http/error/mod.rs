//! Error types shared by the security components.

mod auth_error;

pub use auth_error::{ConfigError, EncodingError, SecurityError, StoreUnavailable};
