//! Error types for anchored comments
//!
//! Annotation and state transitions are total and never fail. Errors only
//! come from the boundaries: reading configuration and parsing JSON handed
//! over by the host.

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

/// Boundary error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidConfig("unknown offset unit: words".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: unknown offset unit: words");

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
