//! Errors crossing the JS boundary

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid JS value: {0}")]
    Value(#[from] serde_wasm_bindgen::Error),

    #[error(transparent)]
    Core(#[from] anchored_comments::Error),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Core(err.into())
    }
}

impl From<SessionError> for JsValue {
    fn from(err: SessionError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
