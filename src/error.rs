/// Error types shared by the exporter, bridge and viewer

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoarderError {
    #[error("Document has no title")]
    MissingTitle,

    #[error("No response containers found")]
    NoContainers,

    #[error("No data collected")]
    NoData,

    #[error("No ID provided")]
    MissingId,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A browser global (window, document, body) or API call was unavailable
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Malformed record {key}: {message}")]
    MalformedRecord { key: String, message: String },
}

impl HoarderError {
    pub fn storage(err: &JsValue) -> Self {
        HoarderError::Storage(js_error_message(err))
    }

    pub fn browser(err: &JsValue) -> Self {
        HoarderError::Browser(js_error_message(err))
    }

    /// Message without the category prefix, as reported by the browser API
    pub fn reason(&self) -> String {
        match self {
            HoarderError::Clipboard(message) | HoarderError::Storage(message) | HoarderError::Browser(message) => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Best-effort human readable message for a thrown JS value
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    if let Some(text) = err.as_string() {
        return text;
    }
    format!("{:?}", err)
}
