/// Error type shared by the content script and the popup
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Failed to read storage: {0}")]
    StorageRead(String),

    #[error("Failed to write storage: {0}")]
    StorageWrite(String),

    #[error("Failed to parse stored products: {0}")]
    Decode(String),

    #[error("Failed to serialize products: {0}")]
    Encode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Browser window is not available")]
    NoWindow,
}

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Render a thrown JS value for an error message
pub fn describe_js(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Wrap a DOM exception
pub fn dom_error(value: JsValue) -> TrackerError {
    TrackerError::Dom(describe_js(&value))
}
