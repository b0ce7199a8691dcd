/// UI module exports
pub mod components;
pub mod popup;
pub mod render;
pub mod viewer;

use wasm_bindgen_futures::JsFuture;

use crate::error::HoarderError;

/// Write `text` to the system clipboard
pub async fn copy_to_clipboard(text: &str) -> Result<(), HoarderError> {
    let window = web_sys::window().ok_or_else(|| HoarderError::Browser("no window".to_string()))?;

    JsFuture::from(window.navigator().clipboard().write_text(text))
        .await
        .map(|_| ())
        .map_err(|e| HoarderError::Clipboard(crate::error::js_error_message(&e)))
}
