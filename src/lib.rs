/// Chat Hoarder - browser extension that exports Grok conversations, plus the
/// viewer that reads them back
/// Built with Rust + WASM + Yew

pub mod adapter;
pub mod bridge;
pub mod config;
pub mod conversation;
pub mod error;
mod exporter;
mod fixtures;
pub mod library;
pub mod observer;
pub mod route;
pub mod scraper;
pub mod store;
mod toast;
pub mod ui;

pub use conversation::Conversation;
pub use error::HoarderError;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Content script for the chat site: export button and scraping
#[wasm_bindgen]
pub fn start_exporter() {
    if let Err(e) = exporter::run() {
        log::error!("Exporter failed to start: {}", e);
    }
}

// Content script for the viewer site: storage bridge
#[wasm_bindgen]
pub fn start_bridge() {
    if let Err(e) = bridge::run() {
        log::error!("Bridge failed to start: {}", e);
    }
}

// Start the Yew app for the conversation viewer
#[wasm_bindgen]
pub fn start_viewer() {
    yew::Renderer::<ui::viewer::LibraryViewer>::new().render();
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Re-export the URL gate for JavaScript access
#[wasm_bindgen]
pub fn is_conversation_path(path: &str) -> bool {
    route::is_conversation_path(path)
}
