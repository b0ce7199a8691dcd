/// Transient notifications shown on the host page during export
use std::time::Duration;

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use crate::config::as_timer_millis;
use crate::error::HoarderError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    pub fn color(self) -> &'static str {
        match self {
            ToastKind::Success => "#4CAF50",
            ToastKind::Error => "#F44336",
            ToastKind::Info => "#323232",
        }
    }
}

const FADE: Duration = Duration::from_millis(300);

/// Inline style of a freshly created toast; it starts transparent and fades in
fn initial_style(kind: ToastKind) -> [(&'static str, &'static str); 12] {
    [
        ("position", "fixed"),
        ("bottom", "20px"),
        ("right", "20px"),
        ("background", kind.color()),
        ("color", "#fff"),
        ("padding", "10px 16px"),
        ("border-radius", "4px"),
        ("box-shadow", "0 2px 6px rgba(0,0,0,0.3)"),
        ("z-index", "9999"),
        ("font-size", "14px"),
        ("opacity", "0"),
        ("transition", "opacity 0.3s ease"),
    ]
}

/// Show `message` in the bottom-right corner for `duration`, then fade it out
pub fn show_toast(document: &Document, message: &str, kind: ToastKind, duration: Duration) -> Result<(), HoarderError> {
    let body = document
        .body()
        .ok_or_else(|| HoarderError::Browser("document has no body".to_string()))?;
    let window = web_sys::window().ok_or_else(|| HoarderError::Browser("no window".to_string()))?;

    let toast: HtmlElement = document
        .create_element("div")
        .map_err(|e| HoarderError::browser(&e))?
        .dyn_into()
        .map_err(|_| HoarderError::Browser("toast is not an HTML element".to_string()))?;
    toast.set_text_content(Some(message));

    let style = toast.style();
    for (name, value) in initial_style(kind) {
        style.set_property(name, value).map_err(|e| HoarderError::browser(&e))?;
    }

    body.append_child(&toast).map_err(|e| HoarderError::browser(&e))?;

    let showing = toast.clone();
    let fade_in = Closure::once_into_js(move || {
        if let Err(e) = showing.style().set_property("opacity", "1") {
            log::debug!("Toast fade failed: {:?}", e);
        }
    });
    window
        .request_animation_frame(fade_in.unchecked_ref())
        .map_err(|e| HoarderError::browser(&e))?;

    let fading = toast.clone();
    let fade_out = Closure::once_into_js(move || {
        if let Err(e) = fading.style().set_property("opacity", "0") {
            log::debug!("Toast fade failed: {:?}", e);
        }
    });
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(fade_out.unchecked_ref(), as_timer_millis(duration))
        .map_err(|e| HoarderError::browser(&e))?;

    let remove = Closure::once_into_js(move || toast.remove());
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(remove.unchecked_ref(), as_timer_millis(duration + FADE))
        .map_err(|e| HoarderError::browser(&e))?;

    Ok(())
}
