/// One-shot DOM watches built on MutationObserver
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, MutationObserver, MutationObserverInit, Node};

use crate::error::HoarderError;

type MutationCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// Resolves the first time its predicate holds.
///
/// Dropping an unresolved watch disconnects the underlying observer. There is
/// no timeout.
pub struct Watch {
    ready: JsFuture,
    observer: Option<MutationObserver>,
    _callback: Option<MutationCallback>,
}

impl Watch {
    fn resolved() -> Watch {
        Watch {
            ready: JsFuture::from(js_sys::Promise::resolve(&JsValue::UNDEFINED)),
            observer: None,
            _callback: None,
        }
    }

    /// Whether a MutationObserver was installed for this watch
    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }
}

impl Future for Watch {
    type Output = Result<(), HoarderError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.ready).poll(cx) {
            Poll::Ready(result) => {
                if let Some(observer) = this.observer.take() {
                    observer.disconnect();
                }
                Poll::Ready(result.map(|_| ()).map_err(|e| HoarderError::browser(&e)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

/// Watch the whole document until `predicate` returns true.
///
/// Resolves immediately, without observing, if the predicate already holds.
pub fn watch_until<F>(document: &Document, predicate: F) -> Result<Watch, HoarderError>
where
    F: Fn() -> bool + 'static,
{
    if predicate() {
        return Ok(Watch::resolved());
    }

    let target: Node = match document.body() {
        Some(body) => body.into(),
        None => document
            .document_element()
            .ok_or_else(|| HoarderError::Browser("document has no root element".to_string()))?
            .into(),
    };

    let mut resolve_slot: Option<js_sys::Function> = None;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        resolve_slot = Some(resolve);
    });
    let resolve = resolve_slot.ok_or_else(|| HoarderError::Browser("promise executor did not run".to_string()))?;

    let callback: MutationCallback = Closure::new(move |_records: js_sys::Array, observer: MutationObserver| {
        if predicate() {
            observer.disconnect();
            if let Err(e) = resolve.call0(&JsValue::NULL) {
                log::error!("Failed to resolve DOM watch: {:?}", e);
            }
        }
    });

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).map_err(|e| HoarderError::browser(&e))?;

    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer
        .observe_with_options(&target, &options)
        .map_err(|e| HoarderError::browser(&e))?;

    Ok(Watch {
        ready: JsFuture::from(promise),
        observer: Some(observer),
        _callback: Some(callback),
    })
}

/// Wait until `find` yields something, then return it
pub async fn wait_for<T, F>(document: &Document, find: F) -> Result<T, HoarderError>
where
    F: Fn() -> Option<T> + Clone + 'static,
{
    if let Some(found) = find() {
        return Ok(found);
    }

    let check = find.clone();
    watch_until(document, move || check().is_some())?.await?;

    find().ok_or_else(|| HoarderError::Browser("watched element disappeared".to_string()))
}

