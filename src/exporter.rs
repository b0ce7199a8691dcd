/// Host-page content script: export button injection, navigation watching and
/// the export action itself
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement, VisibilityState, Window};

use crate::adapter::{GrokAdapter, SiteAdapter};
use crate::config::{as_timer_millis, ExporterConfig};
use crate::error::HoarderError;
use crate::route::{conversation_id, path_of, UrlTracker};
use crate::scraper::{BrowserClipboard, Scraper};
use crate::store::{ChromeStore, ConversationStore};
use crate::toast::{show_toast, ToastKind};

/// Attribute marking our injected button, used to avoid duplicates
pub const EXPORT_BUTTON_MARKER: &str = "data-export-btn";

const EXPORT_BUTTON_CLASS: &str = "inline-flex items-center justify-center gap-2 whitespace-nowrap font-medium cursor-pointer \
    focus-visible:outline-none focus-visible:ring-2 focus-visible:ring-blue-500 disabled:opacity-60 \
    disabled:cursor-not-allowed transition-colors duration-150 [&_svg]:shrink-0 select-none hover:bg-blue-600 \
    bg-blue-500 text-white border border-blue-700 h-10 py-1.5 text-sm rounded-full px-3.5 focus:outline-none";

fn window() -> Result<Window, HoarderError> {
    web_sys::window().ok_or_else(|| HoarderError::Browser("no window".to_string()))
}

fn document() -> Result<Document, HoarderError> {
    window()?
        .document()
        .ok_or_else(|| HoarderError::Browser("no document".to_string()))
}

fn current_href() -> Result<String, HoarderError> {
    window()?.location().href().map_err(|e| HoarderError::browser(&e))
}

/// Split a scrape result into title and responses; a bare title means nothing was collected
pub fn split_capture(mut collected: Vec<String>) -> Result<(String, Vec<String>), HoarderError> {
    if collected.len() <= 1 {
        return Err(HoarderError::NoData);
    }
    let title = collected.remove(0);
    Ok((title, collected))
}

/// Add the Export button to the conversation actions row, once per page.
///
/// No-op on anything but a `/c/<uuid>` route.
pub async fn inject_export_button(config: Rc<ExporterConfig>) -> Result<(), HoarderError> {
    let href = current_href()?;
    let is_conversation = path_of(&href).is_some_and(|path| conversation_id(&path).is_some());
    if !is_conversation {
        return Ok(());
    }

    let adapter = GrokAdapter::from_window()?;
    let anchor = adapter.wait_for_export_anchor().await?;
    if has_export_button(&anchor) {
        return Ok(());
    }

    let button = create_export_button(adapter.document(), config)?;
    anchor.append_child(&button).map_err(|e| HoarderError::browser(&e))?;
    log::info!("Export button injected");
    Ok(())
}

fn has_export_button(anchor: &Element) -> bool {
    anchor
        .query_selector(&format!("[{}]", EXPORT_BUTTON_MARKER))
        .ok()
        .flatten()
        .is_some()
}

fn create_export_button(document: &Document, config: Rc<ExporterConfig>) -> Result<HtmlElement, HoarderError> {
    let button: HtmlElement = document
        .create_element("button")
        .map_err(|e| HoarderError::browser(&e))?
        .dyn_into()
        .map_err(|_| HoarderError::Browser("button is not an HTML element".to_string()))?;

    button
        .set_attribute(EXPORT_BUTTON_MARKER, "true")
        .map_err(|e| HoarderError::browser(&e))?;
    button
        .set_attribute("type", "button")
        .map_err(|e| HoarderError::browser(&e))?;
    button.set_class_name(EXPORT_BUTTON_CLASS);
    button.set_text_content(Some("Export"));
    button
        .style()
        .set_property("margin-left", "4px")
        .map_err(|e| HoarderError::browser(&e))?;

    let onclick = Closure::<dyn FnMut()>::new(move || {
        let config = config.clone();
        spawn_local(async move {
            export_conversation(&config).await;
        });
    });
    button.set_onclick(Some(onclick.as_ref().unchecked_ref()));
    onclick.forget();

    Ok(button)
}

fn notify(config: &ExporterConfig, message: &str, kind: ToastKind) {
    let shown = document().and_then(|document| show_toast(&document, message, kind, config.toast_duration));
    if let Err(e) = shown {
        log::warn!("Could not show toast: {}", e);
    }
}

/// The user-triggered export: scrape, store, report through toasts
pub async fn export_conversation(config: &ExporterConfig) {
    notify(config, "Exporting...", ToastKind::Info);

    match capture_and_store(config).await {
        Ok(count) => {
            log::info!("Exported conversation with {} responses", count);
            notify(config, "Chat exported successfully!", ToastKind::Success);
        }
        Err(e) => {
            log::error!("Export error: {}", e);
            notify(config, "Error exporting chat. Try Refreshing the tab.", ToastKind::Error);
        }
    }
}

async fn capture_and_store(config: &ExporterConfig) -> Result<usize, HoarderError> {
    let scraper = Scraper::new(GrokAdapter::from_window()?, BrowserClipboard, config);
    let (title, responses) = split_capture(scraper.scrape().await?)?;

    let path = window()?.location().pathname().map_err(|e| HoarderError::browser(&e))?;
    let id = conversation_id(&path).ok_or_else(|| HoarderError::Browser(format!("not a conversation page: {}", path)))?;

    ChromeStore.put(&id, &title, &responses).await?;
    Ok(responses.len())
}

fn spawn_injection(config: Rc<ExporterConfig>) {
    spawn_local(async move {
        if let Err(e) = inject_export_button(config).await {
            log::error!("Failed to inject export button: {}", e);
        }
    });
}

struct WatcherState {
    interval: Option<i32>,
    tracker: UrlTracker,
    tick: Option<Closure<dyn FnMut()>>,
}

/// Polls the page URL while the tab is visible and re-injects the export
/// button whenever it changes (the host app navigates client-side)
pub struct NavigationWatcher {
    state: Rc<RefCell<WatcherState>>,
    config: Rc<ExporterConfig>,
}

impl NavigationWatcher {
    pub fn new(initial_url: impl Into<String>, config: Rc<ExporterConfig>) -> Self {
        NavigationWatcher {
            state: Rc::new(RefCell::new(WatcherState {
                interval: None,
                tracker: UrlTracker::new(initial_url),
                tick: None,
            })),
            config,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().interval.is_some()
    }

    pub fn start(&self) -> Result<(), HoarderError> {
        if self.is_running() {
            return Ok(());
        }

        let weak: Weak<RefCell<WatcherState>> = Rc::downgrade(&self.state);
        let config = self.config.clone();
        let tick = Closure::<dyn FnMut()>::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let href = match current_href() {
                Ok(href) => href,
                Err(e) => {
                    log::debug!("Could not read location: {}", e);
                    return;
                }
            };
            let changed = state.borrow_mut().tracker.observe(&href);
            if changed {
                spawn_injection(config.clone());
            }
        });

        let handle = window()?
            .set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                as_timer_millis(self.config.poll_interval),
            )
            .map_err(|e| HoarderError::browser(&e))?;

        let mut state = self.state.borrow_mut();
        state.interval = Some(handle);
        state.tick = Some(tick);
        log::debug!("Navigation watcher started");
        Ok(())
    }

    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(handle) = state.interval.take() {
            if let Ok(window) = window() {
                window.clear_interval_with_handle(handle);
            }
            state.tick = None;
            log::debug!("Navigation watcher stopped");
        }
    }

    /// Start or stop according to the document's visibility
    pub fn sync_visibility(&self, document: &Document) {
        if document.visibility_state() == VisibilityState::Visible {
            if let Err(e) = self.start() {
                log::error!("Failed to start navigation watcher: {}", e);
            }
        } else {
            self.stop();
        }
    }
}

/// Entry point of the host-page content script
pub fn run() -> Result<(), HoarderError> {
    let config = Rc::new(ExporterConfig::default());
    let document = document()?;

    let watcher = Rc::new(NavigationWatcher::new(current_href()?, config.clone()));
    watcher.sync_visibility(&document);

    let on_visibility = {
        let watcher = watcher.clone();
        let document = document.clone();
        Closure::<dyn FnMut()>::new(move || watcher.sync_visibility(&document))
    };
    document
        .add_event_listener_with_callback("visibilitychange", on_visibility.as_ref().unchecked_ref())
        .map_err(|e| HoarderError::browser(&e))?;
    on_visibility.forget();

    spawn_injection(config);
    log::info!("Exporter content script started");
    Ok(())
}
