/// Host-site markup coupling, kept behind one trait so markup changes stay here
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::error::HoarderError;
use crate::observer::{wait_for, watch_until};

/// Flex row next to the host's own conversation actions
pub const EXPORT_ANCHOR_SELECTOR: &str = "div.ml-auto.flex.flex-row.items-end.gap-1";
pub const RESPONSE_CONTAINER_SELECTOR: &str = "div[id^=\"response-\"]";
pub const COPY_CONTROL_SELECTOR: &str = "button[aria-label=\"Copy\"]";

/// Where a scraper finds things on the host page
#[allow(async_fn_in_trait)]
pub trait SiteAdapter {
    type Anchor;
    type Container;
    type Control;

    fn document_title(&self) -> Option<String>;

    fn find_export_anchor(&self) -> Option<Self::Anchor>;

    /// Response containers in document order
    fn find_response_containers(&self) -> Vec<Self::Container>;

    /// The authoritative copy control of a container (last in document order)
    fn find_copy_control(&self, container: &Self::Container) -> Option<Self::Control>;

    async fn wait_for_export_anchor(&self) -> Result<Self::Anchor, HoarderError>;

    /// Wait until at least one container exists, then enumerate them
    async fn wait_for_response_containers(&self) -> Result<Vec<Self::Container>, HoarderError>;
}

/// Adapter for the Grok web app markup
#[derive(Debug, Clone)]
pub struct GrokAdapter {
    document: Document,
}

impl GrokAdapter {
    pub fn new(document: Document) -> Self {
        GrokAdapter { document }
    }

    pub fn from_window() -> Result<Self, HoarderError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| HoarderError::Browser("no document".to_string()))?;
        Ok(GrokAdapter::new(document))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn query_first(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

impl SiteAdapter for GrokAdapter {
    type Anchor = Element;
    type Container = Element;
    type Control = HtmlElement;

    fn document_title(&self) -> Option<String> {
        Some(self.document.title())
    }

    fn find_export_anchor(&self) -> Option<Element> {
        query_first(&self.document, EXPORT_ANCHOR_SELECTOR)
    }

    fn find_response_containers(&self) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(RESPONSE_CONTAINER_SELECTOR) else {
            return Vec::new();
        };

        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn find_copy_control(&self, container: &Element) -> Option<HtmlElement> {
        let controls = container.query_selector_all(COPY_CONTROL_SELECTOR).ok()?;
        let count = controls.length();
        if count == 0 {
            return None;
        }
        controls.item(count - 1)?.dyn_into::<HtmlElement>().ok()
    }

    async fn wait_for_export_anchor(&self) -> Result<Element, HoarderError> {
        let document = self.document.clone();
        wait_for(&self.document, move || query_first(&document, EXPORT_ANCHOR_SELECTOR)).await
    }

    async fn wait_for_response_containers(&self) -> Result<Vec<Element>, HoarderError> {
        let document = self.document.clone();
        watch_until(&self.document, move || {
            query_first(&document, RESPONSE_CONTAINER_SELECTOR).is_some()
        })?
        .await?;

        Ok(self.find_response_containers())
    }
}
