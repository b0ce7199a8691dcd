//! Browser-only tests, run with `wasm-pack test --headless --chrome`
#![cfg(target_arch = "wasm32")]

use chat_hoarder::adapter::{GrokAdapter, SiteAdapter};
use chat_hoarder::bridge::{self, BridgeMessage, PRESENCE_ATTRIBUTE};
use chat_hoarder::observer::{wait_for, watch_until};
use chat_hoarder::scraper::sleep;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen_test::*;
use web_sys::Document;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn append_html(document: &Document, html: &str) -> web_sys::Element {
    let holder = document.create_element("div").unwrap();
    holder.set_inner_html(html);
    document.body().unwrap().append_child(&holder).unwrap();
    holder
}

#[wasm_bindgen_test]
async fn test_watch_resolves_immediately_when_predicate_holds() {
    let watch = watch_until(&document(), || true).unwrap();

    assert!(!watch.is_observing());
    watch.await.unwrap();
}

#[wasm_bindgen_test]
async fn test_wait_for_element_added_later() {
    let document = document();
    let lookup = document.clone();
    let find = move || lookup.query_selector("#late-arrival").ok().flatten();

    let watch = watch_until(&document, {
        let find = find.clone();
        move || find().is_some()
    })
    .unwrap();
    assert!(watch.is_observing());

    let holder = append_html(&document, "<p id=\"late-arrival\">here</p>");
    watch.await.unwrap();

    let found = wait_for(&document, find).await.unwrap();
    assert_eq!(found.text_content().as_deref(), Some("here"));
    holder.remove();
}

fn has_element(document: &Document, selector: &'static str) -> impl Fn() -> bool + 'static {
    let document = document.clone();
    move || document.query_selector(selector).ok().flatten().is_some()
}

#[wasm_bindgen_test]
async fn test_overlapping_watches_resolve_independently() {
    let document = document();

    let first = watch_until(&document, has_element(&document, "#shared-target")).unwrap();
    let second = watch_until(&document, has_element(&document, "#shared-target")).unwrap();
    assert!(first.is_observing());
    assert!(second.is_observing());

    let holder = append_html(&document, "<p id=\"shared-target\"></p>");
    second.await.unwrap();
    first.await.unwrap();
    holder.remove();
}

#[wasm_bindgen_test]
async fn test_dropped_watch_stops_observing() {
    let document = document();
    let calls = Rc::new(Cell::new(0u32));

    let dropped = watch_until(&document, {
        let calls = calls.clone();
        move || {
            calls.set(calls.get() + 1);
            false
        }
    })
    .unwrap();
    assert!(dropped.is_observing());
    assert_eq!(calls.get(), 1);
    drop(dropped);

    // A live watch sees the same mutation, so the batch has been delivered once it resolves
    let live = watch_until(&document, has_element(&document, "#after-drop")).unwrap();
    let holder = append_html(&document, "<p id=\"after-drop\"></p>");
    live.await.unwrap();
    sleep(Duration::from_millis(10)).await.unwrap();

    assert_eq!(calls.get(), 1);
    holder.remove();
}

#[wasm_bindgen_test]
fn test_adapter_picks_last_copy_control() {
    let document = document();
    let holder = append_html(
        &document,
        r#"<div id="response-1">
               <button aria-label="Copy" data-n="first"></button>
               <button aria-label="Copy" data-n="last"></button>
           </div>
           <div id="response-2"><span>no controls</span></div>"#,
    );
    let adapter = GrokAdapter::new(document.clone());

    let containers = adapter.find_response_containers();
    assert_eq!(containers.len(), 2);

    let control = adapter.find_copy_control(&containers[0]).unwrap();
    assert_eq!(control.get_attribute("data-n").as_deref(), Some("last"));
    assert!(adapter.find_copy_control(&containers[1]).is_none());
    holder.remove();
}

#[wasm_bindgen_test]
fn test_adapter_accepts_empty_title() {
    let document = document();
    let previous = document.title();

    document.set_title("");
    let adapter = GrokAdapter::new(document.clone());
    assert_eq!(adapter.document_title().as_deref(), Some(""));
    document.set_title(&previous);
}

#[wasm_bindgen_test]
fn test_presence_marker() {
    let window = web_sys::window().unwrap();
    let root = document().document_element().unwrap();

    root.remove_attribute(PRESENCE_ATTRIBUTE).unwrap();
    assert!(!bridge::extension_present(&window));

    root.set_attribute(PRESENCE_ATTRIBUTE, "true").unwrap();
    assert!(bridge::extension_present(&window));
    root.remove_attribute(PRESENCE_ATTRIBUTE).unwrap();
}

#[wasm_bindgen_test]
fn test_message_survives_js_round_trip() {
    let message = BridgeMessage::delete("abc");

    let js = serde_wasm_bindgen::to_value(&message).unwrap();
    let payload: serde_json::Value = serde_wasm_bindgen::from_value(js).unwrap();

    assert_eq!(bridge::classify(&payload), bridge::Inbound::Message(message));
}
