/// Window-message bridge between the viewer page and extension storage.
///
/// The viewer cannot reach `chrome.storage`; the content script on the
/// viewer's origin can. Both sides exchange typed messages through
/// `window.postMessage`, one response per request.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{MessageEvent, Window};

use crate::conversation::Conversation;
use crate::error::HoarderError;
use crate::store::{ChromeStore, ConversationStore};

/// Attribute set on `<html>` by the bridge so the viewer can detect the extension
pub const PRESENCE_ATTRIBUTE: &str = "data-chat-hoarder-installed";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeleteTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    #[serde(rename = "getChatData")]
    GetChatData,

    #[serde(rename = "deleteChat")]
    DeleteChat {
        #[serde(default)]
        data: DeleteTarget,
    },

    #[serde(rename = "chatDataResponse")]
    ChatDataResponse { data: Vec<Conversation> },

    #[serde(rename = "deleteChatResponse")]
    DeleteChatResponse {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl BridgeMessage {
    pub fn delete(id: impl Into<String>) -> Self {
        BridgeMessage::DeleteChat {
            data: DeleteTarget { id: Some(id.into()) },
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, BridgeMessage::GetChatData | BridgeMessage::DeleteChat { .. })
    }
}

/// What an incoming window message turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(BridgeMessage),
    /// Has a string `type` we don't know
    Unknown(String),
    /// No usable `type`, or a known type with a malformed body
    Ignored,
}

/// Classify a message payload by its `type` field
pub fn classify(payload: &Value) -> Inbound {
    let Some(kind) = payload.get("type").and_then(Value::as_str) else {
        return Inbound::Ignored;
    };

    match kind {
        "getChatData" | "deleteChat" | "chatDataResponse" | "deleteChatResponse" => {
            match serde_json::from_value::<BridgeMessage>(payload.clone()) {
                Ok(message) => Inbound::Message(message),
                Err(e) => {
                    log::debug!("Ignoring malformed {} message: {}", kind, e);
                    Inbound::Ignored
                }
            }
        }
        other => Inbound::Unknown(other.to_string()),
    }
}

/// Answer one request against `store`; responses yield `None`
pub async fn respond<S: ConversationStore>(store: &S, message: &BridgeMessage) -> Option<BridgeMessage> {
    match message {
        BridgeMessage::GetChatData => Some(BridgeMessage::ChatDataResponse {
            data: store.list_all().await,
        }),
        BridgeMessage::DeleteChat { data } => Some(match store.delete(data.id.as_deref()).await {
            Ok(id) => BridgeMessage::DeleteChatResponse {
                success: true,
                id: Some(id),
                error: None,
            },
            Err(e) => BridgeMessage::DeleteChatResponse {
                success: false,
                id: None,
                error: Some(e.reason()),
            },
        }),
        BridgeMessage::ChatDataResponse { .. } | BridgeMessage::DeleteChatResponse { .. } => None,
    }
}

/// Whether a message event was posted by this same window
pub fn from_same_window(event: &MessageEvent, window: &Window) -> bool {
    event
        .source()
        .is_some_and(|source| js_sys::Object::is(&source, window))
}

/// Decode a message event's payload into JSON, `None` for anything unreadable
pub fn payload_of(event: &MessageEvent) -> Option<Value> {
    let data = event.data();
    if data.is_null() || data.is_undefined() {
        return None;
    }
    serde_wasm_bindgen::from_value(data).ok()
}

/// Post a message to `window` with target origin `*`
pub fn post(window: &Window, message: &BridgeMessage) -> Result<(), HoarderError> {
    let value = serde_wasm_bindgen::to_value(message).map_err(|e| HoarderError::Browser(e.to_string()))?;
    window
        .post_message(&value, "*")
        .map_err(|e| HoarderError::browser(&e))
}

fn handle_event(window: &Window, event: &MessageEvent) {
    if !from_same_window(event, window) {
        return;
    }
    let Some(payload) = payload_of(event) else {
        return;
    };

    let message = match classify(&payload) {
        Inbound::Message(message) if message.is_request() => message,
        Inbound::Message(_) | Inbound::Ignored => return,
        Inbound::Unknown(kind) => {
            log::warn!("Unhandled message type: {}", kind);
            return;
        }
    };

    let window = window.clone();
    wasm_bindgen_futures::spawn_local(async move {
        if let Some(response) = respond(&ChromeStore, &message).await {
            if let Err(e) = post(&window, &response) {
                log::error!("Failed to post bridge response: {}", e);
            }
        }
    });
}

/// Entry point of the viewer-site content script
pub fn run() -> Result<(), HoarderError> {
    let window = web_sys::window().ok_or_else(|| HoarderError::Browser("no window".to_string()))?;

    announce_presence(&window)?;

    let listener = {
        let window = window.clone();
        Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| handle_event(&window, &event))
    };
    window
        .add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
        .map_err(|e| HoarderError::browser(&e))?;
    listener.forget();

    log::info!("Storage bridge listening");
    Ok(())
}

fn announce_presence(window: &Window) -> Result<(), HoarderError> {
    let root = window
        .document()
        .and_then(|d| d.document_element())
        .ok_or_else(|| HoarderError::Browser("document has no root element".to_string()))?;

    root.set_attribute(PRESENCE_ATTRIBUTE, "true")
        .map_err(|e| HoarderError::browser(&e))
}

/// Whether the bridge content script has marked this page
pub fn extension_present(window: &Window) -> bool {
    window
        .document()
        .and_then(|d| d.document_element())
        .and_then(|root| root.get_attribute(PRESENCE_ATTRIBUTE))
        .is_some_and(|value| value == "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use futures::executor::block_on;
    use serde_json::json;

    const ID: &str = "a29b3eb4-9eef-4bc4-8a6e-ac1b37112252";

    fn create_test_store() -> MemoryStore {
        let store = MemoryStore::new();
        block_on(store.put(ID, "Bash scripting", &["show me a bash script".to_string(), "echo hi".to_string()])).unwrap();
        store
    }

    #[test]
    fn test_classify_requests() {
        assert_eq!(classify(&json!({"type": "getChatData"})), Inbound::Message(BridgeMessage::GetChatData));
        assert_eq!(
            classify(&json!({"type": "deleteChat", "data": {"id": ID, "title": "ignored", "responses": []}})),
            Inbound::Message(BridgeMessage::delete(ID))
        );
    }

    #[test]
    fn test_classify_delete_without_data() {
        assert_eq!(
            classify(&json!({"type": "deleteChat"})),
            Inbound::Message(BridgeMessage::DeleteChat { data: DeleteTarget::default() })
        );
    }

    #[test]
    fn test_classify_ignores_untyped() {
        assert_eq!(classify(&json!({"data": 1})), Inbound::Ignored);
        assert_eq!(classify(&json!({"type": 5})), Inbound::Ignored);
        assert_eq!(classify(&json!("getChatData")), Inbound::Ignored);
    }

    #[test]
    fn test_classify_unknown_type() {
        assert_eq!(classify(&json!({"type": "refresh"})), Inbound::Unknown("refresh".to_string()));
    }

    #[test]
    fn test_get_chat_data_response() {
        let store = create_test_store();

        let response = block_on(respond(&store, &BridgeMessage::GetChatData)).unwrap();
        let wire = serde_json::to_value(&response).unwrap();

        assert_eq!(
            wire,
            json!({
                "type": "chatDataResponse",
                "data": [{"id": ID, "title": "Bash scripting", "responses": ["show me a bash script", "echo hi"]}]
            })
        );
    }

    #[test]
    fn test_delete_then_refresh() {
        let store = create_test_store();

        let response = block_on(respond(&store, &BridgeMessage::delete(ID))).unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "deleteChatResponse", "success": true, "id": ID})
        );

        let refreshed = block_on(respond(&store, &BridgeMessage::GetChatData)).unwrap();
        assert_eq!(refreshed, BridgeMessage::ChatDataResponse { data: vec![] });
    }

    #[test]
    fn test_delete_without_id_reports_error() {
        let store = create_test_store();

        let response = block_on(respond(&store, &BridgeMessage::DeleteChat { data: DeleteTarget::default() })).unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "deleteChatResponse", "success": false, "error": "No ID provided"})
        );
        assert_eq!(store.len(), 1);
    }

    /// Store whose writes and deletes are rejected by the backend
    struct RejectingStore;

    impl ConversationStore for RejectingStore {
        async fn put(&self, _id: &str, _title: &str, _responses: &[String]) -> Result<(), HoarderError> {
            Err(HoarderError::Storage("QUOTA_BYTES quota exceeded".to_string()))
        }

        async fn list_all(&self) -> Vec<Conversation> {
            Vec::new()
        }

        async fn delete(&self, id: Option<&str>) -> Result<String, HoarderError> {
            id.ok_or(HoarderError::MissingId)?;
            Err(HoarderError::Storage("QUOTA_BYTES quota exceeded".to_string()))
        }

        async fn count(&self) -> Result<usize, HoarderError> {
            Ok(0)
        }
    }

    #[test]
    fn test_delete_failure_carries_storage_message() {
        let response = block_on(respond(&RejectingStore, &BridgeMessage::delete(ID))).unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "deleteChatResponse", "success": false, "error": "QUOTA_BYTES quota exceeded"})
        );
    }

    #[test]
    fn test_delete_failure_without_id_on_rejecting_store() {
        let response =
            block_on(respond(&RejectingStore, &BridgeMessage::DeleteChat { data: DeleteTarget::default() })).unwrap();

        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["error"], "No ID provided");
    }

    #[test]
    fn test_responses_are_not_answered() {
        let store = create_test_store();
        let echoed = BridgeMessage::ChatDataResponse { data: vec![] };

        assert!(!echoed.is_request());
        assert_eq!(block_on(respond(&store, &echoed)), None);
    }

    #[test]
    fn test_request_wire_shape() {
        assert_eq!(serde_json::to_value(BridgeMessage::GetChatData).unwrap(), json!({"type": "getChatData"}));
        assert_eq!(
            serde_json::to_value(BridgeMessage::delete("x")).unwrap(),
            json!({"type": "deleteChat", "data": {"id": "x"}})
        );
    }
}
