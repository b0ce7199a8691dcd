/// Conversation persistence over chrome.storage.local (and an in-memory stand-in)
use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::conversation::{decode_record, encode_record, storage_key, storage_key_for, Conversation, KEY_PREFIX};
use crate::error::HoarderError;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = get, catch)]
    async fn storage_get(keys: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = set, catch)]
    async fn storage_set(items: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = remove, catch)]
    async fn storage_remove(keys: &str) -> Result<JsValue, JsValue>;
}

/// Key-value persistence of conversations under `chat_<id>` keys
#[allow(async_fn_in_trait)]
pub trait ConversationStore {
    /// Write `[title, ...responses]` under `chat_<id>`, replacing any earlier capture
    async fn put(&self, id: &str, title: &str, responses: &[String]) -> Result<(), HoarderError>;

    /// Every decodable conversation. Malformed entries are logged and skipped.
    async fn list_all(&self) -> Vec<Conversation>;

    /// Remove `chat_<id>`. Removing an absent key succeeds.
    async fn delete(&self, id: Option<&str>) -> Result<String, HoarderError>;

    /// Number of `chat_` keys, decodable or not
    async fn count(&self) -> Result<usize, HoarderError>;
}

/// Decode every `chat_` entry of a raw key/value listing.
///
/// `None` values stand for entries that are not strings at all.
pub fn decode_items<I>(items: I) -> Vec<Conversation>
where
    I: IntoIterator<Item = (String, Option<String>)>,
{
    items
        .into_iter()
        .filter(|(key, _)| key.starts_with(KEY_PREFIX))
        .filter_map(|(key, value)| {
            let Some(value) = value else {
                log::error!("Error parsing stored item {}: value is not a string", key);
                return None;
            };
            match decode_record(&key, &value) {
                Ok(conversation) => Some(conversation),
                Err(e) => {
                    log::error!("Error parsing stored item {}: {}", key, e);
                    None
                }
            }
        })
        .collect()
}

/// Store backed by `chrome.storage.local`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStore;

impl ChromeStore {
    async fn raw_items(&self) -> Result<Vec<(String, Option<String>)>, HoarderError> {
        let items = storage_get(&JsValue::NULL)
            .await
            .map_err(|e| HoarderError::storage(&e))?;

        let items: js_sys::Object = items
            .dyn_into()
            .map_err(|_| HoarderError::Storage("storage listing is not an object".to_string()))?;

        Ok(js_sys::Object::entries(&items)
            .iter()
            .filter_map(|entry| {
                let pair: js_sys::Array = entry.unchecked_into();
                let key = pair.get(0).as_string()?;
                Some((key, pair.get(1).as_string()))
            })
            .collect())
    }
}

impl ConversationStore for ChromeStore {
    async fn put(&self, id: &str, title: &str, responses: &[String]) -> Result<(), HoarderError> {
        let value = encode_record(title, responses)?;

        let items = js_sys::Object::new();
        js_sys::Reflect::set(&items, &JsValue::from_str(&storage_key(id)), &JsValue::from_str(&value))
            .map_err(|e| HoarderError::storage(&e))?;

        storage_set(&items).await.map_err(|e| HoarderError::storage(&e))?;
        Ok(())
    }

    async fn list_all(&self) -> Vec<Conversation> {
        match self.raw_items().await {
            Ok(items) => decode_items(items),
            Err(e) => {
                log::error!("Failed to read storage: {}", e);
                Vec::new()
            }
        }
    }

    async fn delete(&self, id: Option<&str>) -> Result<String, HoarderError> {
        let key = storage_key_for(id)?;

        if let Err(e) = storage_remove(&key).await {
            let err = HoarderError::storage(&e);
            log::error!("Error deleting {}: {}", key, err);
            return Err(err);
        }
        Ok(id.unwrap_or_default().to_string())
    }

    async fn count(&self) -> Result<usize, HoarderError> {
        let items = self.raw_items().await?;
        Ok(items.iter().filter(|(key, _)| key.starts_with(KEY_PREFIX)).count())
    }
}

/// Non-persistent store with the same encoding, used when no extension is present
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with conversations, in the given order
    pub fn with_conversations(conversations: &[Conversation]) -> Result<Self, HoarderError> {
        let store = MemoryStore::new();
        for conversation in conversations {
            store.write(&conversation.id, &conversation.title, &conversation.responses)?;
        }
        Ok(store)
    }

    /// Insert a raw stored value, bypassing encoding
    pub fn insert_raw(&self, key: &str, value: &str) {
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, id: &str, title: &str, responses: &[String]) -> Result<(), HoarderError> {
        let value = encode_record(title, responses)?;
        self.insert_raw(&storage_key(id), &value);
        Ok(())
    }

    fn snapshot(&self) -> Vec<(String, Option<String>)> {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect()
    }
}

impl ConversationStore for MemoryStore {
    async fn put(&self, id: &str, title: &str, responses: &[String]) -> Result<(), HoarderError> {
        self.write(id, title, responses)
    }

    async fn list_all(&self) -> Vec<Conversation> {
        decode_items(self.snapshot())
    }

    async fn delete(&self, id: Option<&str>) -> Result<String, HoarderError> {
        let key = storage_key_for(id)?;
        self.entries.borrow_mut().retain(|(k, _)| *k != key);
        Ok(id.unwrap_or_default().to_string())
    }

    async fn count(&self) -> Result<usize, HoarderError> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .filter(|(key, _)| key.starts_with(KEY_PREFIX))
            .count())
    }
}
