/// Conversation records and their persisted encoding
use serde::{Deserialize, Serialize};

use crate::error::HoarderError;

/// Prefix of every storage key holding a conversation
pub const KEY_PREFIX: &str = "chat_";

/// One exported chat session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub responses: Vec<String>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>, responses: Vec<String>) -> Conversation {
        Conversation {
            id: id.into(),
            title: title.into(),
            responses,
        }
    }

    /// Case-insensitive match against the title and every response
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self
                .responses
                .iter()
                .any(|response| response.to_lowercase().contains(&query))
    }
}

/// Earlier wire shape with every response joined into one description.
///
/// Lossy: turn boundaries inside a response cannot be told apart from
/// boundaries between responses. Kept only for consumers of the old shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacySummary {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl From<&Conversation> for LegacySummary {
    fn from(conversation: &Conversation) -> Self {
        LegacySummary {
            id: conversation.id.clone(),
            title: conversation.title.clone(),
            description: conversation.responses.join("\n"),
        }
    }
}

pub fn storage_key(id: &str) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

/// Storage key for a delete request, rejecting a missing or empty id
pub fn storage_key_for(id: Option<&str>) -> Result<String, HoarderError> {
    match id {
        Some(id) if !id.is_empty() => Ok(storage_key(id)),
        _ => Err(HoarderError::MissingId),
    }
}

/// Encode `[title, ...responses]` as the JSON string stored under the key
pub fn encode_record(title: &str, responses: &[String]) -> Result<String, HoarderError> {
    let mut record: Vec<&str> = Vec::with_capacity(responses.len() + 1);
    record.push(title);
    record.extend(responses.iter().map(String::as_str));

    serde_json::to_string(&record).map_err(|e| HoarderError::Storage(e.to_string()))
}

/// Decode a stored value back into a conversation.
///
/// The value must be a JSON array of strings with at least one element; the
/// first element is the title.
pub fn decode_record(key: &str, value: &str) -> Result<Conversation, HoarderError> {
    let malformed = |message: String| HoarderError::MalformedRecord {
        key: key.to_string(),
        message,
    };

    let id = key
        .strip_prefix(KEY_PREFIX)
        .ok_or_else(|| malformed("not a conversation key".to_string()))?;

    let mut record: Vec<String> = serde_json::from_str(value).map_err(|e| malformed(e.to_string()))?;
    if record.is_empty() {
        return Err(malformed("empty array".to_string()));
    }

    let title = record.remove(0);
    Ok(Conversation::new(id, title, record))
}
