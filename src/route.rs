/// URL gating and page-derived conversation metadata
use std::sync::LazyLock;

use regex::Regex;
use url::Url;
use uuid::Uuid;

static CONVERSATION_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/c/([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})/?$")
        .expect("conversation path pattern is valid")
});

/// Whether a path is a conversation-detail route (`/c/<uuid>`)
pub fn is_conversation_path(path: &str) -> bool {
    conversation_id(path).is_some()
}

/// Extract the conversation id from a `/c/<uuid>` path.
///
/// The id is returned exactly as it appears in the path, since it doubles as
/// the storage key suffix.
pub fn conversation_id(path: &str) -> Option<String> {
    let captures = CONVERSATION_PATH.captures(path)?;
    let id = captures.get(1)?.as_str();

    Uuid::try_parse(id).ok().map(|_| id.to_string())
}

/// Path component of a full href, `None` if it doesn't parse
pub fn path_of(href: &str) -> Option<String> {
    Url::parse(href).ok().map(|url| url.path().to_string())
}

/// Strip the site branding from a document title
pub fn conversation_title(document_title: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return document_title.to_string();
    }
    document_title.replacen(suffix, "", 1)
}

/// Remembers the last URL seen by the navigation watcher
#[derive(Debug, Clone, PartialEq)]
pub struct UrlTracker {
    last_url: String,
}

impl UrlTracker {
    pub fn new(initial_url: impl Into<String>) -> UrlTracker {
        UrlTracker {
            last_url: initial_url.into(),
        }
    }

    /// Record `url`, returning true when it differs from the previous one
    pub fn observe(&mut self, url: &str) -> bool {
        if url == self.last_url {
            return false;
        }
        self.last_url = url.to_string();
        true
    }

    pub fn last_url(&self) -> &str {
        &self.last_url
    }
}
