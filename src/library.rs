/// Search and keyboard selection over the list of saved conversations

use crate::conversation::Conversation;

/// Conversations whose title or any response contains `query` (case-insensitive)
pub fn filter_conversations(conversations: &[Conversation], query: &str) -> Vec<Conversation> {
    if query.is_empty() {
        return conversations.to_vec();
    }

    conversations
        .iter()
        .filter(|conversation| conversation.matches(query))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavKey {
    Up,
    Down,
    Escape,
}

impl NavKey {
    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<NavKey> {
        match key {
            "ArrowUp" => Some(NavKey::Up),
            "ArrowDown" => Some(NavKey::Down),
            "Escape" => Some(NavKey::Escape),
            _ => None,
        }
    }
}

/// Next selected index within a filtered list of `len` items.
///
/// Arrow keys clamp at both ends; the first press with nothing selected
/// selects the first item. Escape clears the selection.
pub fn navigate(current: Option<usize>, key: NavKey, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }

    match key {
        NavKey::Escape => None,
        NavKey::Down => Some(current.map_or(0, |i| (i + 1).min(len - 1))),
        NavKey::Up => Some(current.map_or(0, |i| i.saturating_sub(1).min(len - 1))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_conversation(id: &str, title: &str, responses: &[&str]) -> Conversation {
        Conversation::new(id, title, responses.iter().map(|s| s.to_string()).collect())
    }

    fn create_test_library() -> Vec<Conversation> {
        vec![
            create_test_conversation("1", "Bash scripting", &["show me a simple bash script", "echo hello"]),
            create_test_conversation("2", "ReactJS: Components", &["reactjs framework", "useState hooks"]),
            create_test_conversation("3", "Basic C++ Hello World", &["show me a c++ program", "std::cout"]),
        ]
    }

    #[test]
    fn test_filter_empty_query_keeps_all() {
        let library = create_test_library();

        assert_eq!(filter_conversations(&library, "").len(), 3);
    }

    #[test]
    fn test_filter_by_title() {
        let filtered = filter_conversations(&create_test_library(), "REACT");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "2");
    }

    #[test]
    fn test_filter_by_response_body() {
        let filtered = filter_conversations(&create_test_library(), "show me");

        let ids: Vec<&str> = filtered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_filter_no_match() {
        assert!(filter_conversations(&create_test_library(), "haskell").is_empty());
    }

    #[test]
    fn test_navigate_down_from_nothing_selects_first() {
        assert_eq!(navigate(None, NavKey::Down, 3), Some(0));
        assert_eq!(navigate(None, NavKey::Up, 3), Some(0));
    }

    #[test]
    fn test_navigate_clamps() {
        assert_eq!(navigate(Some(2), NavKey::Down, 3), Some(2));
        assert_eq!(navigate(Some(0), NavKey::Up, 3), Some(0));
        assert_eq!(navigate(Some(1), NavKey::Down, 3), Some(2));
        assert_eq!(navigate(Some(1), NavKey::Up, 3), Some(0));
    }

    #[test]
    fn test_navigate_after_list_shrinks() {
        assert_eq!(navigate(Some(5), NavKey::Down, 2), Some(1));
        assert_eq!(navigate(Some(5), NavKey::Up, 2), Some(1));
    }

    #[test]
    fn test_navigate_escape_and_empty() {
        assert_eq!(navigate(Some(1), NavKey::Escape, 3), None);
        assert_eq!(navigate(None, NavKey::Down, 0), None);
    }

    #[test]
    fn test_nav_key_mapping() {
        assert_eq!(NavKey::from_key("ArrowDown"), Some(NavKey::Down));
        assert_eq!(NavKey::from_key("Escape"), Some(NavKey::Escape));
        assert_eq!(NavKey::from_key("Enter"), None);
    }
}
