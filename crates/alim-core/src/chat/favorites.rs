//! Favorites aggregation across all sessions.

use super::message::ChatMessage;
use super::model::ChatSession;

/// Collects every favorite-marked message across all sessions.
///
/// A pure function over the store's read view: each session's internal
/// message order is preserved, and sessions contribute in input
/// iteration order. Removal of a favorite routes back through
/// [`SessionStore::toggle_favorite_anywhere`](super::SessionStore::toggle_favorite_anywhere),
/// since this view carries no session reference.
pub fn favorites(sessions: &[ChatSession]) -> Vec<&ChatMessage> {
    sessions
        .iter()
        .flat_map(|s| s.messages.iter().filter(|m| m.is_favorite))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_favorites(texts: &[(&str, bool)]) -> ChatSession {
        let mut session = ChatSession::new();
        for (text, starred) in texts {
            let mut message = ChatMessage::assistant(*text);
            message.is_favorite = *starred;
            session.messages.push(message);
        }
        session
    }

    #[test]
    fn includes_exactly_the_flagged_messages() {
        let sessions = vec![
            session_with_favorites(&[("a", true), ("b", false)]),
            session_with_favorites(&[("c", false)]),
            session_with_favorites(&[("d", true), ("e", true)]),
        ];

        let texts: Vec<_> = favorites(&sessions).iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "d", "e"]);
    }

    #[test]
    fn empty_when_nothing_is_flagged() {
        let sessions = vec![session_with_favorites(&[("a", false)])];
        assert!(favorites(&sessions).is_empty());
    }

    #[test]
    fn unflagging_removes_from_the_aggregate() {
        let mut sessions = vec![session_with_favorites(&[("a", true)])];
        assert_eq!(favorites(&sessions).len(), 1);

        sessions[0].messages.last_mut().unwrap().is_favorite = false;
        assert!(favorites(&sessions).is_empty());
    }
}
