use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One turn of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Keeps only the most recent `window_size` messages.
///
/// Eviction removes the oldest messages first. The retained history always
/// starts at a user message when one exists inside the window, since the
/// model rejects conversations that open with an assistant turn.
#[derive(Debug, Clone, Copy)]
pub struct SlidingWindowConversationManager {
    window_size: usize,
}

impl SlidingWindowConversationManager {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn apply_management(&self, messages: &mut Vec<Message>) {
        if messages.len() <= self.window_size {
            return;
        }

        let minimum_cut = messages.len() - self.window_size;
        let cut = messages[minimum_cut..]
            .iter()
            .position(|m| m.role == Role::User)
            .map(|offset| minimum_cut + offset)
            .unwrap_or(minimum_cut);

        debug!(
            evicted = cut,
            retained = messages.len() - cut,
            "Trimming conversation history"
        );
        messages.drain(..cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<Message> {
        (0..n)
            .flat_map(|i| {
                [
                    Message::user(format!("q{}", i)),
                    Message::assistant(format!("a{}", i)),
                ]
            })
            .collect()
    }

    #[test]
    fn short_history_is_untouched() {
        let manager = SlidingWindowConversationManager::new(10);
        let mut messages = turns(3);
        manager.apply_management(&mut messages);
        assert_eq!(messages.len(), 6);
    }

    #[test]
    fn oldest_messages_are_evicted_first() {
        let manager = SlidingWindowConversationManager::new(10);
        let mut messages = turns(6);
        messages.push(Message::user("latest"));
        manager.apply_management(&mut messages);

        assert!(messages.len() <= 10);
        assert_eq!(messages.last().unwrap().content, "latest");
        assert_eq!(messages.first().unwrap().role, Role::User);
        assert!(!messages.iter().any(|m| m.content == "q0"));
    }

    #[test]
    fn window_never_opens_with_assistant() {
        let manager = SlidingWindowConversationManager::new(4);
        let mut messages = turns(3);
        messages.push(Message::user("q3"));
        // 7 messages, window of 4 would start at "a1"
        manager.apply_management(&mut messages);

        assert_eq!(messages.first().unwrap().content, "q2");
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn zero_window_is_clamped() {
        let manager = SlidingWindowConversationManager::new(0);
        assert_eq!(manager.window_size(), 1);
        let mut messages = turns(2);
        manager.apply_management(&mut messages);
        assert_eq!(messages.len(), 1);
    }
}
