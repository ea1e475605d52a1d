//! Chat message rules and the speech bubbles drawn above avatars.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::chat::{BLOCKED_WORDS, CHAT_MAX_CHARS};
use crate::game::entity::EntityId;

/// Result of checking an outgoing or relayed chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatVerdict {
    /// Trimmed and cut to the maximum length.
    Accepted(String),
    Empty,
    Blocked { word: &'static str },
}

/// Trim, cap at [`CHAT_MAX_CHARS`] and screen against the blocked word list.
pub fn screen_message(raw: &str) -> ChatVerdict {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ChatVerdict::Empty;
    }

    let lower = trimmed.to_lowercase();
    if let Some(word) = BLOCKED_WORDS.iter().copied().find(|w| lower.contains(w)) {
        return ChatVerdict::Blocked { word };
    }

    ChatVerdict::Accepted(trimmed.chars().take(CHAT_MAX_CHARS).collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatBubble {
    pub message: String,
    pub age: Duration,
}

/// One bubble per speaker, looked up by entity id.
#[derive(Debug, Clone)]
pub struct ChatBubbles {
    bubbles: HashMap<EntityId, ChatBubble>,
    lifetime: Duration,
    fade: Duration,
}

impl ChatBubbles {
    pub fn new(lifetime: Duration, fade: Duration) -> Self {
        Self {
            bubbles: HashMap::new(),
            lifetime,
            fade: fade.min(lifetime),
        }
    }

    /// A new line replaces whatever the speaker was still showing.
    pub fn show(&mut self, owner: &str, message: impl Into<String>) {
        self.bubbles.insert(
            owner.to_string(),
            ChatBubble {
                message: message.into(),
                age: Duration::ZERO,
            },
        );
    }

    pub fn get(&self, owner: &str) -> Option<&ChatBubble> {
        self.bubbles.get(owner)
    }

    pub fn remove(&mut self, owner: &str) -> Option<ChatBubble> {
        self.bubbles.remove(owner)
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChatBubble)> {
        self.bubbles.iter().map(|(id, b)| (id.as_str(), b))
    }

    /// 1.0 until the fade window, then linearly down to 0.0.
    pub fn opacity(&self, bubble: &ChatBubble) -> f32 {
        let fade_start = self.lifetime - self.fade;
        if bubble.age <= fade_start || self.fade.is_zero() {
            return 1.0;
        }
        let into_fade = (bubble.age - fade_start).as_secs_f32() / self.fade.as_secs_f32();
        (1.0 - into_fade).max(0.0)
    }

    /// Age every bubble and drop the expired ones.
    pub fn update(&mut self, dt: Duration) {
        let lifetime = self.lifetime;
        self.bubbles.retain(|_, bubble| {
            bubble.age += dt;
            bubble.age < lifetime
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_trimmed_and_capped() {
        assert_eq!(screen_message("  hola  "), ChatVerdict::Accepted("hola".into()));
        assert_eq!(screen_message("   "), ChatVerdict::Empty);
        let long = "a".repeat(100);
        assert_eq!(screen_message(&long), ChatVerdict::Accepted("a".repeat(CHAT_MAX_CHARS)));
    }

    #[test]
    fn blocked_words_match_case_insensitively() {
        assert_eq!(screen_message("You are STUPID"), ChatVerdict::Blocked { word: "stupid" });
        assert!(matches!(screen_message("nice tree"), ChatVerdict::Accepted(_)));
    }

    #[test]
    fn bubble_fades_then_expires() {
        let mut bubbles = ChatBubbles::new(Duration::from_millis(3000), Duration::from_millis(500));
        bubbles.show("ana", "hola");

        bubbles.update(Duration::from_millis(2500));
        let bubble = bubbles.get("ana").unwrap();
        assert_eq!(bubbles.opacity(bubble), 1.0);

        bubbles.update(Duration::from_millis(250));
        let bubble = bubbles.get("ana").unwrap();
        assert!((bubbles.opacity(bubble) - 0.5).abs() < 1e-3);

        bubbles.update(Duration::from_millis(250));
        assert!(bubbles.get("ana").is_none());
    }

    #[test]
    fn new_line_replaces_old_bubble() {
        let mut bubbles = ChatBubbles::new(Duration::from_millis(3000), Duration::from_millis(500));
        bubbles.show("ana", "hola");
        bubbles.update(Duration::from_millis(2000));
        bubbles.show("ana", "chao");
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles.get("ana").unwrap().age, Duration::ZERO);
        assert_eq!(bubbles.get("ana").unwrap().message, "chao");
    }
}
