//! Placeholder plant-care assistant.
//!
//! Returns a canned reply until a real model integration lands; the
//! suggestion prompts seed the client's quick-reply chips.

/// Opening message shown before the user says anything.
pub const GREETING: &str =
    "Hello! I'm your plant care AI assistant 🌱 How can I help you today?";

/// Quick-reply prompts offered alongside every response.
pub const SUGGESTIONS: [&str; 3] = [
    "How often should I water my plants?",
    "Best plants for low light",
    "Common plant diseases",
];

/// Canned reply to any user message.
pub fn reply(_message: &str) -> &'static str {
    "I'd be happy to help you with plant care advice! (AI integration will be added soon)"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_is_always_the_placeholder() {
        assert_eq!(reply("how do I repot basil?"), reply("anything else"));
        assert!(!reply("x").is_empty());
        assert_eq!(SUGGESTIONS.len(), 3);
        assert!(GREETING.contains("assistant"));
    }
}
