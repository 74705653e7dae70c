use crate::traits::ChatMessage;

const NAME_GUIDANCE: &str = "Please include your name if asked. \
You can get your name using the `make_random_name` tool.";

const CODE_GUIDANCE: &str = "If I request code, please return it as python \
delimited with <execute_python> and </execute_python> tags.";

/// Builds the seed history for one run: standing guidance followed by the
/// user's prompt.
pub struct ContextBuilder {
    guidance: Vec<String>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            guidance: vec![NAME_GUIDANCE.to_string(), CODE_GUIDANCE.to_string()],
        }
    }

    pub fn with_guidance(mut self, guidance: Vec<String>) -> Self {
        self.guidance = guidance;
        self
    }

    /// Guidance goes in as `user` turns rather than `system` ones: some
    /// providers reorder or drop system messages when tools are attached.
    pub fn build_messages(&self, prompt: &str) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = self
            .guidance
            .iter()
            .map(|g| ChatMessage::user(g.clone()))
            .collect();
        messages.push(ChatMessage::user(prompt));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_ends_with_prompt() {
        let messages = ContextBuilder::new().build_messages("What is your name?");
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.role == "user"));
        assert_eq!(messages.last().unwrap().content, "What is your name?");
    }

    #[test]
    fn custom_guidance() {
        let messages = ContextBuilder::new()
            .with_guidance(vec!["Be terse.".to_string()])
            .build_messages("hi");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Be terse.");
    }
}
