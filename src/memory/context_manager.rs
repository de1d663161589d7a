//! Context Window Management
//!
//! Picks the live window of a transcript and assembles the answer prompt
//! from {long-term summary, live window, question}.

use crate::config::MemoryConfig;
use crate::llm::ChatMessage;
use crate::memory::transcript::{format_turns, Transcript};
use crate::models::Turn;

pub const NO_SUMMARY_PLACEHOLDER: &str = "(no previous summary)";
const NO_HISTORY_PLACEHOLDER: &str = "(no conversation yet)";

/// Builds bounded prompts out of a session's memory
pub struct ContextManager {
    config: MemoryConfig,
}

impl ContextManager {
    pub fn new() -> Self {
        Self {
            config: MemoryConfig::default(),
        }
    }

    pub fn with_config(config: MemoryConfig) -> Self {
        Self { config }
    }

    /// The most recent turns quoted verbatim, oldest first
    pub fn live_window<'a>(&self, transcript: &'a Transcript) -> Vec<&'a Turn> {
        transcript.recent(self.config.live_window).collect()
    }

    /// Messages for answering `question` in the context of this session
    pub fn prepare_answer_messages(
        &self,
        system_prompt: &str,
        summary: &str,
        transcript: &Transcript,
        question: &str,
    ) -> Vec<ChatMessage> {
        let window = self.live_window(transcript);

        let summary_text = if summary.is_empty() {
            NO_SUMMARY_PLACEHOLDER
        } else {
            summary
        };

        let history = if window.is_empty() {
            NO_HISTORY_PLACEHOLDER.to_string()
        } else {
            format_turns(window)
        };

        let prompt = format!(
            r#"You are an assistant that talks with the user using a condensed memory of earlier conversations and the most recent exchanges.

[Long-term summary]
{}

[Recent conversation]
{}

[Question]
{}

Use the information above to give a natural reply that stays consistent with what was said before."#,
            summary_text,
            history.trim_end(),
            question
        );

        vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)]
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatRole;
    use crate::models::SessionKey;

    fn transcript_with(count: usize) -> Transcript {
        let mut transcript = Transcript::new(SessionKey::parse("alice").unwrap());
        for i in 0..count {
            transcript.push(Turn::user(format!("Question {}", i)));
        }
        transcript
    }

    #[test]
    fn test_live_window_is_bounded() {
        let manager = ContextManager::new();
        let transcript = transcript_with(15);

        let window = manager.live_window(&transcript);
        assert_eq!(window.len(), manager.config().live_window);
        assert_eq!(window.last().unwrap().content, "Question 14");
    }

    #[test]
    fn test_prepare_answer_messages() {
        let manager = ContextManager::with_config(MemoryConfig {
            live_window: 2,
            ..MemoryConfig::default()
        });
        let transcript = transcript_with(4);

        let messages = manager.prepare_answer_messages(
            "Be kind",
            "Alice likes tea.",
            &transcript,
            "What do I like?",
        );

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[0].content, "Be kind");

        let prompt = &messages[1].content;
        assert!(prompt.contains("Alice likes tea."));
        assert!(prompt.contains("User: Question 3"));
        assert!(prompt.contains("User: Question 2"));
        assert!(!prompt.contains("Question 1"));
        assert!(prompt.contains("What do I like?"));
    }

    #[test]
    fn test_placeholders_for_fresh_session() {
        let manager = ContextManager::new();
        let transcript = transcript_with(0);

        let messages = manager.prepare_answer_messages("sys", "", &transcript, "Hi");
        assert!(messages[1].content.contains(NO_SUMMARY_PLACEHOLDER));
        assert!(messages[1].content.contains(NO_HISTORY_PLACEHOLDER));
    }
}
