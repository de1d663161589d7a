//! Context Summarization
//!
//! Folds the newest turns into the previous long-term summary using the
//! chat model. The result replaces the old summary wholesale.

use tracing::{info, warn};

use crate::config::SUMMARY_WINDOW;
use crate::error::ChatError;
use crate::llm::{ChatMessage, ChatModel};
use crate::memory::context_manager::NO_SUMMARY_PLACEHOLDER;
use crate::memory::transcript::{format_turns, Transcript};
use crate::models::Turn;

/// Summarizes conversation context using a chat model
pub struct ContextSummarizer;

impl ContextSummarizer {
    /// Turns fed to a summarization pass; never more than `SUMMARY_WINDOW`
    pub fn summary_window(transcript: &Transcript) -> Vec<&Turn> {
        transcript.recent(SUMMARY_WINDOW).collect()
    }

    /// Prompt asking the model to merge `turns` into `previous_summary`
    pub fn build_prompt(previous_summary: &str, turns: &[&Turn]) -> String {
        let previous = if previous_summary.is_empty() {
            NO_SUMMARY_PLACEHOLDER
        } else {
            previous_summary
        };

        format!(
            r#"Below is the most recent part of a conversation.
Use it to update the overall summary of the conversation.

[Previous summary]
{}

[New conversation]
{}

Updated consolidated summary:"#,
            previous,
            format_turns(turns.iter().copied()).trim_end()
        )
    }

    /// Produce the new summary for a transcript.
    ///
    /// A blank reply is a generation failure, never a summary.
    pub async fn summarize(
        model: &dyn ChatModel,
        previous_summary: &str,
        transcript: &Transcript,
    ) -> crate::Result<String> {
        let window = Self::summary_window(transcript);
        let prompt = Self::build_prompt(previous_summary, &window);

        info!(
            session = %transcript.session_key,
            model = model.model_name(),
            "Summarizing {} recent turns",
            window.len()
        );

        match model.complete(&[ChatMessage::user(prompt)]).await {
            Ok(summary) if summary.trim().is_empty() => {
                warn!(session = %transcript.session_key, "Model returned an empty summary");
                Err(ChatError::Generation("empty summary".to_string()))
            }
            Ok(summary) => Ok(summary.trim().to_string()),
            Err(e) => {
                warn!("Failed to summarize context: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockChatModel;
    use crate::models::SessionKey;

    fn transcript_with(count: usize) -> Transcript {
        let mut transcript = Transcript::new(SessionKey::parse("alice").unwrap());
        for i in 0..count {
            if i % 2 == 0 {
                transcript.push(Turn::user(format!("Question {}", i)));
            } else {
                transcript.push(Turn::assistant(format!("Answer {}", i)));
            }
        }
        transcript
    }

    #[test]
    fn test_summary_window_never_exceeds_limit() {
        for count in [0, 1, 5, 6, 7, 40] {
            let transcript = transcript_with(count);
            let window = ContextSummarizer::summary_window(&transcript);
            assert_eq!(window.len(), count.min(SUMMARY_WINDOW));
        }
    }

    #[test]
    fn test_build_prompt() {
        let transcript = transcript_with(8);
        let window = ContextSummarizer::summary_window(&transcript);
        let prompt = ContextSummarizer::build_prompt("", &window);

        assert!(prompt.contains(NO_SUMMARY_PLACEHOLDER));
        assert!(prompt.contains("User: Question 2"));
        assert!(prompt.contains("AI: Answer 7"));
        assert!(!prompt.contains("Answer 1\n"));
    }

    #[tokio::test]
    async fn test_summarize_trims_model_output() {
        let model = MockChatModel::with_replies([Ok("  Alice asked questions.\n".to_string())]);
        let transcript = transcript_with(2);

        let summary = ContextSummarizer::summarize(&model, "Older facts.", &transcript)
            .await
            .unwrap();
        assert_eq!(summary, "Alice asked questions.");

        let prompt = &model.calls()[0][0].content;
        assert!(prompt.contains("Older facts."));
    }

    #[tokio::test]
    async fn test_blank_reply_is_generation_error() {
        let model = MockChatModel::with_replies([Ok("   \n".to_string())]);
        let transcript = transcript_with(2);

        let err = ContextSummarizer::summarize(&model, "Older facts.", &transcript)
            .await
            .unwrap_err();
        assert!(err.is_generation());
        assert!(err.to_string().contains("empty summary"));
    }
}
