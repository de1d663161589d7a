//! Conversation summary store
//!
//! Keeps one live transcript per session key plus a persisted long-term
//! summary, and drives the per-interaction cycle:
//! QUESTION → ANSWER (summary + live window) → RESUMMARIZE → PERSIST
//!
//! A session has no summary until its first resummarization; afterwards the
//! summary is read, rewritten and overwritten on every answered question.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, MemoryConfig};
use crate::error::ChatError;
use crate::llm::{ChatModel, MockChatModel, OpenAiClient};
use crate::memory::{ContextManager, ContextSummarizer, FileSummaryStore, SummaryStore, Transcript};
use crate::models::{InteractionOutcome, SessionKey, SessionStats, SummaryState, Turn};
use crate::Result;

pub struct ConversationSummaryStore {
    sessions: Arc<RwLock<HashMap<SessionKey, Transcript>>>,
    summaries: Arc<dyn SummaryStore>,
    model: Arc<dyn ChatModel>,
    context_manager: ContextManager,
    system_prompt: String,
}

impl ConversationSummaryStore {
    pub fn new(model: Arc<dyn ChatModel>, summaries: Arc<dyn SummaryStore>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            summaries,
            model,
            context_manager: ContextManager::new(),
            system_prompt: crate::config::DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Wire up the production collaborators described by `config`.
    ///
    /// Without an API key the mock model is used so the service still runs.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let model: Arc<dyn ChatModel> = match config.model.api_key {
            Some(_) => Arc::new(OpenAiClient::from_config(&config.model)?),
            None => {
                warn!("OPENAI_API_KEY not set, answering with the mock model");
                Arc::new(MockChatModel::new())
            }
        };

        info!(
            model = model.model_name(),
            summary_dir = %config.summary_dir.display(),
            "Conversation store configured"
        );

        Self::new(model, Arc::new(FileSummaryStore::new(&config.summary_dir)))
            .with_system_prompt(config.model.system_prompt.clone())
            .with_memory_config(config.memory.clone())
    }

    pub fn with_memory_config(mut self, config: MemoryConfig) -> Result<Self> {
        config.validate()?;
        self.context_manager = ContextManager::with_config(config);
        Ok(self)
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn memory_config(&self) -> &MemoryConfig {
        self.context_manager.config()
    }

    /// Validate `raw_key` and make sure a session exists for it
    pub async fn open(&self, raw_key: &str) -> Result<SessionKey> {
        let key = SessionKey::parse(raw_key)?;

        let mut sessions = self.sessions.write().await;
        sessions.entry(key.clone()).or_insert_with(|| {
            debug!(session = %key, "Opening new session");
            Transcript::new(key.clone())
        });

        Ok(key)
    }

    /// Persisted long-term summary, or an empty string
    pub async fn load(&self, key: &SessionKey) -> String {
        self.summaries.load(key).await
    }

    /// Add a turn to the live transcript; nothing is persisted
    pub async fn append(&self, key: &SessionKey, turn: Turn) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(key.clone())
            .or_insert_with(|| Transcript::new(key.clone()))
            .push(turn);
    }

    /// Answer `question` from the summary and live window.
    ///
    /// The question and the answer are appended together once generation
    /// succeeds; on failure the transcript is left as it was.
    pub async fn answer(&self, key: &SessionKey, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        let summary = self.load(key).await;

        let messages = {
            let sessions = self.sessions.read().await;
            let empty;
            let transcript = match sessions.get(key) {
                Some(transcript) => transcript,
                None => {
                    empty = Transcript::new(key.clone());
                    &empty
                }
            };

            self.context_manager.prepare_answer_messages(
                &self.system_prompt,
                &summary,
                transcript,
                question,
            )
        };

        info!(
            session = %key,
            model = self.model.model_name(),
            has_summary = !summary.is_empty(),
            "Generating answer"
        );

        let answer = self.model.complete(&messages).await.map_err(|e| {
            warn!(session = %key, "Answer generation failed: {}", e);
            e
        })?;

        let mut sessions = self.sessions.write().await;
        let transcript = sessions
            .entry(key.clone())
            .or_insert_with(|| Transcript::new(key.clone()));
        transcript.push(Turn::user(question));
        transcript.push(Turn::assistant(answer.clone()));

        Ok(answer)
    }

    /// Fold the latest turns into the summary and persist it
    pub async fn resummarize(&self, key: &SessionKey) -> Result<String> {
        let previous = self.load(key).await;

        let snapshot = {
            let sessions = self.sessions.read().await;
            sessions.get(key).filter(|t| !t.is_empty()).cloned()
        };

        let Some(transcript) = snapshot else {
            debug!(session = %key, "Nothing new to summarize");
            return Ok(previous);
        };

        let summary =
            ContextSummarizer::summarize(self.model.as_ref(), &previous, &transcript).await?;
        self.summaries.save(key, &summary).await?;

        Ok(summary)
    }

    /// One user action: answer, resummarize, then report what changed
    pub async fn interact(&self, key: &SessionKey, question: &str) -> Result<InteractionOutcome> {
        let answer = self.answer(key, question).await?;
        let summary = self.resummarize(key).await?;

        let config = self.context_manager.config();
        let recent_turns = {
            let mut sessions = self.sessions.write().await;
            match sessions.get_mut(key) {
                Some(transcript) => {
                    let evicted = transcript.trim_to_recent(config.retained_turns);
                    if evicted > 0 {
                        debug!(session = %key, evicted, "Evicted summarized turns");
                    }
                    transcript.recent(config.display_turns).cloned().collect()
                }
                None => Vec::new(),
            }
        };

        Ok(InteractionOutcome {
            session_key: key.to_string(),
            answer,
            summary_state: SummaryState::of(&summary),
            summary,
            recent_turns,
        })
    }

    /// The last `count` live turns, oldest first
    pub async fn recent_turns(&self, key: &SessionKey, count: usize) -> Vec<Turn> {
        let sessions = self.sessions.read().await;
        sessions
            .get(key)
            .map(|t| t.recent(count).cloned().collect())
            .unwrap_or_default()
    }

    /// Forget the live transcript; the persisted summary is kept
    pub async fn reset(&self, key: &SessionKey) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(key) {
            Some(transcript) => {
                transcript.clear();
                info!(session = %key, "Session transcript reset");
                true
            }
            None => false,
        }
    }

    pub async fn stats(&self, key: &SessionKey) -> SessionStats {
        let summary = self.load(key).await;
        let sessions = self.sessions.read().await;
        let (questions_asked, live_turns) = sessions
            .get(key)
            .map(|t| (t.questions_asked(), t.len()))
            .unwrap_or((0, 0));

        SessionStats {
            session_key: key.to_string(),
            questions_asked,
            live_turns,
            summary_state: SummaryState::of(&summary),
        }
    }
}
