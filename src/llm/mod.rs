//! Language-model collaborators
//!
//! The conversation store only sees the `ChatModel` trait. `OpenAiClient`
//! talks to a chat-completions endpoint; `MockChatModel` keeps the system
//! usable without network access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::error::ChatError;
use crate::Result;

pub mod openai;
pub use openai::OpenAiClient;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A role-tagged message sent to the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Trait for text generation (external model)
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a reply for the given messages
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

/// Deterministic model for development & testing.
///
/// Scripted replies are consumed first; after that every call answers with a
/// numbered canned reply.
pub struct MockChatModel {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
    always_fail: Option<String>,
}

impl MockChatModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            always_fail: None,
        }
    }

    pub fn with_replies<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = std::result::Result<String, String>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::new()
        }
    }

    /// A model whose every call fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            always_fail: Some(reason.into()),
            ..Self::new()
        }
    }

    /// Messages received so far, one entry per call
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let call_number = {
            let mut calls = lock(&self.calls);
            calls.push(messages.to_vec());
            calls.len()
        };

        if let Some(reason) = &self.always_fail {
            return Err(ChatError::Generation(reason.clone()));
        }

        match lock(&self.replies).pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(ChatError::Generation(reason)),
            None => Ok(format!("Mock reply #{}", call_number)),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

// The guarded data stays consistent even if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
