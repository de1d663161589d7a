//! Live transcript storage
//!
//! Ordered, append-only buffer of the turns of one session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::models::{Role, SessionKey, Turn};

/// In-memory conversation of a single session
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub session_key: SessionKey,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    turns: VecDeque<Turn>,
    /// Questions asked over the session's lifetime, including evicted ones
    questions_asked: usize,
}

impl Transcript {
    pub fn new(session_key: SessionKey) -> Self {
        Self {
            session_key,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            turns: VecDeque::new(),
            questions_asked: 0,
        }
    }

    /// Add a turn at the end of the conversation
    pub fn push(&mut self, turn: Turn) {
        if turn.role == Role::User {
            self.questions_asked += 1;
        }
        self.turns.push_back(turn);
        self.updated_at = Utc::now();
    }

    // =============================
    // Iterators (ZERO ALLOCATION)
    // =============================

    /// Iterate over all turns, oldest first
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Iterate over the `count` most recent turns, oldest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &Turn> {
        let skip = self.turns.len().saturating_sub(count);
        self.turns.iter().skip(skip)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn questions_asked(&self) -> usize {
        self.questions_asked
    }

    /// Drop the oldest turns until at most `keep` remain
    pub fn trim_to_recent(&mut self, keep: usize) -> usize {
        let mut evicted = 0;
        while self.turns.len() > keep {
            self.turns.pop_front();
            evicted += 1;
        }

        if evicted > 0 {
            self.updated_at = Utc::now();
        }

        evicted
    }

    /// Clear all turns
    pub fn clear(&mut self) {
        self.turns.clear();
        self.questions_asked = 0;
        self.updated_at = Utc::now();
    }
}

/// Render turns as `Label: content` lines for a prompt
pub fn format_turns<'a>(turns: impl IntoIterator<Item = &'a Turn>) -> String {
    let mut text = String::new();

    for turn in turns {
        text.push_str(turn.role.label());
        text.push_str(": ");
        text.push_str(&turn.content);
        text.push('\n');
    }

    text
}

/// Snapshot of a transcript, as handed out to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptView {
    pub session_key: String,
    pub turns: Vec<Turn>,
}
