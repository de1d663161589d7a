//! Conversation Memory System
//!
//! Live transcripts, long-term summary persistence, prompt windowing and
//! summarization

pub mod context_manager;
pub mod summarizer;
pub mod summary_store;
pub mod transcript;

pub use context_manager::ContextManager;
pub use summarizer::ContextSummarizer;
pub use summary_store::{FileSummaryStore, InMemorySummaryStore, SummaryStore};
pub use transcript::{Transcript, TranscriptView};
