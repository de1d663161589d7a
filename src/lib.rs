//! Summary-Memory Chat
//!
//! A chat service that remembers users across sessions:
//! - Keeps a live transcript per session key
//! - Answers from {long-term summary, recent turns, question}
//! - Condenses the newest turns into the summary after every answer
//! - Persists one plain-text summary per session key
//!
//! INTERACTION LOOP:
//! OPEN → ANSWER → RESUMMARIZE → PERSIST → REPORT

pub mod api;
pub mod config;
pub mod conversational;
pub mod error;
pub mod llm;
pub mod memory;
pub mod models;

pub use error::Result;

// Re-export common types
pub use config::AppConfig;
pub use conversational::ConversationSummaryStore;
pub use models::*;
