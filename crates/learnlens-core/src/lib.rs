//! LearnLens Core Library
//!
//! This crate provides the core functionality for LearnLens, including:
//! - Storage (SQLite schema for organizations, users, badges, courses, enrollments)
//! - Analytics engine (enrollment summaries, trends, completion metrics, learning paths)
//! - Intent classification (ordered pattern rules over free-text queries)
//! - Chart payload generation
//! - LLM integration (OpenAI-compatible chat completions)
//! - Response composition (aggregate data + prose answer)

pub mod analytics;
pub mod config;
pub mod error;
pub mod intent;
pub mod llm;
pub mod model;
pub mod service;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::service::AnalyticsService;
    pub use crate::storage::Database;
}
