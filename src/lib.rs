//! Chat Recap - turn an exported ChatGPT `conversations.json` into a year-in-review
//!
//! The pipeline flattens the export's conversation trees into a message list,
//! folds that list into calendar and per-conversation rollups in a single pass,
//! and derives the statistics a slideshow-style recap shows: streaks, peak and
//! quiet periods, shares, reply lengths, leaderboards, badges and a word cloud.
//! It can be used as a library, through the `chat-recap` binary, or through the
//! Swift bindings in [`ffi`].
//!
//! # Examples
//!
//! ## Analysing an export on disk
//!
//! ```no_run
//! use chat_recap::{analyse_export, RecapConfig};
//! use std::path::Path;
//!
//! let recap = analyse_export(Path::new("/path/to/export"), &RecapConfig::default()).unwrap();
//! println!("{} messages over {} active days", recap.context.message_count, recap.context.active_days);
//! println!("{}", recap.to_json_pretty().unwrap());
//! ```
//!
//! ## Analysing parsed JSON
//!
//! ```
//! use chat_recap::{analyse_value, RecapConfig, ReportTimezone};
//! use serde_json::json;
//!
//! let export = json!([{ "id": "c1", "title": "Hello", "mapping": {
//!     "n1": { "message": { "author": { "role": "user" },
//!         "content": { "content_type": "text", "parts": ["hi"] }, "create_time": 1700000000 } }
//! }}]);
//! let config = RecapConfig::default().with_timezone(ReportTimezone::Utc);
//! let recap = analyse_value(&export, &config).unwrap();
//! assert_eq!(recap.metrics.message_count, 1);
//! ```

pub mod achievements;
pub mod aggregate;
pub mod charts;
pub mod config;
pub mod content;
pub mod error;
pub mod extremum;
pub mod ffi;
pub mod format;
pub mod leaderboard;
pub mod loader;
pub mod parser;
pub mod report;
pub mod stats;
pub mod streaks;
pub mod types;
pub mod words;

use std::path::Path;

use serde_json::Value;

// Re-export commonly used types and functions for convenience
pub use aggregate::Aggregates;
pub use charts::{Chart, ChartData};
pub use config::{load_config, load_config_or_default, RecapConfig, ReportTimezone};
pub use content::extract_text;
pub use error::{RecapError, RecapResult};
pub use loader::{find_conversation_file, load_messages, read_export};
pub use parser::flatten_messages;
pub use report::{build_recap, Recap, RecapContext, RecapMetrics};
pub use types::{ConversationSummary, NormalizedMessage, Role, WordCloudTerm};
pub use words::word_cloud_terms;

/// Locate, read and analyse an export file or directory.
pub fn analyse_export(path: &Path, config: &RecapConfig) -> RecapResult<Recap> {
    let messages = load_messages(path)?;
    Ok(build_recap(&messages, config))
}

/// Analyse an export that has already been parsed into JSON.
pub fn analyse_value(export: &Value, config: &RecapConfig) -> RecapResult<Recap> {
    let conversations = export.as_array().ok_or(RecapError::NotAnArray)?;
    analyse_conversations(conversations, config)
}

pub fn analyse_conversations(conversations: &[Value], config: &RecapConfig) -> RecapResult<Recap> {
    let messages = loader::messages_from_conversations(conversations)?;
    Ok(build_recap(&messages, config))
}
