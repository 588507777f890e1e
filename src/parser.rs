// SPDX-License-Identifier: GPL-3.0-only

//! JSON parsing for conversation records.
//!
//! This module deserializes conversation record files into typed Rust
//! structures. A record is a JSON object with three optional top-level
//! fields:
//!
//! - `metadata`: project path, git branch, and start/end unix timestamps
//! - `messages`: the ordered conversation turns (`role` + `content`)
//! - `thinking`: model-internal reasoning annotations
//!
//! Parsing is deliberately tolerant: missing or wrong-typed optional fields
//! come back as `None` rather than failing the whole record, and message
//! `content` may be either a plain string or an array of typed content
//! blocks as written by session logs.
//!
//! # Example
//!
//! ```
//! use cc2html::parser::parse_conversation;
//!
//! let json = r#"{
//!     "metadata": { "project": "/home/user/demo", "git_branch": "main" },
//!     "messages": [{ "role": "user", "content": "Hello" }]
//! }"#;
//!
//! let conversation = parse_conversation(json).unwrap();
//! assert_eq!(conversation.messages.len(), 1);
//! ```

use serde::Deserialize;
use snafu::prelude::*;

/// Error type for conversation parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// Failed to parse JSON content.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// A parsed conversation record.
///
/// Every field is optional in the source format; an absent field means the
/// corresponding section is simply not rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversation {
    /// Provenance information shown in the metadata header.
    pub metadata: Option<Metadata>,

    /// The conversation turns, in sequence order.
    pub messages: Vec<Message>,

    /// Thinking annotations, rendered after all messages.
    pub thinking: Vec<ThinkingBlock>,
}

/// Conversation provenance shown in the metadata header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    /// The project path. Only the final path segment is displayed.
    pub project: Option<String>,

    /// The git branch name, shown verbatim.
    pub git_branch: Option<String>,

    /// When the conversation started, as a unix timestamp in seconds.
    pub start_time: Option<i64>,

    /// When the conversation ended, as a unix timestamp in seconds.
    pub end_time: Option<i64>,
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// The speaker role (e.g. "user", "assistant"). Rendering defaults an
    /// absent role to "unknown".
    pub role: Option<String>,

    /// The message text. Rendering defaults absent content to empty.
    pub content: Option<String>,
}

/// A model-internal reasoning annotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThinkingBlock {
    /// The reasoning text.
    pub content: Option<String>,
}

impl<'de> Deserialize<'de> for Conversation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let metadata = value
            .get("metadata")
            .filter(|m| m.is_object())
            .map(|m| Metadata {
                project: get_string(m, "project"),
                git_branch: get_string(m, "git_branch"),
                start_time: get_i64(m, "start_time"),
                end_time: get_i64(m, "end_time"),
            });

        let messages = value
            .get("messages")
            .and_then(serde_json::Value::as_array)
            .map(|msgs| msgs.iter().map(parse_message).collect())
            .unwrap_or_default();

        let thinking = value
            .get("thinking")
            .and_then(serde_json::Value::as_array)
            .map(|blocks| blocks.iter().map(parse_thinking).collect())
            .unwrap_or_default();

        Ok(Self {
            metadata,
            messages,
            thinking,
        })
    }
}

fn parse_message(value: &serde_json::Value) -> Message {
    Message {
        role: get_string(value, "role"),
        content: extract_content(value),
    }
}

fn parse_thinking(value: &serde_json::Value) -> ThinkingBlock {
    // Session logs write the text under "thinking"; the plain record
    // format uses "content". Accept both.
    ThinkingBlock {
        content: get_string(value, "content").or_else(|| get_string(value, "thinking")),
    }
}

/// Extracts message content, which may be a plain string or an array of
/// typed content blocks.
///
/// The block form is what session logs produce:
/// `[{ "type": "text", "text": "..." }, ...]`. Text blocks are joined with
/// newlines; thinking-typed blocks belong to the top-level `thinking`
/// channel and are skipped here.
fn extract_content(value: &serde_json::Value) -> Option<String> {
    let content = value.get("content")?;

    if let Some(text) = content.as_str() {
        return Some(text.to_owned());
    }

    let blocks = content.as_array()?;
    let mut text = String::new();
    for block in blocks {
        if block.get("type").and_then(serde_json::Value::as_str) == Some("text")
            && let Some(t) = block.get("text").and_then(serde_json::Value::as_str)
        {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(t);
        }
    }

    Some(text)
}

/// Returns the string value under `key`, or `None` for absent or
/// wrong-typed fields.
fn get_string(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}

/// Returns the integer value under `key`, or `None` for absent or
/// wrong-typed fields.
fn get_i64(value: &serde_json::Value, key: &str) -> Option<i64> {
    value.get(key).and_then(serde_json::Value::as_i64)
}

/// Parses a JSON string into a [`Conversation`].
///
/// # Errors
///
/// Returns an error only when the input is not valid JSON. Missing or
/// wrong-typed optional fields degrade to absent instead of failing.
///
/// # Example
///
/// ```
/// use cc2html::parser::parse_conversation;
///
/// let conversation = parse_conversation("{}").unwrap();
/// assert!(conversation.messages.is_empty());
/// ```
pub fn parse_conversation(json_str: &str) -> Result<Conversation, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_record() {
        let json = r#"{
            "metadata": {
                "project": "/home/user/demo",
                "git_branch": "main",
                "start_time": 1733356800,
                "end_time": 1733360400
            },
            "messages": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello!" }
            ],
            "thinking": [
                { "content": "The user greeted me." }
            ]
        }"#;
        let conversation = parse_conversation(json).unwrap();

        let meta = conversation.metadata.as_ref().unwrap();
        assert_eq!(meta.project.as_deref(), Some("/home/user/demo"));
        assert_eq!(meta.git_branch.as_deref(), Some("main"));
        assert_eq!(meta.start_time, Some(1_733_356_800));
        assert_eq!(meta.end_time, Some(1_733_360_400));

        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].role.as_deref(), Some("user"));
        assert_eq!(conversation.messages[1].content.as_deref(), Some("Hello!"));

        assert_eq!(conversation.thinking.len(), 1);
        assert_eq!(
            conversation.thinking[0].content.as_deref(),
            Some("The user greeted me.")
        );
    }

    #[test]
    fn parses_empty_record() {
        let conversation = parse_conversation("{}").unwrap();

        assert!(conversation.metadata.is_none());
        assert!(conversation.messages.is_empty());
        assert!(conversation.thinking.is_empty());
    }

    #[test]
    fn parses_partial_metadata() {
        let json = r#"{ "metadata": { "git_branch": "feature/x" } }"#;
        let conversation = parse_conversation(json).unwrap();

        let meta = conversation.metadata.unwrap();
        assert!(meta.project.is_none());
        assert_eq!(meta.git_branch.as_deref(), Some("feature/x"));
        assert!(meta.start_time.is_none());
    }

    #[test]
    fn wrong_typed_fields_degrade_to_absent() {
        let json = r#"{
            "metadata": { "project": 42, "start_time": "yesterday" },
            "messages": [{ "role": 7, "content": "hi" }]
        }"#;
        let conversation = parse_conversation(json).unwrap();

        let meta = conversation.metadata.unwrap();
        assert!(meta.project.is_none());
        assert!(meta.start_time.is_none());
        assert!(conversation.messages[0].role.is_none());
        assert_eq!(conversation.messages[0].content.as_deref(), Some("hi"));
    }

    #[test]
    fn non_object_metadata_is_absent() {
        let json = r#"{ "metadata": "oops" }"#;
        let conversation = parse_conversation(json).unwrap();

        assert!(conversation.metadata.is_none());
    }

    #[test]
    fn message_without_content() {
        let json = r#"{ "messages": [{ "role": "user" }] }"#;
        let conversation = parse_conversation(json).unwrap();

        assert!(conversation.messages[0].content.is_none());
    }

    #[test]
    fn parses_block_array_content() {
        let json = r#"{
            "messages": [{
                "role": "assistant",
                "content": [
                    { "type": "text", "text": "First part." },
                    { "type": "thinking", "thinking": "hidden" },
                    { "type": "text", "text": "Second part." }
                ]
            }]
        }"#;
        let conversation = parse_conversation(json).unwrap();

        assert_eq!(
            conversation.messages[0].content.as_deref(),
            Some("First part.\nSecond part.")
        );
    }

    #[test]
    fn thinking_accepts_session_log_key() {
        let json = r#"{ "thinking": [{ "thinking": "deep thought" }] }"#;
        let conversation = parse_conversation(json).unwrap();

        assert_eq!(
            conversation.thinking[0].content.as_deref(),
            Some("deep thought")
        );
    }

    #[test]
    fn returns_error_for_invalid_json() {
        assert!(parse_conversation("not valid json").is_err());
    }

    #[test]
    fn preserves_message_order() {
        let json = r#"{ "messages": [
            { "role": "user", "content": "1" },
            { "role": "assistant", "content": "2" },
            { "role": "user", "content": "3" }
        ] }"#;
        let conversation = parse_conversation(json).unwrap();

        let contents: Vec<_> = conversation
            .messages
            .iter()
            .map(|m| m.content.as_deref().unwrap())
            .collect();
        assert_eq!(contents, ["1", "2", "3"]);
    }
}
