// SPDX-License-Identifier: GPL-3.0-only

//! HTML rendering for parsed conversation records.
//!
//! This module transforms a [`Conversation`] into a self-contained HTML
//! fragment: a metadata header, the messages in order, and any thinking
//! blocks as a trailing group of callouts. Message text is run through
//! [`crate::markup`], so code blocks and the markdown subset come out
//! styled and everything user-supplied comes out escaped.
//!
//! The fragment carries CSS classes but no styles of its own;
//! [`stylesheet`] returns the matching style rules as plain CSS text for
//! the caller to attach, and [`render_page`] wraps both into a full HTML
//! document.
//!
//! # Example
//!
//! ```
//! use cc2html::parser::{Conversation, Message};
//! use cc2html::renderer::{render_conversation, RenderOptions};
//!
//! let conversation = Conversation {
//!     messages: vec![Message {
//!         role: Some("user".into()),
//!         content: Some("Hello!".into()),
//!     }],
//!     ..Default::default()
//! };
//!
//! let html = render_conversation(&conversation, &RenderOptions::default());
//! assert!(html.starts_with("<div class=\"claude-conversation\">"));
//! assert!(html.contains("Hello!"));
//! ```

use crate::markup::{self, escape_attr, escape_html};
use crate::parser::{Conversation, Message, Metadata, ThinkingBlock};
use chrono::DateTime;
use std::fmt::Write;
use std::path::Path;

/// Configuration options for HTML rendering.
///
/// Controls which optional sections are included in the rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Whether to include the metadata header (project, branch, timestamps).
    pub show_metadata: bool,

    /// Whether to include thinking blocks after the messages.
    pub show_thinking: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_metadata: true,
            show_thinking: true,
        }
    }
}

/// Renders a conversation as an HTML fragment.
///
/// The fragment is a single `<div class="claude-conversation">` containing
/// the metadata header (if any), each message in sequence order, and each
/// thinking block after all messages. Sections whose data is absent are
/// omitted entirely.
#[must_use]
pub fn render_conversation(conversation: &Conversation, opts: &RenderOptions) -> String {
    let mut out = String::from("<div class=\"claude-conversation\">");

    if opts.show_metadata
        && let Some(meta) = &conversation.metadata
    {
        render_metadata(&mut out, meta);
    }

    for message in &conversation.messages {
        render_message(&mut out, message);
    }

    if opts.show_thinking {
        for think in &conversation.thinking {
            render_thinking(&mut out, think);
        }
    }

    out.push_str("</div>");
    out
}

/// Renders a conversation as a complete standalone HTML document with the
/// stylesheet embedded.
///
/// The page title is the conversation's project name when one is present.
#[must_use]
pub fn render_page(conversation: &Conversation, opts: &RenderOptions) -> String {
    let title = conversation
        .metadata
        .as_ref()
        .and_then(|m| non_empty(m.project.as_deref()))
        .map_or("Claude conversation", basename);

    wrap_document(title, &render_conversation(conversation, opts))
}

/// Wraps an already-rendered fragment in a minimal HTML document with the
/// stylesheet embedded in a `<style>` element.
#[must_use]
pub fn wrap_document(title: &str, fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{fragment}\n</body>\n</html>\n",
        escape_html(title),
        stylesheet()
    )
}

/// Returns the CSS rules matching the classes emitted by
/// [`render_conversation`], as plain CSS text with no `<style>` wrapper.
#[must_use]
pub const fn stylesheet() -> &'static str {
    include_str!("../assets/style.css")
}

/// Renders the metadata header. A metadata record whose fields are all
/// absent or empty produces no output at all.
fn render_metadata(out: &mut String, meta: &Metadata) {
    let mut rows = String::new();

    if let Some(project) = non_empty(meta.project.as_deref()) {
        meta_row(&mut rows, "Project", "claude-project", basename(project));
    }
    if let Some(branch) = non_empty(meta.git_branch.as_deref()) {
        meta_row(&mut rows, "Branch", "claude-branch", branch);
    }
    if let Some(started) = format_timestamp(meta.start_time) {
        meta_row(&mut rows, "Started", "claude-start", &started);
    }
    if let Some(ended) = format_timestamp(meta.end_time) {
        meta_row(&mut rows, "Ended", "claude-end", &ended);
    }

    if !rows.is_empty() {
        out.push_str("<div class=\"claude-metadata\">");
        out.push_str(&rows);
        out.push_str("</div>");
    }
}

fn meta_row(out: &mut String, label: &str, class: &str, value: &str) {
    write!(
        out,
        "<div class=\"claude-meta-item\"><strong>{label}:</strong> \
         <span class=\"{class}\">{}</span></div>",
        escape_html(value)
    )
    .unwrap();
}

fn render_message(out: &mut String, message: &Message) {
    let role = message.role.as_deref().unwrap_or("unknown");
    let content = message.content.as_deref().unwrap_or("");

    write!(out, "<div class=\"claude-msg-{}\">", escape_attr(role)).unwrap();
    write!(
        out,
        "<div class=\"claude-msg-role\">{}</div>",
        escape_html(&capitalize(role))
    )
    .unwrap();
    write!(
        out,
        "<div class=\"claude-msg-content\">{}</div>",
        markup::to_html(content)
    )
    .unwrap();
    out.push_str("</div>");
}

fn render_thinking(out: &mut String, think: &ThinkingBlock) {
    let content = think.content.as_deref().unwrap_or("");

    out.push_str("<blockquote class=\"claude-thinking\">");
    out.push_str("<span class=\"claude-thinking-icon\">&#129504;</span> ");
    out.push_str("<strong>Thinking:</strong>");
    write!(
        out,
        "<div class=\"claude-thinking-content\">{}</div>",
        markup::to_html(content)
    )
    .unwrap();
    out.push_str("</blockquote>");
}

/// Returns the field value when it is present and non-empty.
fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}

/// Returns the final segment of a path, for display.
fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Formats a unix timestamp as `YYYY-MM-DD HH:MM:SS` in UTC.
///
/// Zero and out-of-range timestamps produce no output, matching the
/// treatment of other absent metadata fields.
fn format_timestamp(timestamp: Option<i64>) -> Option<String> {
    let secs = timestamp.filter(|&t| t != 0)?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Uppercases the first character of a role name for display.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
