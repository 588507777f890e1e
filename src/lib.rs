// SPDX-License-Identifier: GPL-3.0-only

//! Convert Claude conversation records to styled HTML.
//!
//! This crate provides parsing and rendering functionality for transforming
//! recorded Claude conversations into safe, styled HTML fragments.
//!
//! # Overview
//!
//! A conversation record is a JSON document holding optional metadata,
//! ordered messages, and thinking annotations. This crate:
//!
//! 1. Parses the JSON record into typed Rust representations
//! 2. Renders the conversation as an HTML fragment, escaping all
//!    user-supplied text and converting a restricted markdown subset
//!    (fenced and inline code, bold, italic, line breaks)
//!
//! # Example
//!
//! ```no_run
//! use cc2html::{parser, renderer};
//!
//! let json = std::fs::read_to_string("conversation.json").unwrap();
//! let conversation = parser::parse_conversation(&json).unwrap();
//!
//! let opts = renderer::RenderOptions::default();
//! let html = renderer::render_conversation(&conversation, &opts);
//! println!("{html}");
//! ```
//!
//! # Modules
//!
//! - [`parser`]: JSON parsing and type definitions for conversation records
//! - [`markup`]: text-to-HTML conversion for individual message bodies
//! - [`renderer`]: HTML generation for whole conversations, plus the
//!   accompanying stylesheet

#![deny(missing_docs)]

pub mod markup;
pub mod parser;
pub mod renderer;
