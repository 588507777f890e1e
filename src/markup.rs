// SPDX-License-Identifier: GPL-3.0-only

//! HTML generation for free-form message text.
//!
//! This module converts the text of a single message or thinking block into
//! an HTML fragment. It understands a restricted markdown subset:
//!
//! - Fenced code blocks (triple backticks with an optional language tag)
//! - Inline code spans (single backticks)
//! - Bold (`**text**` / `__text__`) and italic (`*text*` / `_text_`)
//! - Newlines, rendered as `<br>` outside of code blocks
//!
//! Everything else is treated as plain text and HTML-escaped. The input is
//! scanned once into code and text regions up front, so markdown emphasis
//! and line-break conversion never touch code that has already been
//! rendered, and code containing backticks or asterisks comes out verbatim.
//!
//! # Example
//!
//! ```
//! use cc2html::markup;
//!
//! let html = markup::to_html("Run `cargo test` for **all** checks");
//! assert_eq!(
//!     html,
//!     "Run <code class=\"claude-inline-code\">cargo test</code> \
//!      for <strong>all</strong> checks"
//! );
//! ```

use std::fmt::Write;

/// A region of the input, produced by the segmentation scan.
///
/// Code regions carry the raw (unescaped) source text; escaping happens
/// when the region is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    /// Plain text between code regions. Markdown emphasis and line-break
    /// conversion apply here.
    Text(&'a str),

    /// A fenced code block with its language tag (empty when untagged).
    Fenced { language: &'a str, body: &'a str },

    /// An inline code span.
    Inline(&'a str),
}

/// Converts raw message text into an HTML fragment.
///
/// The result contains only text-level markup (`<pre>`, `<code>`,
/// `<strong>`, `<em>`, `<br>`); all user-supplied text is HTML-escaped.
/// Plain text with no markdown markers passes through unchanged apart from
/// entity escaping.
#[must_use]
pub fn to_html(raw: &str) -> String {
    let segments = segment(raw);
    let mut out = String::with_capacity(raw.len() + raw.len() / 2);

    for (i, seg) in segments.iter().enumerate() {
        match *seg {
            Segment::Fenced { language, body } => {
                let language = if language.is_empty() {
                    "plaintext"
                } else {
                    language
                };
                write!(
                    out,
                    "<pre><code class=\"language-{}\">{}</code></pre>",
                    escape_attr(language),
                    escape_html(body)
                )
                .unwrap();
            }
            Segment::Inline(content) => {
                write!(
                    out,
                    "<code class=\"claude-inline-code\">{}</code>",
                    escape_html(content)
                )
                .unwrap();
            }
            Segment::Text(text) => {
                let after_fence = i
                    .checked_sub(1)
                    .is_some_and(|p| matches!(segments[p], Segment::Fenced { .. }));
                let before_fence = segments
                    .get(i + 1)
                    .is_some_and(|s| matches!(s, Segment::Fenced { .. }));
                render_text(&mut out, text, after_fence, before_fence);
            }
        }
    }

    out
}

/// Splits the input into code and text regions.
///
/// Fenced blocks are located across the whole input first; only the text
/// between them is then scanned for inline spans. Without the two stages,
/// a stray backtick in running text could pair with a fence opener and
/// swallow the fence. A backtick that opens neither a well-formed fence
/// nor an inline span is ordinary text. Regions never overlap and cover
/// the whole input.
fn segment(raw: &str) -> Vec<Segment<'_>> {
    let bytes = raw.as_bytes();
    let mut segments = Vec::new();
    let mut rest_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'`'
            && raw[i..].starts_with("```")
            && let Some((language, body, end)) = parse_fence(raw, i)
        {
            segment_inline(&raw[rest_start..i], &mut segments);
            segments.push(Segment::Fenced { language, body });
            i = end;
            rest_start = end;
            continue;
        }
        i += 1;
    }

    segment_inline(&raw[rest_start..], &mut segments);
    segments
}

/// Scans fence-free text for inline code spans, pushing the resulting
/// text and inline regions.
fn segment_inline<'a>(text: &'a str, segments: &mut Vec<Segment<'a>>) {
    let bytes = text.as_bytes();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'`'
            && let Some((content, end)) = parse_inline(text, i)
        {
            if text_start < i {
                segments.push(Segment::Text(&text[text_start..i]));
            }
            segments.push(Segment::Inline(content));
            i = end;
            text_start = end;
            continue;
        }
        i += 1;
    }

    if text_start < text.len() {
        segments.push(Segment::Text(&text[text_start..]));
    }
}

/// Tries to parse a fenced code block starting at `start` (which must point
/// at `` ``` ``).
///
/// The opener is three backticks, an optional language word, and a newline;
/// the block ends at the next three backticks. Returns the language tag,
/// the body, and the index just past the closing fence.
fn parse_fence(raw: &str, start: usize) -> Option<(&str, &str, usize)> {
    let bytes = raw.as_bytes();
    let lang_start = start + 3;
    let mut lang_end = lang_start;

    while bytes
        .get(lang_end)
        .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_')
    {
        lang_end += 1;
    }

    if bytes.get(lang_end) != Some(&b'\n') {
        return None;
    }

    let body_start = lang_end + 1;
    let body_len = raw[body_start..].find("```")?;

    Some((
        &raw[lang_start..lang_end],
        &raw[body_start..body_start + body_len],
        body_start + body_len + 3,
    ))
}

/// Tries to parse an inline code span starting at `start` (which must point
/// at a backtick).
///
/// The span is a backtick, one or more non-backtick characters, and a
/// closing backtick. Returns the content and the index just past the close.
fn parse_inline(raw: &str, start: usize) -> Option<(&str, usize)> {
    let rest = &raw[start + 1..];
    let len = rest.find('`')?;
    if len == 0 {
        return None;
    }
    Some((&rest[..len], start + 1 + len + 1))
}

/// Renders one plain-text region: escape, apply emphasis, convert newlines.
///
/// A newline that directly borders a fenced block (the region's first
/// character after a fence, or its last character before one) stays literal
/// so the `<pre>` output is not padded with extra breaks.
fn render_text(out: &mut String, text: &str, after_fence: bool, before_fence: bool) {
    let emphasized = apply_emphasis(&escape_html(text));
    let last = emphasized.len().saturating_sub(1);

    for (pos, ch) in emphasized.char_indices() {
        if ch == '\n' {
            let skip = (pos == 0 && after_fence) || (pos == last && before_fence);
            if !skip {
                out.push_str("<br>");
            }
        }
        out.push(ch);
    }
}

/// Applies bold and italic markdown to already-escaped text.
///
/// Bold is `**text**` or `__text__`, non-greedy, within one line. Italic is
/// `*text*` or `_text_` with the extra rule that neither delimiter may sit
/// directly against an alphanumeric character on the outside, so words like
/// `snake_case_name` keep their underscores. Bold and italic content is
/// re-scanned, so `**a *b* c**` nests.
fn apply_emphasis(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < bytes.len() {
        let ch = s[i..].chars().next().unwrap_or_default();

        if ch == '*' || ch == '_' {
            let delim = bytes[i];

            if bytes.get(i + 1) == Some(&delim)
                && let Some(end) = find_double(bytes, i + 2, delim)
            {
                out.push_str("<strong>");
                out.push_str(&apply_emphasis(&s[i + 2..end]));
                out.push_str("</strong>");
                prev = Some(ch);
                i = end + 2;
                continue;
            }

            if !prev.is_some_and(|c| c.is_ascii_alphanumeric())
                && let Some(end) = find_single(bytes, i + 1, delim)
            {
                out.push_str("<em>");
                out.push_str(&apply_emphasis(&s[i + 1..end]));
                out.push_str("</em>");
                prev = Some(ch);
                i = end + 1;
                continue;
            }
        }

        out.push(ch);
        prev = Some(ch);
        i += ch.len_utf8();
    }

    out
}

/// Finds the closing double delimiter for a bold span opened before `from`.
///
/// The content must be non-empty and stay on one line.
fn find_double(bytes: &[u8], from: usize, delim: u8) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => return None,
            b if b == delim && bytes.get(i + 1) == Some(&delim) && i > from => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Finds the closing delimiter for an italic span opened before `from`.
///
/// The content must be non-empty and stay on one line, and the character
/// after the close must not be alphanumeric (the snake_case guard). A
/// doubled delimiter inside the span is a bold marker, not a close, so
/// `*a **b** c*` italicizes the whole span.
fn find_single(bytes: &[u8], from: usize, delim: u8) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            return None;
        }
        if b == delim {
            if i > from && bytes.get(i + 1) == Some(&delim) {
                i += 2;
                continue;
            }
            if i > from && !bytes.get(i + 1).is_some_and(u8::is_ascii_alphanumeric) {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Escapes text for an HTML body context.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes text for an HTML attribute context.
///
/// Covers everything [`escape_html`] does plus single quotes, which matter
/// inside attribute values but not in body text.
pub(crate) fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(to_html(""), "");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(to_html("plain text"), "plain text");
    }

    #[test]
    fn escapes_html_special_characters() {
        assert_eq!(
            to_html("<script>alert(\"x\")</script>"),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn renders_fenced_block_with_language() {
        assert_eq!(
            to_html("```python\nprint(1)\n```"),
            "<pre><code class=\"language-python\">print(1)\n</code></pre>"
        );
    }

    #[test]
    fn fenced_block_defaults_to_plaintext() {
        assert_eq!(
            to_html("```\nx\n```"),
            "<pre><code class=\"language-plaintext\">x\n</code></pre>"
        );
    }

    #[test]
    fn fenced_block_body_is_escaped() {
        let html = to_html("```html\n<b>bold</b>\n```");
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn fenced_block_content_is_not_rewrapped() {
        // Backticks and emphasis markers inside a fence stay verbatim.
        let html = to_html("```\nuse `x` and **y**\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-plaintext\">use `x` and **y**\n</code></pre>"
        );
    }

    #[test]
    fn unterminated_fence_falls_back_to_text() {
        let html = to_html("```rust\nfn main() {}");
        assert!(!html.contains("<pre>"));
        assert!(html.contains("fn main() {}"));
    }

    #[test]
    fn fence_without_newline_is_not_a_fence() {
        let html = to_html("```rust code```");
        assert!(!html.contains("<pre>"));
    }

    #[test]
    fn renders_inline_code() {
        assert_eq!(
            to_html("run `ls -la` now"),
            "run <code class=\"claude-inline-code\">ls -la</code> now"
        );
    }

    #[test]
    fn inline_code_is_escaped() {
        assert_eq!(
            to_html("`a < b`"),
            "<code class=\"claude-inline-code\">a &lt; b</code>"
        );
    }

    #[test]
    fn inline_code_suppresses_emphasis() {
        let html = to_html("`**not bold**`");
        assert!(!html.contains("<strong>"));
        assert!(html.contains("**not bold**"));
    }

    #[test]
    fn lone_backtick_is_literal() {
        assert_eq!(to_html("a ` b"), "a ` b");
    }

    #[test]
    fn lone_backtick_before_fence_keeps_fence() {
        // The stray backtick must not pair with the fence opener and
        // swallow the block.
        assert_eq!(
            to_html("a ` b\n```python\nprint(1)\n```"),
            "a ` b\n<pre><code class=\"language-python\">print(1)\n</code></pre>"
        );
    }

    #[test]
    fn inline_span_before_fence_keeps_both() {
        let html = to_html("see `x`\n```\ny\n```");
        assert!(html.contains("<code class=\"claude-inline-code\">x</code>"));
        assert!(html.contains("<pre><code class=\"language-plaintext\">y\n</code></pre>"));
    }

    #[test]
    fn empty_inline_span_is_literal() {
        assert_eq!(to_html("``"), "``");
    }

    #[test]
    fn renders_bold_with_asterisks() {
        assert_eq!(to_html("**bold**"), "<strong>bold</strong>");
    }

    #[test]
    fn renders_bold_with_underscores() {
        assert_eq!(to_html("__bold__"), "<strong>bold</strong>");
    }

    #[test]
    fn renders_italic() {
        assert_eq!(to_html("*x*"), "<em>x</em>");
        assert_eq!(to_html("_x_"), "<em>x</em>");
    }

    #[test]
    fn italic_guards_snake_case() {
        assert_eq!(to_html("a_b_c"), "a_b_c");
        assert_eq!(to_html("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn italic_applies_next_to_snake_case() {
        assert_eq!(to_html("a_b_c and *x*"), "a_b_c and <em>x</em>");
    }

    #[test]
    fn bold_content_can_nest_italic() {
        assert_eq!(
            to_html("**a *b* c**"),
            "<strong>a <em>b</em> c</strong>"
        );
    }

    #[test]
    fn italic_content_can_nest_bold() {
        // The single-delimiter close must not pair with the first half of
        // an inner bold marker.
        assert_eq!(
            to_html("*a **b** c*"),
            "<em>a <strong>b</strong> c</em>"
        );
        assert_eq!(
            to_html("_a __b__ c_"),
            "<em>a <strong>b</strong> c</em>"
        );
    }

    #[test]
    fn unclosed_emphasis_is_literal() {
        assert_eq!(to_html("**open"), "**open");
        assert_eq!(to_html("*open"), "*open");
    }

    #[test]
    fn emphasis_does_not_cross_lines() {
        assert_eq!(to_html("*a\nb*"), "*a<br>\nb*");
    }

    #[test]
    fn newline_becomes_break() {
        assert_eq!(to_html("line1\nline2"), "line1<br>\nline2");
    }

    #[test]
    fn newline_is_kept_after_break() {
        // The break tag is inserted before the newline, not instead of it.
        let html = to_html("a\nb");
        assert!(html.contains("<br>\n"));
    }

    #[test]
    fn fence_newlines_stay_literal() {
        let html = to_html("```\ncode\nline\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-plaintext\">code\nline\n</code></pre>"
        );
    }

    #[test]
    fn newlines_adjacent_to_fence_get_no_break() {
        let html = to_html("before\n```\nx\n```\nafter");
        assert_eq!(
            html,
            "before\n<pre><code class=\"language-plaintext\">x\n</code></pre>\nafter"
        );
    }

    #[test]
    fn text_between_two_fences() {
        let html = to_html("```\na\n```\nmid\n```\nb\n```");
        assert!(html.contains(">\nmid\n<pre>"));
        assert!(!html.contains("<br>"));
    }

    #[test]
    fn language_tag_is_attribute_escaped() {
        // A language word is alphanumeric by construction, so this mostly
        // documents that the escape hook is in place.
        let html = to_html("```rust\nlet x = 1;\n```");
        assert!(html.contains("class=\"language-rust\""));
    }

    #[test]
    fn mixed_document_renders_in_order() {
        let html = to_html("intro `a`\n```sh\nls\n```\n**done**");
        let code_pos = html.find("claude-inline-code").unwrap();
        let pre_pos = html.find("<pre>").unwrap();
        let bold_pos = html.find("<strong>").unwrap();
        assert!(code_pos < pre_pos);
        assert!(pre_pos < bold_pos);
    }

    #[test]
    fn escape_html_covers_entities() {
        assert_eq!(escape_html("&<>\""), "&amp;&lt;&gt;&quot;");
        assert_eq!(escape_html("'"), "'");
    }

    #[test]
    fn escape_attr_also_covers_single_quote() {
        assert_eq!(escape_attr("'\""), "&#39;&quot;");
    }
}
