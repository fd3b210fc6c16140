//! Markdown escaping for text nodes. LaTeX spans pass through untouched.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::latex;

/// Escapes that only apply at the very start of a text node.
static LEADING_ESCAPES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^-", r"\-"),
        (r"^\+ ", r"\+ "),
        (r"^(=+)", r"\${1}"),
        (r"^(#{1,6}) ", r"\${1} "),
        (r"^~~~", r"\~~~"),
        (r"^>", r"\>"),
        (r"^(\d+)\. ", r"${1}\. "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("LEADING_ESCAPES: hardcoded regex is valid"),
            replacement,
        )
    })
    .collect()
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN: hardcoded regex is valid"));

/// Collapse every whitespace run (newlines included) to a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

fn escape_segment(segment: &str, out: &mut String) {
    for ch in segment.chars() {
        if matches!(ch, '\\' | '*' | '`' | '[' | ']' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
}

/// Escape Markdown-significant characters outside `$..$` / `$$..$$` spans.
pub(crate) fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in latex::math_spans(text) {
        escape_segment(&text[last..span.start], &mut out);
        out.push_str(&text[span.clone()]);
        last = span.end;
    }
    escape_segment(&text[last..], &mut out);

    for (re, replacement) in LEADING_ESCAPES.iter() {
        if re.is_match(&out) {
            return re.replacen(&out, 1, *replacement).into_owned();
        }
    }
    out
}
