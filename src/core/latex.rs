//! LaTeX scanning shared by the spacing normalizer, the exporter and the render-input check.
//!
//! Spans are `$$...$$` (block) and `$...$` (inline, delimiters not preceded by a
//! backslash). Environments are tracked as `\begin{name}` / `\end{name}` tokens.

use std::ops::Range;

const BEGIN_MARKER: &str = "\\begin{";
const END_MARKER: &str = "\\end{";

/// Environment boundary found in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvToken<'a> {
    Begin(&'a str),
    End(&'a str),
}

/// Scan a line for `\begin{..}` / `\end{..}` tokens, in order of appearance.
/// An unterminated marker (no closing brace) yields a token with an empty name.
pub fn env_tokens(line: &str) -> Vec<EnvToken<'_>> {
    let mut tokens = Vec::new();
    let mut rest = line;
    loop {
        let next_begin = rest.find(BEGIN_MARKER);
        let next_end = rest.find(END_MARKER);
        let (is_begin, pos) = match (next_begin, next_end) {
            (None, None) => break,
            (Some(b), None) => (true, b),
            (None, Some(e)) => (false, e),
            (Some(b), Some(e)) => (b < e, b.min(e)),
        };
        let marker_len = if is_begin {
            BEGIN_MARKER.len()
        } else {
            END_MARKER.len()
        };
        let after = &rest[pos + marker_len..];
        let (name, remaining) = match after.find('}') {
            Some(close) => (&after[..close], &after[close + 1..]),
            None => ("", ""),
        };
        tokens.push(if is_begin {
            EnvToken::Begin(name)
        } else {
            EnvToken::End(name)
        });
        rest = remaining;
    }
    tokens
}

/// Stack of open environment names.
#[derive(Debug, Clone, Default)]
pub struct EnvStack {
    frames: Vec<String>,
}

impl EnvStack {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Apply one token. `\end{x}` pops down to the innermost open `x`; an end
    /// with no matching frame is ignored. An unnamed end closes the top frame.
    pub fn apply(&mut self, token: EnvToken<'_>) {
        match token {
            EnvToken::Begin(name) => self.frames.push(name.to_string()),
            EnvToken::End("") => {
                self.frames.pop();
            }
            EnvToken::End(name) => {
                if let Some(idx) = self.frames.iter().rposition(|f| f == name) {
                    self.frames.truncate(idx);
                }
            }
        }
    }
}

fn is_unescaped_dollar(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'$' && (i == 0 || bytes[i - 1] != b'\\')
}

/// First `$$...$$` span (shortest body, may cross lines), delimiters included.
pub fn find_block_math(text: &str) -> Option<Range<usize>> {
    let start = text.find("$$")?;
    let close = text[start + 2..].find("$$")?;
    Some(start..start + 2 + close + 2)
}

/// First `$...$` span whose delimiters are not preceded by a backslash.
/// The body may be empty and may cross lines.
pub fn find_inline_math(text: &str) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    let open = (0..bytes.len()).find(|&i| is_unescaped_dollar(bytes, i))?;
    // If the first opener has no closer, no later opener can have one either.
    let close = (open + 1..bytes.len()).find(|&j| is_unescaped_dollar(bytes, j))?;
    Some(open..close + 1)
}

/// All math spans in `text`, left to right and non-overlapping.
pub fn math_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !is_unescaped_dollar(bytes, i) {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'$') {
            match text[i + 2..].find("$$") {
                Some(close) => {
                    let end = i + 2 + close + 2;
                    spans.push(i..end);
                    i = end;
                }
                None => i += 2,
            }
        } else {
            match (i + 1..bytes.len()).find(|&j| is_unescaped_dollar(bytes, j)) {
                Some(close) => {
                    spans.push(i..close + 1);
                    i = close + 1;
                }
                None => break,
            }
        }
    }
    spans
}

/// Whether every `$$` has a partner and every environment is closed by name.
pub(crate) fn check_balance(text: &str) -> Result<(), String> {
    if text.matches("$$").count() % 2 != 0 {
        return Err("unmatched $$ delimiter".to_string());
    }
    let mut open: Vec<&str> = Vec::new();
    for line in text.lines() {
        for token in env_tokens(line) {
            match token {
                EnvToken::Begin(name) => open.push(name),
                EnvToken::End(name) => match open.pop() {
                    Some(top) if top == name => {}
                    Some(top) => {
                        return Err(format!("\\end{{{}}} closes \\begin{{{}}}", name, top));
                    }
                    None => return Err(format!("\\end{{{}}} without \\begin", name)),
                },
            }
        }
    }
    match open.last() {
        Some(name) => Err(format!("\\begin{{{}}} is never closed", name)),
        None => Ok(()),
    }
}
