//! Blank-line spacing around list blocks and LaTeX environments.
//!
//! Bot replies often glue a `- ` list or a `\begin{align*}` block directly to the
//! preceding paragraph, which makes CommonMark parsers fold them into it. A single
//! forward pass inserts the missing blank lines without touching line content.

use crate::core::latex::{self, EnvStack, EnvToken};

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Push a blank separator unless at document start or after a blank line.
fn separate(out: &mut Vec<&str>) {
    if out.last().is_some_and(|l| !is_blank(l)) {
        out.push("");
    }
}

/// Insert blank lines before and after list blocks and LaTeX block environments.
///
/// A list block is a run of lines whose trimmed content starts with `- `. A LaTeX
/// block opens on the first `\begin{..}` seen with no environment open and closes
/// when every environment opened since has been closed again. Lines inside a LaTeX
/// block are never treated as list items. Existing blank lines are reused, so
/// normalizing already-normalized text is a no-op.
pub fn normalize(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut in_list = false;
    let mut envs = EnvStack::default();
    let mut pending_break = false;

    for line in text.split('\n') {
        let trimmed = line.trim();
        let blank = trimmed.is_empty();

        if pending_break {
            if !blank {
                out.push("");
            }
            pending_break = false;
        }

        let was_open = !envs.is_empty();
        let is_list_item = !was_open && trimmed.starts_with("- ");
        if is_list_item && !in_list {
            separate(&mut out);
            in_list = true;
        } else if !is_list_item && in_list {
            if !blank {
                out.push("");
            }
            in_list = false;
        }

        let mut opened = false;
        for token in latex::env_tokens(trimmed) {
            if envs.is_empty() && matches!(token, EnvToken::Begin(_)) {
                opened = true;
            }
            envs.apply(token);
        }
        if opened && !was_open {
            separate(&mut out);
        }

        out.push(line);

        if (was_open || opened) && envs.is_empty() {
            pending_break = true;
        }
    }

    if (in_list || pending_break || !envs.is_empty()) && out.last().is_some_and(|l| !is_blank(l))
    {
        out.push("");
    }
    out.join("\n")
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// [`normalize`] applied only outside ```` ``` ```` fenced code blocks.
///
/// Fenced lines, fence markers included, are copied unchanged. An unclosed fence
/// runs to the end of the text.
pub fn normalize_outside_code(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut prose: Vec<&str> = Vec::new();
    let mut code: Option<Vec<&str>> = None;

    for line in text.split('\n') {
        match code.as_mut() {
            Some(fenced) => {
                fenced.push(line);
                if is_fence(line) {
                    out.push(fenced.join("\n"));
                    code = None;
                }
            }
            None if is_fence(line) => {
                if !prose.is_empty() {
                    out.push(normalize(&prose.join("\n")));
                    prose.clear();
                }
                code = Some(vec![line]);
            }
            None => prose.push(line),
        }
    }

    if let Some(fenced) = code {
        out.push(fenced.join("\n"));
    }
    if !prose.is_empty() {
        out.push(normalize(&prose.join("\n")));
    }
    out.join("\n")
}
