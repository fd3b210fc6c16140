//! Preservation rules that take precedence over generic HTML → Markdown conversion.

use std::sync::LazyLock;

use regex::Regex;

use super::ExportError;
use super::escape::collapse_whitespace;
use crate::core::dom::{Element, Node};
use crate::core::latex;

/// The element being converted and its parent, if any.
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    pub element: &'a Element,
    pub parent: Option<&'a Element>,
}

/// A conversion rule. Rules are tried in order; the first that applies and
/// returns `Some` wins. `None` defers to the next rule, then to the default conversion.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies(&self, ctx: &NodeContext<'_>) -> bool;

    /// `content` is the already-converted Markdown of the element's children.
    fn replace(&self, content: &str, ctx: &NodeContext<'_>) -> Option<String>;
}

/// Rules in precedence order: code, then tables, then LaTeX.
pub fn preservation_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(PreserveCode),
        Box::new(TableToArray),
        Box::new(PreserveLatex),
    ]
}

// ============================================================================
// LaTeX preservation
// ============================================================================

const LATEX_MARKERS: [&str; 5] = [
    "$",
    "\\text",
    "\\begin{align*}",
    "\\end{align*}",
    "\\begin{array}",
];

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("MARKUP_TAG: hardcoded regex is valid"));

fn has_env(text: &str, name: &str) -> bool {
    text.contains(&format!("\\begin{{{}}}", name)) && text.contains(&format!("\\end{{{}}}", name))
}

/// Pick the math out of an element's flattened text.
///
/// Complete `align*` or `array` environments return the whole (tag-stripped) text.
/// Otherwise the first `$$..$$` span, else the first unescaped `$..$` span, is
/// returned alone and the surrounding prose is dropped. `None` when no math is found.
pub fn preserve_latex(text_content: &str) -> Option<String> {
    let text = MARKUP_TAG.replace_all(text_content, "");
    if has_env(&text, "align*") || has_env(&text, "array") {
        return Some(text.into_owned());
    }
    if let Some(span) = latex::find_block_math(&text) {
        return Some(text[span].to_string());
    }
    latex::find_inline_math(&text).map(|span| text[span].to_string())
}

/// Returns raw LaTeX for elements whose text carries math, so generic conversion
/// never escapes `_`, `*` or `\` inside it.
pub struct PreserveLatex;

impl Rule for PreserveLatex {
    fn name(&self) -> &'static str {
        "preserve-latex"
    }

    fn applies(&self, ctx: &NodeContext<'_>) -> bool {
        let text = ctx.element.text_content();
        LATEX_MARKERS.iter().any(|m| text.contains(m))
    }

    fn replace(&self, _content: &str, ctx: &NodeContext<'_>) -> Option<String> {
        let found = preserve_latex(&ctx.element.text_content());
        if found.is_none() {
            log::debug!(
                "<{}> carries LaTeX markers but no math span; using default conversion",
                ctx.element.tag
            );
        }
        found
    }
}

// ============================================================================
// Table → LaTeX array
// ============================================================================

fn cell_text(cell: &Element) -> String {
    collapse_whitespace(cell.text_content().trim())
}

/// Render a table as a bordered LaTeX `array` inside `$$..$$`.
///
/// The column spec is sized from the first row's `th`/`td` count.
pub fn table_to_latex_array(table: &Element) -> Result<String, ExportError> {
    let rows = table.descendants_by_tag(&["tr"]);
    let first = rows.first().ok_or(ExportError::MalformedTable)?;
    let cols = first.descendants_by_tag(&["th", "td"]).len();

    let mut out = String::from("\\begin{array}{|c|");
    for _ in 1..cols {
        out.push_str("c|");
    }
    out.push_str("}\n\\hline\n");
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .descendants_by_tag(&["th", "td"])
            .into_iter()
            .map(cell_text)
            .collect();
        out.push_str(&cells.join(" & "));
        out.push_str(" \\\\\n");
        if i + 1 < rows.len() {
            out.push_str("\\hline\n");
        }
    }
    out.push_str("\\hline\n\\end{array}");
    Ok(format!("$${}$$", out))
}

/// Converts tables to LaTeX arrays so they render with the surrounding math.
pub struct TableToArray;

impl Rule for TableToArray {
    fn name(&self) -> &'static str {
        "table-to-array"
    }

    fn applies(&self, ctx: &NodeContext<'_>) -> bool {
        ctx.element.is("table")
    }

    fn replace(&self, _content: &str, ctx: &NodeContext<'_>) -> Option<String> {
        match table_to_latex_array(ctx.element) {
            Ok(array) => Some(array),
            Err(e) => {
                log::warn!("{}; falling back to default table conversion", e);
                None
            }
        }
    }
}

// ============================================================================
// Code preservation
// ============================================================================

/// `pre` holding exactly one `code` element and nothing but whitespace besides.
fn wraps_single_code(pre: &Element) -> bool {
    let mut elements = pre.element_children();
    let only_code = matches!(elements.next(), Some(c) if c.is("code")) && elements.next().is_none();
    only_code
        && pre.children.iter().all(|n| match n {
            Node::Text(t) => t.trim().is_empty(),
            Node::Element(_) => true,
        })
}

/// Fenced blocks for `pre` (or `code` directly inside `pre`), inline spans otherwise.
/// Backticks in the content are passed through.
pub struct PreserveCode;

impl Rule for PreserveCode {
    fn name(&self) -> &'static str {
        "preserve-code"
    }

    fn applies(&self, ctx: &NodeContext<'_>) -> bool {
        ctx.element.is("code") || ctx.element.is("pre")
    }

    fn replace(&self, content: &str, ctx: &NodeContext<'_>) -> Option<String> {
        let el = ctx.element;
        if el.is("pre") && wraps_single_code(el) {
            // The inner `code` already produced the fence.
            return Some(content.trim().to_string());
        }
        if el.is("pre") || ctx.parent.is_some_and(|p| p.is("pre")) {
            Some(format!("```\n{}\n```", content.trim()))
        } else {
            Some(format!("`{}`", content.trim()))
        }
    }
}
