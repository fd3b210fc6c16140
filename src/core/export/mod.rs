//! HTML → Markdown export that keeps math, code and tables intact.
//!
//! Conversion walks the node tree bottom-up: children are converted first, then the
//! element is handed to the preservation rules (code, table, LaTeX, in that order)
//! and, if none claims it, to the generic element conversion. Block outputs are
//! joined with at most one blank line between them, and the result is re-spaced
//! with [`crate::core::spacing::normalize_outside_code`], leaving fenced code as is.

mod escape;
pub mod rules;


pub use rules::{NodeContext, Rule, preserve_latex, table_to_latex_array};

use crate::core::dom::{self, Element, Node};
use crate::core::spacing;
use escape::{collapse_whitespace, escape_markdown};

/// Errors raised by individual export rules. Rules recover from these locally.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("table has no rows to lay out as a LaTeX array")]
    MalformedTable,
}

/// Options for generic conversion. Headings are always ATX, code always fenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Marker for unordered list items.
    pub bullet_marker: char,
    /// Run the spacing normalizer over the converted output.
    pub respace: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            bullet_marker: '-',
            respace: true,
        }
    }
}

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Block tags that sit inside a list or table; a rule replacing them is not
/// pulled apart from its siblings.
const NESTED_BLOCK_TAGS: &[&str] = &["li", "dd", "dt", "tr", "td", "th", "tbody", "thead", "tfoot"];

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

fn is_block(el: &Element) -> bool {
    BLOCK_TAGS.contains(&el.tag.as_str())
}

fn block(content: &str) -> String {
    format!("\n\n{}\n\n", content.trim_matches('\n'))
}

/// Append `piece`, merging the newlines at the seam into at most one blank line.
fn join_into(out: &mut String, piece: &str) {
    let kept = out.trim_end_matches('\n').len();
    let trailing = out.len() - kept;
    let body = piece.trim_start_matches('\n');
    let leading = piece.len() - body.len();
    out.truncate(kept);
    for _ in 0..trailing.max(leading).min(2) {
        out.push('\n');
    }
    out.push_str(body);
}

/// Wrap `content` in an inline marker, keeping flanking whitespace outside it.
fn wrap_inline(content: &str, marker: &str) -> String {
    let inner = content.trim();
    if inner.is_empty() {
        return String::new();
    }
    let lead = &content[..content.len() - content.trim_start().len()];
    let trail = &content[content.trim_end().len()..];
    format!("{}{}{}{}{}", lead, marker, inner, marker, trail)
}

fn blank_whitespace_lines(text: &str) -> String {
    text.split('\n')
        .map(|l| if l.trim().is_empty() { "" } else { l })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rule-driven HTML → Markdown converter.
pub struct Converter {
    options: ExportOptions,
    rules: Vec<Box<dyn Rule>>,
}

impl Converter {
    pub fn new(options: ExportOptions) -> Self {
        Converter {
            options,
            rules: rules::preservation_rules(),
        }
    }

    /// Add a rule ahead of the built-in ones.
    pub fn with_rule(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.insert(0, rule);
        self
    }

    pub fn convert(&self, nodes: &[Node]) -> String {
        let raw = self.convert_children(nodes, None, false);
        let cleaned = blank_whitespace_lines(&raw);
        let text = if self.options.respace {
            spacing::normalize_outside_code(&cleaned)
        } else {
            cleaned
        };
        text.trim_start_matches(['\n', '\r', '\t'])
            .trim_end()
            .to_string()
    }

    fn convert_children(&self, children: &[Node], parent: Option<&Element>, in_code: bool) -> String {
        let mut out = String::new();
        for (i, child) in children.iter().enumerate() {
            let piece = match child {
                Node::Text(t) if in_code => t.clone(),
                Node::Text(t) => {
                    let collapsed = collapse_whitespace(t);
                    if collapsed.trim().is_empty() && borders_block(children, i) {
                        continue;
                    }
                    escape_markdown(&collapsed)
                }
                Node::Element(el) => self.convert_element(el, parent, in_code),
            };
            if in_code {
                out.push_str(&piece);
            } else {
                join_into(&mut out, &piece);
            }
        }
        out
    }

    fn convert_element(&self, el: &Element, parent: Option<&Element>, in_code: bool) -> String {
        if SKIPPED_TAGS.contains(&el.tag.as_str()) {
            return String::new();
        }
        let child_in_code = in_code || el.is("code") || el.is("pre");
        let content = self.convert_children(&el.children, Some(el), child_in_code);
        let ctx = NodeContext {
            element: el,
            parent,
        };

        for rule in &self.rules {
            if !rule.applies(&ctx) {
                continue;
            }
            if let Some(out) = rule.replace(&content, &ctx) {
                log::debug!("{} converted <{}>", rule.name(), el.tag);
                return if is_block(el) && !NESTED_BLOCK_TAGS.contains(&el.tag.as_str()) {
                    block(&out)
                } else {
                    out
                };
            }
        }
        self.default_replacement(&content, &ctx)
    }

    fn default_replacement(&self, content: &str, ctx: &NodeContext<'_>) -> String {
        let el = ctx.element;
        match el.tag.as_str() {
            "p" => block(content.trim()),
            "br" => "  \n".to_string(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(el.tag.as_bytes()[1] - b'0');
                block(&format!("{} {}", "#".repeat(level), content.trim()))
            }
            "blockquote" => {
                let quoted: Vec<String> = content
                    .trim()
                    .lines()
                    .map(|l| {
                        if l.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {}", l)
                        }
                    })
                    .collect();
                block(&quoted.join("\n"))
            }
            "ul" | "ol" => {
                if ctx.parent.is_some_and(|p| p.is("li")) {
                    format!("\n{}", content.trim_end_matches('\n'))
                } else {
                    block(content)
                }
            }
            "li" => self.list_item(content, ctx),
            "hr" => block("---"),
            "a" => match el.attr("href") {
                Some(href) if !href.is_empty() && !content.trim().is_empty() => {
                    format!("[{}]({})", content.trim(), href)
                }
                _ => content.to_string(),
            },
            "em" | "i" => wrap_inline(content, "_"),
            "strong" | "b" => wrap_inline(content, "**"),
            "img" => match el.attr("src") {
                Some(src) if !src.is_empty() => {
                    format!("![{}]({})", el.attr("alt").unwrap_or(""), src)
                }
                _ => String::new(),
            },
            _ if is_block(el) => block(content),
            _ => content.to_string(),
        }
    }

    fn list_item(&self, content: &str, ctx: &NodeContext<'_>) -> String {
        let prefix = match ctx.parent {
            Some(list) if list.is("ol") => {
                let start = list
                    .attr("start")
                    .and_then(|s| s.trim().parse::<usize>().ok())
                    .unwrap_or(1);
                let index = list
                    .element_children()
                    .filter(|c| c.is("li"))
                    .position(|c| std::ptr::eq(c, ctx.element))
                    .unwrap_or(0);
                format!("{}. ", start + index)
            }
            _ => format!("{} ", self.options.bullet_marker),
        };
        let indent = format!("\n{}", " ".repeat(prefix.len()));
        let body = content.trim().replace('\n', &indent);
        format!("{}{}\n", prefix, body)
    }
}

/// Whitespace-only text at `i` that sits at an edge or next to a block element.
fn borders_block(children: &[Node], i: usize) -> bool {
    let block_at = |j: usize| {
        children
            .get(j)
            .and_then(Node::as_element)
            .is_some_and(is_block)
    };
    i == 0 || i + 1 == children.len() || block_at(i - 1) || block_at(i + 1)
}

/// Convert a node tree to Markdown.
pub fn to_markdown(nodes: &[Node], options: &ExportOptions) -> String {
    Converter::new(options.clone()).convert(nodes)
}

/// Parse an HTML fragment and convert it to Markdown.
pub fn html_to_markdown(html: &str, options: &ExportOptions) -> String {
    to_markdown(&dom::parse_fragment(html), options)
}
