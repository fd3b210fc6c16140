//! Typed node tree for rendered message content, and an HTML fragment parser feeding it.

use kuchiki::NodeData;
use kuchiki::traits::TendrilSink;

/// A node of rendered output: text or an element with children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// Element with a lowercase tag name, its attributes, and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    /// Concatenated text of this node and all descendants (DOM `textContent`).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_child(Node::text(text))
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Descendant elements whose tag is in `tags`, in document order (like `querySelectorAll`).
    pub fn descendants_by_tag<'a>(&'a self, tags: &[&str]) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_by_tag(tags, &mut found);
        found
    }

    fn collect_by_tag<'a>(&'a self, tags: &[&str], found: &mut Vec<&'a Element>) {
        for child in self.element_children() {
            if tags.contains(&child.tag.as_str()) {
                found.push(child);
            }
            child.collect_by_tag(tags, found);
        }
    }
}

/// Parse an HTML fragment into nodes. Returns the children of `<body>`; comments,
/// doctypes and processing instructions are dropped.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let document = kuchiki::parse_html().one(html.to_string());
    match document.select_first("body") {
        Ok(body) => body.as_node().children().filter_map(|c| convert(&c)).collect(),
        Err(()) => document.children().filter_map(|c| convert(&c)).collect(),
    }
}

fn convert(node: &kuchiki::NodeRef) -> Option<Node> {
    match node.data() {
        NodeData::Text(text) => Some(Node::Text(text.borrow().clone())),
        NodeData::Element(data) => {
            let attrs = data
                .attributes
                .borrow()
                .map
                .iter()
                .map(|(name, attr)| (name.local.to_string(), attr.value.clone()))
                .collect();
            Some(Node::Element(Element {
                tag: data.name.local.to_string(),
                attrs,
                children: node.children().filter_map(|c| convert(&c)).collect(),
            }))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_flattens_markup() {
        let p = Element::new("p")
            .with_text("Solve $x^")
            .with_child(Element::new("em").with_text("2"))
            .with_text("+1=0$ now");
        assert_eq!(p.text_content(), "Solve $x^2+1=0$ now");
    }

    #[test]
    fn descendants_by_tag_document_order() {
        let table = Element::new("table").with_child(
            Element::new("tbody")
                .with_child(Element::new("tr").with_child(Element::new("th").with_text("a")))
                .with_child(Element::new("tr").with_child(Element::new("td").with_text("1"))),
        );
        let rows = table.descendants_by_tag(&["tr"]);
        assert_eq!(rows.len(), 2);
        let cells: Vec<String> = table
            .descendants_by_tag(&["th", "td"])
            .iter()
            .map(|c| c.text_content())
            .collect();
        assert_eq!(cells, ["a", "1"]);
    }

    #[test]
    fn tag_is_lowercased() {
        assert!(Element::new("PRE").is("pre"));
    }

    #[test]
    fn parse_fragment_builds_tree() {
        let nodes = parse_fragment(r#"<p>Hi <a href="https://x.test">there</a></p><!-- c -->"#);
        assert_eq!(nodes.len(), 1);
        let p = nodes[0].as_element().unwrap();
        assert!(p.is("p"));
        let a = p.element_children().next().unwrap();
        assert_eq!(a.attr("href"), Some("https://x.test"));
        assert_eq!(p.text_content(), "Hi there");
    }

    #[test]
    fn parse_fragment_tables_get_tbody() {
        let nodes = parse_fragment("<table><tr><td>1</td></tr></table>");
        let table = nodes[0].as_element().unwrap();
        assert_eq!(table.descendants_by_tag(&["tr"]).len(), 1);
    }
}
