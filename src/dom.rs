use crate::ast::{Document, Element, ElementKind, HtmlImageProps, Node};
use serde::{Deserialize, Serialize};

/// Represents a node in the Document Object Model (DOM).
/// This is a generic, intermediate representation that decouples the AST
/// from the final output format (e.g., HTML).
///
/// Text nodes use the `#text` tag name and carry their content in `text`.
/// Attributes keep insertion order so output is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    pub tag_name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<DomNode>,
    pub text: Option<String>,
}

impl DomNode {
    /// Creates a new DOM node with a given tag name (e.g., "h1", "p").
    pub fn new(tag_name: &str) -> Self {
        DomNode {
            tag_name: tag_name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    pub fn text(content: &str) -> Self {
        let mut node = DomNode::new("#text");
        node.text = Some(content.to_string());
        node
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<DomNode>) -> Self {
        self.children = children;
        self
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_text(&self) -> bool {
        self.tag_name == "#text"
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &DomNode, out: &mut String) {
    if let Some(text) = &node.text {
        out.push_str(text);
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

/// Options for the AST to DOM conversion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DomConfig {
    /// Give headings an `id` matching their table-of-contents anchor.
    pub heading_ids: bool,
    /// `target` attribute for links; `None` leaves it off.
    pub link_target: Option<String>,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            heading_ids: true,
            link_target: Some("_blank".to_string()),
        }
    }
}

/// A heading registered while building the DOM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    /// Position among all headings, starting at 0.
    pub order: usize,
    pub text: String,
    pub anchor: String,
}

/// Headings of a document keyed by level and document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableOfContents {
    entries: Vec<TocEntry>,
}

impl TableOfContents {
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries at the given heading level, in document order.
    pub fn at_level(&self, level: u8) -> impl Iterator<Item = &TocEntry> {
        self.entries.iter().filter(move |entry| entry.level == level)
    }

    /// Adds a heading and returns its anchor. Anchors are unique within the
    /// table; repeats get a numeric suffix.
    pub fn register(&mut self, level: u8, text: &str) -> String {
        let base = slugify(text);
        let mut anchor = base.clone();
        let mut suffix = 1;
        while self.entries.iter().any(|entry| entry.anchor == anchor) {
            anchor = format!("{base}-{suffix}");
            suffix += 1;
        }

        self.entries.push(TocEntry {
            level,
            order: self.entries.len(),
            text: text.to_string(),
            anchor: anchor.clone(),
        });
        anchor
    }
}

/// Lowercase, dash-separated anchor for a heading text.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug.to_string()
    }
}

/// Output of [`DomBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDom {
    /// A virtual `div` holding the top-level nodes.
    pub root: DomNode,
    pub toc: TableOfContents,
}

/// Walks a [`Document`] and produces the matching DOM tree.
///
/// Text is stored unescaped; escaping is the HTML generator's job.
#[derive(Debug, Default)]
pub struct DomBuilder {
    config: DomConfig,
    toc: TableOfContents,
}

impl DomBuilder {
    pub fn new(config: DomConfig) -> Self {
        Self {
            config,
            toc: TableOfContents::default(),
        }
    }

    pub fn build(mut self, document: &Document) -> RenderedDom {
        let mut root = DomNode::new("div");
        root.children = self.convert_all(&document.children);
        log::debug!(
            "built DOM for {} top-level nodes, {} headings",
            document.children.len(),
            self.toc.len()
        );
        RenderedDom {
            root,
            toc: self.toc,
        }
    }

    fn convert_all(&mut self, nodes: &[Node]) -> Vec<DomNode> {
        nodes.iter().map(|node| self.convert(node)).collect()
    }

    fn convert(&mut self, node: &Node) -> DomNode {
        match node {
            Node::Text(text) => DomNode::text(text),
            Node::Breakline => DomNode::new("br"),
            Node::HtmlImage(props) => html_image(props),
            Node::Element(element) => self.convert_element(element),
        }
    }

    fn convert_element(&mut self, element: &Element) -> DomNode {
        let container = |this: &mut Self, tag: &str| {
            DomNode::new(tag).with_children(this.convert_all(&element.children))
        };

        match &element.kind {
            ElementKind::Paragraph => container(self, "p"),
            ElementKind::Heading(level) => {
                let text = element.plain_text();
                let anchor = self.toc.register(*level, &text);
                let mut node = container(self, &format!("h{level}"));
                if self.config.heading_ids {
                    node.set_attribute("id", &anchor);
                }
                node
            }
            ElementKind::OrderedList { start } => {
                let node = container(self, "ol");
                if *start == 1 {
                    node
                } else {
                    node.with_attribute("start", &start.to_string())
                }
            }
            ElementKind::UnorderedList => container(self, "ul"),
            ElementKind::ListItem => container(self, "li"),
            ElementKind::Blockquote => container(self, "blockquote"),
            ElementKind::InlineCode | ElementKind::BlockCode => container(self, "code"),
            ElementKind::Bold => container(self, "strong"),
            ElementKind::Italic => container(self, "em"),
            ElementKind::Strong => {
                let em = container(self, "em");
                DomNode::new("strong").with_children(vec![em])
            }
            ElementKind::Strikethrough => container(self, "del"),
            ElementKind::Link { url } => {
                let mut node = container(self, "a").with_attribute("href", url);
                if let Some(target) = &self.config.link_target {
                    node.set_attribute("target", target);
                }
                node
            }
            ElementKind::Image { url } => DomNode::new("img")
                .with_attribute("src", url)
                .with_attribute("alt", &element.plain_text()),
            ElementKind::HtmlDiv(props) => {
                let mut node = container(self, "div");
                if let Some(align) = &props.align {
                    node.set_attribute("align", align);
                }
                if let Some(width) = &props.width {
                    node.set_attribute("width", width);
                }
                node
            }
        }
    }
}

fn html_image(props: &HtmlImageProps) -> DomNode {
    let mut node = DomNode::new("img").with_attribute("src", &props.src);
    let optional = [
        ("alt", &props.alt),
        ("align", &props.align),
        ("width", &props.width),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            node.set_attribute(name, value);
        }
    }
    node
}

/// Converts an Abstract Syntax Tree (AST) into a Document Object Model (DOM)
/// with the default options, dropping the table of contents.
pub fn from_ast(document: &Document) -> DomNode {
    DomBuilder::default().build(document).root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::utils::NodeBuilder;

    fn dom_of(children: Vec<Node>) -> DomNode {
        from_ast(&NodeBuilder::document(children))
    }

    fn tags(node: &DomNode) -> Vec<&str> {
        node.children.iter().map(|child| child.tag_name.as_str()).collect()
    }

    #[test]
    fn test_block_tag_mapping() {
        let root = dom_of(vec![
            NodeBuilder::paragraph(vec![NodeBuilder::text("p")]),
            NodeBuilder::unordered_list(vec![NodeBuilder::list_item(vec![])]),
            NodeBuilder::blockquote(vec![]),
            NodeBuilder::block_code("x"),
        ]);
        assert_eq!(root.tag_name, "div");
        assert_eq!(tags(&root), vec!["p", "ul", "blockquote", "code"]);
        assert_eq!(tags(&root.children[1]), vec!["li"]);
    }

    #[test]
    fn test_inline_tag_mapping() {
        let root = dom_of(vec![NodeBuilder::paragraph(vec![
            NodeBuilder::bold(vec![]),
            NodeBuilder::italic(vec![]),
            NodeBuilder::strikethrough(vec![]),
            NodeBuilder::inline_code("c"),
            Node::Breakline,
        ])]);
        assert_eq!(
            tags(&root.children[0]),
            vec!["strong", "em", "del", "code", "br"]
        );
    }

    #[test]
    fn test_strong_wraps_em() {
        let root = dom_of(vec![NodeBuilder::strong(vec![NodeBuilder::text("x")])]);
        let strong = &root.children[0];
        assert_eq!(strong.tag_name, "strong");
        assert_eq!(tags(strong), vec!["em"]);
        assert_eq!(strong.text_content(), "x");
    }

    #[test]
    fn test_link_and_image_attributes() {
        let root = dom_of(vec![NodeBuilder::paragraph(vec![
            NodeBuilder::link("http://a", vec![NodeBuilder::text("a")]),
            NodeBuilder::image(
                "i.png",
                vec![NodeBuilder::text("the "), NodeBuilder::bold(vec![NodeBuilder::text("alt")])],
            ),
        ])]);
        let link = &root.children[0].children[0];
        assert_eq!(link.attribute("href"), Some("http://a"));
        assert_eq!(link.attribute("target"), Some("_blank"));

        let image = &root.children[0].children[1];
        assert_eq!(image.attribute("src"), Some("i.png"));
        assert_eq!(image.attribute("alt"), Some("the alt"));
        assert!(image.children.is_empty());
    }

    #[test]
    fn test_link_target_can_be_disabled() {
        let config = DomConfig {
            link_target: None,
            ..DomConfig::default()
        };
        let document = NodeBuilder::document(vec![NodeBuilder::link("u", vec![])]);
        let root = DomBuilder::new(config).build(&document).root;
        assert_eq!(root.children[0].attribute("target"), None);
    }

    #[test]
    fn test_ordered_list_start() {
        let root = dom_of(vec![
            NodeBuilder::ordered_list(1, vec![]),
            NodeBuilder::ordered_list(4, vec![]),
        ]);
        assert_eq!(root.children[0].attribute("start"), None);
        assert_eq!(root.children[1].attribute("start"), Some("4"));
    }

    #[test]
    fn test_html_passthrough_attributes() {
        let image = Node::HtmlImage(HtmlImageProps {
            src: "a.png".to_string(),
            alt: None,
            align: Some("right".to_string()),
            width: Some("20".to_string()),
        });
        let root = dom_of(vec![NodeBuilder::html_div(Some("center"), None, vec![image])]);
        let div = &root.children[0];
        assert_eq!(div.attributes, vec![("align".to_string(), "center".to_string())]);
        assert_eq!(
            div.children[0].attributes,
            vec![
                ("src".to_string(), "a.png".to_string()),
                ("align".to_string(), "right".to_string()),
                ("width".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_headings_fill_table_of_contents() {
        let document = NodeBuilder::document(vec![
            NodeBuilder::heading(1, vec![NodeBuilder::text("Intro")]),
            NodeBuilder::heading(2, vec![NodeBuilder::text("Usage Notes")]),
            NodeBuilder::heading(2, vec![NodeBuilder::text("Intro")]),
        ]);
        let rendered = DomBuilder::default().build(&document);

        let anchors: Vec<_> = rendered
            .toc
            .entries()
            .iter()
            .map(|entry| (entry.level, entry.order, entry.anchor.as_str()))
            .collect();
        assert_eq!(
            anchors,
            vec![(1, 0, "intro"), (2, 1, "usage-notes"), (2, 2, "intro-1")]
        );
        assert_eq!(rendered.toc.at_level(2).count(), 2);
        assert_eq!(rendered.root.children[2].attribute("id"), Some("intro-1"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  a -- b_c "), "a-b-c");
        assert_eq!(slugify("Ünïcode"), "ünïcode");
        assert_eq!(slugify("!!!"), "section");
    }
}
