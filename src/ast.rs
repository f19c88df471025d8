use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Visitor for read-only traversal of a parsed [`Document`].
///
/// Every method has an empty default so implementors only override the
/// callbacks they care about.
pub trait Visitor {
    fn visit_document(&mut self, _document: &Document) {}
    /// Called before an element's children are visited.
    fn enter_element(&mut self, _element: &Element) {}
    /// Called after an element's children are visited.
    fn leave_element(&mut self, _element: &Element) {}
    fn visit_text(&mut self, _text: &str) {}
    fn visit_breakline(&mut self) {}
    fn visit_html_image(&mut self, _props: &HtmlImageProps) {}
}

/// Trait for visitor pattern support.
pub trait Visitable {
    fn accept<V: Visitor>(&self, visitor: &mut V);
}

/// Root of the document tree. Owns every node exclusively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub children: Vec<Node>,
}

/// One unit of document structure.
///
/// Containers are [`Element`]s; the remaining variants are leaves and can
/// never hold children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text(String),
    Breakline,
    HtmlImage(HtmlImageProps),
}

/// A container node: a kind plus its children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub kind: ElementKind,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Paragraph,
    /// Heading level, 1 to 6.
    Heading(u8),
    OrderedList {
        start: u64,
    },
    UnorderedList,
    ListItem,
    Blockquote,
    InlineCode,
    BlockCode,
    Bold,
    Italic,
    /// Bold and italic together.
    Strong,
    Strikethrough,
    Link {
        url: String,
    },
    Image {
        url: String,
    },
    HtmlDiv(HtmlDivProps),
}

/// Attributes accepted on a passthrough `<div>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HtmlDivProps {
    pub align: Option<String>,
    pub width: Option<String>,
}

/// Attributes accepted on a passthrough `<img>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HtmlImageProps {
    pub src: String,
    pub alt: Option<String>,
    pub align: Option<String>,
    pub width: Option<String>,
}

impl ElementKind {
    pub fn is_code(&self) -> bool {
        matches!(self, ElementKind::InlineCode | ElementKind::BlockCode)
    }

    pub fn is_link_like(&self) -> bool {
        matches!(self, ElementKind::Link { .. } | ElementKind::Image { .. })
    }

    /// Short name used by tree dumps.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Paragraph => "Paragraph",
            ElementKind::Heading(_) => "Heading",
            ElementKind::OrderedList { .. } => "OrderedList",
            ElementKind::UnorderedList => "UnorderedList",
            ElementKind::ListItem => "ListItem",
            ElementKind::Blockquote => "Blockquote",
            ElementKind::InlineCode => "InlineCode",
            ElementKind::BlockCode => "BlockCode",
            ElementKind::Bold => "Bold",
            ElementKind::Italic => "Italic",
            ElementKind::Strong => "Strong",
            ElementKind::Strikethrough => "Strikethrough",
            ElementKind::Link { .. } => "Link",
            ElementKind::Image { .. } => "Image",
            ElementKind::HtmlDiv(_) => "HtmlDiv",
        }
    }
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: ElementKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    /// Concatenated text of every descendant text leaf.
    pub fn plain_text(&self) -> String {
        let mut collector = utils::PlainText::default();
        self.accept(&mut collector);
        collector.into_string()
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn element(kind: ElementKind, children: Vec<Node>) -> Self {
        Node::Element(Element::with_children(kind, children))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Children of a container; leaves have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) | Node::Breakline | Node::HtmlImage(_) => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Node::Element(_))
    }
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Flattens the tree back to the literal text it holds.
    pub fn plain_text(&self) -> String {
        let mut collector = utils::PlainText::default();
        self.accept(&mut collector);
        collector.into_string()
    }
}

impl Visitable for Document {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        visitor.visit_document(self);
        for child in &self.children {
            child.accept(visitor);
        }
    }
}

impl Visitable for Element {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        visitor.enter_element(self);
        for child in &self.children {
            child.accept(visitor);
        }
        visitor.leave_element(self);
    }
}

impl Visitable for Node {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        match self {
            Node::Element(element) => element.accept(visitor),
            Node::Text(text) => visitor.visit_text(text),
            Node::Breakline => visitor.visit_breakline(),
            Node::HtmlImage(props) => visitor.visit_html_image(props),
        }
    }
}

impl fmt::Display for Document {
    /// Indented one-node-per-line dump, handy for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Document")?;
        for child in &self.children {
            utils::write_tree(f, child, 1)?;
        }
        Ok(())
    }
}

pub mod utils {
    use super::*;

    /// Node creation helper functions
    pub struct NodeBuilder;

    impl NodeBuilder {
        pub fn paragraph(children: Vec<Node>) -> Node {
            Node::element(ElementKind::Paragraph, children)
        }

        pub fn heading(level: u8, children: Vec<Node>) -> Node {
            Node::element(ElementKind::Heading(level), children)
        }

        pub fn unordered_list(items: Vec<Node>) -> Node {
            Node::element(ElementKind::UnorderedList, items)
        }

        pub fn ordered_list(start: u64, items: Vec<Node>) -> Node {
            Node::element(ElementKind::OrderedList { start }, items)
        }

        pub fn list_item(children: Vec<Node>) -> Node {
            Node::element(ElementKind::ListItem, children)
        }

        pub fn blockquote(children: Vec<Node>) -> Node {
            Node::element(ElementKind::Blockquote, children)
        }

        pub fn bold(children: Vec<Node>) -> Node {
            Node::element(ElementKind::Bold, children)
        }

        pub fn italic(children: Vec<Node>) -> Node {
            Node::element(ElementKind::Italic, children)
        }

        pub fn strong(children: Vec<Node>) -> Node {
            Node::element(ElementKind::Strong, children)
        }

        pub fn strikethrough(children: Vec<Node>) -> Node {
            Node::element(ElementKind::Strikethrough, children)
        }

        pub fn inline_code(code: &str) -> Node {
            Node::element(ElementKind::InlineCode, vec![Node::text(code)])
        }

        pub fn block_code(code: &str) -> Node {
            Node::element(ElementKind::BlockCode, vec![Node::text(code)])
        }

        pub fn link(url: &str, children: Vec<Node>) -> Node {
            Node::element(
                ElementKind::Link {
                    url: url.to_string(),
                },
                children,
            )
        }

        pub fn image(url: &str, children: Vec<Node>) -> Node {
            Node::element(
                ElementKind::Image {
                    url: url.to_string(),
                },
                children,
            )
        }

        pub fn html_div(align: Option<&str>, width: Option<&str>, children: Vec<Node>) -> Node {
            Node::element(
                ElementKind::HtmlDiv(HtmlDivProps {
                    align: align.map(str::to_string),
                    width: width.map(str::to_string),
                }),
                children,
            )
        }

        pub fn text(text: &str) -> Node {
            Node::text(text)
        }

        pub fn document(children: Vec<Node>) -> Document {
            Document::new(children)
        }
    }

    /// Collects the literal text held by text leaves.
    #[derive(Debug, Default)]
    pub struct PlainText {
        buffer: String,
    }

    impl PlainText {
        pub fn into_string(self) -> String {
            self.buffer
        }
    }

    impl Visitor for PlainText {
        fn visit_text(&mut self, text: &str) {
            self.buffer.push_str(text);
        }

        fn visit_breakline(&mut self) {
            self.buffer.push('\n');
        }
    }

    pub struct Traversal;

    impl Traversal {
        /// Pre-order depth-first walk over every node below the root.
        pub fn depth_first<'a, F>(document: &'a Document, mut visit_fn: F)
        where
            F: FnMut(&'a Node),
        {
            fn walk<'a, F: FnMut(&'a Node)>(node: &'a Node, visit_fn: &mut F) {
                visit_fn(node);
                for child in node.children() {
                    walk(child, visit_fn);
                }
            }
            for child in &document.children {
                walk(child, &mut visit_fn);
            }
        }

        /// Level-order walk over every node below the root.
        pub fn breadth_first<'a, F>(document: &'a Document, mut visit_fn: F)
        where
            F: FnMut(&'a Node),
        {
            let mut queue: VecDeque<&'a Node> = document.children.iter().collect();
            while let Some(node) = queue.pop_front() {
                visit_fn(node);
                queue.extend(node.children());
            }
        }

        pub fn count_nodes(document: &Document) -> usize {
            let mut count = 0;
            Self::depth_first(document, |_| count += 1);
            count
        }

        /// Every element of the given kind, in document order.
        pub fn find_elements<'a, P>(document: &'a Document, mut predicate: P) -> Vec<&'a Element>
        where
            P: FnMut(&ElementKind) -> bool,
        {
            let mut found = Vec::new();
            Self::depth_first(document, |node| {
                if let Node::Element(element) = node {
                    if predicate(&element.kind) {
                        found.push(element);
                    }
                }
            });
            found
        }

        /// Maximum nesting depth below the root.
        pub fn depth(document: &Document) -> usize {
            fn depth_of(node: &Node) -> usize {
                1 + node.children().iter().map(depth_of).max().unwrap_or(0)
            }
            document.children.iter().map(depth_of).max().unwrap_or(0)
        }
    }

    pub(super) fn write_tree(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match node {
            Node::Text(text) => writeln!(f, "{indent}Text {text:?}"),
            Node::Breakline => writeln!(f, "{indent}Breakline"),
            Node::HtmlImage(props) => writeln!(f, "{indent}HtmlImage src={:?}", props.src),
            Node::Element(element) => {
                match &element.kind {
                    ElementKind::Heading(level) => writeln!(f, "{indent}Heading({level})")?,
                    ElementKind::OrderedList { start } => {
                        writeln!(f, "{indent}OrderedList start={start}")?
                    }
                    ElementKind::Link { url } | ElementKind::Image { url } => {
                        writeln!(f, "{indent}{} url={url:?}", element.kind.name())?
                    }
                    ElementKind::HtmlDiv(props) => writeln!(
                        f,
                        "{indent}HtmlDiv align={:?} width={:?}",
                        props.align, props.width
                    )?,
                    kind => writeln!(f, "{indent}{}", kind.name())?,
                }
                for child in &element.children {
                    write_tree(f, child, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::utils::{NodeBuilder, Traversal};
    use super::*;

    fn sample() -> Document {
        NodeBuilder::document(vec![
            NodeBuilder::heading(1, vec![NodeBuilder::text("Title")]),
            NodeBuilder::paragraph(vec![
                NodeBuilder::text("Hello "),
                NodeBuilder::bold(vec![NodeBuilder::text("world")]),
                Node::Breakline,
                NodeBuilder::link("http://x", vec![NodeBuilder::text("x")]),
            ]),
        ])
    }

    #[test]
    fn test_leaves_have_no_children() {
        assert!(Node::text("a").children().is_empty());
        assert!(Node::Breakline.is_leaf());
        assert!(!NodeBuilder::paragraph(vec![]).is_leaf());
    }

    #[test]
    fn test_plain_text_flattening() {
        assert_eq!(sample().plain_text(), "TitleHello world\nx");
    }

    #[test]
    fn test_traversal_orders_agree_on_count() {
        let document = sample();
        let mut depth_first = Vec::new();
        Traversal::depth_first(&document, |node| depth_first.push(node));
        let mut breadth_first = Vec::new();
        Traversal::breadth_first(&document, |node| breadth_first.push(node));

        assert_eq!(depth_first.len(), 9);
        assert_eq!(breadth_first.len(), depth_first.len());
        // pre-order visits the heading's text before the paragraph
        assert_eq!(depth_first[1].as_text(), Some("Title"));
        assert!(breadth_first[1].as_element().is_some());
        assert_eq!(Traversal::count_nodes(&document), 9);
        assert_eq!(Traversal::depth(&document), 3);
    }

    #[test]
    fn test_find_elements() {
        let document = sample();
        let links = Traversal::find_elements(&document, ElementKind::is_link_like);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].plain_text(), "x");
    }

    #[test]
    fn test_display_dumps_tree() {
        let dump = sample().to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "Document");
        assert_eq!(lines[1], "  Heading(1)");
        assert_eq!(lines[2], "    Text \"Title\"");
        assert_eq!(lines[5], "    Bold");
        assert_eq!(lines[6], "      Text \"world\"");
        assert_eq!(lines[7], "    Breakline");
        assert_eq!(lines[8], "    Link url=\"http://x\"");
    }

    #[test]
    fn test_visitor_enter_leave_balance() {
        #[derive(Default)]
        struct Depth {
            current: usize,
            max: usize,
        }
        impl Visitor for Depth {
            fn enter_element(&mut self, _element: &Element) {
                self.current += 1;
                self.max = self.max.max(self.current);
            }
            fn leave_element(&mut self, _element: &Element) {
                self.current -= 1;
            }
        }

        let mut depth = Depth::default();
        sample().accept(&mut depth);
        assert_eq!(depth.current, 0);
        assert_eq!(depth.max, 2);
    }
}
