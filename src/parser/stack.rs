use crate::ast::{Element, ElementKind, Node};

/// Block context derived from the open nodes.
///
/// Ambiguous tokens (`-`, `>`, `1. `) are interpreted according to this
/// state rather than on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    None,
    Heading,
    BlockCode,
    Blockquote,
    OrderedList,
    UnorderedList,
}

/// How far a link or image has progressed through `[caption](url)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkPhase {
    Caption,
    /// Caption closed by `]`, waiting for `(`.
    Target,
    /// Inside the parentheses; everything up to `)` is the url.
    Url,
}

/// An element that has been opened but not yet completed.
#[derive(Debug)]
pub(crate) struct OpenNode {
    pub element: Element,
    pub link_phase: Option<LinkPhase>,
    /// Block state in effect while this node is on top.
    state: BlockState,
}

/// Stack of open elements with completed top-level nodes underneath.
///
/// Only containers can be opened, so a text leaf is never "current". Each
/// entry records the block state derived when it was pushed, so the state
/// after a push or pop is read from the new top.
#[derive(Debug)]
pub(crate) struct NodeStack {
    entries: Vec<OpenNode>,
    root: Vec<Node>,
}

impl NodeStack {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            root: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of open elements.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn state(&self) -> BlockState {
        self.entries
            .last()
            .map_or(BlockState::None, |open| open.state)
    }

    pub fn top(&self) -> Option<&OpenNode> {
        self.entries.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut OpenNode> {
        self.entries.last_mut()
    }

    pub fn top_kind(&self) -> Option<&ElementKind> {
        self.top().map(|open| &open.element.kind)
    }

    /// True when no node is open or the top node is a passthrough `<div>`,
    /// the two places where block containers may start.
    pub fn at_block_root(&self) -> bool {
        matches!(self.top_kind(), None | Some(ElementKind::HtmlDiv(_)))
    }

    pub fn contains(&self, predicate: impl Fn(&ElementKind) -> bool) -> bool {
        self.entries.iter().any(|open| predicate(&open.element.kind))
    }

    pub fn push(&mut self, kind: ElementKind) {
        let link_phase = kind.is_link_like().then_some(LinkPhase::Caption);
        let state = block_state(&kind).unwrap_or_else(|| self.state());
        self.entries.push(OpenNode {
            element: Element::new(kind),
            link_phase,
            state,
        });
    }

    /// Appends a finished node to the current element, or to the root when
    /// nothing is open.
    pub fn append(&mut self, node: Node) {
        match self.entries.last_mut() {
            Some(open) => open.element.children.push(node),
            None => self.root.push(node),
        }
    }

    /// Closes the current element and folds it into its parent.
    ///
    /// # Panics
    ///
    /// Panics when no element is open; callers must check first.
    pub fn complete(&mut self) {
        let Some(open) = self.entries.pop() else {
            panic!("node stack underflow: complete() called with no open node");
        };
        self.append(Node::Element(open.element));
    }

    pub fn complete_all(&mut self) {
        while !self.is_empty() {
            self.complete();
        }
    }

    /// Completes open elements until one matching `predicate` is on top.
    /// Returns false, leaving the stack untouched, if none matches.
    pub fn complete_until(&mut self, predicate: impl Fn(&ElementKind) -> bool) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .rposition(|open| predicate(&open.element.kind))
        else {
            return false;
        };
        while self.entries.len() > index + 1 {
            self.complete();
        }
        true
    }

    /// Completes open elements until the block root is reached.
    pub fn complete_to_block_root(&mut self) {
        while !self.at_block_root() {
            self.complete();
        }
    }

    /// Hands over the finished top-level nodes.
    ///
    /// # Panics
    ///
    /// Panics if any element is still open.
    pub fn into_root(self) -> Vec<Node> {
        assert!(
            self.entries.is_empty(),
            "node stack finished with {} open node(s)",
            self.entries.len()
        );
        self.root
    }
}

/// The state a block kind imposes on everything opened inside it. Inline
/// kinds and list items inherit their parent's state.
fn block_state(kind: &ElementKind) -> Option<BlockState> {
    match kind {
        ElementKind::Heading(_) => Some(BlockState::Heading),
        ElementKind::BlockCode => Some(BlockState::BlockCode),
        ElementKind::Blockquote => Some(BlockState::Blockquote),
        ElementKind::OrderedList { .. } => Some(BlockState::OrderedList),
        ElementKind::UnorderedList => Some(BlockState::UnorderedList),
        ElementKind::Paragraph | ElementKind::HtmlDiv(_) => Some(BlockState::None),
        _ => None,
    }
}
