use super::config::ParserConfig;
use super::html::{self, HtmlTag};
use super::lookahead::{has_closer, is_link_shape};
use super::stack::{BlockState, LinkPhase, NodeStack};
use crate::ast::{Document, ElementKind, Node};
use crate::lexer::{Lexer, Token, TokenKind};

/// Stack-machine parser that turns a token stream into a [`Document`].
///
/// Every input produces a tree. Markers that cannot be matched degrade to
/// literal text, and constructs still open at a blank line or at the end of
/// input are force-closed with whatever content they collected.
pub struct Parser<'input> {
    source: &'input str,
    tokens: Vec<Token<'input>>,
    config: ParserConfig,
    stack: NodeStack,
    /// Text not yet wrapped into a text node.
    pending: String,
    cursor: usize,
}

impl<'input> Parser<'input> {
    pub fn new(source: &'input str, config: ParserConfig) -> Self {
        Self {
            source,
            tokens: Lexer::new(source).tokenize(),
            config,
            stack: NodeStack::new(),
            pending: String::new(),
            cursor: 0,
        }
    }

    pub fn with_defaults(source: &'input str) -> Self {
        Self::new(source, ParserConfig::default())
    }

    pub fn parse(mut self) -> Document {
        while let Some(&token) = self.tokens.get(self.cursor) {
            self.step(token);
            self.cursor += 1;
        }
        self.flush_text();
        self.stack.complete_all();

        let document = Document::new(self.stack.into_root());
        log::debug!(
            "parsed {} tokens into {} top-level nodes",
            self.tokens.len(),
            document.children.len()
        );
        document
    }

    fn step(&mut self, token: Token<'input>) {
        if token.is_newline() {
            self.on_newline(token);
            return;
        }
        if self.collecting_url() && token.kind != TokenKind::CloseParen {
            self.literal(token);
            return;
        }
        if let Some(code) = self.stack.top_kind().filter(|kind| kind.is_code()) {
            let closes = matches!(
                (code, token.kind),
                (ElementKind::InlineCode, TokenKind::Backtick)
                    | (ElementKind::BlockCode, TokenKind::Fence)
            );
            if !closes {
                self.literal(token);
                return;
            }
        }

        match token.kind {
            TokenKind::Text | TokenKind::Escape => self.pending.push_str(token.value()),
            TokenKind::Hash(level) => self.on_heading(token, level),
            kind if kind.is_emphasis() => self.on_emphasis(token),
            TokenKind::Backtick => self.on_inline_code(token),
            TokenKind::Fence => self.on_block_code(token),
            TokenKind::LessThan => self.on_less_than(token),
            TokenKind::Dash => self.on_dash(token),
            TokenKind::OrderedMarker => self.on_ordered_marker(token),
            TokenKind::Quote => self.on_quote(token),
            TokenKind::Bang => self.on_bang(token),
            TokenKind::OpenBracket => self.on_open_bracket(token),
            TokenKind::CloseBracket => self.on_close_bracket(token),
            TokenKind::OpenParen => self.on_open_paren(token),
            TokenKind::CloseParen => self.on_close_paren(token),
            _ => self.literal(token),
        }
    }

    /// Re-emits a token's source text as plain text.
    fn literal(&mut self, token: Token<'input>) {
        if token.kind != TokenKind::Text {
            log::trace!(
                "{:?} at {}:{} kept as text",
                token.kind,
                token.position.line,
                token.position.column
            );
        }
        self.pending.push_str(token.raw);
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.ensure_container();
        let text = std::mem::take(&mut self.pending);
        self.stack.append(Node::Text(text));
    }

    /// Opens an implicit paragraph when inline content arrives with nothing
    /// open.
    fn ensure_container(&mut self) {
        if self.stack.is_empty() {
            self.stack.push(ElementKind::Paragraph);
        }
    }

    fn open_inline(&mut self, kind: ElementKind) {
        self.flush_text();
        self.ensure_container();
        self.stack.push(kind);
    }

    fn nesting_full(&self) -> bool {
        self.stack.depth() >= self.config.max_nesting
    }

    fn at_line_start(&self) -> bool {
        self.cursor == 0 || self.tokens[self.cursor - 1].is_newline()
    }

    fn next_token(&self) -> Option<Token<'input>> {
        self.tokens.get(self.cursor + 1).copied()
    }

    fn top_link_phase(&self) -> Option<LinkPhase> {
        self.stack.top().and_then(|open| open.link_phase)
    }

    fn collecting_url(&self) -> bool {
        self.top_link_phase() == Some(LinkPhase::Url)
    }

    fn set_link_phase(&mut self, phase: LinkPhase) {
        if let Some(open) = self.stack.top_mut() {
            open.link_phase = Some(phase);
        }
    }

    fn on_newline(&mut self, token: Token<'input>) {
        if self.stack.state() == BlockState::BlockCode {
            self.pending.push_str(token.raw);
            return;
        }

        match self.next_token() {
            None => {
                self.flush_text();
                self.stack.complete_all();
            }
            Some(next) if next.is_newline() => {
                self.flush_text();
                self.stack.complete_all();
                while self.next_token().is_some_and(|t| t.is_newline()) {
                    self.cursor += 1;
                }
            }
            Some(_) if self.stack.state() == BlockState::Heading => {
                self.flush_text();
                self.stack
                    .complete_until(|kind| matches!(kind, ElementKind::Heading(_)));
                self.stack.complete();
            }
            Some(next) if next.kind.starts_block() => self.break_before_block(token, next.kind),
            Some(_) => {
                if !self.pending.is_empty() || !self.stack.at_block_root() {
                    self.pending.push_str(token.raw);
                }
            }
        }
    }

    /// A single newline followed by `-`, `>` or `1. `.
    ///
    /// If the container that marker continues is open, everything above it is
    /// closed and the container carries on. Otherwise the stack unwinds to the
    /// block root so the marker can open a new container.
    fn break_before_block(&mut self, newline: Token<'input>, marker: TokenKind) {
        let state = match marker {
            TokenKind::Dash => BlockState::UnorderedList,
            TokenKind::OrderedMarker => BlockState::OrderedList,
            _ => BlockState::Blockquote,
        };
        let is_container = move |kind: &ElementKind| match state {
            BlockState::UnorderedList => *kind == ElementKind::UnorderedList,
            BlockState::OrderedList => matches!(kind, ElementKind::OrderedList { .. }),
            _ => *kind == ElementKind::Blockquote,
        };

        if self.stack.state() != state {
            self.flush_text();
            self.stack.complete_to_block_root();
            return;
        }

        if !self.stack.top_kind().is_some_and(is_container) {
            self.flush_text();
            self.stack.complete_until(is_container);
        }
        if marker == TokenKind::Quote {
            // the quote continues: keep the line break, drop the marker
            self.pending.push_str(newline.raw);
            self.cursor += 1;
        }
    }

    fn on_heading(&mut self, token: Token<'input>, level: u8) {
        if self.stack.at_block_root() && self.pending.is_empty() {
            self.stack.push(ElementKind::Heading(level));
        } else {
            self.literal(token);
        }
    }

    fn on_emphasis(&mut self, token: Token<'input>) {
        let kind = match token.kind {
            TokenKind::Star | TokenKind::Underscore => ElementKind::Italic,
            TokenKind::DoubleStar | TokenKind::DoubleUnderscore => ElementKind::Bold,
            TokenKind::TripleStar | TokenKind::TripleUnderscore => ElementKind::Strong,
            _ => ElementKind::Strikethrough,
        };

        if self.stack.top_kind() == Some(&kind) {
            self.flush_text();
            self.stack.complete();
        } else if self.nesting_full() {
            self.literal(token);
        } else if has_closer(&self.tokens, self.cursor + 1, token.kind) {
            self.open_inline(kind);
        } else {
            self.literal(token);
        }
    }

    fn on_inline_code(&mut self, token: Token<'input>) {
        if self.stack.top_kind() == Some(&ElementKind::InlineCode) {
            self.flush_text();
            self.stack.complete();
        } else if self.nesting_full() {
            self.literal(token);
        } else {
            self.open_inline(ElementKind::InlineCode);
        }
    }

    fn on_block_code(&mut self, token: Token<'input>) {
        if self.stack.top_kind() == Some(&ElementKind::BlockCode) {
            let trimmed = self
                .pending
                .strip_suffix("\r\n")
                .or_else(|| self.pending.strip_suffix('\n'))
                .map(str::len);
            if let Some(len) = trimmed {
                self.pending.truncate(len);
            }
            self.flush_text();
            self.stack.complete();
        } else if self.nesting_full() {
            self.literal(token);
        } else {
            self.flush_text();
            self.stack.push(ElementKind::BlockCode);
        }
    }

    fn on_dash(&mut self, token: Token<'input>) {
        if self.at_line_start() && self.stack.state() == BlockState::UnorderedList {
            self.flush_text();
            self.stack
                .complete_until(|kind| *kind == ElementKind::UnorderedList);
            self.stack.push(ElementKind::ListItem);
        } else if self.can_open_block() {
            self.stack.push(ElementKind::UnorderedList);
            self.stack.push(ElementKind::ListItem);
        } else {
            self.literal(token);
        }
    }

    fn on_ordered_marker(&mut self, token: Token<'input>) {
        if self.at_line_start() && self.stack.state() == BlockState::OrderedList {
            self.flush_text();
            self.stack
                .complete_until(|kind| matches!(kind, ElementKind::OrderedList { .. }));
            self.stack.push(ElementKind::ListItem);
        } else if self.can_open_block() {
            let start = token.value().parse().unwrap_or(1);
            self.stack.push(ElementKind::OrderedList { start });
            self.stack.push(ElementKind::ListItem);
        } else {
            self.literal(token);
        }
    }

    fn on_quote(&mut self, token: Token<'input>) {
        if self.can_open_block() {
            self.stack.push(ElementKind::Blockquote);
        } else {
            self.literal(token);
        }
    }

    fn can_open_block(&self) -> bool {
        self.stack.at_block_root()
            && self.pending.is_empty()
            && self.stack.state() == BlockState::None
    }

    fn on_bang(&mut self, token: Token<'input>) {
        let bracket_follows = self
            .next_token()
            .is_some_and(|next| next.kind == TokenKind::OpenBracket);
        let opens = bracket_follows
            && !self.nesting_full()
            && is_link_shape(&self.tokens, self.cursor + 2);
        if opens {
            self.open_inline(ElementKind::Image { url: String::new() });
            // the `[` belongs to the image
            self.cursor += 1;
        } else {
            self.literal(token);
        }
    }

    fn on_open_bracket(&mut self, token: Token<'input>) {
        if !self.nesting_full() && is_link_shape(&self.tokens, self.cursor + 1) {
            self.open_inline(ElementKind::Link { url: String::new() });
        } else {
            self.literal(token);
        }
    }

    fn on_close_bracket(&mut self, token: Token<'input>) {
        if self.top_link_phase() == Some(LinkPhase::Caption) {
            self.flush_text();
            self.set_link_phase(LinkPhase::Target);
        } else {
            self.literal(token);
        }
    }

    fn on_open_paren(&mut self, token: Token<'input>) {
        if self.top_link_phase() == Some(LinkPhase::Target) {
            self.flush_text();
            self.set_link_phase(LinkPhase::Url);
        } else {
            self.literal(token);
        }
    }

    fn on_close_paren(&mut self, token: Token<'input>) {
        if !self.collecting_url() {
            self.literal(token);
            return;
        }
        let target = std::mem::take(&mut self.pending);
        if let Some(open) = self.stack.top_mut() {
            if let ElementKind::Link { url } | ElementKind::Image { url } = &mut open.element.kind {
                *url = target.trim().to_string();
            }
        }
        self.stack.complete();
    }

    fn on_less_than(&mut self, token: Token<'input>) {
        if !self.config.allow_html {
            self.literal(token);
            return;
        }

        let offset = token.position.offset;
        let Some((tag, len)) = html::recognize(&self.source[offset..]) else {
            self.literal(token);
            return;
        };

        match tag {
            HtmlTag::Break => {
                self.flush_text();
                self.ensure_container();
                self.stack.append(Node::Breakline);
            }
            HtmlTag::Image(props) => {
                self.flush_text();
                self.ensure_container();
                self.stack.append(Node::HtmlImage(props));
            }
            HtmlTag::DivOpen(_) if self.nesting_full() => {
                self.literal(token);
                return;
            }
            HtmlTag::DivOpen(props) => {
                self.flush_text();
                self.stack.push(ElementKind::HtmlDiv(props));
            }
            HtmlTag::DivClose => {
                let is_div = |kind: &ElementKind| matches!(kind, ElementKind::HtmlDiv(_));
                if !self.stack.contains(is_div) {
                    self.literal(token);
                    return;
                }
                self.flush_text();
                self.stack.complete_until(is_div);
                self.stack.complete();
            }
        }
        self.skip_to(offset + len);
    }

    /// Skips the tokens covered by source bytes before `end`. The tail of a
    /// token that straddles `end` becomes pending text.
    fn skip_to(&mut self, end: usize) {
        while let Some(next) = self.next_token() {
            if next.end() <= end {
                self.cursor += 1;
                continue;
            }
            if next.position.offset < end {
                self.pending
                    .push_str(&next.raw[end - next.position.offset..]);
                self.cursor += 1;
            }
            break;
        }
    }
}
