use super::position::Position;

/// Lexical category of a [`Token`].
///
/// Punctuation kinds are distinguished by run length, so `*`, `**` and `***`
/// are separate kinds rather than one kind with a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `*`
    Star,
    /// `**`
    DoubleStar,
    /// `***`
    TripleStar,
    /// `_`
    Underscore,
    /// `__`
    DoubleUnderscore,
    /// `___`
    TripleUnderscore,
    /// `~~`
    Tilde,
    /// `` ` ``
    Backtick,
    /// ```` ``` ````, optionally followed by a newline.
    Fence,
    /// `#` to `######` followed by a space.
    Hash(u8),
    /// `-` followed by a space.
    Dash,
    /// `>` followed by a space.
    Quote,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    LessThan,
    Bang,
    /// `1. ` at the start of a line.
    OrderedMarker,
    /// Backslash followed by an escapable character.
    Escape,
    Newline,
    Text,
}

impl TokenKind {
    /// True for the markers that open a block when they start a line.
    pub fn starts_block(self) -> bool {
        matches!(
            self,
            TokenKind::Dash | TokenKind::Quote | TokenKind::OrderedMarker
        )
    }

    /// True for the emphasis family, which is matched with look-ahead.
    pub fn is_emphasis(self) -> bool {
        matches!(
            self,
            TokenKind::Star
                | TokenKind::DoubleStar
                | TokenKind::TripleStar
                | TokenKind::Underscore
                | TokenKind::DoubleUnderscore
                | TokenKind::TripleUnderscore
                | TokenKind::Tilde
        )
    }
}

/// A single lexeme borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'input> {
    pub kind: TokenKind,
    /// Exact source slice, including any terminator the rule consumed.
    pub raw: &'input str,
    pub position: Position,
}

impl<'input> Token<'input> {
    pub fn new(kind: TokenKind, raw: &'input str, position: Position) -> Self {
        Self {
            kind,
            raw,
            position,
        }
    }

    /// The semantic payload of the token.
    ///
    /// Text tokens yield their text, ordered markers their digits and escapes
    /// the escaped character. Punctuation yields its raw slice.
    pub fn value(&self) -> &'input str {
        match self.kind {
            TokenKind::OrderedMarker => self
                .raw
                .split_once('.')
                .map(|(digits, _)| digits)
                .unwrap_or(self.raw),
            TokenKind::Escape => &self.raw[1..],
            _ => self.raw,
        }
    }

    /// Byte offset one past the end of the token.
    pub fn end(&self) -> usize {
        self.position.offset + self.raw.len()
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Newline
    }
}
