//! Static character map used by the lexer.

use super::token::TokenKind;

/// What must follow a repeating punctuation run for it to become a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminator {
    None,
    /// The character must follow; it becomes part of the token.
    Required(char),
    /// The character may follow; when present it becomes part of the token.
    Optional(char),
}

/// Matching rule for a punctuation character that may repeat.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RunRule {
    pub ch: char,
    pub max_repeat: usize,
    pub terminator: Terminator,
}

impl RunRule {
    /// Token kind for a run of `count` characters, if the run has one.
    pub fn kind_for(&self, count: usize) -> Option<TokenKind> {
        match (self.ch, count) {
            ('*', 1) => Some(TokenKind::Star),
            ('*', 2) => Some(TokenKind::DoubleStar),
            ('*', 3) => Some(TokenKind::TripleStar),
            ('_', 1) => Some(TokenKind::Underscore),
            ('_', 2) => Some(TokenKind::DoubleUnderscore),
            ('_', 3) => Some(TokenKind::TripleUnderscore),
            ('~', 2) => Some(TokenKind::Tilde),
            ('`', 1) => Some(TokenKind::Backtick),
            ('`', 3) => Some(TokenKind::Fence),
            ('#', n @ 1..=6) => Some(TokenKind::Hash(n as u8)),
            ('-', 1) => Some(TokenKind::Dash),
            ('>', 1) => Some(TokenKind::Quote),
            _ => None,
        }
    }
}

static RUN_RULES: [RunRule; 7] = [
    RunRule {
        ch: '*',
        max_repeat: 3,
        terminator: Terminator::None,
    },
    RunRule {
        ch: '_',
        max_repeat: 3,
        terminator: Terminator::None,
    },
    RunRule {
        ch: '~',
        max_repeat: 2,
        terminator: Terminator::None,
    },
    RunRule {
        ch: '#',
        max_repeat: 6,
        terminator: Terminator::Required(' '),
    },
    RunRule {
        ch: '`',
        max_repeat: 3,
        terminator: Terminator::Optional('\n'),
    },
    RunRule {
        ch: '>',
        max_repeat: 1,
        terminator: Terminator::Required(' '),
    },
    RunRule {
        ch: '-',
        max_repeat: 1,
        terminator: Terminator::Required(' '),
    },
];

static SINGLE_CHARS: [(char, TokenKind); 6] = [
    ('[', TokenKind::OpenBracket),
    (']', TokenKind::CloseBracket),
    ('(', TokenKind::OpenParen),
    (')', TokenKind::CloseParen),
    ('<', TokenKind::LessThan),
    ('!', TokenKind::Bang),
];

/// Classification of one grapheme cluster.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CharClass {
    Newline,
    Digit,
    Escape,
    Run(&'static RunRule),
    Single(TokenKind),
    Plain,
}

pub(crate) fn is_newline(grapheme: &str) -> bool {
    grapheme == "\n" || grapheme == "\r\n"
}

fn single_char(grapheme: &str) -> Option<char> {
    let mut chars = grapheme.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// True when a backslash in front of this grapheme escapes it.
pub(crate) fn is_escapable(grapheme: &str) -> bool {
    single_char(grapheme).is_some_and(|ch| {
        ch == '\\'
            || ch == '!'
            || RUN_RULES.iter().any(|rule| rule.ch == ch)
            || SINGLE_CHARS.iter().any(|(c, _)| *c == ch)
    })
}

pub(crate) fn classify(grapheme: &str) -> CharClass {
    if is_newline(grapheme) {
        return CharClass::Newline;
    }
    let Some(ch) = single_char(grapheme) else {
        return CharClass::Plain;
    };
    if ch.is_ascii_digit() {
        return CharClass::Digit;
    }
    if ch == '\\' {
        return CharClass::Escape;
    }
    if let Some(rule) = RUN_RULES.iter().find(|rule| rule.ch == ch) {
        return CharClass::Run(rule);
    }
    SINGLE_CHARS
        .iter()
        .find(|(c, _)| *c == ch)
        .map_or(CharClass::Plain, |(_, kind)| CharClass::Single(*kind))
}
