/// Lexical analysis module for tokenizing Markdown input.
///
/// The lexer classifies runs of characters into a flat stream of tokens. It
/// applies no structural interpretation: deciding whether a `-` starts a list
/// item or a `*` opens emphasis is left to the parser.
mod char_class;
mod position;
mod token;

pub use position::Position;
pub use token::{Token, TokenKind};

use char_class::{CharClass, RunRule, Terminator, classify, is_escapable, is_newline};
use unicode_segmentation::UnicodeSegmentation;

/// Converts Markdown text into a sequence of [`Token`]s.
///
/// Tokenizing is total: every input produces tokens whose raw slices, joined
/// in order, reproduce the input exactly.
pub struct Lexer<'input> {
    input: &'input str,
    graphemes: Vec<(usize, &'input str)>,
    cursor: usize,
    /// Grapheme index where the pending text run begins.
    text_start: Option<usize>,
    /// Position of the grapheme at `tracked`.
    tracked_position: Position,
    tracked: usize,
    tokens: Vec<Token<'input>>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            graphemes: input.grapheme_indices(true).collect(),
            cursor: 0,
            text_start: None,
            tracked_position: Position::new(),
            tracked: 0,
            tokens: Vec::new(),
        }
    }

    /// Runs the lexer to completion.
    pub fn tokenize(mut self) -> Vec<Token<'input>> {
        while let Some(&(_, grapheme)) = self.graphemes.get(self.cursor) {
            match classify(grapheme) {
                CharClass::Newline => {
                    self.emit(TokenKind::Newline, self.cursor, self.cursor + 1);
                    self.cursor += 1;
                }
                CharClass::Digit => match self.ordered_marker_end() {
                    Some(end) => {
                        self.emit(TokenKind::OrderedMarker, self.cursor, end);
                        self.cursor = end;
                    }
                    None => self.extend_text(1),
                },
                CharClass::Escape => {
                    let escaped = self
                        .graphemes
                        .get(self.cursor + 1)
                        .is_some_and(|&(_, next)| is_escapable(next));
                    if escaped {
                        self.emit(TokenKind::Escape, self.cursor, self.cursor + 2);
                        self.cursor += 2;
                    } else {
                        self.extend_text(1);
                    }
                }
                CharClass::Run(rule) => self.lex_run(rule),
                CharClass::Single(kind) => {
                    self.emit(kind, self.cursor, self.cursor + 1);
                    self.cursor += 1;
                }
                CharClass::Plain => self.extend_text(1),
            }
        }
        self.flush_text(self.cursor);

        log::debug!(
            "lexed {} tokens from {} bytes",
            self.tokens.len(),
            self.input.len()
        );
        self.tokens
    }

    fn grapheme_at(&self, index: usize) -> Option<&'input str> {
        self.graphemes.get(index).map(|&(_, g)| g)
    }

    fn byte_offset(&self, index: usize) -> usize {
        self.graphemes
            .get(index)
            .map_or(self.input.len(), |&(offset, _)| offset)
    }

    fn at_line_start(&self) -> bool {
        self.cursor == 0 || self.grapheme_at(self.cursor - 1).is_some_and(is_newline)
    }

    /// End index of an ordered-list marker (`12. `) starting at the cursor.
    fn ordered_marker_end(&self) -> Option<usize> {
        if !self.at_line_start() {
            return None;
        }
        let mut index = self.cursor;
        while self
            .grapheme_at(index)
            .is_some_and(|g| matches!(classify(g), CharClass::Digit))
        {
            index += 1;
        }
        match (self.grapheme_at(index), self.grapheme_at(index + 1)) {
            (Some("."), Some(" ")) => Some(index + 2),
            _ => None,
        }
    }

    /// Greedily matches a repeating punctuation run and its terminator.
    ///
    /// When a required terminator is missing the run becomes text and
    /// scanning resumes at the character that failed to match.
    fn lex_run(&mut self, rule: &RunRule) {
        let start = self.cursor;
        let mut end = start;
        while end - start < rule.max_repeat
            && self
                .grapheme_at(end)
                .is_some_and(|g| g.len() == rule.ch.len_utf8() && g.starts_with(rule.ch))
        {
            end += 1;
        }

        let terminated = |ch: char, grapheme: Option<&str>| match grapheme {
            Some(g) if ch == '\n' => is_newline(g),
            Some(g) => g.len() == ch.len_utf8() && g.starts_with(ch),
            None => false,
        };

        let token_end = match rule.terminator {
            Terminator::None => Some(end),
            Terminator::Required(ch) => terminated(ch, self.grapheme_at(end)).then_some(end + 1),
            // only a full-length run (a fence) swallows its line break
            Terminator::Optional(ch) => {
                if end - start == rule.max_repeat && terminated(ch, self.grapheme_at(end)) {
                    Some(end + 1)
                } else {
                    Some(end)
                }
            }
        };

        match (token_end, rule.kind_for(end - start)) {
            (Some(token_end), Some(kind)) => {
                self.emit(kind, start, token_end);
                self.cursor = token_end;
            }
            _ => self.extend_text(end - start),
        }
    }

    fn extend_text(&mut self, count: usize) {
        if self.text_start.is_none() {
            self.text_start = Some(self.cursor);
        }
        self.cursor += count;
    }

    fn flush_text(&mut self, end: usize) {
        if let Some(start) = self.text_start.take() {
            self.push_token(TokenKind::Text, start, end);
        }
    }

    /// Emits a punctuation token, flushing any pending text first.
    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.flush_text(start);
        self.push_token(kind, start, end);
    }

    fn push_token(&mut self, kind: TokenKind, start: usize, end: usize) {
        let raw = &self.input[self.byte_offset(start)..self.byte_offset(end)];
        let position = self.position_of(start);
        self.tokens.push(Token::new(kind, raw, position));
    }

    /// Position of the grapheme at `index`. Indices must not decrease
    /// between calls.
    fn position_of(&mut self, index: usize) -> Position {
        debug_assert!(index >= self.tracked);
        while self.tracked < index {
            let (_, grapheme) = self.graphemes[self.tracked];
            self.tracked_position.advance(grapheme);
            self.tracked += 1;
        }
        self.tracked_position
    }
}

/// Tokenizes `input` with a fresh [`Lexer`].
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).iter().map(|t| t.kind).collect()
    }

    fn raws(input: &str) -> Vec<&str> {
        tokenize(input).iter().map(|t| t.raw).collect()
    }

    #[test]
    fn test_plain_text_is_one_token() {
        let tokens = tokenize("Hello, world");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].value(), "Hello, world");
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_raw_slices_reassemble_input() {
        let input = "# Title\n\n- a *b* __c__\n> q\n1. x ~~y~~ `z`\n```\ncode\n```\n![i](u) \\* <br>";
        let joined: String = tokenize(input).iter().map(|t| t.raw).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn test_heading_tokenization() {
        assert_eq!(kinds("# Hi"), vec![TokenKind::Hash(1), TokenKind::Text]);
        assert_eq!(
            kinds("###### Hi"),
            vec![TokenKind::Hash(6), TokenKind::Text]
        );
        assert_eq!(raws("## Hi"), vec!["## ", "Hi"]);
        // no space after the run
        assert_eq!(kinds("#tag"), vec![TokenKind::Text]);
    }

    #[test]
    fn test_seven_hashes_back_off() {
        assert_eq!(raws("####### x"), vec!["######", "# ", "x"]);
        assert_eq!(
            kinds("####### x"),
            vec![TokenKind::Text, TokenKind::Hash(1), TokenKind::Text]
        );
    }

    #[test]
    fn test_emphasis_tokenization() {
        assert_eq!(
            kinds("*a* **b** ***c***"),
            vec![
                TokenKind::Star,
                TokenKind::Text,
                TokenKind::Star,
                TokenKind::Text,
                TokenKind::DoubleStar,
                TokenKind::Text,
                TokenKind::DoubleStar,
                TokenKind::Text,
                TokenKind::TripleStar,
                TokenKind::Text,
                TokenKind::TripleStar,
            ]
        );
        assert_eq!(raws("****"), vec!["***", "*"]);
        assert_eq!(
            kinds("_a_ __b__"),
            vec![
                TokenKind::Underscore,
                TokenKind::Text,
                TokenKind::Underscore,
                TokenKind::Text,
                TokenKind::DoubleUnderscore,
                TokenKind::Text,
                TokenKind::DoubleUnderscore,
            ]
        );
    }

    #[test]
    fn test_tilde_needs_a_pair() {
        assert_eq!(kinds("~a"), vec![TokenKind::Text]);
        assert_eq!(
            kinds("~~a~~"),
            vec![TokenKind::Tilde, TokenKind::Text, TokenKind::Tilde]
        );
        assert_eq!(raws("~~~"), vec!["~~", "~"]);
    }

    #[test]
    fn test_dash_and_quote_need_space() {
        assert_eq!(kinds("- item"), vec![TokenKind::Dash, TokenKind::Text]);
        assert_eq!(kinds("> quote"), vec![TokenKind::Quote, TokenKind::Text]);
        assert_eq!(kinds("a-b"), vec![TokenKind::Text]);
        assert_eq!(kinds("->"), vec![TokenKind::Text]);
        assert_eq!(raws("---"), vec!["---"]);
    }

    #[test]
    fn test_fence_consumes_optional_newline() {
        assert_eq!(
            raws("```\ncode\n```"),
            vec!["```\n", "code", "\n", "```"]
        );
        assert_eq!(
            kinds("```\ncode\n```"),
            vec![
                TokenKind::Fence,
                TokenKind::Text,
                TokenKind::Newline,
                TokenKind::Fence
            ]
        );
        assert_eq!(kinds("``"), vec![TokenKind::Text]);
        assert_eq!(
            kinds("`x`"),
            vec![TokenKind::Backtick, TokenKind::Text, TokenKind::Backtick]
        );
        // a single backtick leaves the line break alone
        assert_eq!(raws("`x`\ny"), vec!["`", "x", "`", "\n", "y"]);
    }

    #[test]
    fn test_ordered_marker_only_at_line_start() {
        let tokens = tokenize("12. first\nitem 3. not");
        assert_eq!(tokens[0].kind, TokenKind::OrderedMarker);
        assert_eq!(tokens[0].value(), "12");
        assert_eq!(tokens[0].raw, "12. ");
        assert_eq!(tokens[1].value(), "first");
        assert_eq!(tokens[2].kind, TokenKind::Newline);
        assert_eq!(tokens[3].kind, TokenKind::Text);
        assert_eq!(tokens[3].value(), "item 3. not");
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_digits_without_marker_shape_are_text() {
        assert_eq!(kinds("1.5 apples"), vec![TokenKind::Text]);
        assert_eq!(kinds("2024"), vec![TokenKind::Text]);
    }

    #[test]
    fn test_single_character_tokens() {
        assert_eq!(
            kinds("![a](b)<"),
            vec![
                TokenKind::Bang,
                TokenKind::OpenBracket,
                TokenKind::Text,
                TokenKind::CloseBracket,
                TokenKind::OpenParen,
                TokenKind::Text,
                TokenKind::CloseParen,
                TokenKind::LessThan,
            ]
        );
    }

    #[test]
    fn test_newlines_are_dedicated_tokens() {
        assert_eq!(
            kinds("a\n\nb"),
            vec![
                TokenKind::Text,
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Text
            ]
        );
        let tokens = tokenize("a\r\nb");
        assert_eq!(tokens[1].raw, "\r\n");
        assert_eq!(tokens[2].position.line, 2);
    }

    #[test]
    fn test_escapes() {
        let tokens = tokenize(r"\*not\* a\b");
        assert_eq!(tokens[0].kind, TokenKind::Escape);
        assert_eq!(tokens[0].value(), "*");
        assert_eq!(tokens[1].value(), "not");
        assert_eq!(tokens[2].kind, TokenKind::Escape);
        // backslash before a plain letter stays text
        assert_eq!(tokens[3].value(), r" a\b");
    }

    #[test]
    fn test_position_tracking() {
        let tokens = tokenize("ab\n- cd");
        let dash = tokens[2];
        assert_eq!(dash.kind, TokenKind::Dash);
        assert_eq!(dash.position.line, 2);
        assert_eq!(dash.position.column, 1);
        assert_eq!(dash.position.offset, 3);
        assert_eq!(tokens[3].position.column, 3);
    }

    #[test]
    fn test_unicode_text_tokenization() {
        let tokens = tokenize("héllo 👍🏽 *世界*");
        assert_eq!(tokens[0].value(), "héllo 👍🏽 ");
        assert_eq!(tokens[1].kind, TokenKind::Star);
        assert_eq!(tokens[1].position.column, 9);
        assert_eq!(tokens[2].value(), "世界");
    }
}
