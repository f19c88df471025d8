//! Forward scans that decide whether an opening marker has a partner.

use crate::lexer::{Token, TokenKind};

fn is_blank_line(tokens: &[Token<'_>], index: usize) -> bool {
    tokens[index].is_newline() && tokens.get(index + 1).is_some_and(Token::is_newline)
}

/// True if a token of exactly `kind` appears after `from` before the next
/// blank line.
pub(crate) fn has_closer(tokens: &[Token<'_>], from: usize, kind: TokenKind) -> bool {
    for index in from..tokens.len() {
        if is_blank_line(tokens, index) {
            return false;
        }
        if tokens[index].kind == kind {
            return true;
        }
    }
    false
}

/// True if the tokens from `from` onwards complete a `...](...)` shape.
///
/// The scan fails on another unescaped `[` or a blank line, and succeeds
/// once `]`, `(` and `)` have each been seen.
pub(crate) fn is_link_shape(tokens: &[Token<'_>], from: usize) -> bool {
    let (mut close_bracket, mut open_paren, mut close_paren) = (false, false, false);
    for index in from..tokens.len() {
        if is_blank_line(tokens, index) {
            return false;
        }
        match tokens[index].kind {
            TokenKind::OpenBracket => return false,
            TokenKind::CloseBracket => close_bracket = true,
            TokenKind::OpenParen => open_paren = true,
            TokenKind::CloseParen => close_paren = true,
            _ => {}
        }
        if close_bracket && open_paren && close_paren {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_has_closer_stops_at_blank_line() {
        let tokens = tokenize("*a\nb*");
        assert!(has_closer(&tokens, 1, TokenKind::Star));

        let tokens = tokenize("*a\n\nb*");
        assert!(!has_closer(&tokens, 1, TokenKind::Star));
    }

    #[test]
    fn test_has_closer_needs_identical_kind() {
        let tokens = tokenize("**a*");
        assert!(!has_closer(&tokens, 1, TokenKind::DoubleStar));
        assert!(has_closer(&tokens, 1, TokenKind::Star));
    }

    #[test]
    fn test_link_shape() {
        let tokens = tokenize("[text](http://example.com)");
        assert!(is_link_shape(&tokens, 1));

        let tokens = tokenize("[text](unterminated");
        assert!(!is_link_shape(&tokens, 1));

        let tokens = tokenize("[a [b](c)");
        assert!(!is_link_shape(&tokens, 1));

        let tokens = tokenize(r"[a \[b](c)");
        assert!(is_link_shape(&tokens, 1));

        let tokens = tokenize("[a]\n\n(c)");
        assert!(!is_link_shape(&tokens, 1));
    }
}
