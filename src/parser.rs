// Parser module: stack machine over the lexer's token stream
mod config;
mod core;
mod html;
mod lookahead;
mod stack;


pub use config::ParserConfig;
pub use self::core::Parser;
pub use stack::BlockState;

use crate::ast::Document;

/// Parse Markdown using the default parser configuration.
///
/// Parsing is total: malformed markup degrades to text.
pub fn parse(markdown: &str) -> Document {
    Parser::with_defaults(markdown).parse()
}

/// Parse function with custom configuration.
pub fn parse_with_config(markdown: &str, config: ParserConfig) -> Document {
    Parser::new(markdown, config).parse()
}
