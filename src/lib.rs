//! Markdown to document-tree conversion.
//!
//! The pipeline has four stages:
//! 1. **Lexical Analysis:** [`lexer`] splits the input into tokens
//! 2. **Parsing:** [`parser`] runs a stack machine that builds the [`Document`]
//! 3. **DOM:** [`dom`] maps the tree onto HTML elements and collects headings
//! 4. **Code Generation:** [`codegen`] serialises the DOM to an HTML string
//!
//! Parsing is total. Markers that cannot be matched stay in the text, and
//! constructs left open are closed at the next blank line or the end of input.

// Core modules
pub mod ast;
pub mod codegen;
pub mod dom;
pub mod error;
pub mod lexer;
pub mod parser;

// Configuration module for public API
pub mod config;

// Re-export key types for public API
pub use ast::{Document, Element, ElementKind, HtmlDivProps, HtmlImageProps, Node, Visitable, Visitor};
pub use codegen::{HtmlGenerator, HtmlValidator, HtmlWriter, OutputConfig, OutputConfigBuilder};
pub use config::{EngineConfig, EngineConfigBuilder, MarkdownEngine};
pub use dom::{DomBuilder, DomConfig, DomNode, RenderedDom, TableOfContents, TocEntry};
pub use error::{MarkdownError, Result};
pub use lexer::{Lexer, Position, Token, TokenKind};
pub use parser::{Parser, ParserConfig};

/// Parses Markdown text into a document tree.
///
/// Never fails: every input string yields a [`Document`].
///
/// # Examples
///
/// ```
/// use mdtree::{parse_markdown, ElementKind};
///
/// let document = parse_markdown("# Hello, World!");
/// let heading = document.children[0].as_element().unwrap();
/// assert_eq!(heading.kind, ElementKind::Heading(1));
/// ```
pub fn parse_markdown(markdown: &str) -> Document {
    parser::parse(markdown)
}

/// Splits Markdown text into tokens without interpreting them.
pub fn tokenize(markdown: &str) -> Vec<Token<'_>> {
    lexer::tokenize(markdown)
}

/// Converts a Markdown string to an HTML string with the default
/// configuration.
///
/// # Examples
///
/// ```
/// use mdtree::to_html;
///
/// let html = to_html("# Hello, World!");
/// assert_eq!(html, "<h1 id=\"hello-world\">Hello, World!</h1>\n");
/// ```
pub fn to_html(markdown: &str) -> String {
    MarkdownEngine::new().to_html(markdown)
}
