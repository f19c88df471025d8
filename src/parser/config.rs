use serde::Deserialize;

/// Configuration for the parser behavior and options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParserConfig {
    /// Whether the `<br>`, `<div>` and `<img>` allow-list is recognised.
    /// When false every `<` is literal text.
    pub allow_html: bool,
    /// Most elements that may be open at once. Openers past this depth
    /// are kept as text, which bounds the depth of the finished tree.
    pub max_nesting: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            allow_html: true,
            max_nesting: 64,
        }
    }
}
