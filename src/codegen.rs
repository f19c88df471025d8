use crate::dom::DomNode;
use crate::error::{MarkdownError, Result};
use serde::Deserialize;

/// Configuration options for HTML output formatting
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Whether to escape HTML special characters in text and attributes
    pub escape_html: bool,
    /// Whether to include XHTML-style self-closing tags
    pub xhtml_style: bool,
    /// Whether to add newlines after block elements
    pub add_newlines: bool,
    /// Custom DOCTYPE declaration (if any)
    pub doctype: Option<String>,
    /// Whether to wrap output in a document structure
    pub wrap_in_document: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            escape_html: true,
            xhtml_style: true,
            add_newlines: true,
            doctype: None,
            wrap_in_document: false,
        }
    }
}

/// Builder pattern for OutputConfig to make configuration easier
#[derive(Debug, Default)]
pub struct OutputConfigBuilder {
    config: OutputConfig,
}

impl OutputConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable HTML escaping
    pub fn with_html_escaping(mut self, enabled: bool) -> Self {
        self.config.escape_html = enabled;
        self
    }

    /// Enable or disable XHTML-style self-closing tags
    pub fn with_xhtml_style(mut self, enabled: bool) -> Self {
        self.config.xhtml_style = enabled;
        self
    }

    /// Enable or disable newlines after block elements
    pub fn with_newlines(mut self, enabled: bool) -> Self {
        self.config.add_newlines = enabled;
        self
    }

    pub fn with_doctype(mut self, doctype: &str) -> Self {
        self.config.doctype = Some(doctype.to_string());
        self
    }

    /// Enable or disable wrapping output in document structure
    pub fn with_document_wrapper(mut self, enabled: bool) -> Self {
        self.config.wrap_in_document = enabled;
        self
    }

    pub fn build(self) -> OutputConfig {
        self.config
    }
}

/// Low-level HTML writing utilities with escaping
#[derive(Debug)]
pub struct HtmlWriter<'a> {
    buffer: String,
    config: &'a OutputConfig,
}

impl<'a> HtmlWriter<'a> {
    pub fn new(config: &'a OutputConfig) -> Self {
        Self {
            buffer: String::new(),
            config,
        }
    }

    /// Writes an opening tag with attributes
    pub fn write_opening_tag(&mut self, tag: &str, attributes: &[(String, String)]) {
        self.buffer.push('<');
        self.buffer.push_str(tag);
        self.write_attributes(attributes);
        self.buffer.push('>');
    }

    /// Writes a void element such as `<br>` or `<img>`
    pub fn write_self_closing(&mut self, tag: &str, attributes: &[(String, String)]) {
        self.buffer.push('<');
        self.buffer.push_str(tag);
        self.write_attributes(attributes);
        if self.config.xhtml_style {
            self.buffer.push_str(" />");
        } else {
            self.buffer.push('>');
        }
    }

    pub fn write_closing_tag(&mut self, tag: &str) {
        self.buffer.push_str("</");
        self.buffer.push_str(tag);
        self.buffer.push('>');
    }

    /// Writes plain text content with optional escaping
    pub fn write_text(&mut self, text: &str) {
        if self.config.escape_html {
            self.buffer.push_str(&escape_html(text));
        } else {
            self.buffer.push_str(text);
        }
    }

    /// Writes raw HTML content without escaping
    pub fn write_raw(&mut self, html: &str) {
        self.buffer.push_str(html);
    }

    pub fn write_newline_if_enabled(&mut self) {
        if self.config.add_newlines {
            self.buffer.push('\n');
        }
    }

    pub fn into_output(self) -> String {
        self.buffer
    }

    fn write_attributes(&mut self, attributes: &[(String, String)]) {
        for (key, value) in attributes {
            self.buffer.push(' ');
            self.buffer.push_str(key);
            self.buffer.push_str("=\"");
            if self.config.escape_html {
                self.buffer.push_str(&escape_html_attribute(value));
            } else {
                self.buffer.push_str(value);
            }
            self.buffer.push('"');
        }
    }
}

/// Escapes HTML special characters in text content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Escapes HTML special characters in attribute values
pub fn escape_html_attribute(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push_str(&escape_html(c.encode_utf8(&mut [0; 4]))),
        }
    }
    escaped
}

/// Checks if a tag is a void element
pub fn is_self_closing_tag(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "meta")
}

/// Checks if an element is a block-level element
pub fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "blockquote" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "ol" | "p" | "ul"
    )
}

/// Serialises a DOM tree into an HTML string.
#[derive(Debug, Default)]
pub struct HtmlGenerator {
    config: OutputConfig,
}

impl HtmlGenerator {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Generates HTML for the children of `root`, the virtual container
    /// produced by the DOM builder.
    pub fn generate(&self, root: &DomNode) -> String {
        let mut writer = HtmlWriter::new(&self.config);

        if let Some(doctype) = &self.config.doctype {
            writer.write_raw(&format!("<!DOCTYPE {}>\n", doctype));
        }
        if self.config.wrap_in_document {
            writer.write_raw("<html>\n<head>\n<meta charset=\"UTF-8\">\n</head>\n<body>\n");
        }

        for child in &root.children {
            self.render_dom_node(child, &mut writer);
        }

        if self.config.wrap_in_document {
            writer.write_raw("</body>\n</html>\n");
        }

        let html = writer.into_output();
        log::debug!("generated {} bytes of HTML", html.len());
        html
    }

    fn render_dom_node(&self, node: &DomNode, writer: &mut HtmlWriter<'_>) {
        if node.is_text() {
            writer.write_text(node.text.as_deref().unwrap_or_default());
            return;
        }

        if is_self_closing_tag(&node.tag_name) {
            writer.write_self_closing(&node.tag_name, &node.attributes);
            return;
        }

        writer.write_opening_tag(&node.tag_name, &node.attributes);
        for child in &node.children {
            self.render_dom_node(child, writer);
        }
        writer.write_closing_tag(&node.tag_name);

        if is_block_element(&node.tag_name) {
            writer.write_newline_if_enabled();
        }
    }
}

/// Validates HTML output for correctness
pub struct HtmlValidator;

impl HtmlValidator {
    /// Validates that HTML output is well-formed: every opened tag is closed
    /// in order, void elements excepted.
    pub fn validate_well_formed(html: &str) -> Result<()> {
        let mut tag_stack: Vec<String> = Vec::new();
        let mut rest = html;

        while let Some(start) = rest.find('<') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('>') else {
                return Err(MarkdownError::generation_error("unterminated tag"));
            };
            let tag_content = &after[..end];
            rest = &after[end + 1..];

            if tag_content.starts_with('!') {
                continue;
            }
            if let Some(closing) = tag_content.strip_prefix('/') {
                let tag_name = closing.trim();
                match tag_stack.pop() {
                    Some(expected) if expected == tag_name => {}
                    Some(expected) => {
                        return Err(MarkdownError::generation_error(format!(
                            "mismatched closing tag: expected {}, found {}",
                            expected, tag_name
                        )));
                    }
                    None => {
                        return Err(MarkdownError::generation_error(format!(
                            "unexpected closing tag: {}",
                            tag_name
                        )));
                    }
                }
            } else if !tag_content.ends_with('/') {
                let tag_name = tag_content.split_whitespace().next().unwrap_or_default();
                if !is_self_closing_tag(tag_name) {
                    tag_stack.push(tag_name.to_string());
                }
            }
        }

        if !tag_stack.is_empty() {
            return Err(MarkdownError::generation_error(format!(
                "unclosed tags: {:?}",
                tag_stack
            )));
        }
        Ok(())
    }
}

/// Generates HTML from a DOM tree with the default output options.
pub fn generate_html(dom_root: &DomNode) -> String {
    HtmlGenerator::default().generate(dom_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> DomNode {
        DomNode::new("p").with_children(vec![DomNode::text(text)])
    }

    fn root(children: Vec<DomNode>) -> DomNode {
        DomNode::new("div").with_children(children)
    }

    #[test]
    fn test_generate_paragraph() {
        let html = generate_html(&root(vec![paragraph("hi")]));
        assert_eq!(html, "<p>hi</p>\n");
    }

    #[test]
    fn test_text_is_escaped_by_default() {
        let html = generate_html(&root(vec![paragraph("<script>&\"")]));
        assert_eq!(html, "<p>&lt;script&gt;&amp;&quot;</p>\n");
    }

    #[test]
    fn test_escaping_can_be_disabled() {
        let config = OutputConfigBuilder::new().with_html_escaping(false).build();
        let html = HtmlGenerator::new(config).generate(&root(vec![paragraph("<b>")]));
        assert_eq!(html, "<p><b></p>\n");
    }

    #[test]
    fn test_attributes_and_void_elements() {
        let link = DomNode::new("a")
            .with_attribute("href", "x?a=1&b=\"2\"")
            .with_children(vec![DomNode::text("l")]);
        let image = DomNode::new("img").with_attribute("src", "i.png");
        let p = DomNode::new("p").with_children(vec![link, DomNode::new("br"), image]);

        let html = generate_html(&root(vec![p]));
        assert_eq!(
            html,
            "<p><a href=\"x?a=1&amp;b=&quot;2&quot;\">l</a><br /><img src=\"i.png\" /></p>\n"
        );
    }

    #[test]
    fn test_html_style_void_elements() {
        let config = OutputConfigBuilder::new()
            .with_xhtml_style(false)
            .with_newlines(false)
            .build();
        let html = HtmlGenerator::new(config).generate(&root(vec![DomNode::new("br")]));
        assert_eq!(html, "<br>");
    }

    #[test]
    fn test_document_wrapper() {
        let config = OutputConfigBuilder::new()
            .with_doctype("html")
            .with_document_wrapper(true)
            .build();
        let html = HtmlGenerator::new(config).generate(&root(vec![paragraph("x")]));
        assert!(html.starts_with("<!DOCTYPE html>\n<html>"));
        assert!(html.contains("<body>\n<p>x</p>\n</body>"));
        assert!(HtmlValidator::validate_well_formed(&html).is_ok());
    }

    #[test]
    fn test_attribute_escaping() {
        assert_eq!(escape_html_attribute("a\n\"b\""), "a&#10;&quot;b&quot;");
    }

    #[test]
    fn test_validator() {
        assert!(HtmlValidator::validate_well_formed("<p>a<br>b<img src=\"x\" /></p>").is_ok());
        assert!(HtmlValidator::validate_well_formed("<p><em>a</p></em>").is_err());
        assert!(HtmlValidator::validate_well_formed("<p>a").is_err());
        assert!(HtmlValidator::validate_well_formed("a</p>").is_err());
        assert!(HtmlValidator::validate_well_formed("<p").is_err());
    }
}
