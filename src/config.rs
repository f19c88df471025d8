/// Configuration module for the Markdown engine public API.
///
/// This module provides the configuration structs, their TOML loading, and
/// the MarkdownEngine that runs the parse, DOM and HTML stages in sequence.
use crate::ast::Document;
use crate::codegen::{HtmlGenerator, HtmlValidator, OutputConfig};
use crate::dom::{DomBuilder, DomConfig, RenderedDom};
use crate::error::Result;
use crate::parser::{Parser, ParserConfig};
use serde::Deserialize;
use std::path::Path;

/// Main configuration struct for the Markdown engine.
///
/// Every section is optional in TOML; missing keys keep their defaults.
///
/// ```toml
/// [parser]
/// allow-html = false
///
/// [dom]
/// heading-ids = true
/// link-target = "_self"
///
/// [output]
/// escape-html = true
/// wrap-in-document = true
/// doctype = "html"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Parser configuration
    pub parser: ParserConfig,
    /// DOM transformation configuration
    pub dom: DomConfig,
    /// HTML output configuration
    pub output: OutputConfig,
}

impl EngineConfig {
    /// Creates a builder for configuring the engine.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        log::debug!("Reading config from: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Builder for EngineConfig to provide a fluent configuration API.
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parser configuration.
    pub fn parser(mut self, parser_config: ParserConfig) -> Self {
        self.config.parser = parser_config;
        self
    }

    /// Sets the DOM configuration.
    pub fn dom(mut self, dom_config: DomConfig) -> Self {
        self.config.dom = dom_config;
        self
    }

    /// Sets the HTML output configuration.
    pub fn output(mut self, output_config: OutputConfig) -> Self {
        self.config.output = output_config;
        self
    }

    /// Enables or disables the `<br>`/`<div>`/`<img>` passthrough.
    pub fn allow_html(mut self, enabled: bool) -> Self {
        self.config.parser.allow_html = enabled;
        self
    }

    pub fn heading_ids(mut self, enabled: bool) -> Self {
        self.config.dom.heading_ids = enabled;
        self
    }

    /// Sets the `target` attribute for links, or removes it with `None`.
    pub fn link_target(mut self, target: Option<&str>) -> Self {
        self.config.dom.link_target = target.map(str::to_string);
        self
    }

    /// Sets HTML escaping mode.
    pub fn escape_html(mut self, enabled: bool) -> Self {
        self.config.output.escape_html = enabled;
        self
    }

    /// Wraps the output in a complete HTML5 document.
    pub fn standalone(mut self, enabled: bool) -> Self {
        self.config.output.wrap_in_document = enabled;
        self.config.output.doctype = enabled.then(|| "html".to_string());
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> EngineConfig {
        self.config
    }
}

/// Main Markdown engine with a configurable processing pipeline.
///
/// Parsing is total, so the main conversions return plain values; only
/// validation can fail.
#[derive(Debug, Default)]
pub struct MarkdownEngine {
    config: EngineConfig,
}

impl MarkdownEngine {
    /// Creates a new Markdown engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new Markdown engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Creates a builder for configuring the engine.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Returns a reference to the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses Markdown into a document tree.
    pub fn parse(&self, markdown: &str) -> Document {
        Parser::new(markdown, self.config.parser.clone()).parse()
    }

    /// Parses Markdown and converts it to a DOM tree with its table of
    /// contents.
    pub fn to_dom(&self, markdown: &str) -> RenderedDom {
        let document = self.parse(markdown);
        DomBuilder::new(self.config.dom.clone()).build(&document)
    }

    /// Parses Markdown text and returns HTML output.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdtree::MarkdownEngine;
    ///
    /// let engine = MarkdownEngine::new();
    /// let html = engine.to_html("# Hello, World!");
    /// assert!(html.contains("<h1"));
    /// ```
    pub fn to_html(&self, markdown: &str) -> String {
        let rendered = self.to_dom(markdown);
        HtmlGenerator::new(self.config.output.clone()).generate(&rendered.root)
    }

    /// Like [`MarkdownEngine::to_html`], but checks that the output is
    /// well-formed.
    pub fn to_validated_html(&self, markdown: &str) -> Result<String> {
        let html = self.to_html(markdown);
        HtmlValidator::validate_well_formed(&html)?;
        Ok(html)
    }
}
