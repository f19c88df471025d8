use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use mdtree::{EngineConfig, MarkdownEngine, MarkdownError};

#[derive(Parser)]
#[command(name = "mdtree")]
#[command(author, version)]
#[command(about = "Convert Markdown into a document tree, HTML or JSON")]
#[command(after_help = "\
EXAMPLES:

    # Render a file to HTML
    mdtree README.md

    # Inspect the parsed tree from stdin
    cat notes.md | mdtree --format tree

    # Full HTML page with a custom config
    mdtree --standalone --config mdtree.toml notes.md")]
struct Cli {
    /// Markdown file to read; stdin when omitted
    file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wrap HTML output in a complete document
    #[arg(long)]
    standalone: bool,

    /// Emit text and attribute values without HTML escaping
    #[arg(long)]
    no_escape: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// HTML fragment (or page with --standalone)
    Html,
    /// The document tree as JSON
    Json,
    /// Indented tree dump
    Tree,
    /// Text content only
    Text,
    /// Table of contents as JSON
    Toc,
    /// Lexer tokens, one per line
    Tokens,
}

fn read_all(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> mdtree::Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| MarkdownError::generation_error(format!("JSON output failed: {e}")))
}

fn main() -> mdtree::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => {
            log::debug!("Using default config");
            EngineConfig::default()
        }
    };
    if cli.standalone {
        config.output.wrap_in_document = true;
        config.output.doctype.get_or_insert_with(|| "html".to_string());
    }
    if cli.no_escape {
        config.output.escape_html = false;
    }

    let input = read_all(cli.file.as_ref())?;
    let engine = MarkdownEngine::with_config(config);

    let output = match cli.format {
        Format::Html => engine.to_html(&input),
        Format::Json => to_json(&engine.parse(&input))?,
        Format::Tree => engine.parse(&input).to_string(),
        Format::Text => engine.parse(&input).plain_text(),
        Format::Toc => to_json(&engine.to_dom(&input).toc)?,
        Format::Tokens => mdtree::tokenize(&input)
            .iter()
            .map(|token| {
                format!(
                    "{}:{}\t{:?}\t{:?}\n",
                    token.position.line, token.position.column, token.kind, token.raw
                )
            })
            .collect(),
    };

    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
