/// Error handling module for the Markdown engine.
///
/// Parsing never fails: malformed Markdown degrades to text. These errors
/// cover the surrounding pipeline (configuration, I/O and HTML output).
use thiserror::Error;

/// Main error type for the Markdown engine.
#[derive(Debug, Error)]
pub enum MarkdownError {
    /// Configuration file could not be parsed.
    #[error("Config error: {source}")]
    Config {
        #[from]
        source: toml::de::Error,
    },

    /// HTML generation or validation errors.
    #[error("Generation error: {message}")]
    Generation { message: String },

    /// I/O related errors.
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results in the Markdown engine.
pub type Result<T> = std::result::Result<T, MarkdownError>;

impl MarkdownError {
    /// Creates a new generation error.
    pub fn generation_error(message: impl Into<String>) -> Self {
        MarkdownError::Generation {
            message: message.into(),
        }
    }

    /// Returns true if the error came from reading input or configuration
    /// rather than from producing output.
    pub fn is_input_error(&self) -> bool {
        matches!(self, MarkdownError::Config { .. } | MarkdownError::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_display() {
        let error = MarkdownError::generation_error("unclosed tags");
        assert_eq!(error.to_string(), "Generation error: unclosed tags");
        assert!(!error.is_input_error());
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let markdown_error: MarkdownError = io_error.into();
        assert!(markdown_error.is_input_error());
        assert!(markdown_error.to_string().contains("File not found"));

        let toml_error = toml::from_str::<toml::Table>("key = ").unwrap_err();
        let markdown_error: MarkdownError = toml_error.into();
        assert!(matches!(markdown_error, MarkdownError::Config { .. }));
        assert!(markdown_error.to_string().starts_with("Config error"));
    }
}
