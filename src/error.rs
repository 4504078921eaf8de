//! Error types for the mathmode library.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Evaluation halted: {0}")]
    Halt(#[from] Halt),
}

impl Error {
    /// Whether this error aborted the whole evaluation.
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt(_))
    }
}

/// Errors that occur during parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid front matter: {0}")]
    FrontMatter(String),

    #[error("Invalid math options at line {line}: {message}")]
    Options { line: usize, message: String },

    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Errors reported by a math backend.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Math rendering error: {0}")]
    Math(String),

    #[error("Too many expansions: an infinite loop or deeply nested macros (limit {0})")]
    TooManyExpansions(usize),

    #[error("Untrusted command: {0}")]
    Untrusted(String),

    #[error("Strict mode: {0}")]
    Strict(String),
}

/// A non-recoverable render failure that stops the whole evaluation.
#[derive(Debug, Error)]
#[error("could not render math `{input}`: {reason}")]
pub struct Halt {
    /// The backend's description of the failure.
    pub reason: String,
    /// The exact markup handed to the backend.
    pub input: String,
}
