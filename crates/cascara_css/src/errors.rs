use cascara_shared::byte_stream::Location;
use serde::Serialize;
use thiserror::Error;

/// Broad category of a parse problem
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Unterminated string, comment or url, invalid escape, control character in an identifier
    Tokenization,
    /// Unexpected token, unbalanced block, missing component
    Syntax,
    /// A value that was parsed but is out of its usual range
    Value,
    /// Use of a legacy compatibility hack
    Compat,
    /// Unknown namespace prefix or misplaced namespace rule
    Namespace,
    /// Duplicate selector in a selector list
    Duplicate,
}

/// Parser error that defines an error (message) on the given position
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    /// Error message
    pub message: String,
    pub kind: ErrorKind,
    /// Line number, starting with 1
    pub line: usize,
    /// Column number, starting with 1
    pub column: usize,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            kind,
            line: location.line,
            column: location.column,
        }
    }

    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self::new(ErrorKind::Syntax, message, location)
    }
}

#[derive(Debug, Error)]
pub enum CssError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl CssError {
    /// Returns the parse error, if this is one
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            CssError::Parse(e) => Some(e),
            CssError::Io(_) => None,
        }
    }
}

pub type CssResult<T> = Result<T, CssError>;

/// Result used inside the grammar
pub type ParseResult<T> = Result<T, ParseError>;
