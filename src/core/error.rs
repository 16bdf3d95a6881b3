//! Error taxonomy
//!
//! Parse errors are recoverable and carry the file/line they were found at.
//! Load and config errors wrap the underlying I/O or JSON failure.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// File name and 1-based line number of a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl Location {
    pub fn new(file: &str, line: usize) -> Self {
        Location {
            file: file.to_string(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line #{}", self.file, self.line)
    }
}

/// Half of a rule row a term was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Block {
    Match,
    Replace,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Match => f.write_str("match"),
            Block::Replace => f.write_str("replacement"),
        }
    }
}

/// Problems found while reading a rule file.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("{at} - Couldn't create rule: row #{row} has {found} terms (need 10 total, 5 match + 5 replace)")]
    TermCount { at: Location, row: usize, found: usize },

    #[error("{at} - Couldn't create rule: unknown symbol '{symbol}'")]
    UnknownSymbol { at: Location, symbol: char },

    #[error("{at} - Couldn't create rule: '{text}' looks like a color, colors are written as '#' followed by exactly 6 hex characters")]
    MalformedColor { at: Location, text: String },

    #[error("{at} - Couldn't create rule: unknown {block} term syntax '{text}' (term #{column}, rule row #{row})")]
    UnknownTerm {
        at: Location,
        block: Block,
        text: String,
        row: usize,
        column: usize,
    },

    #[error("{at} - Couldn't create rule: unterminated term '{text}'")]
    Unterminated { at: Location, text: String },

    #[error("{at} - Couldn't create rule: '{text}' does not fit in -128..=127")]
    NumberOutOfRange { at: Location, text: String },

    #[error("{at} - Couldn't create rule: invalid probability '{text}'")]
    InvalidProbability { at: Location, text: String },

    #[error("{at} - Unable to parse line, did you intend to write a symbol => definition? Symbols can only be 1 character")]
    UnparsedLine { at: Location },

    #[error("{at} - Couldn't create rule: end of file before end of rule")]
    UnexpectedEof { at: Location },
}

impl ParseError {
    pub fn location(&self) -> &Location {
        match self {
            ParseError::TermCount { at, .. }
            | ParseError::UnknownSymbol { at, .. }
            | ParseError::MalformedColor { at, .. }
            | ParseError::UnknownTerm { at, .. }
            | ParseError::Unterminated { at, .. }
            | ParseError::NumberOutOfRange { at, .. }
            | ParseError::InvalidProbability { at, .. }
            | ParseError::UnparsedLine { at }
            | ParseError::UnexpectedEof { at } => at,
        }
    }

    /// Fatal for the file it occurred in; everything else only skips a line or rule.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParseError::UnexpectedEof { .. })
    }
}

/// Failures reading rule sources from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read rule directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read rule file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reading or validating the engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Failures building an engine from configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),
}
