use std::path::PathBuf;

use crate::trigger::TimestampError;

/// Errors raised while compiling trigger rules.
///
/// Every variant produced by a rule line carries the 1-based line number and
/// the line text so the user can find the offending rule.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("line {line}: unknown trigger type `{kind}` in `{content}`")]
    UnknownType {
        line: usize,
        content: String,
        kind: String,
    },

    #[error("line {line}: {kind} takes {expected} argument(s), found {found} in `{content}`")]
    Arity {
        line: usize,
        content: String,
        kind: String,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: undefined trigger `{name}` referenced in `{content}`")]
    UndefinedReference {
        line: usize,
        content: String,
        name: String,
    },

    #[error("line {line}: trigger `{name}` is already defined, in `{content}`")]
    DuplicateName {
        line: usize,
        content: String,
        name: String,
    },

    #[error("line {line}: missing trigger name in `{content}`")]
    EmptyName { line: usize, content: String },

    #[error("line {line}: ADD lists no trigger names in `{content}`")]
    EmptyAdd { line: usize, content: String },

    #[error("line {line}: invalid timestamp `{value}` in `{content}`: {source}")]
    InvalidTimestamp {
        line: usize,
        content: String,
        value: String,
        source: TimestampError,
    },

    #[error("Failed to read rules file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        source: Box<RuleError>,
    },
}

impl RuleError {
    /// Line number of the offending rule, if the error came from one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnknownType { line, .. }
            | Self::Arity { line, .. }
            | Self::UndefinedReference { line, .. }
            | Self::DuplicateName { line, .. }
            | Self::EmptyName { line, .. }
            | Self::EmptyAdd { line, .. }
            | Self::InvalidTimestamp { line, .. } => Some(*line),
            Self::Io { .. } => None,
            Self::InFile { source, .. } => source.line(),
        }
    }

    /// The error without the file it was read from.
    pub fn without_file(&self) -> &RuleError {
        match self {
            Self::InFile { source, .. } => source.without_file(),
            other => other,
        }
    }

    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Io { .. } | Self::InFile { .. } => self,
            other => Self::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}
