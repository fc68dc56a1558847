use std::fmt;

use crate::types::SourceSpan;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRange,
    InvalidLogicShape,
    OutOfMemory,
    UnresolvedRequiredReference,
    MalformedTemplate,
    Parse,
    Database,
    Io,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidRange => "INVALID_RANGE",
            Self::InvalidLogicShape => "INVALID_LOGIC_SHAPE",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::UnresolvedRequiredReference => "UNRESOLVED_REQUIRED_REFERENCE",
            Self::MalformedTemplate => "MALFORMED_TEMPLATE",
            Self::Parse => "PARSE_ERROR",
            Self::Database => "DATABASE_ERROR",
            Self::Io => "IO_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ScriptDescError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl ScriptDescError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(kind: ErrorKind, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            kind,
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn invalid_range(min: i64, max: i64) -> Self {
        Self::new(
            ErrorKind::InvalidRange,
            format!("Interval minimum {} exceeds maximum {}.", min, max),
        )
    }

    pub fn out_of_memory(what: &str) -> Self {
        Self::new(
            ErrorKind::OutOfMemory,
            format!("Allocation failed while growing {}.", what),
        )
    }
}
