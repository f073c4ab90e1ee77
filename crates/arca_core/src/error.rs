//! Error taxonomy for the reconciliation core.
//!
//! # Responsibility
//! - Classify every failure into one stable `ErrorKind`.
//! - Carry row/field/operation context from the point of failure outward.
//!
//! # Invariants
//! - `kind` is fixed at construction; wrapping only adds context.
//! - Context is rendered outermost first, ending with the root cause.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

/// Failure classes surfaced by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Cell or column is legitimately empty.
    NoData,
    /// Malformed value, empty where required, or empty upload payload.
    Invalid,
    /// Reference resolution miss.
    NotFound,
    /// Referenced collection has not been loaded.
    Unavailable,
    /// Tabular source transport or storage failure.
    Source,
    /// JSON encoding failure at the serialization boundary.
    Encoding,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoData => "no data",
            Self::Invalid => "invalid",
            Self::NotFound => "not found",
            Self::Unavailable => "unavailable",
            Self::Source => "source failure",
            Self::Encoding => "encoding failure",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error with kind, context stack and optional cause.
#[derive(Debug)]
pub struct CoreError {
    kind: ErrorKind,
    // innermost first
    context: Vec<String>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl CoreError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: Vec::new(),
            source: None,
        }
    }

    /// Creates an error caused by a lower-level failure.
    ///
    /// The cause's message replaces the kind label at the end of `Display`.
    pub fn with_source<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            kind,
            context: Vec::new(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Wraps this error with one more (outer) context message.
    pub fn context(mut self, message: impl Into<String>) -> Self {
        self.context.push(message.into());
        self
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for message in self.context.iter().rev() {
            write!(f, "{message}: ")?;
        }
        match &self.source {
            Some(source) => write!(f, "{source}"),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}

/// Context helpers for `CoreResult`.
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> CoreResult<T>;

    fn with_context<F>(self, message: F) -> CoreResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for CoreResult<T> {
    fn context(self, message: impl Into<String>) -> CoreResult<T> {
        self.map_err(|err| err.context(message))
    }

    fn with_context<F>(self, message: F) -> CoreResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| err.context(message()))
    }
}
