//! Export failure taxonomy.
//!
//! Every failure aborts the artifact it belongs to; nothing is emitted
//! partially. Failures are stored on cache entries and raised again when a
//! dependent document is assembled, so the error type is `Clone`.

use thiserror::Error;

/// Result alias used across the exporter.
pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// A concrete value has no term encoding.
    #[error("{0}")]
    UnsupportedValue(String),

    /// A stamp outside the encodable set, or a float stamp while float
    /// encoding is disabled.
    #[error("unhandled stamp: {0}")]
    UnsupportedStamp(String),

    /// A node class with no encoding, or one rejected by the allow-list.
    #[error("{0}")]
    UnsupportedNodeVariant(String),

    /// A call site whose target has no implementation on any instantiated type.
    #[error("no implementations found for {0}")]
    UnresolvedCallTarget(String),

    /// A required edge is missing or the graph was never built.
    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    /// No graph could be obtained for a method that must be exported.
    #[error("no graph available for {0}")]
    MissingGraph(String),

    #[error("failed to write {path}: {message}")]
    Io { path: String, message: String },
}

impl ExportError {
    pub fn unsupported_value(message: impl Into<String>) -> Self {
        ExportError::UnsupportedValue(message.into())
    }

    pub fn unsupported_node(message: impl Into<String>) -> Self {
        ExportError::UnsupportedNodeVariant(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ExportError::MalformedGraph(message.into())
    }

    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Short category name, used in debug logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::UnsupportedValue(_) => "UnsupportedValue",
            ExportError::UnsupportedStamp(_) => "UnsupportedStamp",
            ExportError::UnsupportedNodeVariant(_) => "UnsupportedNodeVariant",
            ExportError::UnresolvedCallTarget(_) => "UnresolvedCallTarget",
            ExportError::MalformedGraph(_) => "MalformedGraph",
            ExportError::MissingGraph(_) => "MissingGraph",
            ExportError::Io { .. } => "Io",
        }
    }
}
