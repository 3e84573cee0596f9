//! Error type for configuration operations
//!
//! Sink failures never surface here: a logging call must not be able to crash
//! the caller, so file-open problems degrade to stderr inside the emit path.

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by configuration loading and parsing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or contradictory configuration content.
    #[error("configuration error: {0}")]
    Config(String),

    /// A document node carries both the single `stream` attribute and the
    /// `streams` list.
    #[error("domain `{domain}`: both `stream` and `streams` are specified")]
    ConflictingStreams {
        /// Qualified name of the offending domain node.
        domain: String,
    },

    /// A level name outside the fixed vocabulary.
    #[error("unknown log level `{0}`")]
    UnknownLevel(String),

    /// A stream name outside the fixed vocabulary.
    #[error("unknown stream kind `{0}`")]
    UnknownStream(String),

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Deserializing a logging document failed.
    #[error("malformed logging document: {0}")]
    Document(#[from] serde_json::Error),
}
