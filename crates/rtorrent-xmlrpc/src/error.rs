//! Error taxonomy for encoding, decoding and transporting XML-RPC calls.

use thiserror::Error;

use crate::value::ValueKind;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for XML-RPC operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The document is not well-formed markup.
    #[error("malformed XML: {0}")]
    Parse(String),

    /// The markup is well-formed but does not follow the XML-RPC grammar.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The input ended before the document was complete.
    #[error("incomplete input: document ended unexpectedly")]
    IncompleteInput,

    /// A value was extracted as a type it does not hold.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        /// The type the caller asked for.
        expected: ValueKind,
        /// The type the value actually holds.
        actual: ValueKind,
    },

    /// The server answered with a fault document.
    #[error("remote fault {code}: {message}")]
    RemoteFault {
        /// Fault code reported by the server.
        code: i32,
        /// Fault message reported by the server.
        message: String,
    },

    /// The endpoint address could not be parsed.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Connection, TLS, timeout or body transfer failure.
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the credentials.
    #[error("authentication required")]
    Unauthorized,

    /// The server answered with a non-success HTTP status.
    #[error("unexpected HTTP status {0}")]
    Http(u16),
}

impl Error {
    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        use quick_xml::errors::{IllFormedError, SyntaxError};

        match err {
            // Every other syntax error means the input stopped inside markup.
            quick_xml::Error::Syntax(SyntaxError::InvalidBangMarkup) => Self::Parse(err.to_string()),
            quick_xml::Error::Syntax(_) => Self::IncompleteInput,
            quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(_)) => Self::IncompleteInput,
            other => Self::Parse(other.to_string()),
        }
    }
}
