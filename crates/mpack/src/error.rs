//! Error types for pack/unpack operations.

use std::io;

use thiserror::Error;

/// Broad classification of an [`Error`].
///
/// `Stream` errors come from the byte source or sink and may succeed on a
/// retry of the underlying transport. `Format` errors mean the payload itself
/// is malformed or unsupported and should be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Stream,
    Format,
}

/// Error type for pack/unpack operations.
#[derive(Debug, Error)]
pub enum Error {
    // Stream errors
    /// The source ended before a declared header or payload was complete.
    #[error("truncated stream: unexpected end of input")]
    TruncatedStream,
    /// The source or sink failed for a reason other than end of input.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    // Format errors
    /// The leading byte does not belong to any supported value type.
    #[error("unrecognized leading byte {0:#04x}")]
    UnrecognizedTag(u8),
    /// A type-specific unpacker was handed a byte outside its tag set.
    #[error("expected {expected} tag, found {found:#04x}")]
    InvalidFixedTag { expected: &'static str, found: u8 },
    /// String payload is not valid UTF-8.
    #[error("invalid UTF-8 in str payload")]
    InvalidUtf8,
    /// A uint64 payload does not fit the signed 64-bit integer model.
    #[error("uint64 value {0} exceeds i64::MAX")]
    IntegerOverflow(u64),
    /// Container nesting exceeded the reader's depth limit.
    #[error("max nesting depth {0} exceeded")]
    MaxDepthExceeded(usize),
    /// A complete value was decoded but input bytes remain.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    /// A length or count does not fit a 32-bit length field.
    #[error("length {0} exceeds the 32-bit length field")]
    LengthOverflow(usize),
}

impl Error {
    /// Classify this error as a stream or a format problem.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TruncatedStream | Error::Io(_) => ErrorKind::Stream,
            Error::UnrecognizedTag(_)
            | Error::InvalidFixedTag { .. }
            | Error::InvalidUtf8
            | Error::IntegerOverflow(_)
            | Error::MaxDepthExceeded(_)
            | Error::TrailingBytes(_)
            | Error::LengthOverflow(_) => ErrorKind::Format,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::TruncatedStream
        } else {
            Error::Io(e)
        }
    }
}

/// Result type alias for pack/unpack operations.
pub type Result<T> = std::result::Result<T, Error>;
