use serde::{de, ser};
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during bencode serialization or deserialization.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A custom error message from serde
    #[error("{0}")]
    Message(String),

    /// The value or target shape has no bencode binding
    #[error("unsupported type: {0}")]
    Unsupported(&'static str),

    /// The lookahead byte does not start the production the target requires
    #[error("expected {expected}, found {found:?}")]
    TypeMismatch {
        expected: &'static str,
        found: char,
    },

    /// A byte string's length prefix is empty, non-numeric, or out of range
    #[error("malformed byte string length {0:?}")]
    InvalidLength(String),

    /// An integer payload between `i` and `e` failed to parse
    #[error("malformed integer {0:?}")]
    InvalidInteger(String),

    /// No production starts with this byte
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),

    /// A byte string was decoded into a text target but is not UTF-8
    #[error("byte string is not valid UTF-8")]
    InvalidUtf8,

    /// Containers nested past the decoder's depth limit
    #[error("nesting depth limit exceeded")]
    NestingTooDeep,

    /// The source ran out mid-value
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// The source was exhausted at a clean boundary between values.
    /// Returned by [`Decoder::decode`](crate::Decoder::decode) when no
    /// further document is available; not a failure of any prior value.
    #[error("end of input")]
    Eof,

    /// An I/O error from the underlying sink or source
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true for the clean end-of-stream condition, as opposed to a
    /// truncation mid-value. Useful to terminate a read loop over
    /// back-to-back documents:
    ///
    /// ```rust
    /// use bencode_serde::Decoder;
    ///
    /// let mut dec = Decoder::new(&b"i1ei2ei3e"[..]);
    /// let mut seen = Vec::new();
    /// loop {
    ///     match dec.decode::<i64>() {
    ///         Ok(n) => seen.push(n),
    ///         Err(e) if e.is_eof() => break,
    ///         Err(e) => panic!("{e}"),
    ///     }
    /// }
    /// assert_eq!(seen, [1, 2, 3]);
    /// ```
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Eof)
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
