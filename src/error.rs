use thiserror::Error;

/// Errors produced while encoding or decoding bencode.
///
/// Decoding errors record the absolute byte offset at which they were
/// detected, see [`BencodeError::offset`].
#[derive(Debug, Error)]
pub enum BencodeError {
    /// The value has no bencode representation (floats, `char`, unit, ...).
    #[error("unsupported type: {0}")]
    UnsupportedType(&'static str),

    /// A map whose key type is not textual was asked to encode or decode.
    #[error("unsupported dictionary key type: {0}")]
    UnsupportedKeyType(&'static str),

    #[error("malformed integer at byte {offset}: {reason}")]
    MalformedInteger { offset: usize, reason: String },

    #[error("malformed byte string length at byte {offset}")]
    MalformedLength { offset: usize },

    /// A declared length or terminator cannot be satisfied by the remaining input.
    #[error("truncated buffer at byte {offset}")]
    TruncatedBuffer { offset: usize },

    /// A list or dictionary is missing its closing `e`.
    #[error("unterminated container starting at byte {offset}")]
    UnterminatedContainer { offset: usize },

    /// The decoded wire shape does not fit the destination.
    #[error("type mismatch at byte {offset}: expected {expected}, found {found}")]
    TypeMismatch {
        offset: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// More elements were decoded than a fixed-size destination holds.
    #[error("array overflow at byte {offset}: destination holds {capacity} elements, found {found}")]
    ArrayOverflow {
        offset: usize,
        capacity: usize,
        found: usize,
    },

    /// The destination cannot be written through (a shared `Rc`/`Arc`).
    #[error("destination {0} is not a mutable reference")]
    NotAReference(&'static str),

    #[error("unexpected character {found:?} at byte {offset}")]
    UnexpectedChar { offset: usize, found: char },

    #[error("nesting too deep at byte {offset}")]
    NestingTooDeep { offset: usize },

    #[error("trailing data at byte {offset}")]
    TrailingData { offset: usize },

    /// Raised by user-supplied hooks.
    #[error("{0}")]
    Custom(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BencodeError {
    /// Creates a [`BencodeError::Custom`] error from anything printable.
    pub fn custom(msg: impl std::fmt::Display) -> Self {
        BencodeError::Custom(msg.to_string())
    }

    /// Returns the byte offset at which a decoding error was detected.
    ///
    /// Encoding errors, hook errors and I/O errors carry no offset.
    pub fn offset(&self) -> Option<usize> {
        match self {
            BencodeError::MalformedInteger { offset, .. }
            | BencodeError::MalformedLength { offset }
            | BencodeError::TruncatedBuffer { offset }
            | BencodeError::UnterminatedContainer { offset }
            | BencodeError::TypeMismatch { offset, .. }
            | BencodeError::ArrayOverflow { offset, .. }
            | BencodeError::UnexpectedChar { offset, .. }
            | BencodeError::NestingTooDeep { offset }
            | BencodeError::TrailingData { offset } => Some(*offset),
            _ => None,
        }
    }

    /// Moves the reported offset forward by `base` bytes.
    ///
    /// Hooks see a slice that starts at the value they decode, so their
    /// offsets are relative to that slice.
    pub(crate) fn shifted(mut self, base: usize) -> Self {
        match &mut self {
            BencodeError::MalformedInteger { offset, .. }
            | BencodeError::MalformedLength { offset }
            | BencodeError::TruncatedBuffer { offset }
            | BencodeError::UnterminatedContainer { offset }
            | BencodeError::TypeMismatch { offset, .. }
            | BencodeError::ArrayOverflow { offset, .. }
            | BencodeError::UnexpectedChar { offset, .. }
            | BencodeError::NestingTooDeep { offset }
            | BencodeError::TrailingData { offset } => *offset += base,
            _ => {}
        }
        self
    }
}
