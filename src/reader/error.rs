use thiserror::Error;

#[doc = r#"
A set of errors that can occur while decoding bytes into the midi representation
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Reading at Position {position}, {kind}")]
pub struct ReaderError {
    position: usize,
    pub(crate) kind: ReaderErrorKind,
}

/// A kind of error that a reader can produce
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReaderErrorKind {
    /// Fewer bytes remain than a decode step requires.
    #[error("Truncated stream: needed {requested} bytes, {remaining} remaining")]
    TruncatedStream {
        /// Bytes the decoder asked for
        requested: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },
    /// A chunk did not start with the expected magic.
    #[error("Invalid chunk magic: expected {expected:?}, found {found:?}")]
    InvalidChunkMagic {
        /// `MThd` or `MTrk`
        expected: [u8; 4],
        /// What the file contained
        found: [u8; 4],
    },
    /// The header declares a format other than 0, 1 or 2.
    #[error("Invalid file format {0}")]
    InvalidFormat(u16),
}

impl ReaderError {
    /// Create a reader error from a position and kind
    pub const fn new(position: usize, kind: ReaderErrorKind) -> Self {
        Self { position, kind }
    }
    /// True if the stream ended before a decode step finished
    pub const fn is_truncated(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::TruncatedStream { .. })
    }
    /// True if a chunk magic did not match
    pub const fn is_invalid_magic(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::InvalidChunkMagic { .. })
    }
    /// Returns the error kind of the reader.
    pub fn error_kind(&self) -> &ReaderErrorKind {
        &self.kind
    }
    /// Returns the absolute byte offset where the read error occurred.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Create a new truncated stream error
    pub const fn truncated(position: usize, requested: usize, remaining: usize) -> Self {
        Self {
            position,
            kind: ReaderErrorKind::TruncatedStream {
                requested,
                remaining,
            },
        }
    }

    /// Create a new chunk magic error
    pub const fn invalid_magic(position: usize, expected: [u8; 4], found: [u8; 4]) -> Self {
        Self {
            position,
            kind: ReaderErrorKind::InvalidChunkMagic { expected, found },
        }
    }
}

/// The Read Result type (see [`ReaderError`])
pub type ReadResult<T> = Result<T, ReaderError>;
