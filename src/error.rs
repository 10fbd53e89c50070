use crate::{reader::ReaderError, script::RenderError, sequence::SequenceError};
use thiserror::Error;

/// Any error produced while turning a MIDI file into a script.
///
/// Wraps the per-layer errors so `?` propagates across them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The byte stream could not be decoded
    #[error(transparent)]
    Reader(#[from] ReaderError),
    /// The decoded track could not be sequenced
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    /// The sequence could not be rendered
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result alias over [`enum@Error`]
pub type Result<T> = core::result::Result<T, Error>;
