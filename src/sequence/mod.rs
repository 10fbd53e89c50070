#![doc = r#"
Turning one track/channel of a [`MidiFile`](crate::file::MidiFile) into
timed notes.

The [`Sequencer`] walks the events of the selected track in order, keeps a
running clock in milliseconds, and pairs each `NOTE_ON` with the next
`NOTE_OFF` of the same pitch. A `NOTE_ON` for a pitch that is already
sounding does not start a new note; it is reported as a
[`Diagnostic::OverlappingNote`] instead.

Once the track is done, the number of `NOTE_ON` and `NOTE_OFF` events that
were paired must match and no note may still be open, otherwise the track is
rejected with [`SequenceError::UnbalancedNoteEvents`].
"#]

mod options;
pub use options::*;

mod sequencer;
pub use sequencer::*;

use crate::{event::MetaType, pitch::Pitch, timing::TimingError};
use alloc::{string::String, vec::Vec};
use thiserror::Error;

/// Errors that abort sequencing of a track
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// The tempo or division cannot be used
    #[error(transparent)]
    Timing(#[from] TimingError),
    /// Some notes were never released, or released without being started
    #[error("Unbalanced note events: {note_on} note on, {note_off} note off")]
    UnbalancedNoteEvents {
        /// Paired `NOTE_ON` events
        note_on: u64,
        /// Paired `NOTE_OFF` events
        note_off: u64,
    },
    /// A note event whose pitch code has no frequency
    #[error("Pitch code {0} is outside the frequency table")]
    PitchOutOfRange(u8),
    /// The requested track does not exist
    #[error("Track {index} requested, file has {count}")]
    TrackOutOfRange {
        /// Requested index
        index: usize,
        /// Tracks in the file
        count: usize,
    },
}

/// A non-fatal observation made while sequencing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Diagnostic {
    /// A `NOTE_ON` arrived for a pitch that was still sounding. It was
    /// dropped, and so is the `NOTE_OFF` that releases it.
    OverlappingNote {
        /// Pitch of the note
        pitch: Pitch,
        /// Channel of the note
        channel: u8,
        /// When the second `NOTE_ON` arrived
        at_ms: f64,
    },
}

/// One sounding note
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    pitch: Pitch,
    velocity: u8,
    channel: u8,
    start: f64,
    end: f64,
}

impl Note {
    /// A note that has started but not ended
    pub const fn new(pitch: Pitch, velocity: u8, channel: u8, start: f64) -> Self {
        Self {
            pitch,
            velocity,
            channel,
            start,
            end: 0.0,
        }
    }

    /// A note with both ends known
    pub const fn closed(pitch: Pitch, velocity: u8, channel: u8, start: f64, end: f64) -> Self {
        Self {
            pitch,
            velocity,
            channel,
            start,
            end,
        }
    }

    pub(crate) fn close(&mut self, end: f64) {
        self.end = end;
    }

    /// The pitch
    pub const fn pitch(&self) -> Pitch {
        self.pitch
    }

    /// Velocity of the `NOTE_ON`
    pub const fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Channel of the note
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Start, in milliseconds from the start of the track
    pub const fn start(&self) -> f64 {
        self.start
    }

    /// End, in milliseconds from the start of the track
    pub const fn end(&self) -> f64 {
        self.end
    }

    /// `end - start`
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Text carried by a meta event, with the time it occurs at
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetaText {
    /// Which kind of text
    pub kind: MetaType,
    /// Milliseconds from the start of the track
    pub at_ms: f64,
    /// The text
    pub text: String,
}

#[doc = r#"
The notes of one track/channel with their timing and the track's metadata.

A `Sequence` owns everything it holds and does not borrow from the file it
was made from.
"#]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sequence {
    pub(crate) notes: Vec<Note>,
    pub(crate) track: usize,
    pub(crate) channel: u8,
    pub(crate) track_name: String,
    pub(crate) instrument_name: String,
    pub(crate) copyright: String,
    pub(crate) bpm: u32,
    pub(crate) ppqn: u16,
    pub(crate) ms_per_pulse: f64,
    pub(crate) length_ms: f64,
    pub(crate) note_on: u64,
    pub(crate) note_off: u64,
    pub(crate) texts: Vec<MetaText>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Sequence {
    /// Closed notes ordered by start time
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Index of the source track
    pub const fn track(&self) -> usize {
        self.track
    }

    /// Channel the notes were taken from
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Track name or [`UNKNOWN_TEXT`](crate::UNKNOWN_TEXT)
    pub fn track_name(&self) -> &str {
        &self.track_name
    }

    /// Instrument name or [`UNKNOWN_TEXT`](crate::UNKNOWN_TEXT)
    pub fn instrument_name(&self) -> &str {
        &self.instrument_name
    }

    /// Copyright notice or [`UNKNOWN_TEXT`](crate::UNKNOWN_TEXT)
    pub fn copyright(&self) -> &str {
        &self.copyright
    }

    /// Tempo used for the conversion
    pub const fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Pulses per quarter note of the file
    pub const fn ppqn(&self) -> u16 {
        self.ppqn
    }

    /// Duration of one pulse in milliseconds
    pub const fn ms_per_pulse(&self) -> f64 {
        self.ms_per_pulse
    }

    /// Pre-delay plus every event delay, in milliseconds
    pub const fn length_ms(&self) -> f64 {
        self.length_ms
    }

    /// Paired `NOTE_ON` events
    pub const fn note_on_count(&self) -> u64 {
        self.note_on
    }

    /// Paired `NOTE_OFF` events
    pub const fn note_off_count(&self) -> u64 {
        self.note_off
    }

    /// Text, lyric, marker and cue point events of the track
    pub fn texts(&self) -> &[MetaText] {
        &self.texts
    }

    /// Everything odd that was seen but did not abort sequencing
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[test]
fn note_accessors() {
    use pretty_assertions::assert_eq;
    let mut note = Note::new(Pitch::new(60), 100, 0, 250.0);
    assert_eq!(note.end(), 0.0);
    note.close(750.0);
    assert_eq!(note.duration(), 500.0);
    assert_eq!(note, Note::closed(Pitch::new(60), 100, 0, 250.0, 750.0));
}
