#![doc = r#"
Decode Standard MIDI Files and turn a single track/channel into a list of
discrete notes that a one-voice beeper can play.

# Overview

The crate is split in two layers:

- the decoder ([`reader`], [`event`], [`file`]) which reads `MThd`/`MTrk`
  chunks, variable-length quantities and event payloads byte for byte, and
- the sequencer ([`timing`], [`sequence`]) which walks the decoded events of
  one track, pairs `NOTE_ON`/`NOTE_OFF` by pitch and produces absolute
  millisecond timings.

[`script`] renders a [`Sequence`](sequence::Sequence) into a RouterOS-style
`:beep`/`:delay` script.

# Example
```rust
use midibeep::prelude::*;

// MThd, format 1, one track, 96 pulses per quarter note
let mut bytes = vec![
    b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 1, 0, 96,
];
let track = [
    0x00, // pre-delay
    0x90, 60, 100, 0x83, 0x60, // note on, then 480 pulses
    0x80, 60, 0, 0x00, // note off
    0xFF, 0x2F, 0x00, // end of track
];
bytes.extend_from_slice(b"MTrk");
bytes.extend_from_slice(&(track.len() as u32).to_be_bytes());
bytes.extend_from_slice(&track);

let file = MidiFile::parse(&bytes).unwrap();
let sequence = Sequencer::new(&file, SequenceOptions::default().with_bpm(120))
    .unwrap()
    .run()
    .unwrap();

assert_eq!(sequence.notes().len(), 1);
assert_eq!(sequence.notes()[0].end(), 2500.0);
```

# Limitations

Running status is not supported: every event must carry its own status
byte.
"#]
#![warn(missing_docs)]
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
pub use error::*;

pub mod event;
pub mod file;
pub mod pitch;
pub mod reader;
pub mod script;
pub mod sequence;
pub mod timing;

/// Commonly used types
pub mod prelude {
    pub use crate::{
        Error,
        event::{Command, Event, EventCode, MetaType, SystemCommand},
        file::{
            ChannelNotes, Format, MidiFile, MthdHeader, MtrkChunk, MtrkHeader, TrackSummary,
        },
        pitch::{Key, Octave, Pitch},
        reader::{ReadResult, Reader, ReaderError, ReaderErrorKind, Vlv},
        script::{RenderError, ScriptOptions},
        sequence::{
            Diagnostic, MetaText, Note, Sequence, SequenceError, SequenceOptions, Sequencer,
        },
        timing::{Tempo, TimingConverter, TimingError},
    };
}

/// Placeholder text for missing track metadata.
pub const UNKNOWN_TEXT: &str = "<UNKNOWN>";
