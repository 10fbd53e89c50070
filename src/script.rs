#![doc = r#"
Rendering a [`Sequence`] as a RouterOS beeper script.

```text
#----------------File Description-----------------#
# ...
#-------------------------------------------------#

:beep frequency=261.625565 length=500.000000ms;
:delay 500.000000ms;
:beep frequency=293.664768 length=250.000000ms;
:delay 250.000000ms;
```

Each note becomes one `:beep`. `:beep` does not block, so the script
sleeps with `:delay` until the next note starts, and after the last note
until every note has ended.
"#]

use crate::{
    pitch::{NOTES_IN_OCTAVE, Pitch},
    sequence::Sequence,
};
use alloc::string::String;
use core::fmt::{self, Write};
use thiserror::Error;

/// Errors from rendering a script
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Shifting a note moved it outside the frequency table
    #[error("Pitch {pitch} shifted by {shift} semitones is outside the frequency table")]
    PitchOutOfRange {
        /// The pitch code in the sequence
        pitch: u8,
        /// Total shift in semitones
        shift: i64,
    },
    /// The output sink refused a write
    #[error("Failed to write script")]
    Write(#[from] fmt::Error),
}

/// How to render a script
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptOptions {
    /// Shown in the header, usually the path of the MIDI file
    pub source_name: String,
    /// Whole octaves to shift every note by
    pub octave_shift: i32,
    /// Semitones to shift every note by
    pub note_shift: i32,
    /// Hz added to every frequency
    pub fine_tuning: f64,
    /// Append the note name and start time to every `:beep`
    pub comments: bool,
}

impl ScriptOptions {
    /// Total shift in semitones. Cannot overflow in `i64`.
    fn shift(&self) -> i64 {
        i64::from(self.octave_shift) * i64::from(NOTES_IN_OCTAVE) + i64::from(self.note_shift)
    }
}

/// Render the whole script into a string
pub fn render(sequence: &Sequence, options: &ScriptOptions) -> Result<String, RenderError> {
    let mut out = String::new();
    write_script(&mut out, sequence, options)?;
    Ok(out)
}

/// Render the whole script into any [`fmt::Write`] sink
pub fn write_script<W: Write>(
    out: &mut W,
    sequence: &Sequence,
    options: &ScriptOptions,
) -> Result<(), RenderError> {
    write_header(out, sequence, options)?;

    let shift = options.shift();
    let mut cursor = 0.0;
    for note in sequence.notes() {
        let pitch = i32::try_from(shift)
            .ok()
            .and_then(|shift| note.pitch().shifted(shift))
            .ok_or(RenderError::PitchOutOfRange {
                pitch: note.pitch().code(),
                shift,
            })?;
        // in the table by construction of `shifted`
        let freq = pitch.frequency().unwrap_or_default() + options.fine_tuning;

        if note.start() > cursor {
            writeln!(out, ":delay {:.6}ms;", note.start() - cursor)?;
            cursor = note.start();
        }
        write!(
            out,
            ":beep frequency={:.6} length={:.6}ms;",
            freq,
            note.duration()
        )?;
        if options.comments {
            write_comment(out, pitch, note.start(), options.fine_tuning)?;
        }
        writeln!(out)?;
    }

    let end = sequence
        .notes()
        .iter()
        .map(|note| note.end())
        .fold(cursor, f64::max);
    if end > cursor {
        writeln!(out, ":delay {:.6}ms;", end - cursor)?;
    }
    Ok(())
}

fn write_header<W: Write>(
    out: &mut W,
    sequence: &Sequence,
    options: &ScriptOptions,
) -> fmt::Result {
    writeln!(out, "#----------------File Description-----------------#")?;
    writeln!(out, "# This file was generated by midibeep")?;
    writeln!(out, "# Source: {}", options.source_name)?;
    writeln!(out, "# Milliseconds per pulse: {:.6}", sequence.ms_per_pulse())?;
    writeln!(out, "# Track index: {}", sequence.track())?;
    writeln!(out, "# MIDI Channel: {}", sequence.channel())?;
    writeln!(out, "# Track BPM: {}", sequence.bpm())?;
    writeln!(out, "# Number of notes: {}", sequence.notes().len())?;
    writeln!(
        out,
        "# Track length: {} HH:MM:SS:MS",
        TimeText(sequence.length_ms())
    )?;
    writeln!(out, "# Track name: {}", sequence.track_name())?;
    writeln!(out, "# Instrument name: {}", sequence.instrument_name())?;
    writeln!(out, "# Track copyright: {}", sequence.copyright())?;
    writeln!(out, "#-------------------------------------------------#")?;
    writeln!(out)
}

fn write_comment<W: Write>(out: &mut W, pitch: Pitch, at_ms: f64, fine_tuning: f64) -> fmt::Result {
    write!(out, " # {pitch}")?;
    if fine_tuning != 0.0 {
        write!(out, " {fine_tuning:+.3}Hz")?;
    }
    write!(out, " @ {}", TimeText(at_ms))
}

/// Milliseconds shown as `HH:MM:SS:MS`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeText(pub f64);

impl fmt::Display for TimeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0 as u64;
        write!(
            f,
            "{:02}:{:02}:{:02}:{:03}",
            (ms / 3_600_000) % 24,
            (ms / 60_000) % 60,
            (ms / 1_000) % 60,
            ms % 1_000
        )
    }
}

#[cfg(test)]
use crate::sequence::Note;
#[cfg(test)]
use alloc::{string::ToString, vec, vec::Vec};
#[cfg(test)]
use pretty_assertions::assert_eq;

#[cfg(test)]
fn sequence(notes: Vec<Note>) -> Sequence {
    let length_ms = notes.last().map(|n| n.end()).unwrap_or(0.0);
    Sequence {
        note_on: notes.len() as u64,
        note_off: notes.len() as u64,
        notes,
        track: 1,
        channel: 0,
        track_name: String::from("Lead"),
        instrument_name: String::from("<UNKNOWN>"),
        copyright: String::from("<UNKNOWN>"),
        bpm: 120,
        ppqn: 96,
        ms_per_pulse: 60_000.0 / (120.0 * 96.0),
        length_ms,
        texts: Vec::new(),
        diagnostics: Vec::new(),
    }
}

#[cfg(test)]
fn body(script: &str) -> Vec<&str> {
    script
        .lines()
        .filter(|line| !line.starts_with('#') && !line.is_empty())
        .collect()
}

#[test]
fn time_text() {
    assert_eq!(TimeText(0.0).to_string(), "00:00:00:000");
    assert_eq!(TimeText(2500.7).to_string(), "00:00:02:500");
    assert_eq!(TimeText(3_723_004.0).to_string(), "01:02:03:004");
}

#[test]
fn header_lists_metadata() {
    let script = render(
        &sequence(vec![Note::closed(Pitch::new(69), 100, 0, 0.0, 2500.0)]),
        &ScriptOptions {
            source_name: "song.mid".to_string(),
            ..Default::default()
        },
    )
    .unwrap();
    let header: Vec<&str> = script.lines().take(13).collect();
    assert_eq!(
        header,
        vec![
            "#----------------File Description-----------------#",
            "# This file was generated by midibeep",
            "# Source: song.mid",
            "# Milliseconds per pulse: 5.208333",
            "# Track index: 1",
            "# MIDI Channel: 0",
            "# Track BPM: 120",
            "# Number of notes: 1",
            "# Track length: 00:00:02:500 HH:MM:SS:MS",
            "# Track name: Lead",
            "# Instrument name: <UNKNOWN>",
            "# Track copyright: <UNKNOWN>",
            "#-------------------------------------------------#",
        ]
    );
}

#[test]
fn beeps_and_delays() {
    let script = render(
        &sequence(vec![
            Note::closed(Pitch::new(69), 100, 0, 0.0, 500.0),
            Note::closed(Pitch::new(81), 100, 0, 750.0, 1000.0),
        ]),
        &ScriptOptions::default(),
    )
    .unwrap();
    assert_eq!(
        body(&script),
        vec![
            ":beep frequency=440.000000 length=500.000000ms;",
            ":delay 750.000000ms;",
            ":beep frequency=880.000000 length=250.000000ms;",
            ":delay 250.000000ms;",
        ]
    );
}

#[test]
fn leading_silence() {
    let script = render(
        &sequence(vec![Note::closed(Pitch::new(69), 100, 0, 100.0, 200.0)]),
        &ScriptOptions::default(),
    )
    .unwrap();
    assert_eq!(
        body(&script),
        vec![
            ":delay 100.000000ms;",
            ":beep frequency=440.000000 length=100.000000ms;",
            ":delay 100.000000ms;",
        ]
    );
}

#[test]
fn shifts_and_comments() {
    let script = render(
        &sequence(vec![Note::closed(Pitch::new(57), 100, 0, 0.0, 1000.0)]),
        &ScriptOptions {
            octave_shift: 1,
            note_shift: 0,
            fine_tuning: 1.5,
            comments: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        body(&script),
        vec![
            ":beep frequency=441.500000 length=1000.000000ms; # A4 +1.500Hz @ 00:00:00:000",
            ":delay 1000.000000ms;",
        ]
    );
}

#[test]
fn shift_out_of_table() {
    let err = render(
        &sequence(vec![Note::closed(Pitch::new(115), 100, 0, 0.0, 10.0)]),
        &ScriptOptions {
            octave_shift: 1,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        RenderError::PitchOutOfRange {
            pitch: 115,
            shift: 12
        }
    );
}

#[test]
fn extreme_shifts_do_not_overflow() {
    let notes = vec![Note::closed(Pitch::new(60), 100, 0, 0.0, 10.0)];
    let err = render(
        &sequence(notes.clone()),
        &ScriptOptions {
            octave_shift: i32::MAX,
            note_shift: i32::MAX,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        RenderError::PitchOutOfRange {
            pitch: 60,
            shift: i64::from(i32::MAX) * 13
        }
    );

    let err = render(
        &sequence(notes),
        &ScriptOptions {
            octave_shift: i32::MIN,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        RenderError::PitchOutOfRange {
            pitch: 60,
            shift: i64::from(i32::MIN) * 12
        }
    );
}

#[test]
fn empty_sequence_is_header_only() {
    let script = render(&sequence(Vec::new()), &ScriptOptions::default()).unwrap();
    assert!(body(&script).is_empty());
    assert!(script.contains("# Number of notes: 0"));
}
