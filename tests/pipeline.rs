use midibeep::{
    prelude::*,
    script::{self, TimeText},
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn create_midi(format: u16, ppqn: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = Vec::new();

    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x06]);
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&ppqn.to_be_bytes());

    for payload in tracks {
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(payload);
    }
    bytes
}

/// 125 BPM, which with 120 pulses per quarter note is 4ms per pulse
fn conductor_track() -> Vec<u8> {
    vec![
        0x00, //
        0xFF, 0x51, 0x03, 0x07, 0x53, 0x00, 0x00, // 480 000 us per quarter note
        0xFF, 0x2F, 0x00,
    ]
}

fn lead_track() -> Vec<u8> {
    vec![
        0x3C, // pre-delay, 240ms
        0xFF, 0x03, 0x04, b'L', b'e', b'a', b'd', 0x00, //
        0x90, 69, 100, 0x78, // A4, 480ms
        0x80, 69, 0, 0x3C, // 240ms rest
        0x90, 81, 90, 0x00, // A5
        0x90, 81, 90, 0x3C, // A5 again while sounding
        0x80, 81, 0, 0x00, //
        0x80, 81, 0, 0x00, // releases the dropped A5
        0x91, 40, 100, 0x00, // other channel
        0xFF, 0x05, 0x02, b'l', b'a', 0x3C, // lyric, then 240ms
        0xFF, 0x2F, 0x00,
    ]
}

fn convert(bytes: &[u8], options: SequenceOptions) -> midibeep::Result<String> {
    let file = MidiFile::parse(bytes)?;
    let sequence = file.sequence(options)?;
    let script = script::render(
        &sequence,
        &ScriptOptions {
            source_name: "lead.mid".to_string(),
            ..Default::default()
        },
    )?;
    Ok(script)
}

#[test]
fn sequence_lead_track() {
    init_tracing();
    let bytes = create_midi(1, 120, &[conductor_track(), lead_track()]);
    let file = MidiFile::parse(&bytes).unwrap();
    let sequence = file
        .sequence(SequenceOptions::default().with_track(1))
        .unwrap();

    assert_eq!(sequence.bpm(), 125);
    assert_eq!(sequence.ms_per_pulse(), 4.0);
    assert_eq!(sequence.track_name(), "Lead");
    assert_eq!(sequence.instrument_name(), midibeep::UNKNOWN_TEXT);
    assert_eq!(sequence.length_ms(), 1440.0);
    assert_eq!(sequence.note_on_count(), 2);
    assert_eq!(sequence.note_off_count(), 2);

    let notes: Vec<(u8, f64, f64)> = sequence
        .notes()
        .iter()
        .map(|n| (n.pitch().code(), n.start(), n.end()))
        .collect();
    assert_eq!(notes, vec![(69, 240.0, 720.0), (81, 960.0, 1200.0)]);

    assert_eq!(
        sequence.diagnostics(),
        &[Diagnostic::OverlappingNote {
            pitch: Pitch::new(81),
            channel: 0,
            at_ms: 960.0
        }]
    );
    assert_eq!(
        sequence.texts(),
        &[MetaText {
            kind: MetaType::Lyric,
            at_ms: 1200.0,
            text: "la".to_string()
        }]
    );
}

#[test]
fn every_note_closes_after_it_starts() {
    let bytes = create_midi(1, 120, &[conductor_track(), lead_track()]);
    let file = MidiFile::parse(&bytes).unwrap();
    let sequence = file
        .sequence(SequenceOptions::default().with_track(1))
        .unwrap();

    for note in sequence.notes() {
        assert!(note.end() >= note.start());
        assert!(note.end() <= sequence.length_ms());
    }
    assert!(
        sequence
            .notes()
            .windows(2)
            .all(|pair| pair[0].start() <= pair[1].start())
    );
}

#[test]
fn render_lead_track() {
    init_tracing();
    let bytes = create_midi(1, 120, &[conductor_track(), lead_track()]);
    let script = convert(&bytes, SequenceOptions::default().with_track(1)).unwrap();

    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(lines[2], "# Source: lead.mid");
    assert_eq!(lines[3], "# Milliseconds per pulse: 4.000000");
    assert_eq!(lines[6], "# Track BPM: 125");
    assert_eq!(lines[7], "# Number of notes: 2");
    assert_eq!(
        lines[8],
        format!("# Track length: {} HH:MM:SS:MS", TimeText(1440.0))
    );
    assert_eq!(lines[9], "# Track name: Lead");
    assert_eq!(lines[13], "");
    assert_eq!(
        &lines[14..],
        &[
            ":delay 240.000000ms;",
            ":beep frequency=440.000000 length=480.000000ms;",
            ":delay 720.000000ms;",
            ":beep frequency=880.000000 length=240.000000ms;",
            ":delay 240.000000ms;",
        ]
    );
}

#[test]
fn bpm_override_beats_tempo_event() {
    let bytes = create_midi(1, 120, &[conductor_track(), lead_track()]);
    let file = MidiFile::parse(&bytes).unwrap();
    let sequence = file
        .sequence(SequenceOptions::default().with_track(1).with_bpm(250))
        .unwrap();

    assert_eq!(sequence.bpm(), 250);
    assert_eq!(sequence.ms_per_pulse(), 2.0);
    assert_eq!(sequence.notes()[0].start(), 120.0);
    assert_eq!(sequence.length_ms(), 720.0);
}

#[test]
fn other_channel_is_unbalanced() {
    let bytes = create_midi(1, 120, &[conductor_track(), lead_track()]);
    let err = convert(&bytes, SequenceOptions::default().with_track(1).with_channel(1))
        .unwrap_err();
    assert_eq!(
        err,
        midibeep::Error::Sequence(SequenceError::UnbalancedNoteEvents {
            note_on: 1,
            note_off: 0
        })
    );
}

#[test]
fn conductor_track_has_no_notes() {
    let bytes = create_midi(1, 120, &[conductor_track(), lead_track()]);
    let script = convert(&bytes, SequenceOptions::default()).unwrap();
    assert!(script.contains("# Number of notes: 0"));
    assert!(!script.contains(":beep"));
}

#[test]
fn decode_error_surfaces_through_pipeline() {
    let mut bytes = create_midi(1, 120, &[conductor_track(), lead_track()]);
    bytes.truncate(bytes.len() - 1);
    let err = convert(&bytes, SequenceOptions::default().with_track(1)).unwrap_err();
    match err {
        midibeep::Error::Reader(err) => assert!(err.is_truncated()),
        other => panic!("expected a reader error, got {other:?}"),
    }
}

#[test]
fn smpte_division_is_rejected() {
    // -25 fps, 40 ticks per frame
    let bytes = create_midi(0, 0xE728, &[lead_track()]);
    let file = MidiFile::parse(&bytes).unwrap();
    assert!(file.header().is_smpte());
    let err = file.sequence(SequenceOptions::default()).unwrap_err();
    assert_eq!(
        err,
        SequenceError::Timing(TimingError::UnsupportedDivision(0xE728))
    );
}
