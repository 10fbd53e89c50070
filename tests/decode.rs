use midibeep::prelude::*;

/// Wrap track payloads into a complete file
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

fn conductor_track() -> Vec<u8> {
    vec![
        0x00, // pre-delay
        0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, 0x00, // 500 000 us per quarter note
        0xFF, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08, 0x00, // 4/4
        0xFF, 0x2F, 0x00,
    ]
}

fn melody_track() -> Vec<u8> {
    vec![
        0x00, // pre-delay
        0xFF, 0x03, 0x05, b'T', b'h', b'e', b'm', b'e', 0x00, // track name
        0xC0, 0x50, 0x00, // program change, one data byte
        0x90, 60, 100, 0x60, // C4 for 96 pulses
        0x80, 60, 0, 0x00, //
        0x90, 64, 90, 0x30, // E4 for 48 pulses
        0x80, 64, 0, 0x30, // then 48 pulses of rest
        0xB0, 0x07, 0x64, 0x00, // volume
        0x90, 67, 80, 0x81, 0x40, // G4 for 192 pulses
        0x80, 67, 0, 0x00, //
        0xFF, 0x2F, 0x00,
    ]
}

#[test]
fn decode_format_one_file() {
    let bytes = create_midi(1, 96, &[conductor_track(), melody_track()]);
    let file = MidiFile::parse(&bytes).unwrap();

    assert_eq!(file.header().format(), Format::Simultaneous);
    assert_eq!(file.header().track_count(), 2);
    assert_eq!(file.header().ppqn(), 96);
    assert_eq!(file.tracks().len(), 2);

    let conductor = &file.tracks()[0];
    assert_eq!(conductor.events().len(), 3);
    let tempo = conductor.find_meta(MetaType::Tempo).unwrap();
    assert_eq!(Tempo::from_event(tempo).unwrap().bpm(), 120);

    let melody = &file.tracks()[1];
    assert_eq!(melody.events().len(), 10);
    assert_eq!(melody.events()[1].data(), &[0x50]);
    assert_eq!(melody.events()[7].delay().value(), 192);
    assert_eq!(
        melody.events().last().unwrap().meta_type(),
        Some(MetaType::TrackEnd)
    );
}

#[test]
fn analyze_counts_notes() {
    let bytes = create_midi(1, 96, &[conductor_track(), melody_track()]);
    let file = MidiFile::parse(&bytes).unwrap();
    let summary = file.analyze();

    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].name, midibeep::UNKNOWN_TEXT);
    assert!(summary[0].is_silent());
    assert_eq!(summary[1].name, "Theme");
    assert_eq!(
        summary[1].channels,
        vec![ChannelNotes {
            channel: 0,
            note_on: 3,
            note_off: 3
        }]
    );
}

#[test]
fn corrupted_header_magic_decodes_no_track() {
    let mut bytes = create_midi(1, 96, &[conductor_track()]);
    bytes[1] = b'X';
    let err = MidiFile::parse(&bytes).unwrap_err();
    assert_eq!(
        err.error_kind(),
        &ReaderErrorKind::InvalidChunkMagic {
            expected: *b"MThd",
            found: *b"MXhd"
        }
    );
    assert_eq!(err.position(), 0);
}

#[test]
fn corrupted_track_magic() {
    let mut bytes = create_midi(1, 96, &[conductor_track(), melody_track()]);
    // the second track starts after the header and the first track
    let second = 14 + 8 + conductor_track().len();
    bytes[second] = b'm';
    let err = MidiFile::parse(&bytes).unwrap_err();
    assert!(err.is_invalid_magic());
    assert_eq!(err.position(), second);
}

#[test]
fn track_length_past_end_of_buffer() {
    let mut bytes = create_midi(0, 96, &[melody_track()]);
    // declared length one byte longer than what is there
    let len = melody_track().len() as u32 + 1;
    bytes[18..22].copy_from_slice(&len.to_be_bytes());
    let err = MidiFile::parse(&bytes).unwrap_err();
    assert_eq!(
        err.error_kind(),
        &ReaderErrorKind::TruncatedStream {
            requested: len as usize,
            remaining: len as usize - 1
        }
    );
    assert_eq!(err.position(), 22);
}

#[test]
fn event_crossing_chunk_boundary() {
    // the note off is cut short by the declared length
    let track = vec![0x00, 0x90, 60, 100, 0x60, 0x80, 60];
    let mut bytes = create_midi(0, 96, &[track]);
    bytes.extend_from_slice(&[0x00, 0x00, 0xFF, 0x2F, 0x00]);
    let err = MidiFile::parse(&bytes).unwrap_err();
    assert!(err.is_truncated());
}

#[test]
fn running_status_is_not_supported() {
    // the second note on omits its status byte
    let track = vec![0x00, 0x90, 60, 100, 0x00, 62, 100, 0x00, 0xFF, 0x2F, 0x00];
    let bytes = create_midi(0, 96, &[track]);
    let file = MidiFile::parse(&bytes).unwrap();

    // 62 is read as a status byte with an unknown command
    let events = file.tracks()[0].events();
    assert_eq!(events[1].command(), None);
    assert_eq!(events[1].code().full_cmd(), 62);
    assert_eq!(events[1].data(), &[100]);
}

#[test]
fn invalid_format() {
    let bytes = create_midi(3, 96, &[conductor_track()]);
    let err = MidiFile::parse(&bytes).unwrap_err();
    assert_eq!(err.error_kind(), &ReaderErrorKind::InvalidFormat(3));
}

#[test]
fn empty_buffer() {
    assert!(MidiFile::parse(&[]).unwrap_err().is_truncated());
}
