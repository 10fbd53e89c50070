use super::{Diagnostic, MetaText, Note, Sequence, SequenceError, SequenceOptions};
use crate::{
    UNKNOWN_TEXT,
    event::{Command, Event, MetaType},
    file::{Format, MidiFile, MtrkChunk},
    pitch::Pitch,
    timing::{Tempo, TimingConverter},
};
use alloc::{collections::BTreeMap, string::String, vec::Vec};

/// A note event after channel filtering
enum NoteEvent {
    On { pitch: u8, velocity: u8 },
    Off { pitch: u8 },
}

#[doc = r#"
Converts one track/channel of a decoded file into a [`Sequence`].

The tempo is resolved when the sequencer is created: an explicit BPM in the
options wins, otherwise the first TEMPO event is used (track 0 for format 1
files, the selected track then track 0 for format 2, the only track for
format 0). Without any TEMPO event the default of 120 BPM applies.
"#]
#[derive(Debug, Clone)]
pub struct Sequencer<'a> {
    track: &'a MtrkChunk,
    options: SequenceOptions,
    timing: TimingConverter,
}

impl<'a> Sequencer<'a> {
    /// Select the track and resolve the tempo.
    ///
    /// # Errors
    /// - [`SequenceError::TrackOutOfRange`] if the track does not exist
    /// - [`SequenceError::Timing`] for a broken TEMPO event or an unusable
    ///   division
    pub fn new(file: &'a MidiFile, options: SequenceOptions) -> Result<Self, SequenceError> {
        let track = file
            .track(options.track)
            .ok_or(SequenceError::TrackOutOfRange {
                index: options.track,
                count: file.tracks().len(),
            })?;

        let ppqn = file.header().ppqn();
        let timing = match options.bpm {
            Some(bpm) => TimingConverter::new(bpm, ppqn)?,
            None => TimingConverter::from_tempo(file_tempo(file, options.track)?, ppqn)?,
        };

        Ok(Self {
            track,
            options,
            timing,
        })
    }

    /// The timing the sequencer will use
    pub const fn timing(&self) -> &TimingConverter {
        &self.timing
    }

    /// Walk the track and build the sequence.
    ///
    /// # Errors
    /// - [`SequenceError::PitchOutOfRange`] for a note outside the frequency table
    /// - [`SequenceError::UnbalancedNoteEvents`] if notes are left open or
    ///   released without being started
    pub fn run(self) -> Result<Sequence, SequenceError> {
        let channel = self.options.channel;
        let mut now = self.timing.to_ms(self.track.predelay());

        let mut notes: Vec<Note> = Vec::new();
        // pitch -> index into `notes`
        let mut open: BTreeMap<u8, usize> = BTreeMap::new();
        // pitch -> releases still owed to dropped overlapping notes
        let mut absorbed: BTreeMap<u8, u32> = BTreeMap::new();
        let mut note_on = 0u64;
        let mut note_off = 0u64;
        let mut texts = Vec::new();
        let mut diagnostics = Vec::new();

        for event in self.track.events() {
            match self.note_event(event) {
                Some(NoteEvent::On { pitch, velocity }) => {
                    let pitch = in_table(pitch)?;
                    if open.contains_key(&pitch.code()) {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            pitch = pitch.code(),
                            channel,
                            at_ms = now,
                            "overlapping note dropped"
                        );
                        *absorbed.entry(pitch.code()).or_insert(0) += 1;
                        diagnostics.push(Diagnostic::OverlappingNote {
                            pitch,
                            channel,
                            at_ms: now,
                        });
                    } else {
                        open.insert(pitch.code(), notes.len());
                        notes.push(Note::new(pitch, velocity, channel, now));
                        note_on += 1;
                    }
                }
                Some(NoteEvent::Off { pitch }) => {
                    let pitch = in_table(pitch)?;
                    if let Some(index) = open.remove(&pitch.code()) {
                        notes[index].close(now);
                        note_off += 1;
                    } else if let Some(owed) = absorbed.get_mut(&pitch.code()) {
                        *owed -= 1;
                        if *owed == 0 {
                            absorbed.remove(&pitch.code());
                        }
                    } else {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            pitch = pitch.code(),
                            channel,
                            at_ms = now,
                            "note off without note on"
                        );
                        note_off += 1;
                    }
                }
                None => {
                    if let Some(text) = meta_text(event, now) {
                        texts.push(text);
                    }
                }
            }
            now += self.timing.to_ms(event.delay());
        }

        if note_on != note_off || !open.is_empty() {
            return Err(SequenceError::UnbalancedNoteEvents { note_on, note_off });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            track = self.options.track,
            channel,
            notes = notes.len(),
            length_ms = now,
            bpm = self.timing.bpm(),
            "sequenced track"
        );

        Ok(Sequence {
            notes,
            track: self.options.track,
            channel,
            track_name: track_text(self.track, MetaType::TrackName),
            instrument_name: track_text(self.track, MetaType::InstrumentName),
            copyright: track_text(self.track, MetaType::Copyright),
            bpm: self.timing.bpm(),
            ppqn: self.timing.ppqn(),
            ms_per_pulse: self.timing.ms_per_pulse(),
            length_ms: now,
            note_on,
            note_off,
            texts,
            diagnostics,
        })
    }

    fn note_event(&self, event: &Event) -> Option<NoteEvent> {
        if event.channel()? != self.options.channel {
            return None;
        }
        let &[pitch, velocity, ..] = event.data() else {
            return None;
        };
        match event.command()? {
            Command::NoteOn if velocity == 0 && self.options.velocity_zero_is_note_off => {
                Some(NoteEvent::Off { pitch })
            }
            Command::NoteOn => Some(NoteEvent::On { pitch, velocity }),
            Command::NoteOff => Some(NoteEvent::Off { pitch }),
            _ => None,
        }
    }
}

impl MidiFile {
    /// Shorthand for [`Sequencer::new`] followed by [`Sequencer::run`]
    pub fn sequence(&self, options: SequenceOptions) -> Result<Sequence, SequenceError> {
        Sequencer::new(self, options)?.run()
    }
}

fn in_table(code: u8) -> Result<Pitch, SequenceError> {
    let pitch = Pitch::new(code);
    if pitch.in_table() {
        Ok(pitch)
    } else {
        Err(SequenceError::PitchOutOfRange(code))
    }
}

fn file_tempo(file: &MidiFile, selected: usize) -> Result<Tempo, SequenceError> {
    let search: &[usize] = match file.header().format() {
        Format::SingleMultiChannel => &[selected],
        Format::Simultaneous => &[0],
        Format::SequentiallyIndependent => &[selected, 0],
    };
    let event = search
        .iter()
        .filter_map(|&index| file.track(index))
        .find_map(|track| track.find_meta(MetaType::Tempo));

    match event {
        Some(event) => Ok(Tempo::from_event(event)?),
        None => {
            #[cfg(feature = "tracing")]
            tracing::warn!("no tempo event found, using 120 BPM");
            Ok(Tempo::DEFAULT)
        }
    }
}

fn track_text(track: &MtrkChunk, meta: MetaType) -> String {
    track
        .find_meta(meta)
        .and_then(|event| event.text())
        .map(|text| text.into_owned())
        .unwrap_or_else(|| String::from(UNKNOWN_TEXT))
}

fn meta_text(event: &Event, at_ms: f64) -> Option<MetaText> {
    let kind = event.meta_type()?;
    if !matches!(
        kind,
        MetaType::Text | MetaType::Lyric | MetaType::Marker | MetaType::CuePoint
    ) {
        return None;
    }
    Some(MetaText {
        kind,
        at_ms,
        text: event.text()?.into_owned(),
    })
}

#[cfg(test)]
use crate::{event::EventCode, file::MthdHeader, reader::Vlv};
#[cfg(test)]
use alloc::vec;
#[cfg(test)]
use pretty_assertions::assert_eq;

#[cfg(test)]
fn channel_event(status: u8, a: u8, b: u8, delay: u32) -> Event {
    Event::new(false, EventCode::from_byte(status), vec![a, b], Vlv::new(delay))
}

#[cfg(test)]
fn on(pitch: u8, delay: u32) -> Event {
    channel_event(0x90, pitch, 100, delay)
}

#[cfg(test)]
fn off(pitch: u8, delay: u32) -> Event {
    channel_event(0x80, pitch, 0, delay)
}

#[cfg(test)]
fn meta(kind: u8, data: &[u8], delay: u32) -> Event {
    Event::new(true, EventCode::from_byte(kind), data.to_vec(), Vlv::new(delay))
}

#[cfg(test)]
fn tempo(micros_per_quarter: u32) -> Event {
    meta(0x51, &micros_per_quarter.to_be_bytes()[1..], 0)
}

#[cfg(test)]
fn file(format: Format, tracks: Vec<MtrkChunk>) -> MidiFile {
    MidiFile::new(MthdHeader::new(format, tracks.len() as u16, 96), tracks)
}

#[cfg(test)]
fn single(events: Vec<Event>) -> MidiFile {
    file(
        Format::SingleMultiChannel,
        vec![MtrkChunk::new(Vlv::ZERO, events)],
    )
}

#[cfg(test)]
fn at_120() -> SequenceOptions {
    SequenceOptions::default().with_bpm(120)
}

#[test]
fn one_note() {
    // note on at 0, note off 480 pulses later
    let file = single(vec![on(60, 480), off(60, 0)]);
    let sequence = file.sequence(at_120()).unwrap();
    assert_eq!(
        sequence.notes(),
        &[Note::closed(Pitch::new(60), 100, 0, 0.0, 2500.0)]
    );
    assert_eq!(sequence.note_on_count(), 1);
    assert_eq!(sequence.note_off_count(), 1);
    assert_eq!(sequence.length_ms(), 2500.0);
    assert!(sequence.diagnostics().is_empty());
}

#[test]
fn predelay_shifts_everything() {
    let track = MtrkChunk::new(Vlv::new(96), vec![on(60, 96), off(60, 0)]);
    let file = file(Format::SingleMultiChannel, vec![track]);
    let sequence = file.sequence(at_120()).unwrap();
    assert_eq!(sequence.notes()[0].start(), 500.0);
    assert_eq!(sequence.notes()[0].end(), 1000.0);
    assert_eq!(sequence.length_ms(), 1000.0);
}

#[test]
fn overlapping_note_is_dropped() {
    let file = single(vec![on(60, 96), on(60, 96), off(60, 96), off(60, 0)]);
    let sequence = file.sequence(at_120()).unwrap();

    assert_eq!(
        sequence.notes(),
        &[Note::closed(Pitch::new(60), 100, 0, 0.0, 1000.0)]
    );
    assert_eq!(
        sequence.diagnostics(),
        &[Diagnostic::OverlappingNote {
            pitch: Pitch::new(60),
            channel: 0,
            at_ms: 500.0
        }]
    );
    assert_eq!(sequence.note_on_count(), 1);
    assert_eq!(sequence.note_off_count(), 1);
    assert_eq!(sequence.length_ms(), 1500.0);
}

#[test]
fn unterminated_note() {
    let file = single(vec![on(60, 96), on(62, 96), off(60, 0)]);
    assert_eq!(
        file.sequence(at_120()).unwrap_err(),
        SequenceError::UnbalancedNoteEvents {
            note_on: 2,
            note_off: 1
        }
    );
}

#[test]
fn stray_note_off() {
    let file = single(vec![on(60, 96), off(60, 0), off(64, 0)]);
    assert_eq!(
        file.sequence(at_120()).unwrap_err(),
        SequenceError::UnbalancedNoteEvents {
            note_on: 1,
            note_off: 2
        }
    );
}

#[test]
fn stray_note_off_before_a_pair() {
    // the stray is counted even though a later pair balances itself
    let file = single(vec![off(64, 0), on(60, 96), off(60, 0)]);
    assert_eq!(
        file.sequence(at_120()).unwrap_err(),
        SequenceError::UnbalancedNoteEvents {
            note_on: 1,
            note_off: 2
        }
    );
}

#[test]
fn unreleased_overlap_is_accepted() {
    let file = single(vec![on(60, 96), on(60, 96), off(60, 0)]);
    let sequence = file.sequence(at_120()).unwrap();
    assert_eq!(
        sequence.notes(),
        &[Note::closed(Pitch::new(60), 100, 0, 0.0, 1000.0)]
    );
    assert_eq!(sequence.note_on_count(), 1);
    assert_eq!(sequence.note_off_count(), 1);
    assert_eq!(sequence.diagnostics().len(), 1);
}

#[test]
fn balanced_counts_but_open_note() {
    let file = single(vec![on(60, 96), off(64, 0)]);
    assert!(matches!(
        file.sequence(at_120()),
        Err(SequenceError::UnbalancedNoteEvents { .. })
    ));
}

#[test]
fn other_channels_only_add_time() {
    let file = single(vec![
        on(60, 96),
        channel_event(0x91, 40, 100, 96),
        channel_event(0x81, 40, 0, 96),
        off(60, 0),
    ]);
    let sequence = file.sequence(at_120()).unwrap();
    assert_eq!(sequence.notes().len(), 1);
    assert_eq!(sequence.notes()[0].end(), 1500.0);

    let sequence = file.sequence(at_120().with_channel(1)).unwrap();
    assert_eq!(
        sequence.notes(),
        &[Note::closed(Pitch::new(40), 100, 1, 500.0, 1000.0)]
    );
}

#[test]
fn notes_are_ordered_by_start() {
    let file = single(vec![
        on(60, 48),
        on(64, 48),
        off(60, 48),
        on(67, 48),
        off(64, 0),
        off(67, 0),
    ]);
    let sequence = file.sequence(at_120()).unwrap();
    let starts: Vec<f64> = sequence.notes().iter().map(|n| n.start()).collect();
    assert_eq!(starts, vec![0.0, 250.0, 750.0]);
    assert_eq!(sequence.notes()[1].end(), 1000.0);
}

#[test]
fn pitch_outside_table() {
    let file = single(vec![on(125, 96), off(125, 0)]);
    assert_eq!(
        file.sequence(at_120()).unwrap_err(),
        SequenceError::PitchOutOfRange(125)
    );
}

#[test]
fn velocity_zero_release() {
    let file = single(vec![on(60, 96), channel_event(0x90, 60, 0, 0)]);
    assert!(file.sequence(at_120()).is_err());

    let sequence = file
        .sequence(at_120().with_velocity_zero_as_note_off(true))
        .unwrap();
    assert_eq!(sequence.notes()[0].end(), 500.0);
}

#[test]
fn metadata_and_texts() {
    let file = single(vec![
        meta(0x03, b"Melody", 0),
        meta(0x04, b"Square", 0),
        on(60, 96),
        meta(0x05, b"la", 0),
        off(60, 0),
    ]);
    let sequence = file.sequence(at_120()).unwrap();
    assert_eq!(sequence.track_name(), "Melody");
    assert_eq!(sequence.instrument_name(), "Square");
    assert_eq!(sequence.copyright(), UNKNOWN_TEXT);
    assert_eq!(
        sequence.texts(),
        &[MetaText {
            kind: MetaType::Lyric,
            at_ms: 500.0,
            text: String::from("la"),
        }]
    );
}

#[test]
fn tempo_from_conductor_track() {
    let conductor = MtrkChunk::new(
        Vlv::ZERO,
        vec![meta(0x51, &[0x0F, 0x42, 0x40], 0), meta(0x2F, &[], 0)],
    );
    let melody = MtrkChunk::new(Vlv::ZERO, vec![on(60, 96), off(60, 0)]);
    let file = file(Format::Simultaneous, vec![conductor, melody]);

    let sequence = file
        .sequence(SequenceOptions::default().with_track(1))
        .unwrap();
    assert_eq!(sequence.bpm(), 60);
    assert_eq!(sequence.notes()[0].end(), 1000.0);

    let sequence = file
        .sequence(SequenceOptions::default().with_track(1).with_bpm(120))
        .unwrap();
    assert_eq!(sequence.bpm(), 120);
    assert_eq!(sequence.notes()[0].end(), 500.0);
}

#[test]
fn tempo_from_single_track() {
    let file = single(vec![tempo(1_000_000), on(60, 96), off(60, 0)]);
    let sequence = file.sequence(SequenceOptions::default()).unwrap();
    assert_eq!(sequence.bpm(), 60);
    assert_eq!(sequence.notes()[0].end(), 1000.0);
}

#[test]
fn independent_tracks_fall_back_to_first_track_tempo() {
    let first = MtrkChunk::new(Vlv::ZERO, vec![tempo(1_000_000), on(62, 96), off(62, 0)]);
    let second = MtrkChunk::new(Vlv::ZERO, vec![on(60, 96), off(60, 0)]);
    let file = file(Format::SequentiallyIndependent, vec![first, second]);

    let sequence = file
        .sequence(SequenceOptions::default().with_track(1))
        .unwrap();
    assert_eq!(sequence.bpm(), 60);
    assert_eq!(sequence.notes()[0].end(), 1000.0);
}

#[test]
fn independent_tracks_prefer_own_tempo() {
    let first = MtrkChunk::new(Vlv::ZERO, vec![tempo(1_000_000), on(62, 96), off(62, 0)]);
    let second = MtrkChunk::new(Vlv::ZERO, vec![tempo(500_000), on(60, 96), off(60, 0)]);
    let file = file(Format::SequentiallyIndependent, vec![first, second]);

    let sequence = file
        .sequence(SequenceOptions::default().with_track(1))
        .unwrap();
    assert_eq!(sequence.bpm(), 120);
    assert_eq!(sequence.notes()[0].end(), 500.0);

    let sequence = file.sequence(SequenceOptions::default()).unwrap();
    assert_eq!(sequence.bpm(), 60);
}

#[test]
fn default_tempo_without_tempo_event() {
    let file = single(vec![on(60, 96), off(60, 0)]);
    let sequence = file.sequence(SequenceOptions::default()).unwrap();
    assert_eq!(sequence.bpm(), 120);
}

#[test]
fn broken_tempo_event() {
    let file = single(vec![meta(0x51, &[0x07], 0)]);
    assert!(matches!(
        file.sequence(SequenceOptions::default()),
        Err(SequenceError::Timing(_))
    ));
}

#[test]
fn missing_track() {
    let file = single(vec![]);
    assert_eq!(
        file.sequence(at_120().with_track(3)).unwrap_err(),
        SequenceError::TrackOutOfRange { index: 3, count: 1 }
    );
}
