use super::MtrkChunk;
use crate::{UNKNOWN_TEXT, event::Command, event::MetaType};
use alloc::{collections::BTreeMap, string::String, vec::Vec};

/// Note event counts for one channel of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelNotes {
    /// Channel, 0 to 15
    pub channel: u8,
    /// `NOTE_ON` events seen
    pub note_on: u64,
    /// `NOTE_OFF` events seen
    pub note_off: u64,
}

/// A short description of one track, see [`MidiFile::analyze`](super::MidiFile::analyze)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackSummary {
    /// The track name, or a placeholder
    pub name: String,
    /// Number of decoded events
    pub events: usize,
    /// Channels that carry note events, ordered by channel
    pub channels: Vec<ChannelNotes>,
}

impl TrackSummary {
    pub(crate) fn from_track(track: &MtrkChunk) -> Self {
        let name = track
            .find_meta(MetaType::TrackName)
            .and_then(|e| e.text())
            .map(|t| t.into_owned())
            .unwrap_or_else(|| String::from(UNKNOWN_TEXT));

        let mut channels: BTreeMap<u8, ChannelNotes> = BTreeMap::new();
        for event in track.events() {
            let (Some(command), Some(channel)) = (event.command(), event.channel()) else {
                continue;
            };
            let note_on = match command {
                Command::NoteOn => true,
                Command::NoteOff => false,
                _ => continue,
            };
            let counts = channels.entry(channel).or_insert(ChannelNotes {
                channel,
                ..Default::default()
            });
            if note_on {
                counts.note_on += 1;
            } else {
                counts.note_off += 1;
            }
        }

        Self {
            name,
            events: track.events().len(),
            channels: channels.into_values().collect(),
        }
    }

    /// True if no channel carries notes
    pub fn is_silent(&self) -> bool {
        self.channels.is_empty()
    }
}

#[test]
fn counts_per_channel() {
    use crate::{
        event::{Event, EventCode},
        reader::Vlv,
    };
    use alloc::vec;
    use pretty_assertions::assert_eq;

    let ev = |status: u8, data: &[u8]| {
        Event::new(
            status == 0xFF,
            EventCode::from_byte(status),
            data.to_vec(),
            Vlv::ZERO,
        )
    };
    let track = MtrkChunk::new(
        Vlv::ZERO,
        vec![
            Event::new(true, EventCode::from_byte(0x03), b"Lead".to_vec(), Vlv::ZERO),
            ev(0x91, &[60, 100]),
            ev(0x90, &[62, 100]),
            ev(0x81, &[60, 0]),
            ev(0xB0, &[7, 100]),
            ev(0x91, &[64, 100]),
        ],
    );
    let summary = TrackSummary::from_track(&track);
    assert_eq!(summary.name, "Lead");
    assert_eq!(summary.events, 6);
    assert_eq!(
        summary.channels,
        vec![
            ChannelNotes {
                channel: 0,
                note_on: 1,
                note_off: 0
            },
            ChannelNotes {
                channel: 1,
                note_on: 2,
                note_off: 1
            },
        ]
    );
}

#[test]
fn unnamed_track() {
    use pretty_assertions::assert_eq;
    let track = MtrkChunk::new(crate::reader::Vlv::ZERO, Vec::new());
    let summary = TrackSummary::from_track(&track);
    assert_eq!(summary.name, UNKNOWN_TEXT);
    assert!(summary.is_silent());
}
