/// What to sequence and how.
///
/// ```rust
/// # use midibeep::prelude::*;
/// let options = SequenceOptions::default()
///     .with_track(2)
///     .with_channel(9)
///     .with_bpm(90);
/// assert_eq!(options.track, 2);
/// assert_eq!(options.bpm, Some(90));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceOptions {
    /// Index of the track to read notes from
    pub track: usize,
    /// Channel whose note events are kept, 0 to 15
    pub channel: u8,
    /// Tempo override. `None` takes the tempo from the file.
    pub bpm: Option<u32>,
    /// Treat `NOTE_ON` with velocity 0 as `NOTE_OFF`
    pub velocity_zero_is_note_off: bool,
}

impl SequenceOptions {
    /// Select a track
    pub const fn with_track(mut self, track: usize) -> Self {
        self.track = track;
        self
    }

    /// Select a channel
    pub const fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Override the tempo. `0` keeps the file's tempo.
    pub const fn with_bpm(mut self, bpm: u32) -> Self {
        self.bpm = if bpm == 0 { None } else { Some(bpm) };
        self
    }

    /// Treat `NOTE_ON` with velocity 0 as a release
    pub const fn with_velocity_zero_as_note_off(mut self, enabled: bool) -> Self {
        self.velocity_zero_is_note_off = enabled;
        self
    }
}

#[test]
fn zero_bpm_means_from_file() {
    use pretty_assertions::assert_eq;
    let options = SequenceOptions::default().with_bpm(140).with_bpm(0);
    assert_eq!(options.bpm, None);
}
