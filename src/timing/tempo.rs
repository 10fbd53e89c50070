use super::TimingError;
use crate::event::{Event, MetaType};

#[doc = r#"
The tempo of a track, in microseconds per quarter note.

Stored in a TEMPO meta event as three big-endian bytes:

```text
FF 51 03 tt tt tt
```

# Example
```rust
# use midibeep::prelude::*;
let tempo = Tempo::from_bytes(&[0x07, 0xA1, 0x20]).unwrap();
assert_eq!(tempo.micros_per_quarter_note(), 500_000);
assert_eq!(tempo.bpm(), 120);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tempo(u32);

impl Tempo {
    /// 500 000 µs per quarter note, the tempo of a file without TEMPO events
    pub const DEFAULT: Self = Self(500_000);

    /// Create a tempo from microseconds per quarter note
    pub const fn new(micros_per_quarter_note: u32) -> Result<Self, TimingError> {
        if micros_per_quarter_note == 0 {
            return Err(TimingError::InvalidTempo);
        }
        Ok(Self(micros_per_quarter_note))
    }

    /// Parse the payload of a TEMPO event.
    ///
    /// Only the first three bytes are used.
    pub const fn from_bytes(data: &[u8]) -> Result<Self, TimingError> {
        if data.len() < 3 {
            return Err(TimingError::InvalidTempo);
        }
        Self::new(((data[0] as u32) << 16) | ((data[1] as u32) << 8) | data[2] as u32)
    }

    /// Parse a TEMPO meta event
    pub fn from_event(event: &Event) -> Result<Self, TimingError> {
        if event.meta_type() != Some(MetaType::Tempo) {
            return Err(TimingError::InvalidTempo);
        }
        Self::from_bytes(event.data())
    }

    /// Microseconds per quarter note
    pub const fn micros_per_quarter_note(&self) -> u32 {
        self.0
    }

    /// Beats per minute, truncated
    pub const fn bpm(&self) -> u32 {
        60_000_000 / self.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn bpm_from_tempo_bytes() {
    use pretty_assertions::assert_eq;
    let tempo = Tempo::from_bytes(&[0x07, 0xA1, 0x20]).unwrap();
    assert_eq!(tempo.bpm(), 120);

    // 60_000_000 / 650_000 = 92.3
    let tempo = Tempo::from_bytes(&[0x09, 0xEB, 0x10]).unwrap();
    assert_eq!(tempo.micros_per_quarter_note(), 650_000);
    assert_eq!(tempo.bpm(), 92);
}

#[test]
fn invalid_tempo_payloads() {
    use pretty_assertions::assert_eq;
    assert_eq!(Tempo::from_bytes(&[0x07, 0xA1]), Err(TimingError::InvalidTempo));
    assert_eq!(Tempo::from_bytes(&[0, 0, 0]), Err(TimingError::InvalidTempo));
}

#[test]
fn tempo_from_event() {
    use crate::{event::EventCode, reader::Vlv};
    use alloc::vec;
    use pretty_assertions::assert_eq;
    let event = Event::new(
        true,
        EventCode::from_byte(0x51),
        vec![0x0F, 0x42, 0x40],
        Vlv::ZERO,
    );
    assert_eq!(Tempo::from_event(&event).unwrap().bpm(), 60);

    let not_tempo = Event::new(false, EventCode::from_byte(0x90), vec![60, 100], Vlv::ZERO);
    assert!(Tempo::from_event(&not_tempo).is_err());
}
