#![doc = r#"
Conversion from pulses to milliseconds.

A file's delta times count pulses. With a tempo in beats per minute and a
division in pulses per quarter note (PPQN), one pulse lasts

```text
60 000 / (bpm × ppqn)  milliseconds
```

All conversions use `f64`.
"#]

mod tempo;
pub use tempo::*;

use crate::reader::Vlv;
use thiserror::Error;

/// Errors from timing setup
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// A TEMPO event that is too short or zero
    #[error("Invalid tempo event")]
    InvalidTempo,
    /// A tempo of zero beats per minute
    #[error("Invalid BPM {0}")]
    InvalidBpm(u32),
    /// Zero pulses per quarter note, or an SMPTE division
    #[error("Unsupported division {0:#06X}")]
    UnsupportedDivision(u16),
}

#[doc = r#"
Turns pulse counts into milliseconds for a fixed tempo and division.

# Example
```rust
# use midibeep::prelude::*;
let timing = TimingConverter::new(120, 96).unwrap();
assert_eq!(timing.to_ms(Vlv::new(96)), 500.0);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConverter {
    bpm: u32,
    ppqn: u16,
    ms_per_pulse: f64,
}

impl TimingConverter {
    /// Create a converter.
    ///
    /// # Errors
    /// - [`TimingError::InvalidBpm`] for a zero BPM
    /// - [`TimingError::UnsupportedDivision`] for a zero PPQN or a division
    ///   with the SMPTE bit set
    pub fn new(bpm: u32, ppqn: u16) -> Result<Self, TimingError> {
        if bpm == 0 {
            return Err(TimingError::InvalidBpm(bpm));
        }
        if ppqn == 0 || ppqn & 0x8000 != 0 {
            return Err(TimingError::UnsupportedDivision(ppqn));
        }
        let ms_per_pulse = 60_000.0 / (bpm as f64 * ppqn as f64);
        Ok(Self {
            bpm,
            ppqn,
            ms_per_pulse,
        })
    }

    /// Create a converter from a tempo
    pub fn from_tempo(tempo: Tempo, ppqn: u16) -> Result<Self, TimingError> {
        Self::new(tempo.bpm(), ppqn)
    }

    /// Beats per minute
    pub const fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Pulses per quarter note
    pub const fn ppqn(&self) -> u16 {
        self.ppqn
    }

    /// Duration of one pulse in milliseconds
    pub const fn ms_per_pulse(&self) -> f64 {
        self.ms_per_pulse
    }

    /// Convert a pulse count to milliseconds
    pub fn to_ms(&self, pulses: Vlv) -> f64 {
        pulses.value() as f64 * self.ms_per_pulse
    }
}

#[test]
fn ms_per_pulse_at_120_bpm() {
    use pretty_assertions::assert_eq;
    let timing = TimingConverter::new(120, 96).unwrap();
    assert_eq!(timing.ms_per_pulse(), 60_000.0 / (120.0 * 96.0));
    assert!((timing.ms_per_pulse() - 5.208_333_333).abs() < 1e-9);
    assert_eq!(timing.to_ms(Vlv::new(96)), 500.0);
    assert_eq!(timing.to_ms(Vlv::new(480)), 2500.0);
    assert_eq!(timing.to_ms(Vlv::ZERO), 0.0);
}

#[test]
fn from_tempo() {
    use pretty_assertions::assert_eq;
    let timing = TimingConverter::from_tempo(Tempo::DEFAULT, 96).unwrap();
    assert_eq!(timing.bpm(), 120);
    assert_eq!(timing.to_ms(Vlv::new(96)), 500.0);

    // 125 BPM at 120 pulses per quarter note is exactly 4ms per pulse
    let timing = TimingConverter::from_tempo(Tempo::new(480_000).unwrap(), 120).unwrap();
    assert_eq!(timing.bpm(), 125);
    assert_eq!(timing.ms_per_pulse(), 4.0);
    assert_eq!(timing.to_ms(Vlv::new(480)), 1920.0);
}

#[test]
fn rejects_bad_division() {
    use pretty_assertions::assert_eq;
    assert_eq!(
        TimingConverter::new(120, 0),
        Err(TimingError::UnsupportedDivision(0))
    );
    assert_eq!(
        TimingConverter::new(120, 0xE728),
        Err(TimingError::UnsupportedDivision(0xE728))
    );
    assert_eq!(TimingConverter::new(0, 96), Err(TimingError::InvalidBpm(0)));
}
