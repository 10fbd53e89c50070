#![doc = r#"
Pitch codes, their names and their frequencies.

Pitch code `69` is A4 at 440 Hz. Code `0` is `C-1`. The frequency table
covers ten octaves, codes `0` to `119`; codes above that have no
frequency.
"#]
use core::fmt;

/// Number of pitch codes with a known frequency
pub const FREQUENCY_TABLE_LEN: usize = 120;

/// Semitones per octave
pub const NOTES_IN_OCTAVE: i32 = 12;

/// Equal temperament, A4 = 440 Hz, C4 to B4
const OCTAVE_FOUR: [f64; 12] = [
    261.625_565_300_598_6,
    277.182_630_976_872_1,
    293.664_767_917_407_6,
    311.126_983_722_080_9,
    329.627_556_912_869_9,
    349.228_231_433_003_9,
    369.994_422_711_634_4,
    391.995_435_981_749_27,
    415.304_697_579_945_1,
    440.0,
    466.163_761_518_089_9,
    493.883_301_256_124_1,
];

#[doc = r#"
A pitch code as carried by `NOTE_ON`/`NOTE_OFF` events.

# Example
```rust
# use midibeep::prelude::*;
let a4 = Pitch::new(69);
assert_eq!(a4.key(), Key::A);
assert_eq!(a4.octave(), Octave::new(4));
assert_eq!(a4.frequency(), Some(440.0));
assert_eq!(a4.to_string(), "A4");
```
"#]
#[derive(Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pitch(u8);

impl Pitch {
    /// Wrap a pitch code
    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    /// Shift by a number of semitones.
    ///
    /// Returns `None` if the result leaves the frequency table.
    pub fn shifted(&self, semitones: i32) -> Option<Self> {
        let code = i32::from(self.0).checked_add(semitones)?;
        if (0..FREQUENCY_TABLE_LEN as i32).contains(&code) {
            Some(Self(code as u8))
        } else {
            None
        }
    }

    /// The pitch code
    pub const fn code(&self) -> u8 {
        self.0
    }

    /// True if the code has a frequency
    pub const fn in_table(&self) -> bool {
        (self.0 as usize) < FREQUENCY_TABLE_LEN
    }

    /// Identifies the key of the pitch
    pub const fn key(&self) -> Key {
        Key::from_code(self.0)
    }

    /// Identifies the octave of the pitch
    pub const fn octave(&self) -> Octave {
        Octave((self.0 / 12) as i8 - 1)
    }

    /// Frequency in Hz, if the code is inside the table
    pub fn frequency(&self) -> Option<f64> {
        if !self.in_table() {
            return None;
        }
        let mut freq = OCTAVE_FOUR[(self.0 % 12) as usize];
        let octave = self.octave().value();
        for _ in octave..4 {
            freq /= 2.0;
        }
        for _ in 4..octave {
            freq *= 2.0;
        }
        Some(freq)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key(), self.octave())
    }
}

#[allow(missing_docs)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[doc = r#"
The note name of a [`Pitch`] within its octave.
"#]
pub enum Key {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl Key {
    /// Returns an array beginning with [`Key::C`] to [`Key::B`]
    pub fn all() -> [Key; 12] {
        use Key::*;
        [C, CSharp, D, DSharp, E, F, FSharp, G, GSharp, A, ASharp, B]
    }

    /// Returns true if the key is sharp.
    #[inline]
    pub const fn is_sharp(&self) -> bool {
        use Key::*;
        matches!(self, CSharp | DSharp | FSharp | GSharp | ASharp)
    }

    const fn from_code(code: u8) -> Self {
        use Key::*;
        match code % 12 {
            0 => C,
            1 => CSharp,
            2 => D,
            3 => DSharp,
            4 => E,
            5 => F,
            6 => FSharp,
            7 => G,
            8 => GSharp,
            9 => A,
            10 => ASharp,
            _ => B,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Key::*;
        let name = match self {
            C => "C",
            CSharp => "C#",
            D => "D",
            DSharp => "D#",
            E => "E",
            F => "F",
            FSharp => "F#",
            G => "G",
            GSharp => "G#",
            A => "A",
            ASharp => "A#",
            B => "B",
        };
        f.write_str(name)
    }
}

#[doc = r#"
Identifies the octave of a [`Pitch`]. Pitch code `0` is in octave `-1`.
"#]
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Octave(i8);

impl Octave {
    /// Should be a value between [-1, 9]. Clamps between these two values.
    pub const fn new(mut octave: i8) -> Self {
        if octave < -1 {
            octave = -1
        } else if octave > 9 {
            octave = 9;
        }
        Self(octave)
    }

    /// The octave, from `[-1,9]`
    pub const fn value(&self) -> i8 {
        self.0
    }
}

impl fmt::Display for Octave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
fn equal_temperament(code: u8) -> f64 {
    // 440 * 2^((n - 69) / 12) without `powf`
    let mut freq = 440.0;
    let semitone = 1.059_463_094_359_295_3_f64;
    if code >= 69 {
        for _ in 69..code {
            freq *= semitone;
        }
    } else {
        for _ in code..69 {
            freq /= semitone;
        }
    }
    freq
}

#[test]
fn frequencies_follow_equal_temperament() {
    for code in 0..FREQUENCY_TABLE_LEN as u8 {
        let freq = Pitch::new(code).frequency().unwrap();
        let expected = equal_temperament(code);
        assert!(
            (freq - expected).abs() / expected < 1e-9,
            "{code}: {freq} != {expected}"
        );
    }
}

#[test]
fn known_frequencies() {
    use pretty_assertions::assert_eq;
    assert_eq!(Pitch::new(69).frequency(), Some(440.0));
    assert_eq!(Pitch::new(57).frequency(), Some(220.0));
    assert_eq!(Pitch::new(81).frequency(), Some(880.0));
    assert_eq!(Pitch::new(60).frequency(), Some(261.625_565_300_598_6));
    assert_eq!(Pitch::new(119).frequency(), Some(7_902.132_820_097_986));
    assert_eq!(Pitch::new(120).frequency(), None);
}

#[test]
fn names() {
    use alloc::string::ToString;
    use pretty_assertions::assert_eq;
    assert_eq!(Pitch::new(0).to_string(), "C-1");
    assert_eq!(Pitch::new(60).to_string(), "C4");
    assert_eq!(Pitch::new(61).to_string(), "C#4");
    assert_eq!(Pitch::new(94).key(), Key::ASharp);
    assert_eq!(Pitch::new(94).octave(), Octave::new(6));
}

#[test]
fn shifting() {
    use pretty_assertions::assert_eq;
    assert_eq!(Pitch::new(60).shifted(12), Some(Pitch::new(72)));
    assert_eq!(Pitch::new(60).shifted(-61), None);
    assert_eq!(Pitch::new(110).shifted(10), None);
    assert_eq!(Pitch::new(110).shifted(9), Some(Pitch::new(119)));
    assert_eq!(Pitch::new(1).shifted(i32::MAX), None);
}
