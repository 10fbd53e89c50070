use core::fmt;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The main command: the high nibble of a status byte.
///
/// Nibbles `0x0..=0x7` are data bytes in a well formed stream and have no
/// variant. [`EventCode::command`] returns `None` for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Command {
    /// Low nibble is the channel
    NoteOff = 0x8,
    /// Low nibble is the channel
    NoteOn = 0x9,
    /// Low nibble is the channel
    PolyphonicAftertouch = 0xA,
    /// Low nibble is the channel
    ControlModeChange = 0xB,
    /// Low nibble is the channel
    ProgramChange = 0xC,
    /// Low nibble is the channel
    ChannelAftertouch = 0xD,
    /// Low nibble is the channel
    PitchWheel = 0xE,
    /// Low nibble is a [`SystemCommand`]
    System = 0xF,
}

impl Command {
    /// Number of data bytes that follow the status byte
    pub const fn arity(&self) -> usize {
        use Command::*;
        match self {
            NoteOff | NoteOn | PolyphonicAftertouch | ControlModeChange | PitchWheel => 2,
            ProgramChange | ChannelAftertouch | System => 1,
        }
    }
}

/// The low nibble of a `0xF_` status byte.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SystemCommand {
    Exclusive = 0x0,
    TimeCodeQuarterFrame = 0x1,
    SongPositionPointer = 0x2,
    SongSelect = 0x3,
    Reserved4 = 0x4,
    Reserved5 = 0x5,
    TuneRequest = 0x6,
    EndOfExclusive = 0x7,
    TimingClock = 0x8,
    Undefined9 = 0x9,
    Start = 0xA,
    Continue = 0xB,
    Stop = 0xC,
    UndefinedD = 0xD,
    ActiveSensing = 0xE,
    /// Marks a meta event inside a file
    Meta = 0xF,
}

#[doc = r#"
The type byte of a meta event (the byte after `0xFF`).

```rust
# use midibeep::prelude::*;
let tempo = MetaType::try_from(0x51).unwrap();
assert_eq!(tempo, MetaType::Tempo);
assert_eq!(u8::from(MetaType::TrackEnd), 0x2F);
```
"#]
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MetaType {
    SequenceNumber = 0x00,
    Text = 0x01,
    Copyright = 0x02,
    TrackName = 0x03,
    InstrumentName = 0x04,
    Lyric = 0x05,
    Marker = 0x06,
    CuePoint = 0x07,
    ProgramName = 0x08,
    DeviceName = 0x09,
    MidiChannel = 0x20,
    MidiPort = 0x21,
    TrackEnd = 0x2F,
    Tempo = 0x51,
    SmpteOffset = 0x54,
    TimeSignature = 0x58,
    KeySignature = 0x59,
    Proprietary = 0x7F,
}

impl MetaType {
    /// True for the meta events that carry free text
    pub const fn is_text(&self) -> bool {
        use MetaType::*;
        matches!(
            self,
            Text | Copyright
                | TrackName
                | InstrumentName
                | Lyric
                | Marker
                | CuePoint
                | ProgramName
                | DeviceName
        )
    }
}

#[doc = r#"
A status byte split into its two nibbles.

For channel events the low nibble is the channel. For a meta event the
decoder replaces the `0xFF` code with the code of the meta type byte, so
`full_cmd` is then the meta type.

```rust
# use midibeep::prelude::*;
let code = EventCode::from_byte(0x93);
assert_eq!(code.main(), 0x9);
assert_eq!(code.sub(), 0x3);
assert_eq!(code.command(), Some(Command::NoteOn));
assert!(EventCode::from_byte(0xFF).is_meta());
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventCode {
    main: u8,
    sub: u8,
}

impl EventCode {
    /// Split a status byte
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            main: (byte >> 4) & 0x0F,
            sub: byte & 0x0F,
        }
    }

    /// The code a meta event of `meta` type is stored under
    pub fn from_meta(meta: MetaType) -> Self {
        Self::from_byte(meta.into())
    }

    /// High nibble
    pub const fn main(&self) -> u8 {
        self.main
    }

    /// Low nibble: the channel for channel events
    pub const fn sub(&self) -> u8 {
        self.sub
    }

    /// Both nibbles recombined into the original byte
    pub const fn full_cmd(&self) -> u8 {
        (self.main << 4) | self.sub
    }

    /// True iff this is `0xFF`, a system event with the meta sub-command
    pub const fn is_meta(&self) -> bool {
        self.main == Command::System as u8 && self.sub == SystemCommand::Meta as u8
    }

    /// The main command, if the high nibble names one
    pub fn command(&self) -> Option<Command> {
        Command::try_from(self.main).ok()
    }

    /// Interpret the full byte as a meta type
    pub fn meta_type(&self) -> Option<MetaType> {
        MetaType::try_from(self.full_cmd()).ok()
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04X}", self.full_cmd())
    }
}

#[test]
fn split_and_recombine() {
    use pretty_assertions::assert_eq;
    for byte in 0..=u8::MAX {
        let code = EventCode::from_byte(byte);
        assert_eq!(code.full_cmd(), byte);
        assert_eq!(code.main(), byte >> 4);
        assert_eq!(code.sub(), byte & 0x0F);
    }
}

#[test]
fn only_ff_is_meta() {
    for byte in 0..=u8::MAX {
        assert_eq!(EventCode::from_byte(byte).is_meta(), byte == 0xFF);
    }
}

#[test]
fn arity_by_command() {
    use pretty_assertions::assert_eq;
    assert_eq!(Command::NoteOff.arity(), 2);
    assert_eq!(Command::NoteOn.arity(), 2);
    assert_eq!(Command::PolyphonicAftertouch.arity(), 2);
    assert_eq!(Command::ControlModeChange.arity(), 2);
    assert_eq!(Command::PitchWheel.arity(), 2);
    assert_eq!(Command::ProgramChange.arity(), 1);
    assert_eq!(Command::ChannelAftertouch.arity(), 1);
}

#[test]
fn data_nibbles_have_no_command() {
    assert!(EventCode::from_byte(0x45).command().is_none());
    assert_eq!(
        EventCode::from_meta(MetaType::TrackEnd).full_cmd(),
        0x2F
    );
}
