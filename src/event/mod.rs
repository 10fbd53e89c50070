#![doc = r#"
Track events and their status codes.

# Layout inside a track

```text
pre-delay  event  delta  event  delta  ...  FF 2F 00
```

The decoder reads one pre-delay for the track and then, for each event, the
event itself followed by the delta that separates it from the next one. The
end-of-track meta event with a zero length carries no trailing delta.

Every event must start with its own status byte; running status is not
supported.
"#]

mod code;
pub use code::*;

use crate::reader::{ReadResult, Reader, Vlv};
use alloc::{borrow::Cow, string::String, vec::Vec};

/// One decoded track event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    meta: bool,
    code: EventCode,
    data: Vec<u8>,
    delay: Vlv,
}

impl Event {
    /// Build an event by hand
    pub fn new(meta: bool, code: EventCode, data: Vec<u8>, delay: Vlv) -> Self {
        Self {
            meta,
            code,
            data,
            delay,
        }
    }

    /// Decode one event and the delta that follows it.
    ///
    /// Channel events take one or two data bytes depending on their
    /// [`Command`]. Status bytes with an unknown high nibble are accepted
    /// and read a single data byte. Meta events read their type byte, a
    /// [`Vlv`] length and that many bytes.
    pub fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let code = EventCode::from_byte(reader.read_u8()?);

        if code.is_meta() {
            let code = EventCode::from_byte(reader.read_u8()?);
            let len = reader.read_vlv()?.value();
            if code.meta_type() == Some(MetaType::TrackEnd) && len == 0 {
                return Ok(Self {
                    meta: true,
                    code,
                    data: Vec::new(),
                    delay: Vlv::ZERO,
                });
            }
            let data = reader.read_exact(len as usize)?.to_vec();
            let delay = reader.read_vlv()?;
            return Ok(Self {
                meta: true,
                code,
                data,
                delay,
            });
        }

        let arity = code.command().map(|c| c.arity()).unwrap_or(1);
        let data = reader.read_exact(arity)?.to_vec();
        let delay = reader.read_vlv()?;

        Ok(Self {
            meta: false,
            code,
            data,
            delay,
        })
    }

    /// True for meta events
    pub const fn is_meta(&self) -> bool {
        self.meta
    }

    /// The status code. For meta events this is the meta type.
    pub const fn code(&self) -> EventCode {
        self.code
    }

    /// The main command of a channel event
    pub fn command(&self) -> Option<Command> {
        if self.meta {
            return None;
        }
        self.code.command()
    }

    /// The meta type of a meta event
    pub fn meta_type(&self) -> Option<MetaType> {
        if !self.meta {
            return None;
        }
        self.code.meta_type()
    }

    /// The channel of a channel event
    pub fn channel(&self) -> Option<u8> {
        match self.command()? {
            Command::System => None,
            _ => Some(self.code.sub()),
        }
    }

    /// The payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pulses between this event and the next one
    pub const fn delay(&self) -> Vlv {
        self.delay
    }

    /// The payload as text, if it is not empty.
    ///
    /// Invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        if self.data.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(&self.data))
    }
}

#[cfg(test)]
fn read_one(bytes: &[u8]) -> (Event, usize) {
    let mut reader = Reader::from_byte_slice(bytes);
    let event = Event::read(&mut reader).unwrap();
    (event, reader.remaining())
}

#[test]
fn note_on_reads_two_bytes_and_delta() {
    use pretty_assertions::assert_eq;
    let (event, remaining) = read_one(&[0x92, 60, 100, 0x83, 0x60, 0xAA]);
    assert!(!event.is_meta());
    assert_eq!(event.command(), Some(Command::NoteOn));
    assert_eq!(event.channel(), Some(2));
    assert_eq!(event.data(), &[60, 100]);
    assert_eq!(event.delay().value(), 480);
    assert_eq!(remaining, 1);
}

#[test]
fn program_change_reads_one_byte() {
    use pretty_assertions::assert_eq;
    let (event, remaining) = read_one(&[0xC0, 5, 0x10]);
    assert_eq!(event.command(), Some(Command::ProgramChange));
    assert_eq!(event.data(), &[5]);
    assert_eq!(event.delay().value(), 0x10);
    assert_eq!(remaining, 0);
}

#[test]
fn two_byte_commands() {
    use pretty_assertions::assert_eq;
    for status in [0x80, 0x90, 0xA0, 0xB0, 0xE0] {
        let (event, remaining) = read_one(&[status, 1, 2, 0]);
        assert_eq!(event.data(), &[1, 2]);
        assert_eq!(remaining, 0);
    }
    for status in [0xC0, 0xD0, 0xF0] {
        let (event, remaining) = read_one(&[status, 1, 0]);
        assert_eq!(event.data(), &[1]);
        assert_eq!(remaining, 0);
    }
}

#[test]
fn unknown_command_is_accepted_with_one_byte() {
    use pretty_assertions::assert_eq;
    let (event, remaining) = read_one(&[0x3C, 0x40, 0x00, 0x99]);
    assert_eq!(event.command(), None);
    assert_eq!(event.data(), &[0x40]);
    assert_eq!(remaining, 1);
}

#[test]
fn meta_tempo() {
    use pretty_assertions::assert_eq;
    let (event, remaining) = read_one(&[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, 0x00]);
    assert!(event.is_meta());
    assert_eq!(event.meta_type(), Some(MetaType::Tempo));
    assert_eq!(event.code().full_cmd(), 0x51);
    assert_eq!(event.channel(), None);
    assert_eq!(event.data(), &[0x07, 0xA1, 0x20]);
    assert_eq!(remaining, 0);
}

#[test]
fn meta_text() {
    use pretty_assertions::assert_eq;
    let (event, _) = read_one(&[0xFF, 0x03, 0x05, b'P', b'i', b'a', b'n', b'o', 0x00]);
    assert_eq!(event.meta_type(), Some(MetaType::TrackName));
    assert_eq!(event.text().as_deref(), Some("Piano"));
}

#[test]
fn track_end_reads_no_delta() {
    use pretty_assertions::assert_eq;
    let (event, remaining) = read_one(&[0xFF, 0x2F, 0x00, 0x55]);
    assert_eq!(event.meta_type(), Some(MetaType::TrackEnd));
    assert!(event.data().is_empty());
    assert_eq!(event.delay(), Vlv::ZERO);
    assert_eq!(remaining, 1);
}

#[test]
fn truncated_payload() {
    let mut reader = Reader::from_byte_slice(&[0xFF, 0x01, 0x05, b'a', b'b']);
    assert!(Event::read(&mut reader).unwrap_err().is_truncated());

    let mut reader = Reader::from_byte_slice(&[0x90, 60]);
    assert!(Event::read(&mut reader).unwrap_err().is_truncated());

    // missing trailing delta
    let mut reader = Reader::from_byte_slice(&[0x90, 60, 100]);
    assert!(Event::read(&mut reader).unwrap_err().is_truncated());
}
