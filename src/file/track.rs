use crate::{
    event::{Event, EventCode, MetaType},
    reader::{ReadResult, Reader, ReaderError, Vlv},
};
use alloc::vec::Vec;

/// Chunk magic of a track
pub const MTRK_MAGIC: [u8; 4] = *b"MTrk";

/// The eight bytes in front of a track payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MtrkHeader {
    length: u32,
}

impl MtrkHeader {
    /// Decode the magic and payload length.
    pub fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let position = reader.buffer_position();
        let magic = reader.read_exact_size::<4>()?;
        if magic != MTRK_MAGIC {
            return Err(ReaderError::invalid_magic(position, MTRK_MAGIC, magic));
        }
        let length = reader.read_u32_be()?;
        Ok(Self { length })
    }

    /// Declared payload length in bytes
    pub const fn length(&self) -> u32 {
        self.length
    }
}

#[doc = r#"
One `MTrk` chunk: the pre-delay and every event up to the end of the
declared payload.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MtrkChunk {
    header: MtrkHeader,
    predelay: Vlv,
    events: Vec<Event>,
}

impl MtrkChunk {
    /// Build a track by hand
    pub fn new(predelay: Vlv, events: Vec<Event>) -> Self {
        Self {
            header: MtrkHeader { length: 0 },
            predelay,
            events,
        }
    }

    /// Decode one track chunk.
    ///
    /// The whole declared payload is taken from `reader` before any event
    /// is decoded, so a length that overruns the buffer fails up front.
    /// Events are then read until the payload is used up; an event that
    /// would run past it fails with a truncated stream error.
    pub fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let header = MtrkHeader::read(reader)?;
        let mut payload = reader.sub_reader(header.length as usize)?;

        let predelay = payload.read_vlv()?;
        let mut events = Vec::new();
        while !payload.is_empty() {
            let event = Event::read(&mut payload)?;
            #[cfg(feature = "tracing")]
            tracing::trace!(
                code = %event.code(),
                meta = event.is_meta(),
                len = event.data().len(),
                delay = event.delay().value(),
                "decoded event"
            );
            events.push(event);
        }

        Ok(Self {
            header,
            predelay,
            events,
        })
    }

    /// The chunk header
    pub const fn header(&self) -> &MtrkHeader {
        &self.header
    }

    /// Pulses before the first event
    pub const fn predelay(&self) -> Vlv {
        self.predelay
    }

    /// Events in file order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The first event whose code equals `code`.
    ///
    /// This is a plain scan over every event, channel events included.
    pub fn find_first_event_by_code(&self, code: EventCode) -> Option<&Event> {
        self.events.iter().find(|event| event.code() == code)
    }

    /// The first meta event of type `meta`
    pub fn find_meta(&self, meta: MetaType) -> Option<&Event> {
        let code = EventCode::from_meta(meta);
        self.events
            .iter()
            .find(|event| event.is_meta() && event.code() == code)
    }
}

#[cfg(test)]
fn chunk(payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MTrk");
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

#[test]
fn read_track() {
    use crate::event::Command;
    use pretty_assertions::assert_eq;
    let bytes = chunk(&[
        0x05, // pre-delay
        0xFF, 0x03, 0x02, b'h', b'i', 0x00, // name
        0x90, 60, 100, 0x60, // note on
        0x80, 60, 0, 0x00, // note off
        0xFF, 0x2F, 0x00,
    ]);
    let mut reader = Reader::from_byte_slice(&bytes);
    let track = MtrkChunk::read(&mut reader).unwrap();

    assert!(reader.is_empty());
    assert_eq!(track.predelay().value(), 5);
    assert_eq!(track.events().len(), 4);
    assert_eq!(track.events()[1].command(), Some(Command::NoteOn));
    assert_eq!(track.events()[1].delay().value(), 0x60);
    assert_eq!(track.events()[3].meta_type(), Some(MetaType::TrackEnd));

    let name = track.find_meta(MetaType::TrackName).unwrap();
    assert_eq!(name.data(), b"hi");
    assert!(track.find_meta(MetaType::Copyright).is_none());
}

#[test]
fn find_first_by_code() {
    use pretty_assertions::assert_eq;
    let bytes = chunk(&[
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, 0x00, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40,
        0x00,
    ]);
    let mut reader = Reader::from_byte_slice(&bytes);
    let track = MtrkChunk::read(&mut reader).unwrap();
    let tempo = track
        .find_first_event_by_code(EventCode::from_byte(0x51))
        .unwrap();
    assert_eq!(tempo.data(), &[0x07, 0xA1, 0x20]);
}

#[test]
fn stops_at_declared_length() {
    use pretty_assertions::assert_eq;
    let mut bytes = chunk(&[0x00, 0xC0, 0x01, 0x00]);
    bytes.extend_from_slice(b"trailing");
    let mut reader = Reader::from_byte_slice(&bytes);
    let track = MtrkChunk::read(&mut reader).unwrap();
    assert_eq!(track.events().len(), 1);
    assert_eq!(reader.remaining(), 8);
}

#[test]
fn event_past_declared_length() {
    // the note on needs a delta that lies outside the chunk
    let mut bytes = chunk(&[0x00, 0x90, 60, 100]);
    bytes.push(0x00);
    let mut reader = Reader::from_byte_slice(&bytes);
    assert!(MtrkChunk::read(&mut reader).unwrap_err().is_truncated());
}

#[test]
fn declared_length_overruns_buffer() {
    use pretty_assertions::assert_eq;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MTrk");
    bytes.extend_from_slice(&100u32.to_be_bytes());
    bytes.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
    let mut reader = Reader::from_byte_slice(&bytes);
    let err = MtrkChunk::read(&mut reader).unwrap_err();
    assert!(err.is_truncated());
    assert_eq!(err.position(), 8);
}

#[test]
fn bad_track_magic() {
    let mut bytes = chunk(&[0x00, 0xFF, 0x2F, 0x00]);
    bytes[3] = b'x';
    let mut reader = Reader::from_byte_slice(&bytes);
    assert!(MtrkChunk::read(&mut reader).unwrap_err().is_invalid_magic());
}
