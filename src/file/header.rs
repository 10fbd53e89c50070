use crate::reader::{ReadResult, Reader, ReaderError, ReaderErrorKind};

/// Chunk magic of the file header
pub const MTHD_MAGIC: [u8; 4] = *b"MThd";

const MTHD_BODY_LEN: u32 = 6;

#[doc = r#"
How the tracks of a file relate to each other.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Format {
    /// Format 0: one track holding every channel
    SingleMultiChannel,
    /// Format 1: tracks play together, the first one carries tempo
    Simultaneous,
    /// Format 2: tracks are independent patterns
    SequentiallyIndependent,
}

impl Format {
    /// The number stored in the header
    pub const fn as_u16(&self) -> u16 {
        match self {
            Self::SingleMultiChannel => 0,
            Self::Simultaneous => 1,
            Self::SequentiallyIndependent => 2,
        }
    }
}

impl TryFrom<u16> for Format {
    type Error = ReaderErrorKind;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::SingleMultiChannel),
            1 => Ok(Self::Simultaneous),
            2 => Ok(Self::SequentiallyIndependent),
            v => Err(ReaderErrorKind::InvalidFormat(v)),
        }
    }
}

#[doc = r#"
The `MThd` chunk.

```text
"MThd"  length(u32)  format(u16)  tracks(u16)  division(u16)
```

All integers are big-endian. The length is 6 in practice; any extra bytes
a longer header declares are skipped.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MthdHeader {
    length: u32,
    format: Format,
    track_count: u16,
    ppqn: u16,
}

impl MthdHeader {
    /// Create a header
    pub const fn new(format: Format, track_count: u16, ppqn: u16) -> Self {
        Self {
            length: MTHD_BODY_LEN,
            format,
            track_count,
            ppqn,
        }
    }

    /// Decode the header chunk.
    ///
    /// # Errors
    /// - [`ReaderErrorKind::InvalidChunkMagic`] if the magic is not `MThd`
    /// - [`ReaderErrorKind::InvalidFormat`] if the format is not 0, 1 or 2
    /// - [`ReaderErrorKind::TruncatedStream`] on a short read
    pub fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let position = reader.buffer_position();
        let magic = reader.read_exact_size::<4>()?;
        if magic != MTHD_MAGIC {
            return Err(ReaderError::invalid_magic(position, MTHD_MAGIC, magic));
        }
        let length = reader.read_u32_be()?;

        let format_position = reader.buffer_position();
        let format = Format::try_from(reader.read_u16_be()?)
            .map_err(|kind| ReaderError::new(format_position, kind))?;
        let track_count = reader.read_u16_be()?;
        let ppqn = reader.read_u16_be()?;

        if length > MTHD_BODY_LEN {
            reader.read_exact((length - MTHD_BODY_LEN) as usize)?;
        }

        Ok(Self {
            length,
            format,
            track_count,
            ppqn,
        })
    }

    /// The declared chunk length
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// The file format
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Number of `MTrk` chunks that follow
    pub const fn track_count(&self) -> u16 {
        self.track_count
    }

    /// The raw division word. Pulses per quarter note unless the top bit is
    /// set, in which case the file uses SMPTE timing.
    pub const fn ppqn(&self) -> u16 {
        self.ppqn
    }

    /// True if the division word describes SMPTE frames
    pub const fn is_smpte(&self) -> bool {
        self.ppqn & 0x8000 != 0
    }
}

#[test]
fn read_header() {
    use pretty_assertions::assert_eq;
    let bytes = [
        b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 3, 0x01, 0xE0,
    ];
    let mut reader = Reader::from_byte_slice(&bytes);
    let header = MthdHeader::read(&mut reader).unwrap();
    assert_eq!(header.format(), Format::Simultaneous);
    assert_eq!(header.track_count(), 3);
    assert_eq!(header.ppqn(), 480);
    assert!(!header.is_smpte());
    assert!(reader.is_empty());
}

#[test]
fn longer_header_is_skipped() {
    use pretty_assertions::assert_eq;
    let bytes = [
        b'M', b'T', b'h', b'd', 0, 0, 0, 8, 0, 0, 0, 1, 0, 96, 0xAA, 0xBB, 0xCC,
    ];
    let mut reader = Reader::from_byte_slice(&bytes);
    let header = MthdHeader::read(&mut reader).unwrap();
    assert_eq!(header.length(), 8);
    assert_eq!(header.format(), Format::SingleMultiChannel);
    assert_eq!(reader.remaining(), 1);
}

#[test]
fn bad_magic() {
    use pretty_assertions::assert_eq;
    let bytes = [b'R', b'I', b'F', b'F', 0, 0, 0, 6, 0, 1, 0, 1, 0, 96];
    let mut reader = Reader::from_byte_slice(&bytes);
    let err = MthdHeader::read(&mut reader).unwrap_err();
    assert_eq!(
        err.error_kind(),
        &ReaderErrorKind::InvalidChunkMagic {
            expected: *b"MThd",
            found: *b"RIFF"
        }
    );
    assert_eq!(err.position(), 0);
}

#[test]
fn bad_format() {
    use pretty_assertions::assert_eq;
    let bytes = [b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 7, 0, 1, 0, 96];
    let mut reader = Reader::from_byte_slice(&bytes);
    let err = MthdHeader::read(&mut reader).unwrap_err();
    assert_eq!(err.error_kind(), &ReaderErrorKind::InvalidFormat(7));
    assert_eq!(err.position(), 8);
}
