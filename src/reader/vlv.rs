use super::{ReadResult, Reader};
use alloc::vec::Vec;

const CONTINUATION_BIT: u8 = 0x80;
const DATA_MASK: u8 = 0x7F;

#[doc = r#"
A MIDI variable-length value.

Seven bits per byte, most significant group first. Every byte except the
last has its top bit set.

Used for track pre-delays, the delta time that follows each event and the
length prefix of meta events.

# Example
```rust
# use midibeep::prelude::*;
let bytes = [0x81, 0x00];
let mut reader = Reader::from_byte_slice(&bytes);
assert_eq!(Vlv::read(&mut reader).unwrap().value(), 0x80);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vlv(u32);

impl Vlv {
    /// Zero pulses
    pub const ZERO: Self = Self(0);

    /// Wrap a value
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The decoded value
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Decode a value from the reader.
    ///
    /// There is no limit on the number of groups. Overlong input shifts
    /// the high bits out of the 32-bit accumulator.
    pub fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let mut value: u32 = 0;
        loop {
            let byte = reader.read_u8()?;
            value = (value << 7) | u32::from(byte & DATA_MASK);
            if byte & CONTINUATION_BIT == 0 {
                return Ok(Self(value));
            }
        }
    }

    /// Encode the value, shortest form.
    pub fn encode(&self) -> Vec<u8> {
        let mut groups = Vec::with_capacity(5);
        let mut rest = self.0;
        groups.push((rest & u32::from(DATA_MASK)) as u8);
        rest >>= 7;
        while rest != 0 {
            groups.push((rest & u32::from(DATA_MASK)) as u8 | CONTINUATION_BIT);
            rest >>= 7;
        }
        groups.reverse();
        groups
    }
}

impl From<u32> for Vlv {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Vlv> for u32 {
    fn from(value: Vlv) -> Self {
        value.0
    }
}

#[cfg(test)]
fn decode(bytes: &[u8]) -> u32 {
    let mut reader = Reader::from_byte_slice(bytes);
    let value = Vlv::read(&mut reader).unwrap();
    assert!(reader.is_empty());
    value.value()
}

#[test]
fn known_encodings() {
    use pretty_assertions::assert_eq;
    assert_eq!(Vlv::new(0x00).encode(), [0x00]);
    assert_eq!(Vlv::new(0x40).encode(), [0x40]);
    assert_eq!(Vlv::new(0x7F).encode(), [0x7F]);
    assert_eq!(Vlv::new(0x80).encode(), [0x81, 0x00]);
    assert_eq!(Vlv::new(0x2000).encode(), [0xC0, 0x00]);
    assert_eq!(Vlv::new(0x3FFF).encode(), [0xFF, 0x7F]);
    assert_eq!(Vlv::new(0x4000).encode(), [0x81, 0x80, 0x00]);
    assert_eq!(Vlv::new(0x0FFF_FFFF).encode(), [0xFF, 0xFF, 0xFF, 0x7F]);
}

#[test]
fn decode_known_values() {
    use pretty_assertions::assert_eq;
    assert_eq!(decode(&[0x00]), 0);
    assert_eq!(decode(&[0x81, 0x00]), 0x80);
    assert_eq!(decode(&[0xFF, 0x7F]), 0x3FFF);
    assert_eq!(decode(&[0x83, 0x60]), 480);
    assert_eq!(decode(&[0xFF, 0xFF, 0xFF, 0x7F]), 0x0FFF_FFFF);
}

#[test]
fn round_trip_28_bit_range() {
    use pretty_assertions::assert_eq;
    for value in [1, 127, 128, 255, 16_383, 16_384, 2_097_151, 2_097_152, 0x0FFF_FFFF] {
        assert_eq!(decode(&Vlv::new(value).encode()), value);
    }
}

#[test]
fn stops_at_first_clear_top_bit() {
    use pretty_assertions::assert_eq;
    let bytes = [0x81, 0x00, 0x90];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert_eq!(Vlv::read(&mut reader).unwrap().value(), 0x80);
    assert_eq!(reader.remaining(), 1);
}

#[test]
fn overlong_value_is_not_rejected() {
    // six groups overflow 32 bits; the high bits are shifted out
    let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert!(Vlv::read(&mut reader).is_ok());
    assert!(reader.is_empty());
}

#[test]
fn unterminated_value_is_truncated() {
    let bytes = [0x81, 0x80];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert!(Vlv::read(&mut reader).unwrap_err().is_truncated());
}
