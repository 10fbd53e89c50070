#![doc = r#"
Bounds-checked sequential reading over an in-memory byte buffer.

Every decoder in the crate pulls its bytes through a [`Reader`]. A short read
is always fatal: asking for `n` bytes either yields exactly `n` bytes or a
[`ReaderErrorKind::TruncatedStream`] error, and the position never moves
backwards.
"#]

mod error;
pub use error::*;

mod vlv;
pub use vlv::*;

/// A forward-only cursor over a byte slice.
///
/// Positions reported in errors are absolute: a reader created with
/// [`Reader::sub_reader`] remembers where its slice started in the
/// enclosing buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    position: usize,
    base_offset: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader at the start of `data`
    pub const fn from_byte_slice(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            base_offset: 0,
        }
    }

    /// Absolute offset of the next byte to be read
    pub const fn buffer_position(&self) -> usize {
        self.base_offset + self.position
    }

    /// Number of bytes not yet consumed
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// True once every byte has been consumed
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read exactly `len` bytes.
    ///
    /// # Errors
    /// [`ReaderErrorKind::TruncatedStream`] if fewer than `len` bytes remain.
    /// The position is left untouched in that case.
    pub fn read_exact(&mut self, len: usize) -> ReadResult<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(ReaderError::truncated(
                self.buffer_position(),
                len,
                remaining,
            ));
        }
        let start = self.position;
        self.position += len;
        Ok(&self.data[start..self.position])
    }

    /// Read exactly `N` bytes into an array
    pub fn read_exact_size<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let bytes = self.read_exact(N)?;
        let mut out = [0; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> ReadResult<u8> {
        let [byte] = self.read_exact_size()?;
        Ok(byte)
    }

    /// Read a big-endian `u16`
    pub fn read_u16_be(&mut self) -> ReadResult<u16> {
        self.read_exact_size().map(u16::from_be_bytes)
    }

    /// Read a big-endian `u32`
    pub fn read_u32_be(&mut self) -> ReadResult<u32> {
        self.read_exact_size().map(u32::from_be_bytes)
    }

    /// Read a variable-length value
    pub fn read_vlv(&mut self) -> ReadResult<Vlv> {
        Vlv::read(self)
    }

    /// Consume `len` bytes and return a reader limited to them.
    ///
    /// Decoding through the returned reader can never run past those bytes.
    pub fn sub_reader(&mut self, len: usize) -> ReadResult<Reader<'a>> {
        let base_offset = self.buffer_position();
        let data = self.read_exact(len)?;
        Ok(Reader {
            data,
            position: 0,
            base_offset,
        })
    }
}

#[test]
fn short_read_is_fatal_and_does_not_advance() {
    use pretty_assertions::assert_eq;
    let bytes = [1, 2, 3];
    let mut reader = Reader::from_byte_slice(&bytes);

    assert_eq!(reader.read_exact(2).unwrap(), &[1, 2]);
    let err = reader.read_exact(2).unwrap_err();
    assert_eq!(
        err.error_kind(),
        &ReaderErrorKind::TruncatedStream {
            requested: 2,
            remaining: 1
        }
    );
    assert_eq!(err.position(), 2);
    assert_eq!(reader.remaining(), 1);
    assert_eq!(reader.read_u8().unwrap(), 3);
    assert!(reader.is_empty());
}

#[test]
fn big_endian_integers() {
    use pretty_assertions::assert_eq;
    let bytes = [0x00, 0x06, 0x00, 0x00, 0x01, 0xE0];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert_eq!(reader.read_u16_be().unwrap(), 6);
    assert_eq!(reader.read_u32_be().unwrap(), 0x1E0);
}

#[test]
fn sub_reader_positions_are_absolute() {
    use pretty_assertions::assert_eq;
    let bytes = [0xAA, 0xBB, 0x01, 0x02, 0xCC];
    let mut reader = Reader::from_byte_slice(&bytes);
    reader.read_exact(2).unwrap();

    let mut sub = reader.sub_reader(2).unwrap();
    assert_eq!(reader.buffer_position(), 4);
    assert_eq!(sub.buffer_position(), 2);
    assert_eq!(sub.read_u8().unwrap(), 0x01);
    assert_eq!(sub.read_u8().unwrap(), 0x02);

    let err = sub.read_u8().unwrap_err();
    assert!(err.is_truncated());
    assert_eq!(err.position(), 4);
}

#[test]
fn sub_reader_longer_than_buffer() {
    let bytes = [0x00, 0x01];
    let mut reader = Reader::from_byte_slice(&bytes);
    let err = reader.sub_reader(3).unwrap_err();
    assert!(err.is_truncated());
}
