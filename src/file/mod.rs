#![doc = r#"
Rusty representation of a decoded [`MidiFile`]

# Example Structure

```text
[Header Chunk: "MThd"]
[Track Chunk 1: "MTrk"]
[Track Chunk 2: "MTrk"]
...
[Track Chunk N: "MTrk"]
```

Tracks are not seekable: each one starts where the previous one ended, and
exactly as many are decoded as the header declares.
"#]

mod header;
pub use header::*;

mod track;
pub use track::*;

mod summary;
pub use summary::*;

use crate::reader::{ReadResult, Reader};
use alloc::vec::Vec;

#[doc = r#"
A whole decoded file: the header and every declared track.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiFile {
    header: MthdHeader,
    tracks: Vec<MtrkChunk>,
}

impl MidiFile {
    /// Assemble a file from already decoded parts
    pub fn new(header: MthdHeader, tracks: Vec<MtrkChunk>) -> Self {
        Self { header, tracks }
    }

    /// Parse a set of bytes into a file struct.
    ///
    /// Decoding is all or nothing: the first failure aborts the whole file.
    /// A bad `MThd` magic fails before any track is looked at.
    pub fn parse(bytes: &[u8]) -> ReadResult<Self> {
        let mut reader = Reader::from_byte_slice(bytes);
        let header = MthdHeader::read(&mut reader)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            format = header.format().as_u16(),
            tracks = header.track_count(),
            ppqn = header.ppqn(),
            "decoded header"
        );

        let mut tracks = Vec::with_capacity(header.track_count() as usize);
        for _index in 0..header.track_count() {
            let track = MtrkChunk::read(&mut reader)?;

            #[cfg(feature = "tracing")]
            tracing::debug!(
                index = _index,
                length = track.header().length(),
                events = track.events().len(),
                "decoded track"
            );

            tracks.push(track);
        }

        Ok(Self { header, tracks })
    }

    /// Returns header info
    pub const fn header(&self) -> &MthdHeader {
        &self.header
    }

    /// Returns the track list
    pub fn tracks(&self) -> &[MtrkChunk] {
        &self.tracks
    }

    /// Returns one track
    pub fn track(&self, index: usize) -> Option<&MtrkChunk> {
        self.tracks.get(index)
    }

    /// Count note events per track and channel.
    ///
    /// Useful to pick which track and channel to sequence.
    pub fn analyze(&self) -> Vec<TrackSummary> {
        self.tracks.iter().map(TrackSummary::from_track).collect()
    }
}

#[cfg(test)]
fn file_bytes(format: u16, tracks: &[&[u8]]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&96u16.to_be_bytes());
    for payload in tracks {
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(payload);
    }
    bytes
}

#[test]
fn parse_two_tracks() {
    use pretty_assertions::assert_eq;
    let bytes = file_bytes(
        1,
        &[
            &[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, 0x00, 0xFF, 0x2F, 0x00],
            &[0x00, 0x90, 60, 100, 0x60, 0x80, 60, 0, 0x00, 0xFF, 0x2F, 0x00],
        ],
    );
    let file = MidiFile::parse(&bytes).unwrap();
    assert_eq!(file.header().format(), Format::Simultaneous);
    assert_eq!(file.header().ppqn(), 96);
    assert_eq!(file.tracks().len(), 2);
    assert_eq!(file.track(1).unwrap().events().len(), 3);
    assert!(file.track(2).is_none());
}

#[test]
fn fewer_tracks_than_declared() {
    let mut bytes = file_bytes(1, &[&[0x00, 0xFF, 0x2F, 0x00]]);
    // claim two tracks
    bytes[11] = 2;
    assert!(MidiFile::parse(&bytes).unwrap_err().is_truncated());
}

#[test]
fn corrupted_header_magic() {
    let mut bytes = file_bytes(1, &[&[0x00, 0xFF, 0x2F, 0x00]]);
    bytes[0] = b'X';
    let err = MidiFile::parse(&bytes).unwrap_err();
    assert!(err.is_invalid_magic());
    assert_eq!(err.position(), 0);
}
