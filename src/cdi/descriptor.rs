/*
    segakatana
    https://github.com/segakatana-rs/segakatana

    Copyright 2025 Segakatana Project Contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/cdi/descriptor.rs

    The variable-length descriptor at the tail of a .cdi container. This is
    the reverse-engineered byte layout DiscJuggler writes; there is no public
    documentation for it, so every offset below is load-bearing.
*/

use crate::cdi::session::Session;
use crate::cdi::track::{SectorSizeClass, Track, TrackMode};
use crate::error::{DiscImageError, Result};
use crate::io::{ReadSeek, SeekFrom};

const TRACK_START_MARKER: [u8; 20] = [
    0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
    0xFF,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorType {
    /// DiscJuggler 2.x
    Type1,
    /// DiscJuggler 3.x
    Type2,
    /// DiscJuggler 3.5+
    Type3,
}

impl DescriptorType {
    fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0x8000_0004 => Ok(DescriptorType::Type1),
            0x8000_0005 => Ok(DescriptorType::Type2),
            0x8000_0006 => Ok(DescriptorType::Type3),
            _ => Err(DiscImageError::InvalidDescriptorType),
        }
    }

    fn is_type1(&self) -> bool {
        matches!(self, DescriptorType::Type1)
    }
}

/// A small cursor over an owned byte buffer with the relative-offset peeks
/// the descriptor grammar needs (read a field a few bytes ahead of the
/// cursor without consuming the bytes in between).
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn require(&self, len: usize) -> Result<()> {
        if self.remaining() < len {
            Err(DiscImageError::TruncatedDescriptor)
        } else {
            Ok(())
        }
    }

    fn advance(&mut self, n: usize) -> Result<()> {
        self.require(n)?;
        self.pos += n;
        Ok(())
    }

    fn peek_u32_le(&self, rel_offset: usize) -> Result<u32> {
        self.require(rel_offset + 4)?;
        let start = self.pos + rel_offset;
        Ok(u32::from_le_bytes(self.buf[start..start + 4].try_into().unwrap()))
    }

    fn peek_bytes(&self, rel_offset: usize, len: usize) -> Result<&'a [u8]> {
        self.require(rel_offset + len)?;
        let start = self.pos + rel_offset;
        Ok(&self.buf[start..start + len])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        self.require(2)?;
        let v = u16::from_le_bytes(self.buf[self.pos..self.pos + 2].try_into().unwrap());
        self.pos += 2;
        Ok(v)
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.require(1)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.require(n)?;
        let v = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(v)
    }
}

/// The descriptor type, size, and decoded session/track table produced by
/// [`parse_descriptor`]. `descriptor_size` includes the trailing 8-byte tail,
/// matching the source tool's own accounting (see DESIGN.md).
pub struct ParsedDescriptor {
    pub descriptor_type: DescriptorType,
    pub descriptor_size: u64,
    pub file_size: u64,
    pub sessions: Vec<Session>,
}

/// Parses the descriptor tail and the variable-length descriptor that
/// precedes it, returning the descriptor's type and the session/track table
/// it encodes.
pub fn parse_descriptor<R: ReadSeek>(reader: &mut R) -> Result<ParsedDescriptor> {
    let file_size = reader.seek(SeekFrom::End(0))?;
    if file_size < 8 {
        return Err(DiscImageError::TruncatedDescriptor);
    }

    reader.seek(SeekFrom::Start(file_size - 8))?;
    let mut tail = [0u8; 8];
    read_exact_checked(reader, &mut tail)?;
    let descriptor_type = DescriptorType::from_raw(u32::from_le_bytes(tail[0..4].try_into().unwrap()))?;
    let helper = u32::from_le_bytes(tail[4..8].try_into().unwrap()) as u64;

    let descriptor_size = match descriptor_type {
        DescriptorType::Type3 => helper,
        _ => file_size.saturating_sub(helper),
    };
    if descriptor_size == 0 || descriptor_size > file_size {
        return Err(DiscImageError::TruncatedDescriptor);
    }
    let descriptor_offset = file_size - descriptor_size;

    reader.seek(SeekFrom::Start(descriptor_offset))?;
    let mut buf = vec![0u8; descriptor_size as usize];
    read_exact_checked(reader, &mut buf)?;

    let sessions = parse_sessions(&buf, descriptor_type)?;
    Ok(ParsedDescriptor {
        descriptor_type,
        descriptor_size,
        file_size,
        sessions,
    })
}

fn read_exact_checked<R: ReadSeek>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    use crate::io::Read;
    reader.read_exact(buf).map_err(|_| DiscImageError::IoShortRead)
}

fn parse_sessions(buf: &[u8], descriptor_type: DescriptorType) -> Result<Vec<Session>> {
    let mut reader = ByteReader::new(buf);
    let session_count = reader.read_u16_le()?;

    let mut sessions = Vec::with_capacity(session_count as usize);
    for session_index in 0..session_count {
        let track_count = reader.read_u16_le()?;
        let mut tracks = Vec::with_capacity(track_count as usize);

        for track_index in 0..track_count {
            tracks.push(parse_track(&mut reader, track_index, descriptor_type)?);
        }

        reader.advance(12)?;
        if !descriptor_type.is_type1() {
            reader.advance(1)?;
        }

        sessions.push(Session {
            index: session_index,
            tracks,
        });
    }

    Ok(sessions)
}

fn parse_track(reader: &mut ByteReader, track_index: u16, descriptor_type: DescriptorType) -> Result<Track> {
    // DJ 3.00.780 and up emits 8 extra prefix bytes when this leading dword is non-zero.
    if reader.peek_u32_le(0)? != 0 {
        reader.advance(8)?;
    }

    let marker = reader.peek_bytes(4, 20)?;
    if marker != TRACK_START_MARKER {
        log::warn!(
            "track {}: track-start marker mismatch (possible third-party DiscJuggler variant); continuing",
            track_index
        );
    }

    // The 4 bytes at relative +24 have no known meaning; preserved as an opaque skip (see DESIGN.md).
    let _unknown_at_24 = reader.peek_bytes(24, 4)?;

    let filename_len = reader.peek_bytes(28, 1)?[0] as usize;
    let filename_bytes = reader.peek_bytes(29, filename_len)?;
    let filename = String::from_utf8_lossy(filename_bytes).into_owned();
    reader.advance(29 + filename_len)?;

    reader.advance(19)?;
    if reader.peek_u32_le(0)? == 0x8000_0000 {
        reader.advance(8)?;
    }

    let pregap_length = reader.peek_u32_le(6)?;
    let body_length = reader.peek_u32_le(10)?;
    let mode = TrackMode::from_raw(reader.peek_u32_le(20)?)?;
    let base_lba = reader.peek_u32_le(36)?;
    let total_length = reader.peek_u32_le(40)?;
    let sector_size = SectorSizeClass::from_raw(reader.peek_u32_le(60)?)?;

    reader.advance(93)?;

    if !descriptor_type.is_type1() {
        if reader.peek_u32_le(5)? == 0xFFFF_FFFF {
            reader.advance(78)?; // DJ 3.00.780 and up
        }
        reader.advance(9)?;
    }

    Ok(Track {
        index: track_index,
        filename,
        pregap_length,
        body_length,
        total_length,
        mode,
        sector_size,
        base_lba,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Cursor;

    /// Builds a minimal, well-formed type-1 track record matching the
    /// grammar in `parse_track`, with the caller's field values spliced in.
    fn build_track_bytes(
        filename: &str,
        pregap: u32,
        body_len: u32,
        mode: u32,
        lba: u32,
        total_len: u32,
        sector_size: u32,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&[0u8; 4]); // leading dword == 0, no extra 8-byte prefix
        out.extend_from_slice(&TRACK_START_MARKER);
        out.extend_from_slice(&[0u8; 4]); // unknown bytes at +24
        out.push(filename.len() as u8);
        out.extend_from_slice(filename.as_bytes());
        out.extend_from_slice(&[0u8; 19]);
        // No 0x80000000 marker here, so the optional extra 8 bytes are skipped.
        // The field block begins here; pad to reach relative offsets used below.
        let mut fields = vec![0u8; 93];
        fields[6..10].copy_from_slice(&pregap.to_le_bytes());
        fields[10..14].copy_from_slice(&body_len.to_le_bytes());
        fields[20..24].copy_from_slice(&mode.to_le_bytes());
        fields[36..40].copy_from_slice(&lba.to_le_bytes());
        fields[40..44].copy_from_slice(&total_len.to_le_bytes());
        fields[60..64].copy_from_slice(&sector_size.to_le_bytes());
        out.extend_from_slice(&fields);
        out
    }

    fn build_type1_descriptor(tracks: &[(u32, u32, u32, u32, u32, u32)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&1u16.to_le_bytes()); // one session
        out.extend_from_slice(&(tracks.len() as u16).to_le_bytes());
        for (i, &(pregap, body_len, mode, lba, total_len, sector_size)) in tracks.iter().enumerate() {
            out.extend_from_slice(&build_track_bytes(
                &format!("T{i}.bin"),
                pregap,
                body_len,
                mode,
                lba,
                total_len,
                sector_size,
            ));
        }
        out.extend_from_slice(&[0u8; 12]);
        out
    }

    fn append_type1_tail(mut descriptor: Vec<u8>) -> Vec<u8> {
        // For type1, helper is the descriptor's absolute start offset; since our
        // descriptor is the entire file minus the 8-byte tail, that offset is 0.
        descriptor.extend_from_slice(&0x8000_0004u32.to_le_bytes());
        descriptor.extend_from_slice(&0u32.to_le_bytes());
        descriptor
    }

    #[test]
    fn parses_single_session_single_track() {
        let descriptor = build_type1_descriptor(&[(150, 150, 2, 0, 300, 2)]);
        let data = append_type1_tail(descriptor);
        let mut cursor = Cursor::new(data);

        let parsed = parse_descriptor(&mut cursor).unwrap();
        assert_eq!(parsed.descriptor_type, DescriptorType::Type1);
        assert_eq!(parsed.sessions.len(), 1);
        assert_eq!(parsed.sessions[0].tracks.len(), 1);
        let track = &parsed.sessions[0].tracks[0];
        assert_eq!(track.mode, TrackMode::Mode2);
        assert_eq!(track.sector_size, SectorSizeClass::Size2352);
        assert_eq!(track.pregap_length, 150);
        assert_eq!(track.body_length, 150);
        assert_eq!(track.total_length, 300);
        assert_eq!(track.base_lba, 0);
    }

    #[test]
    fn rejects_unknown_tail_type() {
        let mut data = vec![0u8; 16];
        data[8..12].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        let mut cursor = Cursor::new(data);
        assert!(matches!(
            parse_descriptor(&mut cursor),
            Err(DiscImageError::InvalidDescriptorType)
        ));
    }

    #[test]
    fn open_session_has_no_tracks() {
        let mut out = Vec::new();
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // zero tracks: open session
        out.extend_from_slice(&[0u8; 12]);
        let data = append_type1_tail(out);
        let mut cursor = Cursor::new(data);

        let parsed = parse_descriptor(&mut cursor).unwrap();
        assert_eq!(parsed.sessions.len(), 1);
        assert!(parsed.sessions[0].is_open());
    }
}
