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

    src/sector_stream.rs

    Translates logical (session, track, LBA) addressing into a byte offset
    in the container, strips per-sector headers, and caches the read cursor
    so sequential reads over one track don't re-seek for every sector.
*/

use crate::cdi::{parse_descriptor, DescriptorType, Session, Track};
use crate::error::{DiscImageError, Result};
use crate::io::{Read, ReadSeek, ReadWriteSeek, SeekFrom, Write};

/// Tracks the position of the last sequential read so that a run of
/// monotonically increasing LBA reads within one track costs one absolute
/// seek plus N relative reads, not N absolute seeks.
#[derive(Clone, Copy, Debug)]
struct CursorState {
    session: u16,
    track: u16,
    next_lba: u32,
    file_pos: u64,
}

pub struct SectorStream<R> {
    reader: R,
    sessions: Vec<Session>,
    descriptor_type: DescriptorType,
    descriptor_size: u64,
    file_size: u64,
    cursor: Option<CursorState>,
}

impl<R: ReadSeek> SectorStream<R> {
    /// Opens a container, parsing its descriptor tail into the session/track
    /// table. The underlying reader is kept open for subsequent sector reads.
    pub fn open(mut reader: R) -> Result<Self> {
        let parsed = parse_descriptor(&mut reader)?;
        Ok(SectorStream {
            reader,
            sessions: parsed.sessions,
            descriptor_type: parsed.descriptor_type,
            descriptor_size: parsed.descriptor_size,
            file_size: parsed.file_size,
            cursor: None,
        })
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn descriptor_type(&self) -> DescriptorType {
        self.descriptor_type
    }

    pub fn descriptor_size(&self) -> u64 {
        self.descriptor_size
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Looks up the parsed `Track` at `(session, track)`. Public so that
    /// higher layers (the bootstrap locator, the ISO9660 walker) can inspect
    /// track metadata without re-deriving it from `sessions()`.
    pub fn track_info(&self, session: u16, track: u16) -> Result<&Track> {
        self.track(session, track)
    }

    fn track(&self, session: u16, track: u16) -> Result<&Track> {
        self.sessions
            .get(session as usize)
            .and_then(|s| s.tracks.get(track as usize))
            .ok_or(DiscImageError::OutOfRange)
    }

    /// The byte offset of the start of `(session, track)`'s body (after its
    /// pregap), per §4.2's offset formula.
    fn track_body_offset(&self, session: u16, track: u16) -> Result<u64> {
        let mut offset: u64 = 0;
        for s in self.sessions.iter().take(session as usize) {
            for t in &s.tracks {
                offset += t.byte_length();
            }
        }
        let target_session = &self.sessions[session as usize];
        for t in target_session.tracks.iter().take(track as usize) {
            offset += t.byte_length();
        }
        let target = self.track(session, track)?;
        offset += target.pregap_length as u64 * target.sector_size.bytes() as u64;
        Ok(offset)
    }

    fn offset_for(&self, session: u16, track: u16, lba: u32) -> Result<u64> {
        let t = self.track(session, track)?;
        if lba < t.base_lba {
            return Err(DiscImageError::OutOfRange);
        }
        let body_offset = self.track_body_offset(session, track)?;
        Ok(body_offset + (lba - t.base_lba) as u64 * t.sector_size.bytes() as u64)
    }

    /// Reads `n` logical sectors starting at `lba` inside `(session, track)`.
    /// Each returned chunk is the 2048-byte user payload for data tracks, or
    /// the full raw sector for audio tracks.
    pub fn read_sectors(&mut self, session: u16, track: u16, lba: u32, n: u32) -> Result<Vec<u8>> {
        let t = self.track(session, track)?.clone();
        if lba < t.base_lba || (lba - t.base_lba) + n > t.body_length {
            return Err(DiscImageError::OutOfRange);
        }

        let strip = t.sector_size.header_strip(t.mode) as u64;
        let payload_len: usize = if t.mode == crate::cdi::TrackMode::Audio {
            t.sector_size.bytes() as usize
        } else {
            2048
        };

        let monotone = matches!(self.cursor, Some(c) if c.session == session && c.track == track && c.next_lba == lba);

        let mut file_pos = if monotone {
            self.cursor.unwrap().file_pos
        } else {
            let offset = self.offset_for(session, track, lba)?;
            self.reader.seek(SeekFrom::Start(offset))?;
            log::trace!("sector_stream: absolute seek to offset {offset} for session {session} track {track} lba {lba}");
            offset
        };

        let mut out = Vec::with_capacity(payload_len * n as usize);
        for i in 0..n {
            if strip > 0 {
                self.reader.seek(SeekFrom::Current(strip as i64))?;
                file_pos += strip;
            }
            let mut sector_buf = vec![0u8; payload_len];
            self.reader.read_exact(&mut sector_buf).map_err(|_| DiscImageError::IoShortRead)?;
            file_pos += payload_len as u64;

            let stored_sector_len = t.sector_size.bytes() as u64;
            let trailer = stored_sector_len.saturating_sub(strip + payload_len as u64);
            if trailer > 0 {
                self.reader.seek(SeekFrom::Current(trailer as i64))?;
                file_pos += trailer;
            }

            out.extend_from_slice(&sector_buf);
            log::trace!("sector_stream: read sector {}", lba + i);
        }

        self.cursor = Some(CursorState {
            session,
            track,
            next_lba: lba + n,
            file_pos,
        });

        Ok(out)
    }
}

impl<R: ReadWriteSeek> SectorStream<R> {
    /// Writes `data` back as `n` full, un-stripped sectors starting at `lba`,
    /// where `n = data.len() / sector_size`. Unlike the source tool this
    /// writes the complete stored sector (header included) rather than just
    /// the 2048-byte logical payload, so it does not corrupt the following
    /// sector's header on a second write (see DESIGN.md / spec §9).
    pub fn write_sectors(&mut self, session: u16, track: u16, lba: u32, data: &[u8]) -> Result<()> {
        let t = self.track(session, track)?.clone();
        let sector_size = t.sector_size.bytes() as usize;
        if data.len() % sector_size != 0 {
            return Err(DiscImageError::IoShortWrite);
        }
        let n = (data.len() / sector_size) as u32;
        if lba < t.base_lba || (lba - t.base_lba) + n > t.body_length {
            return Err(DiscImageError::OutOfRange);
        }

        let offset = self.offset_for(session, track, lba)?;
        self.reader.seek(SeekFrom::Start(offset))?;
        self.reader.write_all(data).map_err(|_| DiscImageError::IoShortWrite)?;
        self.cursor = None;
        Ok(())
    }
}

/// A track-relative view over a `SectorStream`, scoped to one `(session,
/// track)` pair. This is the interface the bootstrap locator and the
/// ISO9660 walker use; its unit is the 2048-byte logical sector regardless
/// of the track's on-disc sector size.
pub struct TrackHandle<'a, R> {
    stream: &'a mut SectorStream<R>,
    session: u16,
    track: u16,
}

impl<'a, R: ReadSeek> TrackHandle<'a, R> {
    pub fn new(stream: &'a mut SectorStream<R>, session: u16, track: u16) -> Result<Self> {
        stream.track_info(session, track)?;
        Ok(TrackHandle { stream, session, track })
    }

    pub fn base_lba(&self) -> u32 {
        self.stream.track_info(self.session, self.track).expect("validated in new()").base_lba
    }

    pub fn body_length(&self) -> u32 {
        self.stream
            .track_info(self.session, self.track)
            .expect("validated in new()")
            .body_length
    }

    /// Reads `n` logical sectors starting at absolute LBA `lba`.
    pub fn read_sectors(&mut self, lba: u32, n: u32) -> Result<Vec<u8>> {
        self.stream.read_sectors(self.session, self.track, lba, n)
    }
}
