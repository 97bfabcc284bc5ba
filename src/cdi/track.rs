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

    src/cdi/track.rs
*/

use crate::error::{DiscImageError, Result};
use strum::Display;

/// The three Red/Yellow Book sector formats a CDI track may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum TrackMode {
    Audio,
    Mode1,
    Mode2,
}

impl TrackMode {
    pub(crate) fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(TrackMode::Audio),
            1 => Ok(TrackMode::Mode1),
            2 => Ok(TrackMode::Mode2),
            _ => Err(DiscImageError::UnsupportedTrackMode),
        }
    }
}

/// The five sector-size classes DiscJuggler may record for a track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum SectorSizeClass {
    #[strum(serialize = "2048")]
    Size2048,
    #[strum(serialize = "2336")]
    Size2336,
    #[strum(serialize = "2352")]
    Size2352,
    #[strum(serialize = "2368")]
    Size2368,
    #[strum(serialize = "2448")]
    Size2448,
}

impl SectorSizeClass {
    pub(crate) fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(SectorSizeClass::Size2048),
            1 => Ok(SectorSizeClass::Size2336),
            2 => Ok(SectorSizeClass::Size2352),
            3 => Ok(SectorSizeClass::Size2368),
            4 => Ok(SectorSizeClass::Size2448),
            _ => Err(DiscImageError::UnsupportedSectorSize),
        }
    }

    /// The number of bytes physically stored per sector on this track.
    pub fn bytes(&self) -> u32 {
        match self {
            SectorSizeClass::Size2048 => 2048,
            SectorSizeClass::Size2336 => 2336,
            SectorSizeClass::Size2352 => 2352,
            SectorSizeClass::Size2368 => 2368,
            SectorSizeClass::Size2448 => 2448,
        }
    }

    /// The number of header bytes to strip from the front of a stored sector
    /// before the 2048-byte logical payload begins, per mode.
    pub fn header_strip(&self, mode: TrackMode) -> u32 {
        match (mode, self) {
            (TrackMode::Mode1, SectorSizeClass::Size2352) => 16,
            (TrackMode::Mode2, SectorSizeClass::Size2352) => 24,
            (TrackMode::Mode2, SectorSizeClass::Size2336) => 8,
            _ => 0,
        }
    }
}

/// A single track within a session: either audio (raw PCM sectors) or data
/// (Mode1/Mode2, carrying a 2048-byte logical payload per sector).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub index: u16,
    pub filename: String,
    pub pregap_length: u32,
    pub body_length: u32,
    pub total_length: u32,
    pub mode: TrackMode,
    pub sector_size: SectorSizeClass,
    pub base_lba: u32,
}

impl Track {
    /// Bytes physically occupied by this track in the container, including
    /// its pregap. Invariant: `total_length >= pregap_length`; the parser
    /// never constructs a `Track` that violates it.
    pub fn byte_length(&self) -> u64 {
        self.total_length as u64 * self.sector_size.bytes() as u64
    }
}
