/*
    FluxFox
    https://github.com/dbalsom/fluxfox

    Copyright 2024-2025 Daniel Balsom

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
*/

use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug)]
pub struct FsDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl Default for FsDateTime {
    fn default() -> Self {
        Self {
            year: 1980,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
        }
    }
}

impl Display for FsDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}/{:02}/{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl FsDateTime {
    /// Decodes the 7-byte `ISO_datetime2` directory-record format: a year
    /// offset from 1900, then month/day/hour/minute/second, then a 15-minute
    /// GMT-offset byte that this type has no field for and so discards.
    pub fn from_directory_record(bytes: [u8; 7]) -> Self {
        FsDateTime {
            year: 1900 + bytes[0] as u16,
            month: bytes[1],
            day: bytes[2],
            hour: bytes[3],
            minute: bytes[4],
            second: bytes[5],
            millisecond: 0,
        }
    }

    /// Decodes the 17-byte `ISO_datetime1` volume-descriptor format: four
    /// ASCII-digit fields (year/month/day), three more (hour/minute/second),
    /// one for hundredths of a second, then the same GMT-offset byte. An
    /// all-zero/all-space field (the volume's unset expiration/effective
    /// dates commonly use this) decodes as the crate's default date rather
    /// than failing, since it isn't a parse error.
    pub fn from_volume_timestamp(bytes: [u8; 17]) -> Self {
        let digits = |s: &[u8]| -> u16 {
            std::str::from_utf8(s)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0)
        };
        let year = digits(&bytes[0..4]);
        if year == 0 {
            return FsDateTime::default();
        }
        FsDateTime {
            year,
            month: digits(&bytes[4..6]) as u8,
            day: digits(&bytes[6..8]) as u8,
            hour: digits(&bytes[8..10]) as u8,
            minute: digits(&bytes[10..12]) as u8,
            second: digits(&bytes[12..14]) as u8,
            millisecond: digits(&bytes[14..16]) * 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_directory_record_timestamp() {
        let dt = FsDateTime::from_directory_record([99, 6, 15, 10, 30, 45, 0]);
        assert_eq!(dt.year, 1999);
        assert_eq!(dt.month, 6);
        assert_eq!(dt.day, 15);
        assert_eq!(dt.hour, 10);
        assert_eq!(dt.minute, 30);
        assert_eq!(dt.second, 45);
    }

    #[test]
    fn decodes_volume_timestamp() {
        let dt = FsDateTime::from_volume_timestamp(*b"2002123123595000\0");
        assert_eq!(dt.year, 2002);
        assert_eq!(dt.month, 12);
        assert_eq!(dt.day, 31);
        assert_eq!(dt.hour, 23);
        assert_eq!(dt.minute, 59);
        assert_eq!(dt.second, 50);
    }

    #[test]
    fn unset_volume_timestamp_decodes_to_default() {
        let dt = FsDateTime::from_volume_timestamp([0u8; 17]);
        assert_eq!(dt.year, FsDateTime::default().year);
    }
}
