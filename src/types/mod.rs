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

    src/types/mod.rs

    Small byte-level primitives shared by the CDI and ISO9660 parsers: the
    both-endian integer pair ISO9660 uses throughout its directory records and
    volume descriptors, plus the fixed hardware-signature compare used by the
    bootstrap validator.
*/

use crate::error::{DiscImageError, Result};
use binrw::binrw;

/// A 16-bit value stored twice: once little-endian, once big-endian. ISO9660
/// uses this layout for volume-sequence numbers. Decoding validates that the
/// two encodings agree; a mismatch means the sector was misread or the image
/// is corrupt.
#[binrw]
#[brw(little)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BiEndian16 {
    le: u16,
    #[brw(big)]
    be: u16,
}

impl BiEndian16 {
    pub fn new(value: u16) -> Self {
        BiEndian16 { le: value, be: value }
    }

    /// Builds a pair from already-separated LE/BE halves, e.g. when a caller
    /// hand-slices both out of a raw sector buffer instead of going through
    /// `binrw`.
    pub fn from_parts(le: u16, be: u16) -> Self {
        BiEndian16 { le, be }
    }

    pub fn get(&self) -> Result<u16> {
        if self.le != self.be.swap_bytes() {
            return Err(DiscImageError::BiEndianMismatch);
        }
        Ok(self.le)
    }

    /// Returns the little-endian value without validating agreement. Useful
    /// for diagnostic dumps of a corrupt image.
    pub fn get_lossy(&self) -> u16 {
        self.le
    }
}

/// A 32-bit value stored twice: once little-endian, once big-endian. ISO9660
/// uses this layout for extent LBAs, extent sizes, and volume space size.
#[binrw]
#[brw(little)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BiEndian32 {
    le: u32,
    #[brw(big)]
    be: u32,
}

impl BiEndian32 {
    pub fn new(value: u32) -> Self {
        BiEndian32 { le: value, be: value }
    }

    /// Builds a pair from already-separated LE/BE halves, e.g. when a caller
    /// hand-slices both out of a raw sector buffer instead of going through
    /// `binrw`.
    pub fn from_parts(le: u32, be: u32) -> Self {
        BiEndian32 { le, be }
    }

    pub fn get(&self) -> Result<u32> {
        if self.le != self.be.swap_bytes() {
            return Err(DiscImageError::BiEndianMismatch);
        }
        Ok(self.le)
    }

    pub fn get_lossy(&self) -> u32 {
        self.le
    }
}

/// Compares `buf` against a fixed ASCII signature, e.g. the bootstrap
/// hardware ID / vendor ID fields.
pub fn signature_matches(buf: &[u8], signature: &[u8]) -> bool {
    buf.len() >= signature.len() && &buf[..signature.len()] == signature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bi_endian_16_round_trips() {
        let v = BiEndian16::new(0x1234);
        assert_eq!(v.get().unwrap(), 0x1234);
    }

    #[test]
    fn bi_endian_16_rejects_mismatch() {
        let v = BiEndian16 { le: 0x1234, be: 0xFFFF };
        assert!(matches!(v.get(), Err(DiscImageError::BiEndianMismatch)));
    }

    #[test]
    fn bi_endian_32_round_trips() {
        let v = BiEndian32::new(0xDEAD_BEEF);
        assert_eq!(v.get().unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn bi_endian_32_rejects_mismatch() {
        let v = BiEndian32 {
            le: 0xDEAD_BEEF,
            be: 0x0000_0001,
        };
        assert!(matches!(v.get(), Err(DiscImageError::BiEndianMismatch)));
    }

    #[test]
    fn signature_match() {
        assert!(signature_matches(b"SEGA SEGAKATANA xxxx", b"SEGA SEGAKATANA "));
        assert!(!signature_matches(b"not a signature", b"SEGA SEGAKATANA "));
    }
}
