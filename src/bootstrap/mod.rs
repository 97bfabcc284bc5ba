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

    src/bootstrap/mod.rs

    Locates, validates, and patches the 32KiB IP.BIN bootstrap region that
    opens the first data track of a Dreamcast disc.
*/

pub mod ip_bin;

use crate::cdi::TrackMode;
use crate::error::{DiscImageError, Result};
use crate::io::{Cursor, ReadSeek};
use crate::sector_stream::{SectorStream, TrackHandle};
use crate::types::signature_matches;
use binrw::BinRead;

pub use ip_bin::{
    BootstrapRegion, IpBinHeader, PeripheralFlags, RegionSymbol, BOOTSTRAP_SIZE, HARDWARE_ID,
    HARDWARE_VENDOR_ID, HEADER_SIZE, MAX_NUM_REGIONS, MR_IMAGE_OFFSET, REGION_CODE_EUROPE,
    REGION_CODE_JAPAN, REGION_CODE_USA, REGION_SYMBOLS_OFFSET, REGION_SYMBOL_DESCRIPTION_SIZE,
    REGION_SYMBOL_EUROPE, REGION_SYMBOL_JAPAN, REGION_SYMBOL_SLOT_UNUSED, REGION_SYMBOL_SLOT_USED,
    REGION_SYMBOL_USA,
};

/// Byte offsets of `IpBinHeader`'s fields within the bootstrap buffer. These
/// mirror the struct's field layout and are used by the patch methods, which
/// write individual bytes rather than re-serialising the whole header.
const REGION_CODE_OFFSET: usize = 16 + 16 + 16;
const PERIPHERALS_OFFSET: usize = REGION_CODE_OFFSET + MAX_NUM_REGIONS;

/// Where `(session, track)` the bootstrap was found, so callers that need to
/// write it back know where to target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootstrapLocation {
    pub session: u16,
    pub track: u16,
}

/// The 32KiB IP.BIN region: header, table of contents, licence screen,
/// region symbol table, and the two bootstrap code blocks. Held as a flat
/// byte buffer; the header and region symbols are decoded on demand rather
/// than kept as live binrw structs, since the patch methods mutate raw bytes
/// directly, matching the original tool.
pub struct Bootstrap {
    buffer: Box<[u8; BOOTSTRAP_SIZE]>,
}

impl Bootstrap {
    /// Scans every non-audio track of every session for the bootstrap
    /// signature at its first sector, reads the full 32KiB region once
    /// found, and validates it. Returns the first match; a disc should only
    /// ever have one.
    pub fn locate<R: ReadSeek>(stream: &mut SectorStream<R>) -> Result<(Bootstrap, BootstrapLocation)> {
        let session_count = stream.sessions().len();
        for session in 0..session_count {
            let track_count = stream.sessions()[session].tracks.len();
            for track in 0..track_count {
                let session = session as u16;
                let track = track as u16;
                let info = match stream.track_info(session, track) {
                    Ok(info) => info,
                    Err(_) => continue,
                };
                if info.mode == TrackMode::Audio {
                    continue;
                }
                let base_lba = info.base_lba;

                let mut handle = TrackHandle::new(stream, session, track)?;
                let first = match handle.read_sectors(base_lba, 1) {
                    Ok(buf) => buf,
                    Err(_) => continue,
                };
                if !signature_matches(&first, HARDWARE_ID) {
                    continue;
                }

                let rest = handle.read_sectors(base_lba + 1, 15)?;
                let mut buffer = Box::new([0u8; BOOTSTRAP_SIZE]);
                buffer[..2048].copy_from_slice(&first);
                buffer[2048..].copy_from_slice(&rest);

                let bootstrap = Bootstrap { buffer };
                bootstrap.validate()?;
                log::info!("bootstrap located in session {session} track {track}");
                return Ok((bootstrap, BootstrapLocation { session, track }));
            }
        }
        Err(DiscImageError::BootstrapNotFound)
    }

    /// Wraps an already-extracted 32KiB region, e.g. one read back out of an
    /// IP.BIN dump on disk, and validates it.
    pub fn from_bytes(buffer: Box<[u8; BOOTSTRAP_SIZE]>) -> Result<Self> {
        let bootstrap = Bootstrap { buffer };
        bootstrap.validate()?;
        Ok(bootstrap)
    }

    fn validate(&self) -> Result<()> {
        let header = self.header()?;
        if header.hardware_id != *HARDWARE_ID || header.hardware_vendor_id != *HARDWARE_VENDOR_ID {
            return Err(DiscImageError::BootstrapSignatureMismatch);
        }
        Ok(())
    }

    pub fn header(&self) -> Result<IpBinHeader> {
        let mut cursor = Cursor::new(&self.buffer[..HEADER_SIZE]);
        Ok(IpBinHeader::read(&mut cursor)?)
    }

    /// Decodes the 8-region-symbol table that follows the licence screen.
    pub fn region_symbols(&self) -> Result<Vec<RegionSymbol>> {
        let mut cursor = Cursor::new(&self.buffer[REGION_SYMBOLS_OFFSET..REGION_SYMBOLS_OFFSET + ip_bin::REGION_SYMBOLS_SIZE]);
        let mut symbols = Vec::with_capacity(MAX_NUM_REGIONS);
        for _ in 0..MAX_NUM_REGIONS {
            symbols.push(RegionSymbol::read(&mut cursor)?);
        }
        Ok(symbols)
    }

    pub fn as_bytes(&self) -> &[u8; BOOTSTRAP_SIZE] {
        &self.buffer
    }

    /// `'MR'` is the only signature the embedded boot logo can have; absence
    /// of the magic at its fixed offset means this title carries no
    /// third-party boot logo.
    pub fn has_boot_logo(&self) -> bool {
        self.buffer[MR_IMAGE_OFFSET..MR_IMAGE_OFFSET + 2] == *b"MR"
    }

    pub fn boot_logo_bytes(&self) -> &[u8] {
        &self.buffer[MR_IMAGE_OFFSET..]
    }

    /// Resets the region code and symbol table, then fills in an entry for
    /// each region named in `regions`, in fixed Japan/USA/Europe slot order.
    pub fn patch_region(&mut self, regions: BootstrapRegion) {
        for i in 0..MAX_NUM_REGIONS {
            self.buffer[REGION_CODE_OFFSET + i] = b' ';
        }
        let symbol_stride = 4 + REGION_SYMBOL_DESCRIPTION_SIZE;
        for i in 0..MAX_NUM_REGIONS {
            let desc_offset = REGION_SYMBOLS_OFFSET + i * symbol_stride + 4;
            self.buffer[desc_offset..desc_offset + REGION_SYMBOL_DESCRIPTION_SIZE].fill(b' ');
        }

        let mut fill_slot = |slot: usize, code: u8, symbol: &[u8; REGION_SYMBOL_DESCRIPTION_SIZE]| {
            self.buffer[REGION_CODE_OFFSET + slot] = code;
            let desc_offset = REGION_SYMBOLS_OFFSET + slot * symbol_stride + 4;
            self.buffer[desc_offset..desc_offset + REGION_SYMBOL_DESCRIPTION_SIZE].copy_from_slice(symbol);
        };

        if regions.contains(BootstrapRegion::JAPAN) {
            fill_slot(0, REGION_CODE_JAPAN, REGION_SYMBOL_JAPAN);
        }
        if regions.contains(BootstrapRegion::USA) {
            fill_slot(1, REGION_CODE_USA, REGION_SYMBOL_USA);
        }
        if regions.contains(BootstrapRegion::EUROPE) {
            fill_slot(2, REGION_CODE_EUROPE, REGION_SYMBOL_EUROPE);
        }
        log::debug!("patched bootstrap region code to {regions:?}");
    }

    /// Sets the "VGA Box" peripherals bit, which is ASCII `'1'` at a fixed
    /// offset, not a bit flip within a packed integer.
    pub fn patch_vga(&mut self) {
        self.buffer[PERIPHERALS_OFFSET + 5] = b'1';
    }

    /// Sets or clears the "uses Windows CE" peripherals bit.
    pub fn patch_os(&mut self, is_wince: bool) {
        self.buffer[PERIPHERALS_OFFSET + 6] = if is_wince { b'1' } else { b'0' };
    }

    /// Decodes the raw peripherals ASCII-hex field for diagnostic display.
    pub fn peripherals(&self) -> Result<PeripheralFlags> {
        let header = self.header()?;
        Ok(PeripheralFlags::from_ascii_hex(&header.peripherals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header_bytes() -> [u8; BOOTSTRAP_SIZE] {
        let mut buf = [0u8; BOOTSTRAP_SIZE];
        buf[..16].copy_from_slice(HARDWARE_ID);
        buf[16..32].copy_from_slice(HARDWARE_VENDOR_ID);
        buf
    }

    #[test]
    fn validates_matching_signature() {
        let buf = sample_header_bytes();
        let bootstrap = Bootstrap::from_bytes(Box::new(buf)).unwrap();
        assert_eq!(&bootstrap.header().unwrap().hardware_id, HARDWARE_ID);
    }

    #[test]
    fn rejects_mismatched_signature() {
        let mut buf = sample_header_bytes();
        buf[0] = b'X';
        assert!(matches!(
            Bootstrap::from_bytes(Box::new(buf)),
            Err(DiscImageError::BootstrapSignatureMismatch)
        ));
    }

    #[test]
    fn patch_region_sets_single_letter_codes_and_symbols() {
        let buf = sample_header_bytes();
        let mut bootstrap = Bootstrap::from_bytes(Box::new(buf)).unwrap();
        bootstrap.patch_region(BootstrapRegion::USA | BootstrapRegion::EUROPE);

        let header = bootstrap.header().unwrap();
        assert_eq!(header.region_code[0], b' ');
        assert_eq!(header.region_code[1], REGION_CODE_USA);
        assert_eq!(header.region_code[2], REGION_CODE_EUROPE);

        let symbols = bootstrap.region_symbols().unwrap();
        assert_eq!(&symbols[1].description, REGION_SYMBOL_USA);
        assert_eq!(&symbols[2].description, REGION_SYMBOL_EUROPE);
        assert_eq!(symbols[0].description, [b' '; REGION_SYMBOL_DESCRIPTION_SIZE]);
    }

    #[test]
    fn patch_vga_and_os_write_fixed_ascii_digits() {
        let buf = sample_header_bytes();
        let mut bootstrap = Bootstrap::from_bytes(Box::new(buf)).unwrap();
        bootstrap.patch_vga();
        bootstrap.patch_os(true);

        let header = bootstrap.header().unwrap();
        assert_eq!(header.peripherals[5], b'1');
        assert_eq!(header.peripherals[6], b'1');

        bootstrap.patch_os(false);
        let header = bootstrap.header().unwrap();
        assert_eq!(header.peripherals[6], b'0');
    }

    #[test]
    fn boot_logo_absent_by_default() {
        let buf = sample_header_bytes();
        let bootstrap = Bootstrap::from_bytes(Box::new(buf)).unwrap();
        assert!(!bootstrap.has_boot_logo());
    }

    #[test]
    fn boot_logo_detected_from_magic() {
        let mut buf = sample_header_bytes();
        buf[MR_IMAGE_OFFSET] = b'M';
        buf[MR_IMAGE_OFFSET + 1] = b'R';
        let bootstrap = Bootstrap::from_bytes(Box::new(buf)).unwrap();
        assert!(bootstrap.has_boot_logo());
    }
}
