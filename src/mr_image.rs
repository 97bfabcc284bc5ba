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

    src/mr_image.rs

    The "MR" image codec: a palette-indexed run-length format used for the
    optional boot logo embedded in bootstrap 1. Decode turns an MR buffer
    into a 32-bpp bottom-up bitmap; encode is the inverse, building a fresh
    palette and RLE stream from a pixel buffer.
*/

use crate::error::{DiscImageError, Result};
use bytemuck::{Pod, Zeroable};

pub const MR_MAGIC: [u8; 2] = *b"MR";
/// `wMagic` + `dwSize` + `dwReserved1` + `dwDataOffset` + `dwWidth` + `dwHeight`
/// + `dwReserved2` + `dwColors`: 2 + 4*7 bytes, tightly packed.
pub const MR_HEADER_SIZE: usize = 30;
pub const MAX_PALETTE_COLOURS: usize = 128;
pub const MAX_MR_IMAGE_SIZE: usize = 0x2000;
pub const MAX_LOGO_WIDTH: u16 = 320;
pub const MAX_LOGO_HEIGHT: u16 = 94;

const BMP_HEADER_SIZE: u32 = 54;
const BMP_RESOLUTION_PPM: i32 = 0x120B;

/// One BGRA palette entry, as stored on the wire. `Pod`/`Zeroable` let the
/// palette be cast to/from a flat byte buffer without a per-entry copy loop.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct MrColor {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl MrColor {
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        MrColor { b, g, r, a }
    }
}

/// A decoded MR image: dimensions plus a flat row-major, top-down pixel
/// buffer of [`MrColor`] entries (one per pixel, already resolved through
/// the palette).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MrImage {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<MrColor>,
}

impl MrImage {
    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Decodes an MR-format buffer (header, palette, RLE stream) into a
    /// flat pixel buffer. `data` is expected to start at the `'MR'` magic.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < MR_HEADER_SIZE || data[0..2] != MR_MAGIC {
            return Err(DiscImageError::DirectoryReadFailed);
        }
        let size = u32::from_le_bytes(data[2..6].try_into().unwrap()) as usize;
        let data_offset = u32::from_le_bytes(data[10..14].try_into().unwrap()) as usize;
        let width = u32::from_le_bytes(data[14..18].try_into().unwrap());
        let height = u32::from_le_bytes(data[18..22].try_into().unwrap());
        let colour_count = u32::from_le_bytes(data[26..30].try_into().unwrap()) as usize;

        if width > MAX_LOGO_WIDTH as u32 || height > MAX_LOGO_HEIGHT as u32 {
            log::warn!("mr_image: {width}x{height} boot logo exceeds the conventional {MAX_LOGO_WIDTH}x{MAX_LOGO_HEIGHT} bound");
        }
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(DiscImageError::DirectoryReadFailed);
        }
        if colour_count > MAX_PALETTE_COLOURS {
            return Err(DiscImageError::PaletteIndexOutOfRange);
        }

        let palette_bytes = colour_count * 4;
        if size <= MR_HEADER_SIZE || data_offset != MR_HEADER_SIZE + palette_bytes {
            return Err(DiscImageError::DirectoryReadFailed);
        }
        if data.len() < size {
            return Err(DiscImageError::IoShortRead);
        }

        let palette: &[MrColor] = bytemuck::cast_slice(&data[MR_HEADER_SIZE..data_offset]);

        let width = width as u16;
        let height = height as u16;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        let encoded = &data[data_offset..size];
        let mut pos = 0usize;
        while pos < encoded.len() {
            let id = encoded[pos];
            let (run_length, index, consumed) = if id == 0x82 {
                let next = *encoded.get(pos + 1).ok_or(DiscImageError::IoShortRead)?;
                if next & 0x80 != 0 {
                    let index = *encoded.get(pos + 2).ok_or(DiscImageError::IoShortRead)?;
                    (((next & 0x7F) as u32 + 0x100) as usize, index, 3)
                } else {
                    let index = next;
                    ((id & 0x7F) as usize, index, 2)
                }
            } else if id == 0x81 {
                let run_length = *encoded.get(pos + 1).ok_or(DiscImageError::IoShortRead)?;
                let index = *encoded.get(pos + 2).ok_or(DiscImageError::IoShortRead)?;
                (run_length as usize, index, 3)
            } else if id & 0x80 != 0 {
                let index = *encoded.get(pos + 1).ok_or(DiscImageError::IoShortRead)?;
                ((id & 0x7F) as usize, index, 2)
            } else {
                (1usize, id, 1)
            };

            if run_length > 0 {
                let colour = palette.get(index as usize).copied().ok_or(DiscImageError::PaletteIndexOutOfRange)?;
                for _ in 0..run_length {
                    pixels.push(colour);
                }
            }
            pos += consumed;
        }

        Ok(MrImage { width, height, pixels })
    }

    /// Encodes a pixel buffer (row-major, top-down, one [`MrColor`] per
    /// pixel) into the MR wire format: header, palette, RLE stream.
    pub fn encode(width: u16, height: u16, pixels: &[MrColor]) -> Result<Vec<u8>> {
        if pixels.len() != width as usize * height as usize {
            return Err(DiscImageError::DirectoryReadFailed);
        }
        if width > MAX_LOGO_WIDTH || height > MAX_LOGO_HEIGHT {
            log::warn!("mr_image: encoding {width}x{height} image exceeds the conventional {MAX_LOGO_WIDTH}x{MAX_LOGO_HEIGHT} bound");
        }

        let mut palette: Vec<MrColor> = Vec::new();
        let mut rle = Vec::new();

        let mut i = 0usize;
        while i < pixels.len() {
            let colour = pixels[i];
            let mut run_length = 1usize;
            while i + run_length < pixels.len() && pixels[i + run_length] == colour && run_length < 0x17F {
                run_length += 1;
            }

            let index = match palette.iter().position(|&c| c == colour) {
                Some(pos) => pos,
                None if palette.len() < MAX_PALETTE_COLOURS => {
                    palette.push(colour);
                    palette.len() - 1
                }
                None => {
                    log::warn!("mr_image: palette exceeds {MAX_PALETTE_COLOURS} colours, collapsing to index 0");
                    0
                }
            };

            encode_run(&mut rle, run_length, index as u8);
            i += run_length;
        }

        let data_offset = MR_HEADER_SIZE + palette.len() * 4;
        let size = data_offset + rle.len();
        if size > MAX_MR_IMAGE_SIZE {
            return Err(DiscImageError::MrImageTooLarge);
        }

        let mut out = Vec::with_capacity(size);
        out.extend_from_slice(&MR_MAGIC);
        out.extend_from_slice(&(size as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // dwReserved1
        out.extend_from_slice(&(data_offset as u32).to_le_bytes());
        out.extend_from_slice(&(width as u32).to_le_bytes());
        out.extend_from_slice(&(height as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // dwReserved2
        out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
        out.extend_from_slice(bytemuck::cast_slice(&palette));
        out.extend_from_slice(&rle);

        Ok(out)
    }

    /// Renders this image as a 32-bpp bottom-up Windows bitmap, the format
    /// the boot-logo extractor writes to disk.
    pub fn to_bmp(&self) -> Vec<u8> {
        let pixel_bytes = self.pixel_count() as u32 * 4;
        let file_size = BMP_HEADER_SIZE + pixel_bytes;

        let mut out = Vec::with_capacity(file_size as usize);
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&file_size.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // reserved
        out.extend_from_slice(&BMP_HEADER_SIZE.to_le_bytes());

        out.extend_from_slice(&40u32.to_le_bytes()); // BITMAPINFOHEADER size
        out.extend_from_slice(&(self.width as i32).to_le_bytes());
        out.extend_from_slice(&(self.height as i32).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // planes
        out.extend_from_slice(&32u16.to_le_bytes()); // bpp
        out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB, no compression
        out.extend_from_slice(&pixel_bytes.to_le_bytes());
        out.extend_from_slice(&BMP_RESOLUTION_PPM.to_le_bytes());
        out.extend_from_slice(&BMP_RESOLUTION_PPM.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // palette colours used
        out.extend_from_slice(&0u32.to_le_bytes()); // important colours

        // Bottom-up: rows are written last-row-first.
        for row in self.pixels.chunks(self.width as usize).rev() {
            for colour in row {
                out.extend_from_slice(bytemuck::bytes_of(colour));
            }
        }

        out
    }
}

/// Appends the smallest wire encoding for one run, per the grammar in
/// `decode`: length > 0xFF uses the `0x82` form, length > 0x7F uses `0x81`,
/// length >= 2 uses `0x80|n`, length 1 emits the index byte alone.
fn encode_run(out: &mut Vec<u8>, run_length: usize, index: u8) {
    if run_length > 0xFF {
        let overflow = (run_length - 0x100) as u8;
        out.push(0x82);
        out.push(overflow | 0x80);
        out.push(index);
    } else if run_length > 0x7F {
        out.push(0x81);
        out.push(run_length as u8);
        out.push(index);
    } else if run_length >= 2 {
        out.push(0x80 | run_length as u8);
        out.push(index);
    } else {
        out.push(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Vec<MrColor> {
        vec![MrColor::rgba(0, 0, 0, 0xFF), MrColor::rgba(0xFF, 0xFF, 0xFF, 0xFF)]
    }

    fn build_mr(encoded: &[u8], width: u16, height: u16, palette: &[MrColor]) -> Vec<u8> {
        let data_offset = MR_HEADER_SIZE + palette.len() * 4;
        let size = data_offset + encoded.len();
        let mut out = Vec::new();
        out.extend_from_slice(&MR_MAGIC);
        out.extend_from_slice(&(size as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(data_offset as u32).to_le_bytes());
        out.extend_from_slice(&(width as u32).to_le_bytes());
        out.extend_from_slice(&(height as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
        out.extend_from_slice(bytemuck::cast_slice(palette));
        out.extend_from_slice(encoded);
        out
    }

    /// Plain byte form: a run marker with its high bit clear is both the
    /// length-1 marker and the palette index itself.
    #[test]
    fn decodes_plain_byte_run() {
        let pal = palette();
        let data = build_mr(&[0x01], 1, 1, &pal);
        let image = MrImage::decode(&data).unwrap();
        assert_eq!(image.pixels, vec![pal[1]]);
    }

    /// General high-bit form: `0x80 | n` followed by the palette index byte.
    #[test]
    fn decodes_general_high_bit_run() {
        let pal = palette();
        let data = build_mr(&[0x80 | 3, 0x00], 3, 1, &pal);
        let image = MrImage::decode(&data).unwrap();
        assert_eq!(image.pixels, vec![pal[0], pal[0], pal[0]]);
    }

    /// `0x82` with the following byte's MSB clear: run length is `id & 0x7F`
    /// (always 2), and that next byte is the palette index.
    #[test]
    fn decodes_0x82_short_form() {
        let pal = palette();
        let data = build_mr(&[0x82, 0x01], 2, 1, &pal);
        let image = MrImage::decode(&data).unwrap();
        assert_eq!(image.pixels, vec![pal[1], pal[1]]);
    }

    /// `0x82` with the following byte's MSB set: an extended run length
    /// above 0x100, with a third byte carrying the palette index.
    #[test]
    fn decodes_0x82_extended_form() {
        let pal = palette();
        let data = build_mr(&[0x82, 0x80 | 0x05, 0x00], 1, 1, &pal);
        let image = MrImage::decode(&data).unwrap();
        assert_eq!(image.pixels.len(), 0x105);
        assert!(image.pixels.iter().all(|&p| p == pal[0]));
    }

    /// `0x81` form: the run length is an explicit byte, not derived from
    /// the marker's low bits.
    #[test]
    fn decodes_0x81_form() {
        let pal = palette();
        let data = build_mr(&[0x81, 0x90, 0x01], 1, 1, &pal);
        let image = MrImage::decode(&data).unwrap();
        assert_eq!(image.pixels.len(), 0x90);
        assert!(image.pixels.iter().all(|&p| p == pal[1]));
    }

    #[test]
    fn decode_rejects_bad_magic() {
        let data = vec![0u8; MR_HEADER_SIZE];
        assert!(MrImage::decode(&data).is_err());
    }

    #[test]
    fn decode_rejects_out_of_range_palette_index() {
        let pal = vec![MrColor::rgba(0, 0, 0, 0xFF)];
        let data = build_mr(&[0x05], 1, 1, &pal);
        assert!(matches!(MrImage::decode(&data), Err(DiscImageError::PaletteIndexOutOfRange)));
    }

    #[test]
    fn round_trips_small_multicolour_image() {
        let pixels = vec![
            MrColor::rgba(10, 20, 30, 255),
            MrColor::rgba(10, 20, 30, 255),
            MrColor::rgba(40, 50, 60, 255),
            MrColor::rgba(255, 0, 0, 255),
        ];
        let encoded = MrImage::encode(4, 1, &pixels).unwrap();
        let decoded = MrImage::decode(&encoded).unwrap();
        assert_eq!(decoded.pixels, pixels);
        assert_eq!(decoded.width, 4);
        assert_eq!(decoded.height, 1);
    }

    #[test]
    fn round_trips_long_run() {
        let pixels = vec![MrColor::rgba(1, 2, 3, 255); 300];
        let encoded = MrImage::encode(300, 1, &pixels).unwrap();
        let decoded = MrImage::decode(&encoded).unwrap();
        assert_eq!(decoded.pixels, pixels);
    }

    #[test]
    fn encode_collapses_over_budget_palette_to_index_zero() {
        let mut pixels = Vec::new();
        for i in 0..200u32 {
            pixels.push(MrColor::rgba((i % 256) as u8, 0, 0, 255));
        }
        let encoded = MrImage::encode(200, 1, &pixels).unwrap();
        let decoded = MrImage::decode(&encoded).unwrap();
        assert_eq!(decoded.pixels.len(), pixels.len());
    }

    #[test]
    fn bmp_header_has_expected_fields() {
        let image = MrImage {
            width: 2,
            height: 1,
            pixels: vec![MrColor::rgba(0, 0, 0, 255), MrColor::rgba(255, 255, 255, 255)],
        };
        let bmp = image.to_bmp();
        assert_eq!(&bmp[0..2], b"BM");
        assert_eq!(u32::from_le_bytes(bmp[10..14].try_into().unwrap()), BMP_HEADER_SIZE);
        assert_eq!(bmp.len(), BMP_HEADER_SIZE as usize + 2 * 4);
    }
}
