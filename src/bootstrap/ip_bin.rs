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

    src/bootstrap/ip_bin.rs

    IP.BIN layout: the 256-byte metadata header and the 8 region-symbol
    slots that follow the licence screen code. Field offsets and sizes come
    straight off the disc layout; none of them are negotiable.
*/

use binrw::binrw;
use bitflags::bitflags;

pub const BOOTSTRAP_SIZE: usize = 0x8000;
pub const HEADER_SIZE: usize = 0x100;
pub const TOC_SIZE: usize = 0x200;
pub const LICENSE_SIZE: usize = 0x3400;
pub const REGION_SYMBOLS_OFFSET: usize = HEADER_SIZE + TOC_SIZE + LICENSE_SIZE;
pub const REGION_SYMBOLS_SIZE: usize = 0x100;
pub const BOOTSTRAP1_OFFSET: usize = REGION_SYMBOLS_OFFSET + REGION_SYMBOLS_SIZE;
pub const BOOTSTRAP1_SIZE: usize = 0x2800;
pub const BOOTSTRAP2_OFFSET: usize = BOOTSTRAP1_OFFSET + BOOTSTRAP1_SIZE;
pub const BOOTSTRAP2_SIZE: usize = 0x2000;

/// Offset of the embedded MR image inside bootstrap 1, per the original
/// tool's `Extract3rdPartyBootLogo`.
pub const MR_IMAGE_OFFSET: usize = BOOTSTRAP1_OFFSET + 32;

pub const MAX_NUM_REGIONS: usize = 8;
pub const REGION_SYMBOL_DESCRIPTION_SIZE: usize = 28;

pub const HARDWARE_ID: &[u8; 16] = b"SEGA SEGAKATANA ";
pub const HARDWARE_VENDOR_ID: &[u8; 16] = b"SEGA ENTERPRISES";

pub const REGION_CODE_JAPAN: u8 = b'J';
pub const REGION_SYMBOL_JAPAN: &[u8; 28] = b"For JAPAN,TAIWAN,PHILIPINES.";
pub const REGION_CODE_USA: u8 = b'U';
pub const REGION_SYMBOL_USA: &[u8; 28] = b"For USA and CANADA.         ";
pub const REGION_CODE_EUROPE: u8 = b'E';
pub const REGION_SYMBOL_EUROPE: &[u8; 28] = b"For EUROPE.                 ";

bitflags! {
    /// Which territories the disc is playable in. Stored in the header as
    /// single-letter codes at fixed slots plus a parallel human-readable
    /// symbol table; this bitmask is the input to `patch_region`, not the
    /// on-disc representation itself.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BootstrapRegion: u8 {
        const JAPAN = 0b001;
        const USA = 0b010;
        const EUROPE = 0b100;
    }
}

bitflags! {
    /// Decoded view of the 28-bit peripherals field, per the bit diagram in
    /// the header comment. Read-only: `patch_vga`/`patch_os` write the two
    /// ASCII digits the original tool touches directly, rather than going
    /// through this bitmask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PeripheralFlags: u32 {
        const WINDOWS_CE = 1 << 0;
        const VGA_BOX = 1 << 1;
        const OTHER_EXPANSIONS = 1 << 2;
        const PURU_PURU_PACK = 1 << 3;
        const MIKE_DEVICE = 1 << 4;
        const MEMORY_CARD = 1 << 5;
        const START_A_B_DIRECTIONS = 1 << 6;
        const C_BUTTON = 1 << 7;
        const D_BUTTON = 1 << 8;
        const X_BUTTON = 1 << 9;
        const Y_BUTTON = 1 << 10;
        const Z_BUTTON = 1 << 11;
        const EXPANDED_DIRECTION_BUTTONS = 1 << 12;
        const ANALOG_R_TRIGGER = 1 << 13;
        const ANALOG_L_TRIGGER = 1 << 14;
        const ANALOG_HORIZONTAL = 1 << 15;
        const ANALOG_VERTICAL = 1 << 16;
        const EXPANDED_ANALOG_HORIZONTAL = 1 << 17;
        const EXPANDED_ANALOG_VERTICAL = 1 << 18;
        const GUN = 1 << 19;
        const KEYBOARD = 1 << 20;
        const MOUSE = 1 << 21;
    }
}

impl PeripheralFlags {
    /// Decodes the 8 ASCII-hex digits of `sPeripherals` into a bitmask.
    /// Non-hex bytes decode as zero for that nibble rather than failing;
    /// this accessor is diagnostic, not load-bearing.
    pub fn from_ascii_hex(bytes: &[u8; 8]) -> Self {
        let mut value: u32 = 0;
        for &b in bytes {
            let nibble = (b as char).to_digit(16).unwrap_or(0);
            value = (value << 4) | nibble;
        }
        PeripheralFlags::from_bits_truncate(value)
    }
}

/// The 256-byte `IP_BIN_HEADER` metadata block at the very start of the
/// bootstrap region.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IpBinHeader {
    pub hardware_id: [u8; 16],
    pub hardware_vendor_id: [u8; 16],
    pub device_info: [u8; 16],
    pub region_code: [u8; MAX_NUM_REGIONS],
    pub peripherals: [u8; 8],
    pub product_number: [u8; 10],
    pub version: [u8; 6],
    pub release_date: [u8; 16],
    pub boot_file_name: [u8; 16],
    pub manufacturers_id: [u8; 16],
    pub application_title: [u8; 128],
}

/// One of the 8 region-symbol slots following the licence screen code.
#[binrw]
#[brw(little)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionSymbol {
    pub unknown: u32,
    pub description: [u8; REGION_SYMBOL_DESCRIPTION_SIZE],
}

pub const REGION_SYMBOL_SLOT_USED: u32 = 0x0EA0_0900;
pub const REGION_SYMBOL_SLOT_UNUSED: u32 = 0xFEAF_0900;
