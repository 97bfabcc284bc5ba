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

    src/iso9660/volume_descriptor.rs

    Volume descriptor layout: the single type/identifier/version header
    shared by all five descriptor kinds, and the Primary Volume Descriptor
    fields the walker and its callers actually use.
*/

use crate::error::{DiscImageError, Result};
use crate::file_system::date_time::FsDateTime;
use crate::types::BiEndian32;

pub const VOLUME_DESCRIPTORS_SECTOR: u32 = 0x10;
pub const SECTOR_SIZE: usize = 0x800;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeDescriptorType {
    BootRecord,
    Primary,
    Supplementary,
    Partition,
    Terminator,
}

impl VolumeDescriptorType {
    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(VolumeDescriptorType::BootRecord),
            1 => Some(VolumeDescriptorType::Primary),
            2 => Some(VolumeDescriptorType::Supplementary),
            3 => Some(VolumeDescriptorType::Partition),
            255 => Some(VolumeDescriptorType::Terminator),
            _ => None,
        }
    }
}

/// The root-directory entry embedded in the PVD, fixed at 35 bytes (a
/// one-byte self-identifier plus its padding byte, never a real filename).
struct EmbeddedRootEntry {
    entry_length: u8,
    extent_lba: u32,
    extent_size: u32,
}

fn parse_embedded_root_entry(buf: &[u8]) -> Result<EmbeddedRootEntry> {
    if buf.len() < 35 {
        return Err(DiscImageError::TruncatedDescriptor);
    }
    let extent_lba = BiEndian32::from_parts(
        u32::from_le_bytes(buf[2..6].try_into().unwrap()),
        u32::from_be_bytes(buf[6..10].try_into().unwrap()),
    )
    .get()?;
    let extent_size = BiEndian32::from_parts(
        u32::from_le_bytes(buf[10..14].try_into().unwrap()),
        u32::from_be_bytes(buf[14..18].try_into().unwrap()),
    )
    .get()?;
    Ok(EmbeddedRootEntry {
        entry_length: buf[0],
        extent_lba,
        extent_size,
    })
}

/// The fields of the Primary Volume Descriptor that this crate parses and
/// exposes. Field offsets within the 2048-byte sector follow the on-disc
/// layout exactly; only the root directory entry, volume space size, and
/// logical block size feed the directory walk itself, the rest are parsed
/// for completeness.
#[derive(Clone, Debug)]
pub struct PrimaryVolumeDescriptor {
    pub system_identifier: String,
    pub volume_identifier: String,
    pub volume_space_size: u32,
    pub volume_set_size: u16,
    pub volume_sequence_number: u16,
    pub logical_block_size: u16,
    pub path_table_size: u32,
    pub type_l_path_table_lba: u32,
    pub type_m_path_table_lba: u32,
    pub root_extent_lba: u32,
    pub root_extent_size: u32,
    pub volume_set_identifier: String,
    pub publisher_identifier: String,
    pub data_preparer_identifier: String,
    pub application_identifier: String,
    pub file_structure_version: u8,
    pub creation_date: FsDateTime,
    pub modification_date: FsDateTime,
    pub expiration_date: FsDateTime,
    pub effective_date: FsDateTime,
}

fn ascii_trimmed(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).trim_end().to_string()
}

impl PrimaryVolumeDescriptor {
    /// Parses the 2048-byte PVD sector. `sector` is expected to already have
    /// passed the type/terminator scan in `scan_volume_descriptors`.
    fn parse(sector: &[u8]) -> Result<Self> {
        if sector.len() < SECTOR_SIZE {
            return Err(DiscImageError::TruncatedDescriptor);
        }
        let biendian32 = |off: usize| -> Result<u32> {
            BiEndian32::from_parts(
                u32::from_le_bytes(sector[off..off + 4].try_into().unwrap()),
                u32::from_be_bytes(sector[off + 4..off + 8].try_into().unwrap()),
            )
            .get()
        };
        let biendian16 = |off: usize| -> Result<u16> {
            crate::types::BiEndian16::from_parts(
                u16::from_le_bytes(sector[off..off + 2].try_into().unwrap()),
                u16::from_be_bytes(sector[off + 2..off + 4].try_into().unwrap()),
            )
            .get()
        };

        let root_entry = parse_embedded_root_entry(&sector[156..156 + 35])?;
        let _ = root_entry.entry_length; // unused: the walker re-derives length from extent_size

        let volume_timestamp = |off: usize| -> FsDateTime { FsDateTime::from_volume_timestamp(sector[off..off + 17].try_into().unwrap()) };

        Ok(PrimaryVolumeDescriptor {
            system_identifier: ascii_trimmed(&sector[8..40]),
            volume_identifier: ascii_trimmed(&sector[40..72]),
            volume_space_size: biendian32(80)?,
            volume_set_size: biendian16(120)?,
            volume_sequence_number: biendian16(124)?,
            logical_block_size: biendian16(128)?,
            path_table_size: biendian32(132)?,
            type_l_path_table_lba: u32::from_le_bytes(sector[140..144].try_into().unwrap()),
            type_m_path_table_lba: u32::from_be_bytes(sector[148..152].try_into().unwrap()),
            root_extent_lba: root_entry.extent_lba,
            root_extent_size: root_entry.extent_size,
            volume_set_identifier: ascii_trimmed(&sector[191..319]),
            publisher_identifier: ascii_trimmed(&sector[319..447]),
            data_preparer_identifier: ascii_trimmed(&sector[447..575]),
            application_identifier: ascii_trimmed(&sector[575..703]),
            file_structure_version: sector[881],
            creation_date: volume_timestamp(775),
            modification_date: volume_timestamp(792),
            expiration_date: volume_timestamp(809),
            effective_date: volume_timestamp(826),
        })
    }
}

/// Reads forward from `sector` 16, one 2048-byte sector at a time, until a
/// Primary Volume Descriptor or the set terminator is seen.
pub fn scan_for_primary<F>(mut read_sector: F) -> Result<PrimaryVolumeDescriptor>
where
    F: FnMut(u32) -> Result<Vec<u8>>,
{
    let mut sector_index = VOLUME_DESCRIPTORS_SECTOR;
    loop {
        let sector = read_sector(sector_index)?;
        let descriptor_type = VolumeDescriptorType::from_raw(sector[0]).ok_or(DiscImageError::PvdNotFound)?;
        match descriptor_type {
            VolumeDescriptorType::Primary => return PrimaryVolumeDescriptor::parse(&sector),
            VolumeDescriptorType::Terminator => return Err(DiscImageError::PvdNotFound),
            _ => {
                sector_index += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_pvd_sector(volume_id: &str, root_lba: u32, root_size: u32) -> Vec<u8> {
        let mut sector = vec![0u8; SECTOR_SIZE];
        sector[0] = 1; // Primary
        sector[1..6].copy_from_slice(b"CD001");
        let id_bytes = volume_id.as_bytes();
        sector[40..40 + id_bytes.len()].copy_from_slice(id_bytes);

        sector[80..84].copy_from_slice(&100u32.to_le_bytes());
        sector[84..88].copy_from_slice(&100u32.to_be_bytes());

        sector[128..130].copy_from_slice(&2048u16.to_le_bytes());
        sector[130..132].copy_from_slice(&2048u16.to_be_bytes());

        // Root directory entry at offset 156.
        sector[156] = 34; // entry length
        sector[156 + 2..156 + 6].copy_from_slice(&root_lba.to_le_bytes());
        sector[156 + 6..156 + 10].copy_from_slice(&root_lba.to_be_bytes());
        sector[156 + 10..156 + 14].copy_from_slice(&root_size.to_le_bytes());
        sector[156 + 14..156 + 18].copy_from_slice(&root_size.to_be_bytes());

        sector[881] = 1; // file structure version
        sector
    }

    #[test]
    fn finds_primary_volume_descriptor() {
        let sector = build_pvd_sector("TEST_GAME", 23, 2048);
        let mut calls = 0;
        let pvd = scan_for_primary(|lba| {
            calls += 1;
            assert_eq!(lba, VOLUME_DESCRIPTORS_SECTOR);
            Ok(sector.clone())
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(pvd.volume_identifier, "TEST_GAME");
        assert_eq!(pvd.root_extent_lba, 23);
        assert_eq!(pvd.root_extent_size, 2048);
        assert_eq!(pvd.logical_block_size, 2048);
        // An all-zero creation-date field (never set by this builder) decodes to
        // the crate's default date rather than failing.
        assert_eq!(pvd.creation_date.year, 1980);
    }

    #[test]
    fn parses_volume_timestamps() {
        let mut sector = build_pvd_sector("TEST_GAME", 23, 2048);
        sector[775..792].copy_from_slice(b"1999070112340000\0");
        let pvd = scan_for_primary(|_| Ok(sector.clone())).unwrap();
        assert_eq!(pvd.creation_date.year, 1999);
        assert_eq!(pvd.creation_date.month, 7);
        assert_eq!(pvd.creation_date.day, 1);
        assert_eq!(pvd.creation_date.hour, 12);
        assert_eq!(pvd.creation_date.minute, 34);
        assert_eq!(pvd.creation_date.second, 0);
    }

    #[test]
    fn terminator_without_primary_is_rejected() {
        let mut sector = vec![0u8; SECTOR_SIZE];
        sector[0] = 255;
        let result = scan_for_primary(|_| Ok(sector.clone()));
        assert!(matches!(result, Err(DiscImageError::PvdNotFound)));
    }
}
