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

    src/iso9660/directory.rs

    Directory-entry parsing and the recursive tree walk, with a sector cache
    keyed by extent LBA that both avoids re-reading a directory twice and
    breaks the `.`/`..` self-reference.
*/

use crate::error::{DiscImageError, Result};
use crate::file_system::date_time::FsDateTime;
use crate::file_system::file_tree::{FileEntry, FileTreeNode};
use crate::io::ReadSeek;
use crate::iso9660::volume_descriptor::SECTOR_SIZE;
use crate::sector_stream::TrackHandle;
use crate::types::{BiEndian16, BiEndian32};
use bitflags::bitflags;
use std::collections::HashMap;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FileFlags: u8 {
        const HIDDEN = 0x01;
        const DIRECTORY = 0x02;
        const ASSOCIATED_FILE = 0x04;
        const EXTENDED_ATTRIBUTE_FORMAT = 0x08;
        const EXTENDED_ATTRIBUTE_PERMISSIONS = 0x10;
        const SPANNING = 0x80;
    }
}

struct DirectoryEntry {
    record_length: u8,
    extent_lba: u32,
    extent_size: u32,
    recorded_at: FsDateTime,
    flags: FileFlags,
    identifier: Vec<u8>,
}

/// Parses one directory entry starting at `buf[0]`. Returns `None` once a
/// zero-length record is seen, which means the rest of the current sector is
/// padding.
fn parse_directory_entry(buf: &[u8]) -> Result<Option<DirectoryEntry>> {
    if buf.is_empty() || buf[0] == 0 {
        return Ok(None);
    }
    let record_length = buf[0];
    if (record_length as usize) < 34 || buf.len() < record_length as usize {
        return Err(DiscImageError::DirectoryReadFailed);
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
    let _ = BiEndian16::from_parts(
        u16::from_le_bytes(buf[28..30].try_into().unwrap()),
        u16::from_be_bytes(buf[30..32].try_into().unwrap()),
    )
    .get()?;

    let recorded_at = FsDateTime::from_directory_record(buf[18..25].try_into().unwrap());
    let flags = FileFlags::from_bits_truncate(buf[25]);
    let identifier_length = buf[32] as usize;
    if buf.len() < 33 + identifier_length {
        return Err(DiscImageError::DirectoryReadFailed);
    }
    let identifier = buf[33..33 + identifier_length].to_vec();

    Ok(Some(DirectoryEntry {
        record_length,
        extent_lba,
        extent_size,
        recorded_at,
        flags,
        identifier,
    }))
}

/// Turns a raw identifier byte string into its displayed name: `.` and `..`
/// for the self/parent entries, otherwise the identifier with its ISO-9660
/// version suffix (`;1`) stripped.
fn normalize_name(identifier: &[u8]) -> String {
    if identifier == [0x00] {
        return ".".to_string();
    }
    if identifier == [0x01] {
        return "..".to_string();
    }
    let name = String::from_utf8_lossy(identifier);
    match name.rfind(';') {
        Some(pos) => name[..pos].to_string(),
        None => name.into_owned(),
    }
}

/// Reads `extent_size` bytes starting at `extent_lba` through `handle`,
/// rounding the read up to whole 2048-byte logical sectors. Public so the
/// filesystem extractor can re-read a file's bytes using the LBA recorded
/// for it by the walk, without re-parsing directory entries.
pub fn read_extent<R: ReadSeek>(handle: &mut TrackHandle<R>, extent_lba: u32, extent_size: u32) -> Result<Vec<u8>> {
    let sectors = extent_size.div_ceil(SECTOR_SIZE as u32).max(1);
    let mut data = handle.read_sectors(extent_lba, sectors)?;
    data.truncate(extent_size as usize);
    Ok(data)
}

/// Caches directory extents by LBA and drives the recursive tree walk.
pub struct DirectoryWalker<'a, 'b, R> {
    handle: &'b mut TrackHandle<'a, R>,
    cache: HashMap<u32, Vec<u8>>,
    /// Full path -> (extent LBA, extent size) for every file entry seen so
    /// far, so a later extraction pass can re-read a file's bytes without
    /// re-walking the tree.
    file_extents: HashMap<String, (u32, u32)>,
}

impl<'a, 'b, R: ReadSeek> DirectoryWalker<'a, 'b, R> {
    pub fn new(handle: &'b mut TrackHandle<'a, R>) -> Self {
        DirectoryWalker {
            handle,
            cache: HashMap::new(),
            file_extents: HashMap::new(),
        }
    }

    /// Consumes the walker, returning the file-path -> extent map it built up.
    pub fn into_file_extents(self) -> HashMap<String, (u32, u32)> {
        self.file_extents
    }

    fn cached_extent(&mut self, extent_lba: u32, extent_size: u32) -> Result<&[u8]> {
        if !self.cache.contains_key(&extent_lba) {
            let data = read_extent(self.handle, extent_lba, extent_size)?;
            if log::log_enabled!(log::Level::Trace) {
                let digest = sha1_smol::Sha1::from(&data).hexdigest();
                log::trace!("iso9660: directory extent at LBA {extent_lba} hashes to {digest}");
            }
            log::debug!("iso9660: cached directory extent at LBA {extent_lba} ({} bytes)", data.len());
            self.cache.insert(extent_lba, data);
        } else {
            log::trace!("iso9660: reused cached directory extent at LBA {extent_lba}");
        }
        Ok(self.cache.get(&extent_lba).unwrap())
    }

    /// Walks the directory rooted at `(extent_lba, extent_size)`, producing
    /// a [`FileTreeNode::Directory`] whose children mirror the on-disc
    /// entries (excluding the raw `.`/`..` self-references, which the tree
    /// model doesn't represent as children).
    pub fn walk_root(&mut self, extent_lba: u32, extent_size: u32, path: &str) -> Result<FileTreeNode> {
        self.walk_directory(extent_lba, extent_size, path, extent_lba)
    }

    fn walk_directory(
        &mut self,
        extent_lba: u32,
        extent_size: u32,
        path: &str,
        enclosing_extent_lba: u32,
    ) -> Result<FileTreeNode> {
        let dfe = FileEntry {
            short_name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            size: 0,
            created: None,
            modified: None,
        };

        let buf = self.cached_extent(extent_lba, extent_size)?.to_vec();
        let mut children = Vec::new();
        let mut pos = 0usize;
        let mut remaining = extent_size as usize;

        while remaining > 0 {
            let remainder = remaining % SECTOR_SIZE;
            if remainder > 0 && remainder < 34 {
                let skip = remainder;
                pos += skip;
                remaining -= skip;
                continue;
            }

            let entry = match parse_directory_entry(&buf[pos..])? {
                Some(entry) => entry,
                None => break,
            };

            let name = normalize_name(&entry.identifier);
            let is_dir = entry.flags.contains(FileFlags::DIRECTORY);

            if name != "." && name != ".." {
                let child_path = if path.is_empty() || path == "/" {
                    format!("/{name}")
                } else {
                    format!("{path}/{name}")
                };

                if is_dir && entry.extent_lba != enclosing_extent_lba {
                    let child = self.walk_directory(entry.extent_lba, entry.extent_size, &child_path, extent_lba)?;
                    children.push(child);
                } else if !is_dir {
                    self.file_extents
                        .insert(child_path.clone(), (entry.extent_lba, entry.extent_size));
                    children.push(FileTreeNode::File(FileEntry {
                        short_name: name,
                        path: child_path,
                        size: entry.extent_size as u64,
                        created: Some(entry.recorded_at.clone()),
                        modified: Some(entry.recorded_at),
                    }));
                }
            }

            pos += entry.record_length as usize;
            remaining = remaining.saturating_sub(entry.record_length as usize);
        }

        Ok(FileTreeNode::Directory { dfe, children })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_entry(identifier: &[u8], flags: FileFlags, extent_lba: u32, extent_size: u32) -> Vec<u8> {
        let mut pad_len = identifier.len() + (identifier.len() % 2 == 0) as usize;
        if pad_len == 0 {
            pad_len = 1;
        }
        let record_length = 33 + pad_len;
        let mut buf = vec![0u8; record_length];
        buf[0] = record_length as u8;
        buf[2..6].copy_from_slice(&extent_lba.to_le_bytes());
        buf[6..10].copy_from_slice(&extent_lba.to_be_bytes());
        buf[10..14].copy_from_slice(&extent_size.to_le_bytes());
        buf[14..18].copy_from_slice(&extent_size.to_be_bytes());
        buf[25] = flags.bits();
        buf[28..30].copy_from_slice(&1u16.to_le_bytes());
        buf[30..32].copy_from_slice(&1u16.to_be_bytes());
        buf[32] = identifier.len() as u8;
        buf[33..33 + identifier.len()].copy_from_slice(identifier);
        buf
    }

    #[test]
    fn parses_self_and_parent_entries() {
        let buf = build_entry(&[0x00], FileFlags::DIRECTORY, 23, 2048);
        let entry = parse_directory_entry(&buf).unwrap().unwrap();
        assert_eq!(normalize_name(&entry.identifier), ".");
        assert_eq!(entry.extent_lba, 23);
    }

    #[test]
    fn strips_version_suffix_from_file_names() {
        let buf = build_entry(b"README.TXT;1", FileFlags::empty(), 100, 512);
        let entry = parse_directory_entry(&buf).unwrap().unwrap();
        assert_eq!(normalize_name(&entry.identifier), "README.TXT");
    }

    #[test]
    fn zero_length_record_ends_parsing() {
        let buf = vec![0u8; 16];
        assert!(parse_directory_entry(&buf).unwrap().is_none());
    }
}
