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

    src/iso9660/mod.rs

    Mounts the ISO-9660 filesystem laid out on a single data track: scans for
    the Primary Volume Descriptor, then walks its root directory into a tree.
*/

pub mod directory;
pub mod volume_descriptor;

use crate::error::Result;
use crate::file_system::file_tree::FileTreeNode;
use crate::io::ReadSeek;
use crate::sector_stream::{SectorStream, TrackHandle};
use directory::DirectoryWalker;
use std::collections::HashMap;
use volume_descriptor::{scan_for_primary, PrimaryVolumeDescriptor};

/// A mounted ISO-9660 filesystem: the parsed Primary Volume Descriptor, the
/// directory tree rooted at it, and a path -> extent lookup for re-reading
/// file bytes during extraction.
pub struct FileSystem {
    pub pvd: PrimaryVolumeDescriptor,
    pub root: FileTreeNode,
    pub(crate) file_extents: HashMap<String, (u32, u32)>,
}

impl FileSystem {
    /// Scans `(session, track)` for the Primary Volume Descriptor and walks
    /// its filesystem. `track` is normally the same data track the bootstrap
    /// was located on.
    pub fn mount<R: ReadSeek>(stream: &mut SectorStream<R>, session: u16, track: u16) -> Result<Self> {
        let mut handle = TrackHandle::new(stream, session, track)?;
        let base_lba = handle.base_lba();

        let pvd = scan_for_primary(|relative_sector| handle.read_sectors(base_lba + relative_sector, 1))?;
        log::info!("found primary volume descriptor: {}", pvd.volume_identifier);

        let mut walker = DirectoryWalker::new(&mut handle);
        let root = walker.walk_root(pvd.root_extent_lba, pvd.root_extent_size, "")?;
        let file_extents = walker.into_file_extents();

        Ok(FileSystem {
            pvd,
            root,
            file_extents,
        })
    }
}
