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

    src/file_system/mod.rs

    The filesystem-agnostic file-tree model, plus the recursive extraction
    routine that copies a mounted tree out to a host directory.
*/

pub mod date_time;
pub mod file_tree;

use crate::error::{DiscImageError, Result};
use crate::file_system::file_tree::FileTreeNode;
use crate::io::ReadSeek;
use crate::iso9660::directory::read_extent;
use crate::iso9660::FileSystem as Iso9660FileSystem;
use crate::sector_stream::TrackHandle;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Recursively copies every file entry in `fs.root` to `output_dir`,
/// recreating its directory structure.
///
/// This is the supplemental operation the original tool's equivalent routine
/// left as an empty stub: each file's bytes are re-read from the track
/// through `handle` at its recorded extent LBA, since the tree only keeps
/// metadata, not file contents.
pub fn extract_tree<R: ReadSeek>(handle: &mut TrackHandle<R>, fs_image: &Iso9660FileSystem, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir).map_err(DiscImageError::from)?;
    extract_node(handle, &fs_image.root, &fs_image.file_extents, output_dir)
}

fn extract_node<R: ReadSeek>(
    handle: &mut TrackHandle<R>,
    node: &FileTreeNode,
    file_extents: &HashMap<String, (u32, u32)>,
    output_dir: &Path,
) -> Result<()> {
    match node {
        FileTreeNode::File(entry) => {
            let (extent_lba, extent_size) = file_extents.get(entry.path()).ok_or(DiscImageError::DirectoryReadFailed)?;
            let dest = output_dir.join(entry.short_name());
            let data = read_extent(handle, *extent_lba, *extent_size)?;
            fs::write(dest, data).map_err(DiscImageError::from)?;
            Ok(())
        }
        FileTreeNode::Directory { dfe, children } => {
            let dir_path = if dfe.path() == "/" || dfe.path().is_empty() {
                output_dir.to_path_buf()
            } else {
                output_dir.join(dfe.short_name())
            };
            fs::create_dir_all(&dir_path).map_err(DiscImageError::from)?;
            for child in children {
                extract_node(handle, child, file_extents, &dir_path)?;
            }
            Ok(())
        }
    }
}
