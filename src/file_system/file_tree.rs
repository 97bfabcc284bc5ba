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
use crate::file_system::date_time::FsDateTime;
use std::fmt::{Display, Formatter, Result};

#[derive(Clone)]
pub struct FileEntry {
    pub(crate) short_name: String,
    pub(crate) path: String,
    pub(crate) size: u64,
    pub(crate) created: Option<FsDateTime>,
    pub(crate) modified: Option<FsDateTime>,
}

impl Display for FileEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{} {:>10} {}",
            self.modified.as_ref().unwrap_or(&FsDateTime::default()),
            self.size,
            self.short_name
        )
    }
}

impl FileEntry {
    /// Returns the short name of the file.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Returns the full short path of the file.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the size of the file as u64 in bytes, or 0 if the entry is a directory.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> Option<&FsDateTime> {
        self.modified.as_ref()
    }

    pub fn created(&self) -> Option<&FsDateTime> {
        self.created.as_ref()
    }
}

#[derive(Clone)]
pub enum FileTreeNode {
    File(FileEntry),
    Directory { dfe: FileEntry, children: Vec<FileTreeNode> },
}

impl Default for FileTreeNode {
    fn default() -> Self {
        FileTreeNode::Directory {
            dfe: FileEntry {
                short_name: "/".to_string(),
                path: "/".to_string(),
                size: 0,
                created: None,
                modified: None,
            },
            children: Vec::new(),
        }
    }
}

impl Display for FileTreeNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            FileTreeNode::File(entry) => write!(f, "{}", entry),
            FileTreeNode::Directory { dfe, .. } => {
                write!(f, "{}", dfe)
            }
        }
    }
}

impl FileTreeNode {
    /// Returns `true` if the current node represents a file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileTreeNode::File(_))
    }

    /// Returns `true` if the current node represents a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileTreeNode::Directory { dfe: _, children: _ })
    }
}
