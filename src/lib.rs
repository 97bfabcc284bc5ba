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
*/

//! # segakatana
//!
//! segakatana is a Rust library for reading, validating, and extracting
//! Sega Dreamcast disc images stored in DiscJuggler's `.cdi` container
//! format.
//!
//! It parses the variable-length session/track descriptor at the tail of a
//! `.cdi` file, locates and validates the `IP.BIN` bootstrap embedded in the
//! first data track, mounts the ISO-9660 filesystem laid out on that track,
//! and can extract raw tracks, the bootstrap, the optional "MR" boot logo,
//! and the filesystem's files back out to a host directory.
//!
//! The main entry point is [`DiscImage::open`], which drives that whole
//! pipeline over a single [`std::io::Read`] + [`std::io::Seek`] handle.

pub mod bootstrap;
pub mod cdi;
pub mod error;
pub mod extract;
pub mod file_system;
pub mod io;
pub mod iso9660;
pub mod mr_image;
pub mod sector_stream;
pub mod types;

use bootstrap::{Bootstrap, BootstrapLocation};
use error::Result;
use io::ReadSeek;
use iso9660::FileSystem;
use sector_stream::SectorStream;
use std::path::Path;

/// An opened `.cdi` container: its session/track table, the located
/// bootstrap, and the filesystem mounted on the bootstrap's track.
///
/// Construction runs the full pipeline described in the crate docs; once
/// open, every extraction operation goes through the held [`SectorStream`]
/// so sequential reads keep the monotone-cursor fast path.
pub struct DiscImage<R> {
    stream: SectorStream<R>,
    bootstrap: Bootstrap,
    bootstrap_location: BootstrapLocation,
    filesystem: FileSystem,
}

impl<R: ReadSeek> DiscImage<R> {
    /// Opens a container: parses the descriptor, locates the bootstrap in
    /// the first matching data track, and mounts the ISO-9660 filesystem on
    /// that same track.
    pub fn open(reader: R) -> Result<Self> {
        let mut stream = SectorStream::open(reader)?;
        let (bootstrap, bootstrap_location) = Bootstrap::locate(&mut stream)?;
        let filesystem = FileSystem::mount(&mut stream, bootstrap_location.session, bootstrap_location.track)?;

        Ok(DiscImage {
            stream,
            bootstrap,
            bootstrap_location,
            filesystem,
        })
    }

    pub fn sessions(&self) -> &[cdi::Session] {
        self.stream.sessions()
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    pub fn bootstrap_location(&self) -> BootstrapLocation {
        self.bootstrap_location
    }

    pub fn filesystem(&self) -> &FileSystem {
        &self.filesystem
    }

    /// Dumps one track's body to `output_dir` (audio as WAV, data as ISO).
    pub fn extract_track(&mut self, session: u16, track: u16, output_dir: &Path) -> Result<()> {
        extract::extract_track(&mut self.stream, session, track, output_dir)
    }

    /// Writes the located bootstrap's 32KiB buffer verbatim as `IP.BIN`.
    pub fn extract_ip_bin(&self, output_dir: &Path) -> Result<()> {
        extract::extract_ip_bin(&self.bootstrap, output_dir)
    }

    /// Decodes and writes the embedded boot logo as `bootlogo.bmp`, if one
    /// is present.
    pub fn extract_boot_logo(&self, output_dir: &Path) -> Result<()> {
        extract::extract_boot_logo(&self.bootstrap, output_dir)
    }

    /// Recreates the mounted filesystem's directory tree and file contents
    /// under `output_dir`.
    pub fn extract_filesystem(&mut self, output_dir: &Path) -> Result<()> {
        extract::extract_filesystem(
            &mut self.stream,
            self.bootstrap_location.session,
            self.bootstrap_location.track,
            &self.filesystem,
            output_dir,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error::DiscImageError;

    /// Every fatal error variant must render a non-empty message, since the
    /// CLI's only error surface is `Display`-ing the chain.
    #[test]
    fn every_error_variant_has_non_empty_display() {
        let variants: Vec<DiscImageError> = vec![
            DiscImageError::IoError("x".into()),
            DiscImageError::FileNotFound,
            DiscImageError::IoShortRead,
            DiscImageError::IoShortWrite,
            DiscImageError::InvalidDescriptorType,
            DiscImageError::TruncatedDescriptor,
            DiscImageError::UnsupportedTrackMode,
            DiscImageError::UnsupportedSectorSize,
            DiscImageError::OutOfRange,
            DiscImageError::BootstrapSignatureMismatch,
            DiscImageError::BootstrapNotFound,
            DiscImageError::PvdNotFound,
            DiscImageError::DirectoryReadFailed,
            DiscImageError::PaletteIndexOutOfRange,
            DiscImageError::MrImageTooLarge,
            DiscImageError::BiEndianMismatch,
        ];
        for variant in variants {
            assert!(!variant.to_string().is_empty());
        }
    }
}
