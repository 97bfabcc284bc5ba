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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscImageError {
    #[error("an IO error occurred reading or writing the disc image: {0}")]
    IoError(String),
    #[error("the requested file was not found")]
    FileNotFound,
    #[error("short read encountered")]
    IoShortRead,
    #[error("short write encountered")]
    IoShortWrite,
    #[error("the descriptor tail contains an unrecognised descriptor type")]
    InvalidDescriptorType,
    #[error("the descriptor was truncated before all expected bytes could be read")]
    TruncatedDescriptor,
    #[error("a track's mode field did not match a known value")]
    UnsupportedTrackMode,
    #[error("a track's sector-size class did not match a known value")]
    UnsupportedSectorSize,
    #[error("a sector read/write fell outside the bounds of its track body")]
    OutOfRange,
    #[error("the bootstrap's hardware ID or vendor ID signature did not match")]
    BootstrapSignatureMismatch,
    #[error("no data track contained a valid bootstrap signature")]
    BootstrapNotFound,
    #[error("the volume-descriptor scan reached a terminator before finding a primary volume descriptor")]
    PvdNotFound,
    #[error("a directory extent could not be fully read")]
    DirectoryReadFailed,
    #[error("an MR image run referenced a palette index out of range")]
    PaletteIndexOutOfRange,
    #[error("an encoded MR image would exceed the maximum allowed size")]
    MrImageTooLarge,
    #[error("a both-endian integer pair did not validate (LE != byteswap(BE))")]
    BiEndianMismatch,
}

impl From<std::io::Error> for DiscImageError {
    fn from(err: std::io::Error) -> Self {
        DiscImageError::IoError(err.to_string())
    }
}

impl From<binrw::Error> for DiscImageError {
    fn from(err: binrw::Error) -> Self {
        DiscImageError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DiscImageError>;
