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

    src/extract.rs

    The four extraction operations: raw track dump (audio to WAV, data to
    ISO), the IP.BIN buffer, the boot logo bitmap, and the mounted filesystem.
    Each reuses the sector stream and the codecs above it; none of them parse
    anything new.
*/

use crate::bootstrap::Bootstrap;
use crate::cdi::TrackMode;
use crate::error::Result;
use crate::file_system;
use crate::io::ReadSeek;
use crate::iso9660::FileSystem as Iso9660FileSystem;
use crate::mr_image::MrImage;
use crate::sector_stream::SectorStream;
use std::fs;
use std::path::Path;

const WAV_SAMPLE_RATE: u32 = 44100;
const WAV_CHANNELS: u16 = 2;
const WAV_BITS_PER_SAMPLE: u16 = 16;

/// Builds the 44-byte canonical PCM WAV header for `data_len` bytes of raw
/// 16-bit stereo 44.1kHz audio.
fn wav_header(data_len: u32) -> [u8; 44] {
    let mut out = [0u8; 44];
    let block_align = WAV_CHANNELS * (WAV_BITS_PER_SAMPLE / 8);
    let byte_rate = WAV_SAMPLE_RATE * block_align as u32;

    out[0..4].copy_from_slice(b"RIFF");
    out[4..8].copy_from_slice(&(36 + data_len).to_le_bytes());
    out[8..12].copy_from_slice(b"WAVE");
    out[12..16].copy_from_slice(b"fmt ");
    out[16..20].copy_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    out[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    out[22..24].copy_from_slice(&WAV_CHANNELS.to_le_bytes());
    out[24..28].copy_from_slice(&WAV_SAMPLE_RATE.to_le_bytes());
    out[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    out[32..34].copy_from_slice(&block_align.to_le_bytes());
    out[34..36].copy_from_slice(&WAV_BITS_PER_SAMPLE.to_le_bytes());
    out[36..40].copy_from_slice(b"data");
    out[40..44].copy_from_slice(&data_len.to_le_bytes());
    out
}

/// Dumps one track's body to `output_dir`, named `T<Audio|Data><session>-<track>.<wav|iso>`.
/// Audio tracks get a WAV header prepended to the raw sectors; data tracks
/// are emitted as a plain ISO (the stripped 2048-byte payload per sector).
pub fn extract_track<R: ReadSeek>(stream: &mut SectorStream<R>, session: u16, track: u16, output_dir: &Path) -> Result<()> {
    let info = stream.track_info(session, track)?.clone();
    let body = stream.read_sectors(session, track, info.base_lba, info.body_length)?;

    let (kind, extension) = match info.mode {
        TrackMode::Audio => ("Audio", "wav"),
        TrackMode::Mode1 | TrackMode::Mode2 => ("Data", "iso"),
    };
    let file_name = format!("T{kind}{session}-{track}.{extension}");
    let dest = output_dir.join(file_name);

    if info.mode == TrackMode::Audio {
        let mut out = Vec::with_capacity(44 + body.len());
        out.extend_from_slice(&wav_header(body.len() as u32));
        out.extend_from_slice(&body);
        fs::write(&dest, out)?;
    } else {
        fs::write(&dest, &body)?;
    }
    log::info!("extracted track {session}-{track} to {}", dest.display());
    Ok(())
}

/// Writes the bootstrap's 32KiB buffer verbatim as `IP.BIN`.
pub fn extract_ip_bin(bootstrap: &Bootstrap, output_dir: &Path) -> Result<()> {
    let dest = output_dir.join("IP.BIN");
    fs::write(&dest, bootstrap.as_bytes().as_slice())?;
    log::info!("extracted IP.BIN to {}", dest.display());
    Ok(())
}

/// Decodes the embedded boot logo and writes it as `bootlogo.bmp`. Absence of
/// the logo is not an error: the bootstrap simply has none, a common case for
/// titles that never shipped one, so this logs a warning and returns `Ok`.
pub fn extract_boot_logo(bootstrap: &Bootstrap, output_dir: &Path) -> Result<()> {
    if !bootstrap.has_boot_logo() {
        log::warn!("bootstrap carries no embedded boot logo, skipping");
        return Ok(());
    }
    let image = MrImage::decode(bootstrap.boot_logo_bytes())?;
    let dest = output_dir.join("bootlogo.bmp");
    fs::write(&dest, image.to_bmp())?;
    log::info!("extracted boot logo to {}", dest.display());
    Ok(())
}

/// Recreates the mounted filesystem's directory tree and file contents under
/// `output_dir`.
pub fn extract_filesystem<R: ReadSeek>(
    stream: &mut SectorStream<R>,
    session: u16,
    track: u16,
    fs_image: &Iso9660FileSystem,
    output_dir: &Path,
) -> Result<()> {
    let mut handle = crate::sector_stream::TrackHandle::new(stream, session, track)?;
    file_system::extract_tree(&mut handle, fs_image, output_dir)?;
    log::info!("extracted filesystem contents to {}", output_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_has_expected_fields_for_body_length_10() {
        let data_len = 10 * 2352u32;
        let header = wav_header(data_len);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(u32::from_le_bytes(header[40..44].try_into().unwrap()), 23520);
        assert_eq!(header.len() + data_len as usize, 23564);
    }

    #[test]
    fn wav_header_declares_pcm_stereo_44100_16bit() {
        let header = wav_header(0);
        assert_eq!(u16::from_le_bytes(header[20..22].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(header[22..24].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(header[24..28].try_into().unwrap()), 44100);
        assert_eq!(u16::from_le_bytes(header[34..36].try_into().unwrap()), 16);
        assert_eq!(u32::from_le_bytes(header[28..32].try_into().unwrap()), 176400);
        assert_eq!(u16::from_le_bytes(header[32..34].try_into().unwrap()), 4);
    }
}
