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

    tests/synthetic_disc.rs

    Builds a minimal but structurally valid .cdi byte-for-byte in memory (one
    Mode2/2048 data track carrying a bootstrap, an embedded boot logo, and a
    one-file ISO9660 filesystem, plus one Audio/2352 track) and drives the
    library end to end against it: open -> bootstrap locate -> ISO walk ->
    every extraction operation.
*/

use segakatana::bootstrap::{BOOTSTRAP_SIZE, HARDWARE_ID, HARDWARE_VENDOR_ID, MR_IMAGE_OFFSET};
use segakatana::iso9660::directory::FileFlags;
use segakatana::mr_image::{MrColor, MrImage};
use segakatana::DiscImage;
use std::fs;
use std::fs::File;
use std::io::Write;

const SECTOR_SIZE: usize = 2048;
const AUDIO_SECTOR_SIZE: usize = 2352;

const TRACK_START_MARKER: [u8; 20] = [
    0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
    0xFF,
];

/// Mirrors `cdi::descriptor::parse_track`'s grammar for a type-1 descriptor
/// track record: leading zero dword, track-start marker, 4 unknown bytes,
/// filename, 19 zero bytes, then a 93-byte field block.
fn build_track_bytes(filename: &str, pregap: u32, body_len: u32, mode: u32, lba: u32, total_len: u32, sector_size: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&TRACK_START_MARKER);
    out.extend_from_slice(&[0u8; 4]);
    out.push(filename.len() as u8);
    out.extend_from_slice(filename.as_bytes());
    out.extend_from_slice(&[0u8; 19]);
    let mut fields = vec![0u8; 93];
    fields[6..10].copy_from_slice(&pregap.to_le_bytes());
    fields[10..14].copy_from_slice(&body_len.to_le_bytes());
    fields[20..24].copy_from_slice(&mode.to_le_bytes());
    fields[36..40].copy_from_slice(&lba.to_le_bytes());
    fields[40..44].copy_from_slice(&total_len.to_le_bytes());
    fields[60..64].copy_from_slice(&sector_size.to_le_bytes());
    out.extend_from_slice(&fields);
    out
}

fn build_type1_descriptor(tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&1u16.to_le_bytes()); // one session
    out.extend_from_slice(&(tracks.len() as u16).to_le_bytes());
    for track in tracks {
        out.extend_from_slice(track);
    }
    out.extend_from_slice(&[0u8; 12]);
    out
}

fn append_type1_tail(mut file: Vec<u8>, descriptor: Vec<u8>) -> Vec<u8> {
    let helper = file.len() as u32;
    file.extend_from_slice(&descriptor);
    file.extend_from_slice(&0x8000_0004u32.to_le_bytes());
    file.extend_from_slice(&helper.to_le_bytes());
    file
}

/// Mirrors `iso9660::directory::build_entry`'s directory-record layout.
fn build_directory_entry(identifier: &[u8], flags: FileFlags, extent_lba: u32, extent_size: u32) -> Vec<u8> {
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

/// Mirrors `iso9660::volume_descriptor::PrimaryVolumeDescriptor::parse`'s
/// sector layout.
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

    sector[156] = 34;
    sector[156 + 2..156 + 6].copy_from_slice(&root_lba.to_le_bytes());
    sector[156 + 6..156 + 10].copy_from_slice(&root_lba.to_be_bytes());
    sector[156 + 10..156 + 14].copy_from_slice(&root_size.to_le_bytes());
    sector[156 + 14..156 + 18].copy_from_slice(&root_size.to_be_bytes());

    sector[881] = 1;
    sector
}

const FILE_CONTENTS: &[u8] = b"Hello, Dreamcast!\n";

/// Lays out the data track's 19 logical sectors: a 16-sector bootstrap
/// (carrying an embedded boot logo), a PVD, a root directory extent, and a
/// one-sector file extent.
fn build_data_track() -> Vec<u8> {
    let mut bootstrap = vec![0u8; BOOTSTRAP_SIZE];
    bootstrap[0..16].copy_from_slice(HARDWARE_ID);
    bootstrap[16..32].copy_from_slice(HARDWARE_VENDOR_ID);

    let logo_pixels = vec![
        MrColor::rgba(0, 0, 0, 255),
        MrColor::rgba(0, 0, 0, 255),
        MrColor::rgba(255, 255, 255, 255),
        MrColor::rgba(255, 0, 0, 255),
    ];
    let logo = MrImage::encode(4, 1, &logo_pixels).unwrap();
    bootstrap[MR_IMAGE_OFFSET..MR_IMAGE_OFFSET + logo.len()].copy_from_slice(&logo);

    assert_eq!(bootstrap.len(), 16 * SECTOR_SIZE);

    let pvd = build_pvd_sector("SYNTHETIC", 17, SECTOR_SIZE as u32);

    let mut root_dir = vec![0u8; SECTOR_SIZE];
    let mut pos = 0;
    for entry in [
        build_directory_entry(&[0x00], FileFlags::DIRECTORY, 17, SECTOR_SIZE as u32),
        build_directory_entry(&[0x01], FileFlags::DIRECTORY, 17, SECTOR_SIZE as u32),
        build_directory_entry(b"HELLO.TXT;1", FileFlags::empty(), 18, FILE_CONTENTS.len() as u32),
    ] {
        root_dir[pos..pos + entry.len()].copy_from_slice(&entry);
        pos += entry.len();
    }

    let mut file_sector = vec![0u8; SECTOR_SIZE];
    file_sector[..FILE_CONTENTS.len()].copy_from_slice(FILE_CONTENTS);

    let mut track = Vec::with_capacity(19 * SECTOR_SIZE);
    track.extend_from_slice(&bootstrap);
    track.extend_from_slice(&pvd);
    track.extend_from_slice(&root_dir);
    track.extend_from_slice(&file_sector);
    assert_eq!(track.len(), 19 * SECTOR_SIZE);
    track
}

fn build_audio_track() -> Vec<u8> {
    let mut track = vec![0u8; 3 * AUDIO_SECTOR_SIZE];
    for (i, b) in track.iter_mut().enumerate() {
        *b = (i % 256) as u8;
    }
    track
}

fn build_synthetic_cdi() -> Vec<u8> {
    let data_track = build_data_track();
    let audio_track = build_audio_track();

    let mut file = Vec::new();
    file.extend_from_slice(&data_track);
    file.extend_from_slice(&audio_track);

    let track0 = build_track_bytes("DATA.BIN", 0, 19, 2, 0, 19, 0);
    let track1 = build_track_bytes("AUDIO.BIN", 0, 3, 0, 0, 3, 2);
    let descriptor = build_type1_descriptor(&[track0, track1]);

    append_type1_tail(file, descriptor)
}

#[test]
fn opens_and_extracts_a_synthetic_disc_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let cdi_path = dir.path().join("synthetic.cdi");
    let mut cdi_file = File::create(&cdi_path).unwrap();
    cdi_file.write_all(&build_synthetic_cdi()).unwrap();
    drop(cdi_file);

    let output_dir = dir.path().join("out");
    let file = File::open(&cdi_path).unwrap();
    let mut image = DiscImage::open(file).unwrap();

    assert_eq!(image.sessions().len(), 1);
    assert_eq!(image.sessions()[0].tracks.len(), 2);
    assert_eq!(image.bootstrap_location().session, 0);
    assert_eq!(image.bootstrap_location().track, 0);
    assert_eq!(&image.bootstrap().header().unwrap().hardware_id, HARDWARE_ID);
    assert!(image.bootstrap().has_boot_logo());
    assert_eq!(image.filesystem().pvd.volume_identifier, "SYNTHETIC");

    image.extract_ip_bin(&output_dir).unwrap();
    let ip_bin = fs::read(output_dir.join("IP.BIN")).unwrap();
    assert_eq!(ip_bin.len(), BOOTSTRAP_SIZE);
    assert_eq!(&ip_bin[0..16], HARDWARE_ID);

    image.extract_boot_logo(&output_dir).unwrap();
    let bmp = fs::read(output_dir.join("bootlogo.bmp")).unwrap();
    assert_eq!(&bmp[0..2], b"BM");

    image.extract_filesystem(&output_dir).unwrap();
    let extracted_file = fs::read(output_dir.join("HELLO.TXT")).unwrap();
    assert_eq!(extracted_file, FILE_CONTENTS);

    image.extract_track(0, 0, &output_dir).unwrap();
    let data_dump = fs::read(output_dir.join("TData0-0.iso")).unwrap();
    assert_eq!(data_dump.len(), 19 * SECTOR_SIZE);
    assert_eq!(&data_dump[0..16], HARDWARE_ID);

    image.extract_track(0, 1, &output_dir).unwrap();
    let audio_dump = fs::read(output_dir.join("TAudio0-1.wav")).unwrap();
    assert_eq!(audio_dump.len(), 44 + 3 * AUDIO_SECTOR_SIZE);
    assert_eq!(&audio_dump[0..4], b"RIFF");
    assert_eq!(
        u32::from_le_bytes(audio_dump[40..44].try_into().unwrap()),
        (3 * AUDIO_SECTOR_SIZE) as u32
    );
}
