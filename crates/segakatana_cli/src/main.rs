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

pub mod args;

use anyhow::{Context, Error};
use args::{args_parser, Args, TrackSelector};
use segakatana::DiscImage;
use std::fs::File;
use std::path::{Path, PathBuf};

fn main() -> Result<(), Error> {
    let cli = args_parser().run();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(&cli) {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("segakatana: {e}");
            for cause in e.chain().skip(1) {
                eprintln!("caused by: {cause}");
            }
            std::process::exit(1);
        }
    }
}

fn run(cli: &Args) -> Result<(), Error> {
    let file = File::open(&cli.path).with_context(|| format!("failed to open {}", cli.path.display()))?;
    let mut image = DiscImage::open(file).context("failed to parse disc image")?;

    if let Some(selector) = &cli.track_selector {
        let output_dir = output_dir(cli)?;
        dump_tracks(&mut image, *selector, &output_dir)?;
    }

    if cli.extract.any() {
        let output_dir = output_dir(cli)?;
        if cli.extract.ip_bin {
            image.extract_ip_bin(&output_dir).context("failed to extract IP.BIN")?;
        }
        if cli.extract.boot_logo {
            image.extract_boot_logo(&output_dir).context("failed to extract boot logo")?;
        }
    }

    if cli.extract_filesystem {
        let output_dir = output_dir(cli)?;
        image.extract_filesystem(&output_dir).context("failed to extract filesystem contents")?;
    }

    if cli.convert {
        log::warn!("convert (-c) is currently a no-op stub");
    }

    Ok(())
}

fn output_dir(cli: &Args) -> Result<PathBuf, Error> {
    let dir = cli.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create output directory {}", dir.display()))?;
    Ok(dir)
}

fn dump_tracks(image: &mut DiscImage<File>, selector: TrackSelector, output_dir: &Path) -> Result<(), Error> {
    match selector {
        TrackSelector::One { session, track } => {
            image
                .extract_track(session, track, output_dir)
                .with_context(|| format!("failed to dump track {session}:{track}"))?;
        }
        TrackSelector::All => {
            let sessions: Vec<_> = image.sessions().to_vec();
            for session in &sessions {
                for track in &session.tracks {
                    image
                        .extract_track(session.index, track.index, output_dir)
                        .with_context(|| format!("failed to dump track {}:{}", session.index, track.index))?;
                }
            }
        }
    }
    Ok(())
}
