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

use bpaf::*;
use std::path::PathBuf;
use std::str::FromStr;

/// Which track(s) `-s` should operate on: a specific `session:track` pair,
/// or every track when the flag is present with no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSelector {
    All,
    One { session: u16, track: u16 },
}

impl FromStr for TrackSelector {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (session, track) = input
            .split_once(':')
            .ok_or_else(|| format!("expected SESSION:TRACK, got '{input}'"))?;
        let session = session.parse::<u16>().map_err(|_| format!("invalid session number '{session}'"))?;
        let track = track.parse::<u16>().map_err(|_| format!("invalid track number '{track}'"))?;
        Ok(TrackSelector::One { session, track })
    }
}

/// Which artefacts `-e` should extract. `a` expands directly to the union of
/// every known kind rather than being rewritten to a string of the other
/// letters; order of the input characters doesn't matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractKinds {
    pub ip_bin: bool,
    pub boot_logo: bool,
}

impl ExtractKinds {
    pub fn any(&self) -> bool {
        self.ip_bin || self.boot_logo
    }
}

impl FromStr for ExtractKinds {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut kinds = ExtractKinds::default();
        for ch in input.chars() {
            match ch {
                'a' => {
                    kinds.ip_bin = true;
                    kinds.boot_logo = true;
                }
                'i' => kinds.ip_bin = true,
                'l' => kinds.boot_logo = true,
                other => return Err(format!("unknown extraction kind '{other}', expected one of a, i, l")),
            }
        }
        Ok(kinds)
    }
}

#[derive(Debug, Clone)]
pub struct Args {
    pub path: PathBuf,
    pub verbose: bool,
    pub output_dir: Option<PathBuf>,
    pub track_selector: Option<TrackSelector>,
    pub extract: ExtractKinds,
    pub convert: bool,
    pub extract_filesystem: bool,
}

pub fn args_parser() -> OptionParser<Args> {
    let path = positional::<PathBuf>("PATH").help("Path to the .cdi container");
    let verbose = short('v').long("verbose").help("Raise logging to verbose tracing").switch();
    let output_dir = short('o')
        .long("output")
        .argument::<PathBuf>("DIR")
        .help("Output directory for extraction")
        .optional();
    let track_selector = short('s')
        .long("track")
        .argument::<String>("SESSION:TRACK")
        .help("Dump one track (SESSION:TRACK), or every track if given with no value")
        .optional()
        .parse(|value| match value {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(Some(TrackSelector::All)),
            Some(raw) => raw.parse::<TrackSelector>().map(Some),
        });
    let extract = short('e')
        .long("extract")
        .argument::<String>("a|i|l")
        .help("Extract kinds: union of a (all), i (IP.BIN), l (boot logo)")
        .parse(|value| value.parse::<ExtractKinds>())
        .fallback(ExtractKinds::default());
    let convert = short('c').long("convert").help("Convert (currently a no-op stub)").switch();
    let extract_filesystem = short('f')
        .long("filesystem")
        .help("Extract filesystem contents under the output directory")
        .switch();

    construct!(Args {
        path,
        verbose,
        output_dir,
        track_selector,
        extract,
        convert,
        extract_filesystem,
    })
    .to_options()
    .descr("Read, validate, and extract Sega Dreamcast .cdi disc images")
}
