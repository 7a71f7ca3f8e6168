// Anim64 - Delta-compressed animation scripts for C64 playback engines
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Anim64 Compiler CLI
//!
//! Compiles text recordings into animation scripts for the Commodore 64.

use clap::Parser;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anim64::error::format_error;
use anim64::memory::MemoryImage;
use anim64::output::{format_from_extension, write_segments, write_text, OutputFormat};
use anim64::recording::parse_number;
use anim64::watcher::RecordingWatcher;
use anim64::{AttributeConfig, Bin, EncoderConfig, LayoutMode, StateRange};

/// Anim64 - Delta-compressed animation scripts for the Commodore 64
#[derive(Parser, Debug)]
#[command(name = "anim64")]
#[command(author = "Anim64 Team")]
#[command(version)]
#[command(about = "Compiles recorded object animations into C64 playback scripts")]
#[command(long_about = r#"
Anim64 reads a recording with one object state per line
(object x y angle) and compiles it into delta-compressed scripts, delta
tables and a header for a playback engine on the Commodore 64.

Numbers may be decimal, $hex or %binary.

Example usage:
  anim64 walk.txt -o walk.prg
  anim64 walk.txt -o walk.prg --base $4000 --symbols walk.inc
  anim64 walk.txt -o walk.prg --modulo 2=32 --range 0=-3..3

Chunked layout over free memory ranges (one file per range):
  anim64 walk.txt -o walk.prg --bin $0C00-$0FFF --bin $C000-$CFFF
  anim64 walk.txt -o walk.prg --bin $0C00-$0FFF --bin $C000-$CFFF --merge

Rebuild whenever the recording changes:
  anim64 walk.txt -o walk.prg --watch
"#)]
struct Cli {
    /// Recording to compile
    recording: PathBuf,

    /// Output file (.prg, .bin or .raw)
    #[arg(short, long)]
    output: PathBuf,

    /// Number of objects (default: highest object index + 1)
    #[arg(long)]
    objects: Option<usize>,

    /// Number of attributes per state (x, y, angle)
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=3))]
    attributes: u8,

    /// Delta range of an attribute, e.g. 0=-3..3
    #[arg(long = "range", value_name = "I=MIN..MAX", value_parser = parse_range)]
    ranges: Vec<(usize, RangeInclusive<i32>)>,

    /// Wrap the deltas of an attribute, e.g. 2=32
    #[arg(long = "modulo", value_name = "I=M", value_parser = parse_modulo)]
    modulos: Vec<(usize, i32)>,

    /// Load address of the contiguous layout
    #[arg(long, value_name = "ADDR", default_value = "$C000", value_parser = parse_address)]
    base: u16,

    /// Free memory range for the chunked layout, e.g. $C000-$CFFF
    #[arg(long = "bin", value_name = "ADDR-END", value_parser = parse_bin, conflicts_with = "base")]
    bins: Vec<Bin>,

    /// Merge chunked segments into one file
    #[arg(long, requires = "bins")]
    merge: bool,

    /// Byte used for gaps when merging
    #[arg(long, value_name = "BYTE", default_value = "0", value_parser = parse_byte)]
    fill: u8,

    /// Write raw binaries without load address
    #[arg(long)]
    raw: bool,

    /// Reject State values that do not fit instead of truncating them
    #[arg(long)]
    strict: bool,

    /// Write an assembler symbol listing
    #[arg(long, value_name = "FILE")]
    symbols: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Watch the recording and rebuild on changes
    #[arg(short, long)]
    watch: bool,
}

fn parse_address(text: &str) -> Result<u16, String> {
    parse_number(text.trim())
        .and_then(|value| u16::try_from(value).ok())
        .ok_or_else(|| format!("'{}' is not an address between $0000 and $FFFF", text))
}

fn parse_byte(text: &str) -> Result<u8, String> {
    parse_number(text.trim())
        .and_then(|value| u8::try_from(value).ok())
        .ok_or_else(|| format!("'{}' is not a byte", text))
}

fn parse_bin(text: &str) -> Result<Bin, String> {
    let (first, last) = text
        .split_once('-')
        .ok_or_else(|| format!("'{}' is not a range like $C000-$CFFF", text))?;
    let (first, last) = (parse_address(first)?, parse_address(last)?);
    if last < first {
        return Err(format!("'{}' ends before it starts", text));
    }
    Ok(Bin::from_range(first, last))
}

fn parse_indexed(text: &str) -> Result<(usize, &str), String> {
    let (index, value) = text
        .split_once('=')
        .ok_or_else(|| format!("'{}' is missing '='", text))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not an attribute index", index))?;
    Ok((index, value.trim()))
}

fn parse_i32(text: &str) -> Result<i32, String> {
    parse_number(text.trim())
        .and_then(|value| i32::try_from(value).ok())
        .ok_or_else(|| format!("'{}' is not a number", text))
}

fn parse_range(text: &str) -> Result<(usize, RangeInclusive<i32>), String> {
    let (index, value) = parse_indexed(text)?;
    let (min, max) = value
        .split_once("..")
        .ok_or_else(|| format!("'{}' is not a range like -7..7", value))?;
    Ok((index, parse_i32(min)?..=parse_i32(max)?))
}

fn parse_modulo(text: &str) -> Result<(usize, i32), String> {
    let (index, value) = parse_indexed(text)?;
    Ok((index, parse_i32(value)?))
}

/// Map the attribute flags onto an encoder configuration.
fn encoder_config(cli: &Cli) -> Result<EncoderConfig, String> {
    let num_attributes = cli.attributes as usize;
    let mut attributes = vec![AttributeConfig::default(); num_attributes];

    for (index, range) in &cli.ranges {
        let attribute = attributes
            .get_mut(*index)
            .ok_or_else(|| format!("--range: no attribute {}", index))?;
        attribute.range = range.clone();
    }
    for (index, modulo) in &cli.modulos {
        let attribute = attributes
            .get_mut(*index)
            .ok_or_else(|| format!("--modulo: no attribute {}", index))?;
        attribute.modulo = Some(*modulo);
    }

    let state_range = if cli.strict {
        StateRange::Strict
    } else {
        StateRange::Wrap
    };

    Ok(attributes
        .into_iter()
        .enumerate()
        .fold(EncoderConfig::new(num_attributes), |config, (index, attribute)| {
            config.with_attribute(index, attribute)
        })
        .with_state_range(state_range))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let format = if cli.raw {
        OutputFormat::Raw
    } else {
        match format_from_extension(&cli.output) {
            Some(f) => f,
            None => {
                eprintln!("Error: Unknown output format. Use .prg, .bin or .raw extension.");
                return ExitCode::from(2);
            }
        }
    };

    let config = match encoder_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let mode = if cli.bins.is_empty() {
        LayoutMode::Contiguous { base: cli.base }
    } else {
        LayoutMode::Chunked {
            bins: cli.bins.clone(),
        }
    };

    if cli.verbose {
        println!("Anim64 Compiler v{}", anim64::VERSION);
        println!("Output format: {:?}", format);
        println!("Output: {}", cli.output.display());
        match &mode {
            LayoutMode::Contiguous { base } => println!("Layout: contiguous at ${:04X}", base),
            LayoutMode::Chunked { bins } => {
                println!("Layout: chunked");
                for bin in bins {
                    println!("  - ${:04X}-${:04X}", bin.address, bin.end() - 1);
                }
            }
        }
        println!();
    }

    let result = run_build(&cli, &config, &mode, format);

    if cli.watch {
        return run_watch_loop(&cli, &config, &mode, format);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

/// Read, compile and write once. Errors are reported before returning the
/// exit code.
fn run_build(
    cli: &Cli,
    config: &EncoderConfig,
    mode: &LayoutMode,
    format: OutputFormat,
) -> Result<(), ExitCode> {
    let source = match std::fs::read_to_string(&cli.recording) {
        Ok(content) => {
            if cli.verbose {
                println!("Reading {}...", cli.recording.display());
            }
            content
        }
        Err(e) => {
            eprintln!("Error: Cannot read {}: {}", cli.recording.display(), e);
            return Err(ExitCode::from(3));
        }
    };

    let filename = cli
        .recording
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("<input>");

    if cli.verbose {
        println!("Compiling...");
    }

    let build = match anim64::compile_recording(&source, cli.objects, config.clone(), mode) {
        Ok(build) => build,
        Err(e) => {
            eprint!("{}", format_error(&e, &source, Some(filename)));
            return Err(ExitCode::from(1));
        }
    };

    let mut segments = build.layout.segments().to_vec();
    if cli.merge {
        match MemoryImage::from_layout(&build.layout, cli.fill) {
            Ok(image) => segments = image.to_segment().into_iter().collect(),
            Err(e) => {
                eprint!("{}", format_error(&e, &source, Some(filename)));
                return Err(ExitCode::from(1));
            }
        }
    }

    if cli.verbose {
        let summary = build.layout.summary();
        println!(
            "{} objects, {} steps, {} deltas ({} recorded)",
            summary.objects,
            summary.steps,
            summary.deltas,
            build.encoder.recorded_deltas()
        );
        println!(
            "Header {} bytes, tables {} bytes, scripts {} bytes",
            summary.header_bytes, summary.table_bytes, summary.script_bytes
        );
        if let Some(address) = build.layout.primary_table_address() {
            println!("Primary delta table at ${:04X}", address);
        }
        println!();
        for script in &build.scripts {
            print!("{}", script.listing());
        }
        println!();
        println!("Writing {}...", cli.output.display());
    }

    let written = match write_segments(&segments, &cli.output, format) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Error: Cannot write {}: {}", cli.output.display(), e);
            return Err(ExitCode::from(1));
        }
    };

    if let Some(path) = &cli.symbols {
        if let Err(e) = write_text(&build.layout.symbols(), path) {
            eprintln!("Error: Cannot write {}: {}", path.display(), e);
            return Err(ExitCode::from(1));
        }
    }

    if cli.verbose {
        println!("Done!");
    } else {
        println!(
            "Compiled {} -> {}",
            display_name(&cli.recording),
            written
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Rebuild whenever the recording changes, until interrupted.
fn run_watch_loop(
    cli: &Cli,
    config: &EncoderConfig,
    mode: &LayoutMode,
    format: OutputFormat,
) -> ExitCode {
    let watcher = match RecordingWatcher::new(std::slice::from_ref(&cli.recording)) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: Failed to create file watcher: {}", e);
            return ExitCode::from(6);
        }
    };

    println!();
    println!("Watching for changes... (Press Ctrl+C to stop)");

    loop {
        if let Err(e) = watcher.wait_for_change() {
            eprintln!("Watch error: {}", e);
            return ExitCode::from(6);
        }

        println!();
        if cli.verbose {
            println!("Change detected, recompiling...");
        } else {
            println!("Recompiling...");
        }

        if run_build(cli, config, mode, format).is_err() {
            println!("Fix errors and save to retry.");
            continue;
        }

        println!("Watching for changes...");
    }
}
