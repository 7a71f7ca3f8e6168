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

//! Output module for the Anim64 compiler.
//!
//! Writes laid-out segments to disk:
//! - PRG files (load address + data)
//! - raw binaries (data only)
//!
//! A layout with several segments produces one file per segment. All files
//! are staged next to their destination first and only moved into place once
//! every one of them was written. If moving one fails, the ones already moved
//! are removed again, so a failed run leaves no partial output.

mod prg;

pub use prg::{encode_segment, read_prg};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::warn;
use tempfile::NamedTempFile;

use crate::layout::Segment;

/// Determine the output format from a file extension.
pub fn format_from_extension(path: &Path) -> Option<OutputFormat> {
    match path.extension()?.to_str()?.to_lowercase().as_str() {
        "prg" => Some(OutputFormat::Prg),
        "bin" | "raw" => Some(OutputFormat::Raw),
        _ => None,
    }
}

/// The output format of segment files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// PRG file (data with load address).
    Prg,
    /// Raw binary without load address.
    Raw,
}

impl OutputFormat {
    /// Whether files start with the load address.
    pub fn has_load_address(&self) -> bool {
        matches!(self, OutputFormat::Prg)
    }
}

/// Destination of every segment.
///
/// A single segment goes to `path`. Several segments get their load
/// address appended to the file stem: `anim.prg` becomes `anim-a000.prg`,
/// `anim-c000.prg`, ...
pub fn segment_paths(path: &Path, segments: &[Segment]) -> Vec<PathBuf> {
    if segments.len() <= 1 {
        return vec![path.to_path_buf()];
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("anim");
    let extension = path.extension().and_then(|s| s.to_str());

    segments
        .iter()
        .map(|segment| {
            let name = match extension {
                Some(ext) => format!("{}-{:04x}.{}", stem, segment.address, ext),
                None => format!("{}-{:04x}", stem, segment.address),
            };
            path.with_file_name(name)
        })
        .collect()
}

/// Write every segment, all or nothing.
///
/// Files already moved into place are removed again when a later one
/// fails. Returns the written paths in segment order.
pub fn write_segments(
    segments: &[Segment],
    path: &Path,
    format: OutputFormat,
) -> io::Result<Vec<PathBuf>> {
    let paths = segment_paths(path, segments);

    let mut staged = Vec::with_capacity(segments.len());
    for (segment, target) in segments.iter().zip(&paths) {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&encode_segment(segment, format.has_load_address()))?;
        file.flush()?;
        staged.push(file);
    }

    for (done, (file, target)) in staged.into_iter().zip(&paths).enumerate() {
        if let Err(err) = file.persist(target) {
            for persisted in &paths[..done] {
                if let Err(cleanup) = fs::remove_file(persisted) {
                    warn!("Could not remove {}: {}", persisted.display(), cleanup);
                }
            }
            return Err(err.error);
        }
    }

    Ok(paths)
}

/// Write a text file (symbol listings), replacing it atomically.
pub fn write_text(text: &str, path: &Path) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
