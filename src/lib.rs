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

//! Anim64 Library
//!
//! Turns per-frame object states into compact bytecode scripts for a
//! playback engine on the Commodore 64, and lays the scripts, the delta
//! tables and a header out in memory.
//!
//! # Modules
//!
//! - [`config`] - Attribute ranges, visibility and state policy
//! - [`recorder`] - Per-object steps and deltas
//! - [`dictionary`] - Delta frequency table and index
//! - [`script`] - Bytecode instructions
//! - [`compiler`] - Per-object script generation
//! - [`encoder`] - Recording and frozen encoder phases
//! - [`layout`] - Memory placement and header resolution
//! - [`memory`] - Memory image with merged regions
//! - [`recording`] - Text recordings
//! - [`output`] - PRG/raw file writing
//! - [`watcher`] - Rebuild on change
//! - [`error`] - Error types and error reporting
//!
//! # Example
//!
//! ```
//! use anim64::{build, DeltaEncoder, EncoderConfig, LayoutMode};
//!
//! let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(3))?;
//! for x in 24..40 {
//!     encoder.record(0, &[x, 100, 0])?;
//! }
//!
//! let output = build(encoder.freeze(), &LayoutMode::Contiguous { base: 0xC000 })?;
//! assert_eq!(output.layout.segments()[0].address, 0xC000);
//! # Ok::<(), anim64::AnimError>(())
//! ```

pub mod compiler;
pub mod config;
pub mod dictionary;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod memory;
pub mod output;
pub mod recorder;
pub mod recording;
pub mod script;
pub mod watcher;

// Re-export commonly used types
pub use config::{AttributeConfig, EncoderConfig, ScreenBounds, StateRange, Visibility};
pub use encoder::{DeltaEncoder, FrozenEncoder};
pub use error::{format_error, AnimError, ErrorCode, Result, SourceLocation, Span};
pub use layout::{Bin, Blocks, Layout, LayoutMode, Segment};
pub use script::{Instruction, Script};

/// The version of the Anim64 compiler.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the compiler.
pub const NAME: &str = "Anim64";

/// Result of a complete build.
#[derive(Debug, Clone)]
pub struct Build {
    /// The frozen encoder the scripts were compiled from.
    pub encoder: FrozenEncoder,
    /// Compiled scripts in object order.
    pub scripts: Vec<Script>,
    /// Placement of all blocks.
    pub layout: Layout,
}

/// Compile every script of a frozen encoder and lay everything out.
pub fn build(encoder: FrozenEncoder, mode: &LayoutMode) -> Result<Build> {
    let scripts = encoder.compile_all()?;
    let tables = encoder.tables();

    let blocks = Blocks {
        scripts: &scripts,
        tables: &tables,
        max_steps: encoder.max_steps(),
    };
    let layout = Layout::allocate(&blocks, mode)?;

    Ok(Build {
        encoder,
        scripts,
        layout,
    })
}

/// Parse a text recording and build it.
///
/// `num_objects` defaults to the highest object index in the recording
/// plus one.
pub fn compile_recording(
    source: &str,
    num_objects: Option<usize>,
    config: EncoderConfig,
    mode: &LayoutMode,
) -> Result<Build> {
    let recording = recording::parse(source)?;
    let num_objects = num_objects.unwrap_or_else(|| recording.num_objects());

    let mut encoder = DeltaEncoder::new(num_objects, config)?;
    recording.replay(&mut encoder)?;

    build(encoder.freeze(), mode)
}
