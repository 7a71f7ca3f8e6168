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

//! Memory layout allocator.
//!
//! Places the header, the delta tables and the scripts in the C64 address
//! space and serializes them. Allocation runs in passes:
//!
//! 1. collect the size of every block,
//! 2. assign addresses (contiguous, or first-fit over bins),
//! 3. build the header from the final addresses,
//! 4. emit one segment per used address range.
//!
//! No byte is emitted before every address is fixed.
//!
//! # Header format
//!
//! ```text
//! script address low bytes   (one per object)
//! script address high bytes  (one per object)
//! delta table 1..N-1 address (low, high)
//! maximum step count         (low, high)
//! ```
//!
//! The primary delta table (attribute 0) is not referenced by the header;
//! its address is part of the [`Layout`] and of the symbol listing.

use std::fmt;

use log::{debug, info};

use crate::error::{AnimError, ErrorCode, Result};
use crate::script::Script;

/// Size of the 64 KiB address space.
pub const ADDRESS_SPACE: usize = 0x10000;

/// What a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Script addresses, table addresses and step count.
    Header,
    /// Delta table of one attribute.
    Table(usize),
    /// Script of one object.
    Script(usize),
}

impl BlockKind {
    /// Symbol name used in listings.
    pub fn symbol(&self) -> String {
        match self {
            BlockKind::Header => "ANIM_HEADER".to_string(),
            BlockKind::Table(attribute) => format!("ANIM_DELTA_{}", attribute),
            BlockKind::Script(object) => format!("ANIM_SCRIPT_{}", object),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Header => write!(f, "header"),
            BlockKind::Table(attribute) => write!(f, "delta table {}", attribute),
            BlockKind::Script(object) => write!(f, "script {}", object),
        }
    }
}

/// An address range blocks can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    /// First address of the range.
    pub address: u16,
    /// Number of bytes available.
    pub capacity: usize,
}

impl Bin {
    /// Create a bin of `capacity` bytes starting at `address`.
    pub fn new(address: u16, capacity: usize) -> Self {
        Self { address, capacity }
    }

    /// Create a bin spanning `first..=last`.
    pub fn from_range(first: u16, last: u16) -> Self {
        Self {
            address: first,
            capacity: (last as usize + 1).saturating_sub(first as usize),
        }
    }

    /// One past the last address of the bin.
    pub fn end(&self) -> usize {
        self.address as usize + self.capacity
    }
}

/// How blocks are distributed over memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutMode {
    /// Everything back to back from one base address.
    Contiguous { base: u16 },
    /// First-fit over disjoint address ranges.
    Chunked { bins: Vec<Bin> },
}

/// Everything the allocator places.
#[derive(Debug, Clone, Copy)]
pub struct Blocks<'a> {
    /// Compiled scripts in object order.
    pub scripts: &'a [Script],
    /// Delta tables in attribute order.
    pub tables: &'a [Vec<u8>],
    /// Longest step list over all objects.
    pub max_steps: usize,
}

impl Blocks<'_> {
    /// Size of the header in bytes.
    pub fn header_size(&self) -> usize {
        2 * self.scripts.len() + 2 * self.tables.len().saturating_sub(1) + 2
    }

    /// Size of a block in bytes.
    pub fn size(&self, kind: BlockKind) -> usize {
        match kind {
            BlockKind::Header => self.header_size(),
            BlockKind::Table(attribute) => self.tables[attribute].len(),
            BlockKind::Script(object) => self.scripts[object].len(),
        }
    }

    /// Sum of all block sizes.
    pub fn total_size(&self) -> usize {
        self.header_size()
            + self.tables.iter().map(Vec::len).sum::<usize>()
            + self.scripts.iter().map(Script::len).sum::<usize>()
    }

    fn tables(&self) -> impl Iterator<Item = BlockKind> {
        (0..self.tables.len()).map(BlockKind::Table)
    }

    fn scripts(&self) -> impl Iterator<Item = BlockKind> {
        (0..self.scripts.len()).map(BlockKind::Script)
    }
}

/// A block with its final address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The placed block.
    pub kind: BlockKind,
    /// First address of the block.
    pub address: u16,
    /// Size in bytes.
    pub size: usize,
    /// Index of the segment the block ends up in.
    pub segment: usize,
}

/// Bytes to be loaded at one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Load address.
    pub address: u16,
    /// Payload.
    pub bytes: Vec<u8>,
}

/// Byte counts per section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutSummary {
    /// Number of scripts.
    pub objects: usize,
    /// Longest step list.
    pub steps: usize,
    /// Number of dictionary entries.
    pub deltas: usize,
    /// Header bytes.
    pub header_bytes: usize,
    /// Delta table bytes, all attributes.
    pub table_bytes: usize,
    /// Script bytes, all objects.
    pub script_bytes: usize,
}

impl LayoutSummary {
    /// Total bytes of all sections.
    pub fn total_bytes(&self) -> usize {
        self.header_bytes + self.table_bytes + self.script_bytes
    }
}

/// A fully resolved memory layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    placements: Vec<Placement>,
    segments: Vec<Segment>,
    summary: LayoutSummary,
}

impl Layout {
    /// Place and serialize `blocks` according to `mode`.
    pub fn allocate(blocks: &Blocks<'_>, mode: &LayoutMode) -> Result<Self> {
        if blocks.max_steps > u16::MAX as usize {
            return Err(AnimError::new(
                ErrorCode::TooManySteps,
                format!(
                    "{} steps do not fit the 16-bit step count of the header",
                    blocks.max_steps
                ),
            ));
        }

        let (placements, segment_addresses) = match mode {
            LayoutMode::Contiguous { base } => place_contiguous(blocks, *base)?,
            LayoutMode::Chunked { bins } => place_chunked(blocks, bins)?,
        };

        let header = build_header(blocks, &placements)?;

        let mut segments: Vec<Segment> = segment_addresses
            .into_iter()
            .map(|address| Segment {
                address,
                bytes: Vec::new(),
            })
            .collect();

        for placement in &placements {
            let bytes = match placement.kind {
                BlockKind::Header => header.as_slice(),
                BlockKind::Table(attribute) => blocks.tables[attribute].as_slice(),
                BlockKind::Script(object) => blocks.scripts[object].bytes(),
            };
            segments[placement.segment].bytes.extend_from_slice(bytes);
        }

        let summary = LayoutSummary {
            objects: blocks.scripts.len(),
            steps: blocks.max_steps,
            deltas: blocks.tables.first().map(Vec::len).unwrap_or(0),
            header_bytes: header.len(),
            table_bytes: blocks.tables.iter().map(Vec::len).sum(),
            script_bytes: blocks.scripts.iter().map(Script::len).sum(),
        };

        info!(
            "Layout: {} segment(s), {} bytes (header {}, tables {}, scripts {})",
            segments.len(),
            summary.total_bytes(),
            summary.header_bytes,
            summary.table_bytes,
            summary.script_bytes
        );

        Ok(Self {
            placements,
            segments,
            summary,
        })
    }

    /// Every block with its address, in emission order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Serialized segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Section sizes and counts.
    pub fn summary(&self) -> &LayoutSummary {
        &self.summary
    }

    /// Address of a block.
    pub fn address_of(&self, kind: BlockKind) -> Option<u16> {
        self.placements
            .iter()
            .find(|placement| placement.kind == kind)
            .map(|placement| placement.address)
    }

    /// Address of the delta table the header does not reference.
    pub fn primary_table_address(&self) -> Option<u16> {
        self.address_of(BlockKind::Table(0))
    }

    /// Total number of serialized bytes.
    pub fn total_bytes(&self) -> usize {
        self.segments.iter().map(|segment| segment.bytes.len()).sum()
    }

    /// Assembler symbol listing, one `NAME = $XXXX` line per block.
    pub fn symbols(&self) -> String {
        let mut sorted = self.placements.clone();
        sorted.sort_by_key(|placement| match placement.kind {
            BlockKind::Header => (0, 0),
            BlockKind::Table(attribute) => (1, attribute),
            BlockKind::Script(object) => (2, object),
        });

        let mut output = String::new();
        for placement in sorted {
            output.push_str(&format!(
                "{:<20} = ${:04X} ; {} bytes\n",
                placement.kind.symbol(),
                placement.address,
                placement.size
            ));
        }
        output
    }
}

/// Address of a block starting at `offset`.
///
/// Only empty blocks can start one past $FFFF. They point at $FFFF instead
/// of wrapping around to $0000.
fn block_address(offset: usize) -> u16 {
    u16::try_from(offset).unwrap_or(u16::MAX)
}

fn place_contiguous(blocks: &Blocks<'_>, base: u16) -> Result<(Vec<Placement>, Vec<u16>)> {
    let end = base as usize + blocks.total_size();
    if end > ADDRESS_SPACE {
        return Err(AnimError::new(
            ErrorCode::AddressOverflow,
            format!(
                "{} bytes starting at ${:04X} run past $FFFF",
                blocks.total_size(),
                base
            ),
        )
        .with_hint("Choose a lower base address or split the output into bins"));
    }

    let order = std::iter::once(BlockKind::Header)
        .chain(blocks.scripts())
        .chain(blocks.tables());

    let mut cursor = base as usize;
    let placements = order
        .map(|kind| {
            let size = blocks.size(kind);
            let placement = Placement {
                kind,
                address: block_address(cursor),
                size,
                segment: 0,
            };
            cursor += size;
            placement
        })
        .collect();

    Ok((placements, vec![base]))
}

/// Check that bins are non-empty, inside the address space and disjoint.
pub fn validate_bins(bins: &[Bin]) -> Result<()> {
    if bins.is_empty() {
        return Err(AnimError::new(ErrorCode::InvalidBins, "No bins given"));
    }

    for bin in bins {
        if bin.capacity == 0 {
            return Err(AnimError::new(
                ErrorCode::InvalidBins,
                format!("Bin at ${:04X} is empty", bin.address),
            ));
        }
        if bin.end() > ADDRESS_SPACE {
            return Err(AnimError::new(
                ErrorCode::InvalidBins,
                format!(
                    "Bin at ${:04X} with {} bytes runs past $FFFF",
                    bin.address, bin.capacity
                ),
            ));
        }
    }

    let mut sorted = bins.to_vec();
    sorted.sort_by_key(|bin| bin.address);
    for pair in sorted.windows(2) {
        if pair[0].end() > pair[1].address as usize {
            return Err(AnimError::new(
                ErrorCode::InvalidBins,
                format!(
                    "Bins at ${:04X} and ${:04X} overlap",
                    pair[0].address, pair[1].address
                ),
            ));
        }
    }

    Ok(())
}

fn place_chunked(blocks: &Blocks<'_>, bins: &[Bin]) -> Result<(Vec<Placement>, Vec<u16>)> {
    validate_bins(bins)?;

    let mut scripts: Vec<BlockKind> = blocks.scripts().collect();
    // Stable: equal sizes stay in object order.
    scripts.sort_by_key(|&kind| std::cmp::Reverse(blocks.size(kind)));

    let order = std::iter::once(BlockKind::Header)
        .chain(blocks.tables())
        .chain(scripts);

    let mut used = vec![0usize; bins.len()];
    let mut placements = Vec::new();

    for kind in order {
        let size = blocks.size(kind);
        let slot = bins
            .iter()
            .zip(&used)
            .position(|(bin, &used)| bin.capacity - used >= size)
            .ok_or_else(|| {
                let remaining: Vec<(u16, usize)> = bins
                    .iter()
                    .zip(&used)
                    .map(|(bin, &used)| (bin.address, bin.capacity - used))
                    .collect();
                AnimError::bin_capacity_exceeded(&kind.to_string(), size, &remaining)
            })?;

        let address = block_address(bins[slot].address as usize + used[slot]);
        debug!("Placing {} ({} bytes) at ${:04X}", kind, size, address);

        used[slot] += size;
        placements.push(Placement {
            kind,
            address,
            size,
            segment: slot,
        });
    }

    // Only bins that received bytes become segments.
    let mut segment_of = vec![None; bins.len()];
    let mut segment_addresses = Vec::new();
    for (slot, bin) in bins.iter().enumerate() {
        if used[slot] > 0 {
            segment_of[slot] = Some(segment_addresses.len());
            segment_addresses.push(bin.address);
        }
    }

    // Zero-sized blocks in unused bins are attached to the first segment.
    for placement in &mut placements {
        placement.segment = segment_of[placement.segment].unwrap_or(0);
    }

    Ok((placements, segment_addresses))
}

fn build_header(blocks: &Blocks<'_>, placements: &[Placement]) -> Result<Vec<u8>> {
    let address = |kind: BlockKind| -> Result<u16> {
        placements
            .iter()
            .find(|placement| placement.kind == kind)
            .map(|placement| placement.address)
            .ok_or_else(|| {
                AnimError::new(ErrorCode::InvalidBins, format!("{} was never placed", kind))
            })
    };

    let scripts = blocks
        .scripts()
        .map(address)
        .collect::<Result<Vec<u16>>>()?;

    let mut header = Vec::with_capacity(blocks.header_size());
    header.extend(scripts.iter().map(|a| (a & 0xFF) as u8));
    header.extend(scripts.iter().map(|a| (a >> 8) as u8));
    for kind in blocks.tables().skip(1) {
        header.extend_from_slice(&address(kind)?.to_le_bytes());
    }
    header.extend_from_slice(&(blocks.max_steps as u16).to_le_bytes());

    Ok(header)
}
