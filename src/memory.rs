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

//! A 64 KiB memory image.
//!
//! Labelled data is injected at absolute addresses. Adjacent regions are
//! merged into chunks, so the image can report which ranges are in use and
//! render everything between the lowest and highest used address as one
//! segment, filling the gaps.

use crate::error::{AnimError, ErrorCode, Result};
use crate::layout::{Layout, Segment, ADDRESS_SPACE};

/// A run of used addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// First used address.
    pub from: u16,
    /// Last used address (inclusive).
    pub to: u16,
    /// Labels of the data in this chunk, in address order.
    pub labels: Vec<String>,
}

impl Chunk {
    /// Number of bytes in the chunk.
    pub fn size(&self) -> usize {
        self.to as usize - self.from as usize + 1
    }
}

/// The complete address space with used regions tracked.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    memory: Vec<Option<u8>>,
    chunks: Vec<Chunk>,
    fill: u8,
}

impl MemoryImage {
    /// Create an empty image; unused bytes render as `fill`.
    pub fn new(fill: u8) -> Self {
        Self {
            memory: vec![None; ADDRESS_SPACE],
            chunks: Vec::new(),
            fill,
        }
    }

    /// Inject every segment of a layout, labelled by load address.
    pub fn from_layout(layout: &Layout, fill: u8) -> Result<Self> {
        let mut image = Self::new(fill);
        for segment in layout.segments() {
            image.inject(
                &format!("segment ${:04X}", segment.address),
                segment.address,
                &segment.bytes,
            )?;
        }
        Ok(image)
    }

    /// Store `data` at `address`.
    ///
    /// Data that runs past $FFFF or overlaps earlier data is rejected.
    pub fn inject(&mut self, label: &str, address: u16, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let from = address as usize;
        let end = from + data.len();
        if end > ADDRESS_SPACE {
            return Err(AnimError::new(
                ErrorCode::AddressOverflow,
                format!("Data for '{}' does not fit into memory", label),
            ));
        }
        if self.memory[from..end].iter().any(Option::is_some) {
            return Err(AnimError::new(
                ErrorCode::InvalidBins,
                format!("Data for '{}' overlaps data injected earlier", label),
            ));
        }

        for (slot, &byte) in self.memory[from..end].iter_mut().zip(data) {
            *slot = Some(byte);
        }
        self.add_chunk(label, address, (end - 1) as u16);
        Ok(())
    }

    fn add_chunk(&mut self, label: &str, from: u16, to: u16) {
        let after = self
            .chunks
            .iter()
            .position(|c| from > 0 && c.to == from - 1);
        let before = self
            .chunks
            .iter()
            .position(|c| to < u16::MAX && c.from == to + 1);

        match (after, before) {
            (Some(a), Some(b)) => {
                let next = self.chunks.remove(b);
                let a = if b < a { a - 1 } else { a };
                let chunk = &mut self.chunks[a];
                chunk.to = next.to;
                chunk.labels.push(label.to_string());
                chunk.labels.extend(next.labels);
            }
            (Some(a), None) => {
                let chunk = &mut self.chunks[a];
                chunk.to = to;
                chunk.labels.push(label.to_string());
            }
            (None, Some(b)) => {
                let chunk = &mut self.chunks[b];
                chunk.from = from;
                chunk.labels.insert(0, label.to_string());
            }
            (None, None) => self.chunks.push(Chunk {
                from,
                to,
                labels: vec![label.to_string()],
            }),
        }
    }

    /// Used regions, merged where adjacent.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Lowest used address.
    pub fn min_used(&self) -> Option<u16> {
        self.chunks.iter().map(|c| c.from).min()
    }

    /// Highest used address.
    pub fn max_used(&self) -> Option<u16> {
        self.chunks.iter().map(|c| c.to).max()
    }

    /// Everything from the lowest to the highest used address as one
    /// segment, gaps filled.
    pub fn to_segment(&self) -> Option<Segment> {
        let (min, max) = (self.min_used()?, self.max_used()?);
        let bytes = self.memory[min as usize..=max as usize]
            .iter()
            .map(|byte| byte.unwrap_or(self.fill))
            .collect();
        Some(Segment {
            address: min,
            bytes,
        })
    }
}
