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

//! Delta dictionary.
//!
//! The dictionary lives in two phases:
//!
//! 1. [`DeltaDictionary`] tallies every recorded delta vector, keeping the
//!    order in which vectors were first seen.
//! 2. [`DeltaDictionary::index`] consumes it and produces a [`DeltaIndex`]:
//!    survivors sorted by descending frequency (ties keep first-seen order)
//!    with a reverse map for lookups while compiling scripts.
//!
//! Pruning by attribute range happens between the two phases.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use log::warn;

/// Number of dictionary slots a Delta instruction can address.
pub const MAX_DELTAS: usize = 128;

/// A delta vector with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEntry {
    /// Component-wise difference between two frames.
    pub delta: Vec<i32>,
    /// How many times the delta was recorded.
    pub count: usize,
}

/// Frequency table of recorded delta vectors.
#[derive(Debug, Clone, Default)]
pub struct DeltaDictionary {
    entries: Vec<DeltaEntry>,
    slots: HashMap<Vec<i32>, usize>,
}

impl DeltaDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `delta`.
    pub fn tally(&mut self, delta: &[i32]) {
        match self.slots.get(delta) {
            Some(&slot) => self.entries[slot].count += 1,
            None => {
                self.slots.insert(delta.to_vec(), self.entries.len());
                self.entries.push(DeltaEntry {
                    delta: delta.to_vec(),
                    count: 1,
                });
            }
        }
    }

    /// Occurrence count of `delta` (0 if never recorded or pruned).
    pub fn count(&self, delta: &[i32]) -> usize {
        self.slots
            .get(delta)
            .map(|&slot| self.entries[slot].count)
            .unwrap_or(0)
    }

    /// Number of distinct delta vectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no delta was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[DeltaEntry] {
        &self.entries
    }

    /// Drop every delta with a component outside its attribute range.
    ///
    /// Returns the number of removed vectors. Pruning twice removes nothing
    /// the second time.
    pub fn prune(&mut self, ranges: &[RangeInclusive<i32>]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| {
            entry
                .delta
                .iter()
                .zip(ranges)
                .all(|(d, range)| range.contains(d))
        });
        self.slots = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (entry.delta.clone(), slot))
            .collect();
        before - self.entries.len()
    }

    /// Rank the surviving deltas by frequency and assign indices.
    pub fn index(self) -> DeltaIndex {
        let mut entries = self.entries;
        // Stable sort: equal counts keep first-seen order.
        entries.sort_by(|a, b| b.count.cmp(&a.count));

        if entries.len() > MAX_DELTAS {
            warn!(
                "{} deltas survived pruning, keeping the {} most frequent",
                entries.len(),
                MAX_DELTAS
            );
            entries.truncate(MAX_DELTAS);
        }

        let lookup = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.delta.clone(), index as u8))
            .collect();

        DeltaIndex { entries, lookup }
    }
}

/// Frozen, frequency-ranked delta dictionary.
#[derive(Debug, Clone, Default)]
pub struct DeltaIndex {
    entries: Vec<DeltaEntry>,
    lookup: HashMap<Vec<i32>, u8>,
}

impl DeltaIndex {
    /// Index of `delta`, if it survived pruning and ranking.
    pub fn get(&self, delta: &[i32]) -> Option<u8> {
        self.lookup.get(delta).copied()
    }

    /// Delta vector stored at `index`.
    pub fn delta(&self, index: u8) -> Option<&[i32]> {
        self.entries
            .get(index as usize)
            .map(|entry| entry.delta.as_slice())
    }

    /// Number of indexed deltas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in index order.
    pub fn entries(&self) -> &[DeltaEntry] {
        &self.entries
    }

    /// Delta table for one attribute: its component of every indexed delta
    /// as a two's complement byte, in index order.
    pub fn table(&self, attribute: usize) -> Vec<u8> {
        self.entries
            .iter()
            .map(|entry| entry.delta.get(attribute).copied().unwrap_or(0) as i8 as u8)
            .collect()
    }
}
