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

//! Fuzz target for the chunked memory allocator.
//!
//! Arbitrary block sizes and bins are placed; a successful layout must
//! account for every byte and keep every block inside a bin.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_layout

#![no_main]

use anim64::{Bin, Blocks, Instruction, Layout, LayoutMode, Script};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    scripts: Vec<u8>,
    tables: u8,
    table_len: u8,
    bins: Vec<(u16, u16)>,
    max_steps: u16,
}

fuzz_target!(|input: Input| {
    let scripts: Vec<Script> = input
        .scripts
        .iter()
        .take(64)
        .enumerate()
        .map(|(object, &len)| {
            let mut instructions = vec![Instruction::Sleep(1); len as usize];
            instructions.push(Instruction::End);
            Script::from_instructions(object, &instructions)
        })
        .collect();
    let tables = vec![vec![0u8; input.table_len as usize]; (input.tables % 3 + 1) as usize];
    let bins: Vec<Bin> = input
        .bins
        .iter()
        .take(8)
        .map(|&(address, capacity)| Bin::new(address, capacity as usize))
        .collect();

    let blocks = Blocks {
        scripts: &scripts,
        tables: &tables,
        max_steps: input.max_steps as usize,
    };

    if let Ok(layout) = Layout::allocate(&blocks, &LayoutMode::Chunked { bins: bins.clone() }) {
        assert_eq!(layout.total_bytes(), blocks.total_size());
        for placement in layout.placements().iter().filter(|p| p.size > 0) {
            let start = placement.address as usize;
            assert!(bins
                .iter()
                .any(|bin| start >= bin.address as usize && start + placement.size <= bin.end()));
        }
    }
});
