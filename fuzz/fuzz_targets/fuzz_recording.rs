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

//! Fuzz target for the recording-to-layout pipeline.
//!
//! Random text is parsed as a recording, encoded, compiled and laid out.
//! Every stage must return Ok or Err, never panic.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_recording
//!
//! Run for a specific duration:
//!   cargo +nightly fuzz run fuzz_recording -- -max_total_time=60

#![no_main]

use anim64::{EncoderConfig, LayoutMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // Large object indices would only exercise allocation.
        if let Ok(recording) = anim64::recording::parse(source) {
            if recording.num_objects() > 256 {
                return;
            }
            let attributes = recording.num_attributes().unwrap_or(3);
            let _ = anim64::compile_recording(
                source,
                None,
                EncoderConfig::new(attributes),
                &LayoutMode::Contiguous { base: 0x0800 },
            );
        }
    }
});
