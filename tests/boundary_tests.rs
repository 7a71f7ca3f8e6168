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

//! Boundary and edge case tests for the Anim64 compiler.
//!
//! These tests verify correct handling of boundary values, edge cases,
//! and extreme inputs.

use anim64::dictionary::MAX_DELTAS;
use anim64::layout::BlockKind;
use anim64::{
    AttributeConfig, Bin, DeltaEncoder, EncoderConfig, ErrorCode, Instruction, LayoutMode,
    StateRange,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

// ============================================================================
// State Encoding Boundaries
// ============================================================================

#[test_case(&[0, 0, 0], [0xC0, 0x00, 0x00]; "all_zero")]
#[test_case(&[255, 0, 0], [0xC0, 0xFF, 0x00]; "x_below_ninth_bit")]
#[test_case(&[256, 0, 0], [0xC1, 0x00, 0x00]; "x_ninth_bit")]
#[test_case(&[511, 255, 31], [0xFF, 0xFF, 0xFF]; "all_max")]
#[test_case(&[0, 0, 1], [0xC2, 0x00, 0x00]; "angle_one")]
fn test_state_encoding(state: &[i32], expected: [u8; 3]) {
    let mut bytes = Vec::new();
    Instruction::state(state, StateRange::Strict)
        .unwrap()
        .encode(&mut bytes);
    assert_eq!(bytes, expected);
}

#[test_case(&[512, 0, 0], (0, 0, 0); "x_wraps")]
#[test_case(&[0, 256, 0], (0, 0, 0); "y_wraps")]
#[test_case(&[0, 0, 32], (0, 0, 0); "angle_wraps")]
#[test_case(&[0, 0, -1], (0, 0, 31); "negative_angle_wraps")]
fn test_state_wrap_policy(state: &[i32], expected: (u16, u8, u8)) {
    let (x, y, angle) = expected;
    assert_eq!(
        Instruction::state(state, StateRange::Wrap).unwrap(),
        Instruction::State { x, y, angle }
    );
}

// ============================================================================
// Sleep Boundaries
// ============================================================================

/// Recording `still` identical frames after a visible first frame.
fn still_script(still: usize) -> Vec<Instruction> {
    let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(3)).unwrap();
    for _ in 0..=still {
        encoder.record(0, &[50, 50, 0]).unwrap();
    }
    encoder.freeze().compile_script(0).unwrap().instructions()
}

#[test_case(1, &[1]; "one")]
#[test_case(62, &[62]; "below_limit")]
#[test_case(63, &[63]; "at_limit")]
#[test_case(64, &[63, 1]; "one_past_limit")]
#[test_case(126, &[63, 63]; "two_full_chunks")]
#[test_case(127, &[63, 63, 1]; "two_chunks_and_one")]
fn test_sleep_chunking(still: usize, expected: &[u8]) {
    let sleeps: Vec<u8> = still_script(still)
        .into_iter()
        .filter_map(|instruction| match instruction {
            Instruction::Sleep(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(sleeps, expected);
}

#[test_case(1, 0; "visible_at_second_frame")]
#[test_case(2, 1; "visible_at_third_frame")]
#[test_case(64, 63; "one_full_sleep")]
fn test_parking_sleep(first_visible: usize, slept: usize) {
    let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(3)).unwrap();
    for _ in 0..first_visible {
        encoder.record(0, &[-10, 50, 0]).unwrap();
    }
    encoder.record(0, &[10, 50, 0]).unwrap();

    let instructions = encoder.freeze().compile_script(0).unwrap().instructions();
    let parked: usize = instructions[1..instructions.len() - 2]
        .iter()
        .map(Instruction::frames)
        .sum();
    assert_eq!(parked, slept);
}

// ============================================================================
// Visibility Boundaries
// ============================================================================

#[test_case(0, 0, true; "origin")]
#[test_case(343, 0, true; "right_edge")]
#[test_case(344, 0, false; "past_right_edge")]
#[test_case(-1, 0, false; "left_of_screen")]
#[test_case(0, -1, false; "above_screen")]
#[test_case(0, 255, true; "bottom")]
fn test_default_visibility(x: i32, y: i32, visible: bool) {
    let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(3)).unwrap();
    encoder.record(0, &[x, y, 0]).unwrap();
    assert_eq!(encoder.freeze().compile_script(0).is_ok(), visible);
}

// ============================================================================
// Dictionary Boundaries
// ============================================================================

/// A recording with `distinct` different deltas, each seen once.
fn encoder_with_distinct_deltas(distinct: usize) -> DeltaEncoder {
    let config = EncoderConfig::new(2)
        .with_attribute(0, AttributeConfig::new(-127..=127))
        .with_attribute(1, AttributeConfig::new(-127..=127));
    let mut encoder = DeltaEncoder::new(1, config).unwrap();

    let mut state = [100, 100];
    encoder.record(0, &state).unwrap();
    for i in 0..distinct as i32 {
        // (dx, dy) pairs are unique: dy encodes i, dx alternates sign.
        let (dx, dy) = (if i % 2 == 0 { 1 } else { -1 }, i / 2 + 1);
        state = [state[0] + dx, state[1] + dy];
        encoder.record(0, &state).unwrap();
    }
    encoder
}

#[test_case(127; "below_cap")]
#[test_case(128; "at_cap")]
#[test_case(129; "past_cap")]
fn test_dictionary_cap(distinct: usize) {
    let encoder = encoder_with_distinct_deltas(distinct);
    assert_eq!(encoder.dictionary().len(), distinct);

    let frozen = encoder.freeze();
    assert_eq!(frozen.index().len(), distinct.min(MAX_DELTAS));
    assert_eq!(frozen.recorded_deltas(), distinct);

    let script = frozen.compile_script(0).unwrap();
    for instruction in script.instructions() {
        if let Instruction::Delta(index) = instruction {
            assert!((index as usize) < MAX_DELTAS);
        }
    }
}

#[test]
fn test_range_edges_survive_pruning() {
    let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(1)).unwrap();
    for x in [10, 17, 10, 2, 10] {
        encoder.record(0, &[x]).unwrap();
    }
    let frozen = encoder.freeze();
    assert!(frozen.index().get(&[7]).is_some());
    assert!(frozen.index().get(&[-7]).is_some());
    assert!(frozen.index().get(&[-8]).is_none());
    assert!(frozen.index().get(&[8]).is_none());
}

// ============================================================================
// Value Extremes
// ============================================================================

#[test]
fn test_recording_with_i32_extremes() {
    let source = "0 -2147483648 0 0\n0 2147483647 0 0\n0 10 20 0\n";
    let output = anim64::compile_recording(
        source,
        None,
        EncoderConfig::new(3),
        &LayoutMode::Contiguous { base: 0xC000 },
    )
    .unwrap();

    assert_eq!(output.encoder.steps(0)[1].delta, Some(vec![i32::MAX, 0, 0]));
    assert_eq!(
        output.scripts[0].instructions(),
        vec![
            Instruction::State { x: 0, y: 0, angle: 0 },
            Instruction::Sleep(1),
            Instruction::State { x: 10, y: 20, angle: 0 },
            Instruction::End,
        ]
    );
}

#[test]
fn test_never_visible_extremes_fail_cleanly() {
    let err = anim64::compile_recording(
        "0 -2147483648 0 0\n0 2147483647 0 0\n",
        None,
        EncoderConfig::new(3),
        &LayoutMode::Contiguous { base: 0xC000 },
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::NeverVisible);
}

#[test]
fn test_wrapped_attribute_between_extremes() {
    let config =
        EncoderConfig::new(3).with_attribute(2, AttributeConfig::default().with_modulo(32));
    let mut encoder = DeltaEncoder::new(1, config).unwrap();
    encoder.record(0, &[10, 20, i32::MIN]).unwrap();
    encoder.record(0, &[10, 20, i32::MAX]).unwrap();
    assert_eq!(encoder.steps(0)[1].delta, Some(vec![0, 0, -1]));
}

// ============================================================================
// Layout Boundaries
// ============================================================================

#[test]
fn test_single_attribute_header_has_no_table_pointers() {
    let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(1)).unwrap();
    encoder.record(0, &[10]).unwrap();
    let output = anim64::build(encoder.freeze(), &LayoutMode::Contiguous { base: 0x1000 }).unwrap();

    // Two script pointer bytes and the step count.
    assert_eq!(output.layout.placements()[0].size, 4);
    assert_eq!(output.layout.address_of(BlockKind::Script(0)), Some(0x1004));
}

#[test]
fn test_empty_dictionary_has_empty_tables() {
    let mut encoder = DeltaEncoder::new(2, EncoderConfig::new(3)).unwrap();
    encoder.record(0, &[10, 10, 0]).unwrap();
    encoder.record(1, &[20, 20, 0]).unwrap();
    let output = anim64::build(encoder.freeze(), &LayoutMode::Contiguous { base: 0xC000 }).unwrap();

    assert_eq!(output.layout.summary().table_bytes, 0);
    assert_eq!(output.layout.summary().deltas, 0);
    assert_eq!(output.layout.total_bytes(), output.layout.summary().total_bytes());
}

#[test]
fn test_bin_exactly_full() {
    let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(1)).unwrap();
    encoder.record(0, &[10]).unwrap();
    // header 4 + table 0 + script 3 + end 1
    let mode = LayoutMode::Chunked {
        bins: vec![Bin::new(0x2000, 8)],
    };
    let output = anim64::build(encoder.freeze(), &mode).unwrap();
    assert_eq!(output.layout.segments()[0].bytes.len(), 8);
}

#[test]
fn test_bin_one_byte_short() {
    let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(1)).unwrap();
    encoder.record(0, &[10]).unwrap();
    let mode = LayoutMode::Chunked {
        bins: vec![Bin::new(0x2000, 7)],
    };
    let err = anim64::build(encoder.freeze(), &mode).unwrap_err();
    assert_eq!(err.code, ErrorCode::BinCapacityExceeded);
}

#[test]
fn test_bin_ending_at_last_address() {
    let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(1)).unwrap();
    encoder.record(0, &[10]).unwrap();
    let mode = LayoutMode::Chunked {
        bins: vec![Bin::from_range(0xFFF8, 0xFFFF)],
    };
    let output = anim64::build(encoder.freeze(), &mode).unwrap();
    assert_eq!(output.layout.segments()[0].address, 0xFFF8);
}
