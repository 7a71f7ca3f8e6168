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

//! Script instruction set.
//!
//! Every byte's top two bits select the instruction:
//!
//! | bits | instruction | size |
//! |------|-------------|------|
//! | `0xxxxxxx` | Delta: dictionary index 0..127 | 1 |
//! | `10000000` | End | 1 |
//! | `10nnnnnn` | Sleep n frames, n = 1..63 | 1 |
//! | `11aaaaax` | State: angle, x bit 8, then x low, y | 3 |

use std::fmt;

use crate::config::StateRange;
use crate::error::{AnimError, ErrorCode, Result};

/// End-of-script marker.
pub const END: u8 = 0x80;

/// Base of the Sleep opcode space.
pub const SLEEP_BASE: u8 = 0x80;

/// Longest Sleep a single byte can encode.
pub const MAX_SLEEP: usize = 63;

/// Highest dictionary index a Delta can address.
pub const MAX_DELTA_INDEX: usize = 127;

/// Tag bits of a State instruction.
pub const STATE_TAG: u8 = 0xC0;

/// Largest value of the State x field (9 bits).
pub const MAX_X: i32 = 511;

/// Largest value of the State y field (8 bits).
pub const MAX_Y: i32 = 255;

/// Largest value of the State angle field (5 bits).
pub const MAX_ANGLE: i32 = 31;

/// A single script instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Apply the delta stored at this dictionary index.
    Delta(u8),
    /// Hold the current state for this many frames.
    Sleep(u8),
    /// Jump to an absolute state.
    State { x: u16, y: u8, angle: u8 },
    /// End of script.
    End,
}

impl Instruction {
    /// A Delta instruction; indices above 127 are a logic error.
    pub fn delta(index: usize) -> Result<Self> {
        if index > MAX_DELTA_INDEX {
            return Err(AnimError::new(
                ErrorCode::DeltaIndexOutOfRange,
                format!(
                    "Delta index {} exceeds the maximum of {}",
                    index, MAX_DELTA_INDEX
                ),
            ));
        }
        Ok(Instruction::Delta(index as u8))
    }

    /// A State instruction for an attribute vector `[x, y, angle]`.
    ///
    /// Missing attributes read as zero. With [`StateRange::Wrap`] the values
    /// are masked to their field width, with [`StateRange::Strict`] they
    /// must already fit.
    pub fn state(vector: &[i32], policy: StateRange) -> Result<Self> {
        let x = vector.first().copied().unwrap_or(0);
        let y = vector.get(1).copied().unwrap_or(0);
        let angle = vector.get(2).copied().unwrap_or(0);

        if policy == StateRange::Strict {
            for (name, value, max) in [("x", x, MAX_X), ("y", y, MAX_Y), ("angle", angle, MAX_ANGLE)]
            {
                if !(0..=max).contains(&value) {
                    return Err(AnimError::new(
                        ErrorCode::StateOutOfRange,
                        format!("State {} = {} is outside 0..={}", name, value, max),
                    ));
                }
            }
        }

        Ok(Instruction::State {
            x: (x & MAX_X) as u16,
            y: (y & MAX_Y) as u8,
            angle: angle.rem_euclid(MAX_ANGLE + 1) as u8,
        })
    }

    /// Sleep instructions covering `frames` frames, chunked at 63.
    ///
    /// Zero frames yield no instruction.
    pub fn sleeps(frames: usize) -> impl Iterator<Item = Instruction> {
        let full = frames / MAX_SLEEP;
        let rest = frames % MAX_SLEEP;
        std::iter::repeat(Instruction::Sleep(MAX_SLEEP as u8))
            .take(full)
            .chain((rest > 0).then_some(Instruction::Sleep(rest as u8)))
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Instruction::State { .. } => 3,
            _ => 1,
        }
    }

    /// Number of frames the instruction accounts for.
    pub fn frames(&self) -> usize {
        match self {
            Instruction::Delta(_) | Instruction::State { .. } => 1,
            Instruction::Sleep(n) => *n as usize,
            Instruction::End => 0,
        }
    }

    /// Append the encoded instruction to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match *self {
            Instruction::Delta(index) => out.push(index & 0x7F),
            Instruction::Sleep(n) => out.push(SLEEP_BASE | (n & 0x3F)),
            Instruction::State { x, y, angle } => {
                out.push(STATE_TAG | ((angle & 0x1F) << 1) | ((x >> 8) as u8 & 0x01));
                out.push((x & 0xFF) as u8);
                out.push(y);
            }
            Instruction::End => out.push(END),
        }
    }

    /// Decode the instruction at the start of `bytes`.
    ///
    /// Returns `None` when `bytes` is empty or a State is cut short.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let &first = bytes.first()?;
        match first {
            b if b < 0x80 => Some(Instruction::Delta(b)),
            END => Some(Instruction::End),
            b if b < STATE_TAG => Some(Instruction::Sleep(b & 0x3F)),
            b => {
                let low = *bytes.get(1)?;
                let y = *bytes.get(2)?;
                Some(Instruction::State {
                    x: (((b & 0x01) as u16) << 8) | low as u16,
                    y,
                    angle: (b >> 1) & 0x1F,
                })
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Delta(index) => write!(f, "delta #{}", index),
            Instruction::Sleep(n) => write!(f, "sleep {}", n),
            Instruction::State { x, y, angle } => write!(f, "state {},{},{}", x, y, angle),
            Instruction::End => write!(f, "end"),
        }
    }
}

/// Compiled bytecode of one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    object: usize,
    bytes: Vec<u8>,
}

impl Script {
    /// Encode `instructions` for `object`.
    pub fn from_instructions(object: usize, instructions: &[Instruction]) -> Self {
        let mut bytes = Vec::with_capacity(instructions.iter().map(Instruction::size).sum());
        for instruction in instructions {
            instruction.encode(&mut bytes);
        }
        Self { object, bytes }
    }

    /// The object this script animates.
    pub fn object(&self) -> usize {
        self.object
    }

    /// Encoded bytes, End marker included.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the script has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the script back into instructions.
    pub fn instructions(&self) -> Vec<Instruction> {
        let mut out = Vec::new();
        let mut rest = self.bytes.as_slice();
        while let Some(instruction) = Instruction::decode(rest) {
            rest = &rest[instruction.size()..];
            out.push(instruction);
        }
        out
    }

    /// Human-readable listing, one instruction per line with its offset.
    pub fn listing(&self) -> String {
        let mut output = format!("; object {} ({} bytes)\n", self.object, self.len());
        let mut offset = 0;
        for instruction in self.instructions() {
            output.push_str(&format!("{:04X}  {}\n", offset, instruction));
            offset += instruction.size();
        }
        output
    }
}
