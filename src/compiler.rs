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

//! Per-object script compiler.
//!
//! Walks the steps of one object once, front to back:
//!
//! - frames before the first visible one become a parked State plus Sleep,
//! - the first visible frame becomes a State,
//! - runs of unchanged frames become Sleep (63 frames per byte at most),
//! - indexed deltas become Delta,
//! - anything else falls back to a State.
//!
//! The encoder never looks ahead for a shorter encoding.

use log::debug;

use crate::config::{StateRange, Visibility};
use crate::dictionary::DeltaIndex;
use crate::error::{AnimError, ErrorCode, Result};
use crate::recorder::Step;
use crate::script::{Instruction, Script};

/// Inputs shared by every object of one compile run.
pub struct ScriptCompiler<'a> {
    /// Frozen delta dictionary.
    pub index: &'a DeltaIndex,
    /// Decides the first frame an object is rendered in.
    pub visibility: &'a dyn Visibility,
    /// Vector parked in the leading State of late objects.
    pub sentinel: &'a [i32],
    /// Handling of State values outside the field widths.
    pub state_range: StateRange,
}

impl ScriptCompiler<'_> {
    /// Compile the steps of `object` into instructions, End included.
    pub fn instructions(&self, object: usize, steps: &[Step]) -> Result<Vec<Instruction>> {
        let first_visible = steps
            .iter()
            .position(|step| self.visibility.is_visible(object, &step.state))
            .ok_or_else(|| {
                AnimError::new(
                    ErrorCode::NeverVisible,
                    format!(
                        "Object {} is never visible in its {} recorded frames",
                        object,
                        steps.len()
                    ),
                )
                .for_object(object)
                .with_hint("Check the recording or widen the screen bounds")
            })?;

        let mut out = Vec::new();

        if first_visible > 0 {
            out.push(self.state(object, self.sentinel)?);
            out.extend(Instruction::sleeps(first_visible - 1));
        }

        out.push(self.state(object, &steps[first_visible].state)?);

        let mut frame = first_visible + 1;
        while frame < steps.len() {
            let step = &steps[frame];

            if step.is_still() {
                let run = steps[frame..]
                    .iter()
                    .take_while(|step| step.is_still())
                    .count();
                out.extend(Instruction::sleeps(run));
                frame += run;
                continue;
            }

            let indexed = step
                .delta
                .as_deref()
                .and_then(|delta| self.index.get(delta));

            match indexed {
                Some(index) => out.push(Instruction::delta(index as usize)?),
                None => out.push(self.state(object, &step.state)?),
            }
            frame += 1;
        }

        out.push(Instruction::End);
        Ok(out)
    }

    /// Compile the steps of `object` into an encoded script.
    pub fn compile(&self, object: usize, steps: &[Step]) -> Result<Script> {
        let instructions = self.instructions(object, steps)?;
        let script = Script::from_instructions(object, &instructions);
        debug!(
            "Object {}: {} frames, {} instructions, {} bytes",
            object,
            steps.len(),
            instructions.len(),
            script.len()
        );
        Ok(script)
    }

    fn state(&self, object: usize, vector: &[i32]) -> Result<Instruction> {
        Instruction::state(vector, self.state_range).map_err(|e| e.for_object(object))
    }
}
