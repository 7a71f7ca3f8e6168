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

//! Per-object step recording.
//!
//! Each call to [`StepRecorder::record`] appends one frame for one object.
//! From the second frame on, the delta to the previous frame is computed
//! component-wise and wrapped for attributes with a modulo.

use crate::config::AttributeConfig;
use crate::error::{AnimError, ErrorCode, Result};

/// One recorded frame of one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Absolute attribute vector.
    pub state: Vec<i32>,
    /// Difference to the previous frame; `None` for the first frame.
    pub delta: Option<Vec<i32>>,
}

impl Step {
    /// Whether the object did not change since the previous frame.
    pub fn is_still(&self) -> bool {
        self.delta
            .as_ref()
            .is_some_and(|delta| delta.iter().all(|&d| d == 0))
    }
}

/// Accumulates the steps of every tracked object.
#[derive(Debug, Clone)]
pub struct StepRecorder {
    attributes: Vec<AttributeConfig>,
    steps: Vec<Vec<Step>>,
}

impl StepRecorder {
    /// Create a recorder for `num_objects` objects.
    pub fn new(num_objects: usize, attributes: Vec<AttributeConfig>) -> Self {
        Self {
            attributes,
            steps: vec![Vec::new(); num_objects],
        }
    }

    /// Number of tracked objects.
    pub fn num_objects(&self) -> usize {
        self.steps.len()
    }

    /// Number of attributes per vector.
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Append a frame for `object` and return its delta, if any.
    pub fn record(&mut self, object: usize, state: &[i32]) -> Result<Option<&[i32]>> {
        let num_objects = self.steps.len();
        let steps = self.steps.get_mut(object).ok_or_else(|| {
            AnimError::new(
                ErrorCode::InvalidObjectIndex,
                format!(
                    "Object index {} is out of range (0..{})",
                    object, num_objects
                ),
            )
            .for_object(object)
        })?;

        if state.len() != self.attributes.len() {
            return Err(AnimError::new(
                ErrorCode::AttributeCountMismatch,
                format!(
                    "Expected {} attributes, got {}",
                    self.attributes.len(),
                    state.len()
                ),
            )
            .for_object(object));
        }

        let delta = steps.last().map(|prev| {
            prev.state
                .iter()
                .zip(state)
                .zip(&self.attributes)
                .map(|((&from, &to), attribute)| {
                    attribute.wrap(i64::from(to) - i64::from(from))
                })
                .collect::<Vec<_>>()
        });

        steps.push(Step {
            state: state.to_vec(),
            delta,
        });

        Ok(steps.last().and_then(|step| step.delta.as_deref()))
    }

    /// The recorded steps of `object`, in recording order.
    pub fn steps(&self, object: usize) -> &[Step] {
        self.steps.get(object).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The longest step list over all objects.
    pub fn max_steps(&self) -> usize {
        self.steps.iter().map(Vec::len).max().unwrap_or(0)
    }
}
