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

//! The two-phase delta encoder.
//!
//! [`DeltaEncoder`] records frames. [`DeltaEncoder::freeze`] consumes it,
//! prunes and indexes the dictionary exactly once, and returns a
//! [`FrozenEncoder`], the only type able to compile scripts. Compiling
//! against a half-built dictionary is therefore impossible.
//!
//! # Example
//!
//! ```
//! use anim64::{DeltaEncoder, EncoderConfig};
//!
//! let mut encoder = DeltaEncoder::new(1, EncoderConfig::new(3)).unwrap();
//! encoder.record(0, &[10, 20, 0]).unwrap();
//! encoder.record(0, &[10, 20, 0]).unwrap();
//! encoder.record(0, &[11, 20, 0]).unwrap();
//!
//! let frozen = encoder.freeze();
//! let scripts = frozen.compile_all().unwrap();
//! assert_eq!(scripts[0].bytes().last(), Some(&0x80));
//! ```

use std::ops::RangeInclusive;

use log::info;

use crate::compiler::ScriptCompiler;
use crate::config::{EncoderConfig, Visibility};
use crate::dictionary::{DeltaDictionary, DeltaIndex};
use crate::error::Result;
use crate::recorder::{Step, StepRecorder};
use crate::script::Script;

/// Recording phase of the encoder.
#[derive(Debug, Clone)]
pub struct DeltaEncoder {
    config: EncoderConfig,
    recorder: StepRecorder,
    dictionary: DeltaDictionary,
}

impl DeltaEncoder {
    /// Create an encoder for `num_objects` objects.
    pub fn new(num_objects: usize, config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        let recorder = StepRecorder::new(num_objects, config.attributes.clone());
        Ok(Self {
            config,
            recorder,
            dictionary: DeltaDictionary::new(),
        })
    }

    /// Number of tracked objects.
    pub fn num_objects(&self) -> usize {
        self.recorder.num_objects()
    }

    /// Record the state of `object` for its next frame.
    pub fn record(&mut self, object: usize, state: &[i32]) -> Result<()> {
        if let Some(delta) = self.recorder.record(object, state)? {
            self.dictionary.tally(delta);
        }
        Ok(())
    }

    /// Recorded steps of `object`.
    pub fn steps(&self, object: usize) -> &[Step] {
        self.recorder.steps(object)
    }

    /// The dictionary as recorded so far.
    pub fn dictionary(&self) -> &DeltaDictionary {
        &self.dictionary
    }

    /// Prune and index the dictionary, ending the recording phase.
    pub fn freeze(self) -> FrozenEncoder {
        let Self {
            config,
            recorder,
            mut dictionary,
        } = self;

        let recorded = dictionary.len();
        let ranges: Vec<RangeInclusive<i32>> = config
            .attributes
            .iter()
            .map(|attribute| attribute.range.clone())
            .collect();
        let pruned = dictionary.prune(&ranges);
        let index = dictionary.index();

        info!(
            "Dictionary: {} distinct deltas recorded, {} pruned, {} indexed",
            recorded,
            pruned,
            index.len()
        );

        FrozenEncoder {
            config,
            recorder,
            index,
            recorded,
        }
    }
}

/// Compile phase of the encoder.
#[derive(Debug, Clone)]
pub struct FrozenEncoder {
    config: EncoderConfig,
    recorder: StepRecorder,
    index: DeltaIndex,
    recorded: usize,
}

impl FrozenEncoder {
    /// The encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Number of tracked objects.
    pub fn num_objects(&self) -> usize {
        self.recorder.num_objects()
    }

    /// Number of attributes per vector.
    pub fn num_attributes(&self) -> usize {
        self.recorder.num_attributes()
    }

    /// The frozen, ranked dictionary.
    pub fn index(&self) -> &DeltaIndex {
        &self.index
    }

    /// Distinct deltas seen before pruning.
    pub fn recorded_deltas(&self) -> usize {
        self.recorded
    }

    /// Recorded steps of `object`.
    pub fn steps(&self, object: usize) -> &[Step] {
        self.recorder.steps(object)
    }

    /// The longest step list over all objects.
    pub fn max_steps(&self) -> usize {
        self.recorder.max_steps()
    }

    /// Delta table of every attribute, in attribute order.
    pub fn tables(&self) -> Vec<Vec<u8>> {
        (0..self.num_attributes())
            .map(|attribute| self.index.table(attribute))
            .collect()
    }

    /// Compile the script of `object` using the configured screen bounds.
    pub fn compile_script(&self, object: usize) -> Result<Script> {
        self.compile_script_with(object, &self.config.screen)
    }

    /// Compile the script of `object` with a custom visibility predicate.
    pub fn compile_script_with(&self, object: usize, visibility: &dyn Visibility) -> Result<Script> {
        self.compiler(visibility)
            .compile(object, self.recorder.steps(object))
    }

    /// Compile every object's script, stopping at the first failure.
    pub fn compile_all(&self) -> Result<Vec<Script>> {
        self.compile_all_with(&self.config.screen)
    }

    /// Compile every object's script with a custom visibility predicate.
    pub fn compile_all_with(&self, visibility: &dyn Visibility) -> Result<Vec<Script>> {
        let compiler = self.compiler(visibility);
        (0..self.num_objects())
            .map(|object| compiler.compile(object, self.recorder.steps(object)))
            .collect()
    }

    fn compiler<'a>(&'a self, visibility: &'a dyn Visibility) -> ScriptCompiler<'a> {
        ScriptCompiler {
            index: &self.index,
            visibility,
            sentinel: &self.config.sentinel,
            state_range: self.config.state_range,
        }
    }
}
