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

//! Encoder configuration.
//!
//! An [`EncoderConfig`] holds one [`AttributeConfig`] per attribute plus the
//! settings the script compiler needs. It is validated once, when the
//! encoder is created.

use std::ops::{Range, RangeInclusive};

use crate::error::{AnimError, ErrorCode, Result};

/// Highest attribute count a State instruction can carry (x, y, angle).
pub const MAX_ATTRIBUTES: usize = 3;

/// Default delta range for every attribute.
pub const DEFAULT_DELTA_RANGE: RangeInclusive<i32> = -7..=7;

/// Configuration of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeConfig {
    /// Deltas outside this range are pruned from the dictionary.
    pub range: RangeInclusive<i32>,
    /// Wrap deltas into `(-m/2, m/2]` when set (angles).
    pub modulo: Option<i32>,
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            range: DEFAULT_DELTA_RANGE,
            modulo: None,
        }
    }
}

impl AttributeConfig {
    /// Create an attribute with the given delta range and no wraparound.
    pub fn new(range: RangeInclusive<i32>) -> Self {
        Self {
            range,
            modulo: None,
        }
    }

    /// Set the modulo used to wrap deltas.
    pub fn with_modulo(mut self, modulo: i32) -> Self {
        self.modulo = Some(modulo);
        self
    }

    /// Wrap a raw delta into `(-m/2, m/2]` if a modulo is configured.
    ///
    /// Without a modulo, deltas past the `i32` range saturate. They lie far
    /// outside any delta range and never reach the dictionary index.
    pub fn wrap(&self, delta: i64) -> i32 {
        match self.modulo {
            Some(m) => {
                let m = i64::from(m);
                let r = delta.rem_euclid(m);
                let wrapped = if r > m / 2 { r - m } else { r };
                // |wrapped| <= m / 2 and m is an i32
                wrapped as i32
            }
            None => delta.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
        }
    }
}

/// What to do with State values that do not fit the instruction fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateRange {
    /// Truncate to the field width (x: 9 bits, y: 8 bits, angle: 5 bits).
    #[default]
    Wrap,
    /// Reject the value with [`ErrorCode::StateOutOfRange`].
    Strict,
}

/// On-screen bounds used by the default visibility predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenBounds {
    /// Visible horizontal positions.
    pub x: Range<i32>,
    /// Smallest visible vertical position.
    pub min_y: i32,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self {
            x: 0..344,
            min_y: 0,
        }
    }
}

/// Decides from which frame on an object is rendered.
pub trait Visibility {
    /// Whether `object` is visible with the given attribute vector.
    fn is_visible(&self, object: usize, state: &[i32]) -> bool;
}

impl Visibility for ScreenBounds {
    fn is_visible(&self, _object: usize, state: &[i32]) -> bool {
        let x = state.first().copied().unwrap_or(0);
        let y = state.get(1).copied().unwrap_or(0);
        self.x.contains(&x) && y >= self.min_y
    }
}

impl<F> Visibility for F
where
    F: Fn(usize, &[i32]) -> bool,
{
    fn is_visible(&self, object: usize, state: &[i32]) -> bool {
        self(object, state)
    }
}

/// Full configuration of a delta encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// One entry per attribute.
    pub attributes: Vec<AttributeConfig>,
    /// Bounds of the default visibility predicate.
    pub screen: ScreenBounds,
    /// Vector parked in the first State of objects that start off-screen.
    pub sentinel: Vec<i32>,
    /// Handling of out-of-range State values.
    pub state_range: StateRange,
}

impl EncoderConfig {
    /// Default configuration for `num_attributes` attributes.
    pub fn new(num_attributes: usize) -> Self {
        Self {
            attributes: vec![AttributeConfig::default(); num_attributes],
            screen: ScreenBounds::default(),
            sentinel: vec![0; num_attributes],
            state_range: StateRange::default(),
        }
    }

    /// Number of attributes per vector.
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Replace the configuration of attribute `index`.
    ///
    /// Indices past the attribute count are ignored.
    pub fn with_attribute(mut self, index: usize, attribute: AttributeConfig) -> Self {
        if let Some(slot) = self.attributes.get_mut(index) {
            *slot = attribute;
        }
        self
    }

    /// Set the screen bounds.
    pub fn with_screen(mut self, screen: ScreenBounds) -> Self {
        self.screen = screen;
        self
    }

    /// Set the off-screen sentinel vector.
    pub fn with_sentinel(mut self, sentinel: Vec<i32>) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Set the State range policy.
    pub fn with_state_range(mut self, state_range: StateRange) -> Self {
        self.state_range = state_range;
        self
    }

    /// Check every setting, reporting the first problem found.
    pub fn validate(&self) -> Result<()> {
        let n = self.attributes.len();
        if n == 0 || n > MAX_ATTRIBUTES {
            return Err(AnimError::new(
                ErrorCode::InvalidConfig,
                format!(
                    "Attribute count must be between 1 and {}, got {}",
                    MAX_ATTRIBUTES, n
                ),
            ));
        }

        for (i, attribute) in self.attributes.iter().enumerate() {
            let (lo, hi) = (*attribute.range.start(), *attribute.range.end());
            if lo > hi {
                return Err(AnimError::new(
                    ErrorCode::InvalidConfig,
                    format!("Delta range {}..={} of attribute {} is empty", lo, hi, i),
                ));
            }
            if lo < i8::MIN as i32 || hi > i8::MAX as i32 {
                return Err(AnimError::new(
                    ErrorCode::InvalidConfig,
                    format!(
                        "Delta range {}..={} of attribute {} does not fit a signed byte",
                        lo, hi, i
                    ),
                )
                .with_hint("Delta tables store one signed byte per entry"));
            }
            if let Some(m) = attribute.modulo {
                if m <= 0 {
                    return Err(AnimError::new(
                        ErrorCode::InvalidConfig,
                        format!("Modulo of attribute {} must be positive, got {}", i, m),
                    ));
                }
            }
        }

        if self.sentinel.len() != n {
            return Err(AnimError::new(
                ErrorCode::InvalidConfig,
                format!(
                    "Sentinel has {} values but {} attributes are configured",
                    self.sentinel.len(),
                    n
                ),
            ));
        }

        Ok(())
    }
}
