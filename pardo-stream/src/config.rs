// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration of a processing unit.
//!
//! A `ParDoConfig` is established once when a [`ParDoUnit`](crate::ParDoUnit) is constructed and
//! is immutable afterwards.
use std::collections::HashSet;

use pardo_core::{OutputTag, SideInputId, WindowMapping};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of physical side-output channels a unit offers.
pub const MAX_SIDE_OUTPUTS: usize = 5;

/// Default tag of the main output.
pub const DEFAULT_MAIN_OUTPUT_TAG: &str = "main";

/// One side input the user function may consult.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideInputSpec {
    pub id: SideInputId,

    /// How the window of a main-input element maps to the window the side input is read in.
    #[serde(default)]
    pub mapping: WindowMapping,
}

impl SideInputSpec {
    pub fn new(id: impl Into<SideInputId>) -> Self {
        Self {
            id: id.into(),
            mapping: WindowMapping::Identity,
        }
    }

    /// Side input holding one value for all of event-time.
    pub fn global(id: impl Into<SideInputId>) -> Self {
        Self {
            id: id.into(),
            mapping: WindowMapping::Global,
        }
    }
}

/// Configuration parameters for a processing unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParDoConfig {
    /// Tag of the main output.
    pub main_output_tag: OutputTag,

    /// Tags of side outputs, in channel order. At most [`MAX_SIDE_OUTPUTS`] are supported.
    pub side_output_tags: Vec<OutputTag>,

    /// Side inputs, in order. The position of a side input in this list is the index carried by
    /// side-input signals.
    pub side_inputs: Vec<SideInputSpec>,

    /// Log every element, side-input value and emission at debug level.
    pub trace_tuples: bool,
}

impl ParDoConfig {
    pub fn with_side_outputs(mut self, tags: impl IntoIterator<Item = OutputTag>) -> Self {
        self.side_output_tags = tags.into_iter().collect();
        self
    }

    pub fn with_side_inputs(
        mut self,
        side_inputs: impl IntoIterator<Item = SideInputSpec>,
    ) -> Self {
        self.side_inputs = side_inputs.into_iter().collect();
        self
    }

    pub fn with_trace_tuples(mut self, trace_tuples: bool) -> Self {
        self.trace_tuples = trace_tuples;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.side_output_tags.len() > MAX_SIDE_OUTPUTS {
            return Err(ConfigError::TooManySideOutputs {
                requested: self.side_output_tags.len(),
            });
        }

        let mut tags = HashSet::new();
        for tag in &self.side_output_tags {
            if tag == &self.main_output_tag {
                return Err(ConfigError::SideOutputIsMainOutput(tag.to_string()));
            }

            if !tags.insert(tag) {
                return Err(ConfigError::DuplicateSideOutput(tag.to_string()));
            }
        }

        let mut ids = HashSet::new();
        for spec in &self.side_inputs {
            if !ids.insert(&spec.id) {
                return Err(ConfigError::DuplicateSideInput(spec.id.to_string()));
            }
        }

        Ok(())
    }
}

impl Default for ParDoConfig {
    fn default() -> Self {
        Self {
            main_output_tag: OutputTag::new(DEFAULT_MAIN_OUTPUT_TAG),
            side_output_tags: Vec::new(),
            side_inputs: Vec::new(),
            trace_tuples: false,
        }
    }
}
