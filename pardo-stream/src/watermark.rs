// SPDX-License-Identifier: MIT OR Apache-2.0

use pardo_core::Timestamp;

use crate::error::ParDoError;

/// Derives the output watermark of a unit from its input watermark and its pushback hold.
///
/// Invariants:
///
/// - the output watermark never decreases,
/// - it never passes the input watermark,
/// - it never passes the timestamp of any element held in the pushback buffer.
///
/// Units without side inputs can never hold anything back. They forward every input watermark
/// as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatermarkCoordinator {
    input: Timestamp,
    output: Timestamp,
    has_side_inputs: bool,
}

impl WatermarkCoordinator {
    pub fn new(has_side_inputs: bool) -> Self {
        Self {
            input: Timestamp::MIN,
            output: Timestamp::MIN,
            has_side_inputs,
        }
    }

    pub fn input_watermark(&self) -> Timestamp {
        self.input
    }

    pub fn output_watermark(&self) -> Timestamp {
        self.output
    }

    /// Handles an input watermark and returns the watermark to emit downstream, if any.
    pub fn on_input_watermark(
        &mut self,
        watermark: Timestamp,
        pushback_hold: Timestamp,
    ) -> Result<Option<Timestamp>, ParDoError> {
        if watermark < self.input {
            return Err(ParDoError::WatermarkRegression {
                current: self.input,
                received: watermark,
            });
        }

        self.input = watermark;

        if !self.has_side_inputs {
            self.output = watermark;
            return Ok(Some(watermark));
        }

        Ok(self.advance(pushback_hold))
    }

    /// Re-evaluates the output watermark after the pushback hold changed, for example because a
    /// side input unblocked buffered elements.
    pub fn on_hold_changed(&mut self, pushback_hold: Timestamp) -> Option<Timestamp> {
        if !self.has_side_inputs {
            // Nothing is ever held back, emitting again would only repeat the last watermark.
            return None;
        }

        self.advance(pushback_hold)
    }

    /// Resets both watermarks to values taken from a snapshot.
    pub(crate) fn restore(&mut self, input: Timestamp, output: Timestamp) {
        self.input = input;
        self.output = output.min(input);
    }

    fn advance(&mut self, pushback_hold: Timestamp) -> Option<Timestamp> {
        let candidate = pushback_hold.min(self.input);
        if candidate > self.output {
            self.output = candidate;
            Some(candidate)
        } else {
            None
        }
    }
}
