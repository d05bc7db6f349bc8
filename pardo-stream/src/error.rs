// SPDX-License-Identifier: MIT OR Apache-2.0

use pardo_core::Timestamp;
use pardo_core::cbor::{DecodeError, EncodeError};
use thiserror::Error;

use crate::config::MAX_SIDE_OUTPUTS;

/// Invalid configuration, always detected when a unit is constructed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "too many side outputs ({requested}), currently only supporting {}",
        MAX_SIDE_OUTPUTS
    )]
    TooManySideOutputs { requested: usize },

    #[error("side output tag '{0}' was configured more than once")]
    DuplicateSideOutput(String),

    #[error("side output tag '{0}' is also used as main output tag")]
    SideOutputIsMainOutput(String),

    #[error("side input '{0}' was configured more than once")]
    DuplicateSideInput(String),
}

/// Failure raised by user code while processing an element.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UserCodeError {
    /// An assertion inside user (test) code did not hold.
    ///
    /// These are additionally recorded in an [`AssertionSlot`](crate::AssertionSlot) so they
    /// can be inspected after the pipeline failed.
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("{0}")]
    Failed(String),
}

impl UserCodeError {
    pub fn failed(reason: impl ToString) -> Self {
        Self::Failed(reason.to_string())
    }

    pub fn assertion(reason: impl ToString) -> Self {
        Self::Assertion(reason.to_string())
    }
}

/// Errors surfaced to the host while a unit handles a signal.
///
/// None of these are retried internally.
#[derive(Debug, Error)]
pub enum ParDoError {
    #[error(transparent)]
    UserCode(#[from] UserCodeError),

    #[error("side input signal refers to unknown side input index {index} (configured: {len})")]
    UnknownSideInput { index: usize, len: usize },

    #[error("input watermark regressed from {current} to {received}")]
    WatermarkRegression {
        current: Timestamp,
        received: Timestamp,
    },

    #[error("processing unit is not running")]
    NotRunning,

    #[error("processing unit was already set up")]
    AlreadySetUp,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
