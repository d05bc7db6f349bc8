// SPDX-License-Identifier: MIT OR Apache-2.0

use pardo_core::cbor::EncodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("error in computing splits, input format returned an empty list")]
    EmptySplits,

    #[error("cannot create reader as source is not split yet")]
    NotSplit,

    #[error("reader was not started yet")]
    NotStarted,

    #[error("reader was already closed")]
    Closed,

    #[error("records per split need to be larger than zero")]
    InvalidSplitSize,

    #[error("could not estimate size of record: {0}")]
    Encode(#[from] EncodeError),

    /// Failure of a concrete input format or record reader.
    #[error("{0}")]
    Format(String),
}
