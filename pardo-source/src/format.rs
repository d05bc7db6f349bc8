// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::SourceError;

/// Independently readable part of a source.
///
/// Splits are handed to other workers and therefore need to be serializable.
pub trait InputSplit: Clone + Serialize + DeserializeOwned {
    /// Size of the split in bytes, used to estimate the size of the whole source.
    fn length(&self) -> u64;
}

/// Reads the records of a single split in order.
pub trait RecordReader {
    type Key;

    type Value;

    /// Returns the next record or `None` once the split is exhausted.
    fn next_key_value(&mut self) -> Result<Option<(Self::Key, Self::Value)>, SourceError>;

    /// Fraction of the split consumed so far.
    ///
    /// Readers are not required to be exact here, values outside of `[0, 1]` and values going
    /// backwards are tolerated by [`BoundedReader`](crate::BoundedReader).
    fn progress(&self) -> Result<f64, SourceError>;

    fn close(&mut self) -> Result<(), SourceError>;
}

/// Describes how a source is cut into splits and how each split is read.
pub trait InputFormat {
    type Key;

    type Value;

    type Split: InputSplit;

    type Reader: RecordReader<Key = Self::Key, Value = Self::Value>;

    /// Computes all splits of the source.
    fn splits(&self) -> Result<Vec<Self::Split>, SourceError>;

    fn create_reader(&self, split: &Self::Split) -> Result<Self::Reader, SourceError>;
}
