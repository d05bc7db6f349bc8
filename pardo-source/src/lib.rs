// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Bounded record sources which can be split into independently readable parts.
//!
//! An [`InputFormat`] describes how a source is cut into [`InputSplit`]s and how the records of
//! a single split are read with a [`RecordReader`]. [`BoundedSource`] computes the splits of a
//! format exactly once, estimates the size of the data and hands out one source per split. Each
//! split source creates a [`BoundedReader`] yielding `(key, value)` records together with a
//! progress fraction which never decreases. Keys and values can be translated into other types
//! on their way out of a reader.
//!
//! [`MemoryInputFormat`] keeps all records in memory and is mostly useful for tests.
mod error;
mod format;
mod memory;
mod reader;
mod source;

pub use error::SourceError;
pub use format::{InputFormat, InputSplit, RecordReader};
pub use memory::{MemoryInputFormat, MemoryRecordReader, MemorySplit};
pub use reader::BoundedReader;
pub use source::{BoundedSource, Translation};
