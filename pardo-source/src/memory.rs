// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use pardo_core::cbor::encode_cbor;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::format::{InputFormat, InputSplit, RecordReader};

/// Input format serving records held in memory, cut into splits of a fixed number of records.
#[derive(Clone, Debug)]
pub struct MemoryInputFormat<K, V> {
    records: Arc<Vec<(K, V)>>,
    records_per_split: usize,
}

impl<K, V> MemoryInputFormat<K, V> {
    pub fn new(records: Vec<(K, V)>, records_per_split: usize) -> Result<Self, SourceError> {
        if records_per_split == 0 {
            return Err(SourceError::InvalidSplitSize);
        }

        Ok(Self {
            records: Arc::new(records),
            records_per_split,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Range of records of a [`MemoryInputFormat`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySplit {
    start: usize,
    end: usize,

    /// Size of all records in this range in their CBOR encoding.
    length: u64,
}

impl MemorySplit {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

impl InputSplit for MemorySplit {
    fn length(&self) -> u64 {
        self.length
    }
}

impl<K, V> InputFormat for MemoryInputFormat<K, V>
where
    K: Clone + Serialize,
    V: Clone + Serialize,
{
    type Key = K;

    type Value = V;

    type Split = MemorySplit;

    type Reader = MemoryRecordReader<K, V>;

    fn splits(&self) -> Result<Vec<MemorySplit>, SourceError> {
        let mut splits = Vec::with_capacity(self.records.len().div_ceil(self.records_per_split));

        for (index, chunk) in self.records.chunks(self.records_per_split).enumerate() {
            let mut length = 0;
            for record in chunk {
                length += encode_cbor(record)?.len() as u64;
            }

            let start = index * self.records_per_split;
            splits.push(MemorySplit {
                start,
                end: start + chunk.len(),
                length,
            });
        }

        Ok(splits)
    }

    fn create_reader(&self, split: &MemorySplit) -> Result<Self::Reader, SourceError> {
        if split.start > split.end || split.end > self.records.len() {
            return Err(SourceError::Format(format!(
                "split {}..{} is out of range for {} records",
                split.start,
                split.end,
                self.records.len()
            )));
        }

        Ok(MemoryRecordReader {
            records: self.records.clone(),
            start: split.start,
            end: split.end,
            position: split.start,
            closed: false,
        })
    }
}

#[derive(Debug)]
pub struct MemoryRecordReader<K, V> {
    records: Arc<Vec<(K, V)>>,
    start: usize,
    end: usize,
    position: usize,
    closed: bool,
}

impl<K, V> RecordReader for MemoryRecordReader<K, V>
where
    K: Clone,
    V: Clone,
{
    type Key = K;

    type Value = V;

    fn next_key_value(&mut self) -> Result<Option<(K, V)>, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }

        if self.position >= self.end {
            return Ok(None);
        }

        let record = self.records.get(self.position).cloned();
        self.position += 1;
        Ok(record)
    }

    fn progress(&self) -> Result<f64, SourceError> {
        if self.end == self.start {
            return Ok(1.0);
        }

        Ok((self.position - self.start) as f64 / (self.end - self.start) as f64)
    }

    fn close(&mut self) -> Result<(), SourceError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pardo_core::cbor::{decode_cbor, encode_cbor};

    use crate::error::SourceError;
    use crate::format::{InputFormat, InputSplit, RecordReader};

    use super::{MemoryInputFormat, MemorySplit};

    #[test]
    fn cut_into_fixed_size_splits() {
        let format = MemoryInputFormat::new((0..5u8).map(|i| (i, i)).collect(), 2).unwrap();
        let splits = format.splits().unwrap();

        let ranges: Vec<(usize, usize)> = splits.iter().map(|s| (s.start(), s.end())).collect();
        assert_eq!(ranges, vec![(0, 2), (2, 4), (4, 5)]);

        // Every record is a two-element array of small integers, three bytes in CBOR.
        let lengths: Vec<u64> = splits.iter().map(|s| s.length()).collect();
        assert_eq!(lengths, vec![6, 6, 3]);
    }

    #[test]
    fn splits_travel_between_workers() {
        let format = MemoryInputFormat::new(vec![("a", 1), ("b", 2)], 1).unwrap();
        let split = format.splits().unwrap().remove(1);

        let bytes = encode_cbor(&split).unwrap();
        let received: MemorySplit = decode_cbor(&bytes[..]).unwrap();

        let mut reader = format.create_reader(&received).unwrap();
        assert_eq!(reader.next_key_value().unwrap(), Some(("b", 2)));
        assert_eq!(reader.next_key_value().unwrap(), None);
        assert_eq!(reader.progress().unwrap(), 1.0);
    }

    #[test]
    fn invalid_configuration() {
        assert!(matches!(
            MemoryInputFormat::new(vec![(1, 1)], 0),
            Err(SourceError::InvalidSplitSize)
        ));

        let format = MemoryInputFormat::new(vec![(1, 1)], 1).unwrap();
        let foreign = MemoryInputFormat::new(vec![(1, 1), (2, 2)], 1)
            .unwrap()
            .splits()
            .unwrap()
            .remove(1);
        assert!(matches!(
            format.create_reader(&foreign),
            Err(SourceError::Format(_))
        ));
    }

    #[test]
    fn closed_reader() {
        let format = MemoryInputFormat::new(vec![(1, 1)], 1).unwrap();
        let split = format.splits().unwrap().remove(0);
        let mut reader = format.create_reader(&split).unwrap();
        reader.close().unwrap();
        assert!(matches!(reader.next_key_value(), Err(SourceError::Closed)));
    }
}
