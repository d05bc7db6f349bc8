// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use pardo_core::{Timestamp, WindowedValue};
use tracing::{info, trace, warn};

use crate::error::SourceError;
use crate::format::{InputFormat, RecordReader};
use crate::source::Translation;

/// Reads all records of a single split.
///
/// Call [`start`](BoundedReader::start) once and [`advance`](BoundedReader::advance) after that
/// until either returns `false`. The current record is available through
/// [`current`](BoundedReader::current) in between, with the translations of the source it was
/// created from applied.
pub struct BoundedReader<F, K = <F as InputFormat>::Key, V = <F as InputFormat>::Value>
where
    F: InputFormat,
{
    format: Arc<F>,
    split: F::Split,
    reader: Option<F::Reader>,
    key_translation: Translation<F::Key, K>,
    value_translation: Translation<F::Value, V>,
    current: Option<(K, V)>,
    records_returned: u64,
    progress: f64,
    done: bool,
    closed: bool,
}

impl<F, K, V> BoundedReader<F, K, V>
where
    F: InputFormat,
{
    pub(crate) fn new(
        format: Arc<F>,
        split: F::Split,
        key_translation: Translation<F::Key, K>,
        value_translation: Translation<F::Value, V>,
    ) -> Self {
        Self {
            format,
            split,
            reader: None,
            key_translation,
            value_translation,
            current: None,
            records_returned: 0,
            progress: 0.0,
            done: false,
            closed: false,
        }
    }

    pub fn split(&self) -> &F::Split {
        &self.split
    }

    /// Opens the split and moves to the first record. Returns `false` if the split is empty.
    ///
    /// Starting again closes the reader opened before and reads the split from its beginning.
    pub fn start(&mut self) -> Result<bool, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }

        self.current = None;
        if let Some(mut previous) = self.reader.take() {
            previous.close()?;
        }

        self.records_returned = 0;
        self.progress = 0.0;
        self.done = false;

        let mut reader = self.format.create_reader(&self.split)?;
        let record = match reader.next_key_value() {
            Ok(record) => record,
            Err(err) => {
                if let Err(close_err) = reader.close() {
                    warn!("failed closing reader after failed first read: {close_err}");
                }
                return Err(err);
            }
        };

        match record {
            Some(record) => {
                self.current = Some(self.translate(record));
                self.records_returned += 1;
                self.reader = Some(reader);
                Ok(true)
            }
            None => {
                reader.close()?;
                self.done = true;
                Ok(false)
            }
        }
    }

    /// Moves to the next record. Returns `false` once the split is exhausted.
    pub fn advance(&mut self) -> Result<bool, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }

        if self.done {
            return Ok(false);
        }

        let Some(reader) = self.reader.as_mut() else {
            return Err(SourceError::NotStarted);
        };

        // Progress is taken before reading, it then describes the record handed out last.
        let progress = reader.progress()?.clamp(0.0, 1.0);
        self.progress = self.progress.max(progress);

        match reader.next_key_value()? {
            Some(record) => {
                self.current = Some(self.translate(record));
                self.records_returned += 1;
                Ok(true)
            }
            None => {
                self.current = None;
                self.done = true;
                trace!("exhausted split after {} records", self.records_returned);
                Ok(false)
            }
        }
    }

    fn translate(&self, (key, value): (F::Key, F::Value)) -> (K, V) {
        ((self.key_translation)(key), (self.value_translation)(value))
    }

    /// Record the reader is positioned on.
    pub fn current(&self) -> Option<&(K, V)> {
        self.current.as_ref()
    }

    /// Records of bounded sources carry no event time of their own and are placed at the very
    /// beginning of time.
    pub fn current_timestamp(&self) -> Timestamp {
        Timestamp::MIN
    }

    /// Current record as a windowed value in the global window, ready to be handed to a processor.
    pub fn current_windowed(&self) -> Option<WindowedValue<(K, V)>>
    where
        K: Clone,
        V: Clone,
    {
        self.current
            .clone()
            .map(|record| WindowedValue::in_global_window(record, self.current_timestamp()))
    }

    /// Number of records returned so far.
    pub fn records_returned(&self) -> u64 {
        self.records_returned
    }

    /// Fraction of the split consumed so far, between 0 and 1 and never decreasing while reading.
    pub fn fraction_consumed(&self) -> f64 {
        if self.done {
            1.0
        } else if self.reader.is_none() || self.records_returned == 0 {
            0.0
        } else {
            self.progress
        }
    }

    /// Splits are never split further while being read, so this is one until the reader is done.
    pub fn split_points_remaining(&self) -> u64 {
        if self.done { 0 } else { 1 }
    }

    pub fn close(&mut self) -> Result<(), SourceError> {
        if self.closed {
            return Ok(());
        }

        info!(
            "closing reader after reading {} records",
            self.records_returned
        );
        self.closed = true;
        self.current = None;

        if let Some(mut reader) = self.reader.take() {
            reader.close()?;
        }

        Ok(())
    }
}
