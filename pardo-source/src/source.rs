// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SourceError;
use crate::format::{InputFormat, InputSplit};
use crate::reader::BoundedReader;

/// Function applied to every key or value a reader hands out.
pub type Translation<A, B> = Arc<dyn Fn(A) -> B + Send + Sync>;

/// Source with a finite amount of records read through an [`InputFormat`].
///
/// A source starts out unsplit. Its splits are computed once, on first use, and cached. Every
/// split is turned into a source of its own with
/// [`split_into_bundles`](BoundedSource::split_into_bundles); only those can create readers.
///
/// Keys and values are handed out as the format reads them unless a translation was set with
/// [`with_key_translation`](BoundedSource::with_key_translation) or
/// [`with_value_translation`](BoundedSource::with_value_translation). `K` and `V` are the types
/// after translation.
pub struct BoundedSource<F, K = <F as InputFormat>::Key, V = <F as InputFormat>::Value>
where
    F: InputFormat,
{
    format: Arc<F>,
    split: Option<F::Split>,
    splits: Option<Vec<F::Split>>,
    estimated_size: u64,
    key_translation: Translation<F::Key, K>,
    value_translation: Translation<F::Value, V>,
}

impl<F> BoundedSource<F>
where
    F: InputFormat,
    F::Key: 'static,
    F::Value: 'static,
{
    pub fn new(format: F) -> Self {
        Self {
            format: Arc::new(format),
            split: None,
            splits: None,
            estimated_size: 0,
            key_translation: Arc::new(|key| key),
            value_translation: Arc::new(|value| value),
        }
    }
}

impl<F, K, V> BoundedSource<F, K, V>
where
    F: InputFormat,
{
    /// Translates every key read from the format with `f` before handing it out. Replaces any
    /// key translation set before.
    pub fn with_key_translation<K2>(
        self,
        f: impl Fn(F::Key) -> K2 + Send + Sync + 'static,
    ) -> BoundedSource<F, K2, V> {
        BoundedSource {
            format: self.format,
            split: self.split,
            splits: self.splits,
            estimated_size: self.estimated_size,
            key_translation: Arc::new(f),
            value_translation: self.value_translation,
        }
    }

    /// Translates every value read from the format with `f` before handing it out. Replaces any
    /// value translation set before.
    pub fn with_value_translation<V2>(
        self,
        f: impl Fn(F::Value) -> V2 + Send + Sync + 'static,
    ) -> BoundedSource<F, K, V2> {
        BoundedSource {
            format: self.format,
            split: self.split,
            splits: self.splits,
            estimated_size: self.estimated_size,
            key_translation: self.key_translation,
            value_translation: Arc::new(f),
        }
    }

    fn for_split(&self, split: F::Split) -> Self {
        Self {
            format: self.format.clone(),
            split: Some(split),
            splits: None,
            estimated_size: 0,
            key_translation: self.key_translation.clone(),
            value_translation: self.value_translation.clone(),
        }
    }

    /// Split this source reads from, `None` if it was not split yet.
    pub fn split(&self) -> Option<&F::Split> {
        self.split.as_ref()
    }

    /// Cached splits, `None` if they were not computed yet.
    pub fn splits(&self) -> Option<&[F::Split]> {
        self.splits.as_deref()
    }

    /// Returns one source per split. A source which is already split returns itself.
    ///
    /// There is no way to influence the size of the splits, the input format decides on them.
    pub fn split_into_bundles(&mut self) -> Result<Vec<BoundedSource<F, K, V>>, SourceError> {
        if self.split.is_some() {
            info!("not splitting source because source is already split");
            return Ok(vec![self.clone()]);
        }

        self.compute_splits_if_necessary()?;
        let splits = self.splits.as_deref().unwrap_or_default();
        info!(
            "generated {} splits, size of first split is {}",
            splits.len(),
            splits.first().map(|split| split.length()).unwrap_or_default()
        );

        Ok(splits
            .iter()
            .map(|split| self.for_split(split.clone()))
            .collect())
    }

    /// Size of the data in bytes: the sum of all split lengths or, once split, the length of the
    /// own split.
    pub fn estimated_size_bytes(&mut self) -> Result<u64, SourceError> {
        if let Some(split) = &self.split {
            return Ok(split.length());
        }

        self.compute_splits_if_necessary()?;
        Ok(self.estimated_size)
    }

    /// Creates a reader for the split of this source.
    pub fn create_reader(&self) -> Result<BoundedReader<F, K, V>, SourceError> {
        let Some(split) = &self.split else {
            return Err(SourceError::NotSplit);
        };

        Ok(BoundedReader::new(
            self.format.clone(),
            split.clone(),
            self.key_translation.clone(),
            self.value_translation.clone(),
        ))
    }

    fn compute_splits_if_necessary(&mut self) -> Result<(), SourceError> {
        if self.splits.is_some() {
            return Ok(());
        }

        let splits = self.format.splits()?;
        if splits.is_empty() {
            return Err(SourceError::EmptySplits);
        }

        self.estimated_size = splits.iter().map(|split| split.length()).sum();
        debug!(
            "computed {} splits with {} bytes in total",
            splits.len(),
            self.estimated_size
        );
        self.splits = Some(splits);

        Ok(())
    }
}

impl<F, K, V> Clone for BoundedSource<F, K, V>
where
    F: InputFormat,
{
    fn clone(&self) -> Self {
        Self {
            format: self.format.clone(),
            split: self.split.clone(),
            splits: self.splits.clone(),
            estimated_size: self.estimated_size,
            key_translation: self.key_translation.clone(),
            value_translation: self.value_translation.clone(),
        }
    }
}
