// SPDX-License-Identifier: MIT OR Apache-2.0

use std::mem;

use pardo_core::{Timestamp, WindowedValue};

/// Elements whose processing was deferred because a side input was not available yet.
///
/// Next to the elements the buffer tracks the smallest timestamp it holds, the output watermark
/// must never pass it. Elements leave the buffer in bulk when it gets re-evaluated, which is why
/// the minimum is recomputed over the whole buffer on every rewrite instead of being decremented.
#[derive(Debug)]
pub struct PushbackBuffer<T> {
    elements: Vec<WindowedValue<T>>,
    min_timestamp: Timestamp,
}

impl<T> PushbackBuffer<T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            min_timestamp: Timestamp::MAX,
        }
    }

    pub fn from_elements(elements: Vec<WindowedValue<T>>) -> Self {
        let mut buffer = Self::new();
        buffer.replace(elements);
        buffer
    }

    pub fn add(&mut self, element: WindowedValue<T>) {
        self.min_timestamp = self.min_timestamp.min(element.timestamp());
        self.elements.push(element);
    }

    /// Smallest timestamp of all buffered elements, [`Timestamp::MAX`] if the buffer is empty.
    pub fn min_timestamp(&self) -> Timestamp {
        self.min_timestamp
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[WindowedValue<T>] {
        &self.elements
    }

    /// Runs every buffered element through `f` again and keeps exactly what `f` pushes back.
    ///
    /// A failure is fatal for the element `f` failed on, it leaves the buffer for good. The
    /// elements pushed back so far and all elements not visited yet stay in the buffer before the
    /// error is returned. Results `f` emitted before failing are not rolled back.
    pub fn reprocess<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(WindowedValue<T>) -> Result<Vec<WindowedValue<T>>, E>,
    {
        let elements = mem::take(&mut self.elements);
        let mut still_pushed_back = Vec::with_capacity(elements.len());
        let mut remaining = elements.into_iter();

        while let Some(element) = remaining.next() {
            match f(element) {
                Ok(pushed_back) => still_pushed_back.extend(pushed_back),
                Err(err) => {
                    still_pushed_back.extend(remaining);
                    self.replace(still_pushed_back);
                    return Err(err);
                }
            }
        }

        self.replace(still_pushed_back);
        Ok(())
    }

    fn replace(&mut self, elements: Vec<WindowedValue<T>>) {
        self.min_timestamp = elements
            .iter()
            .map(|element| element.timestamp())
            .min()
            .unwrap_or(Timestamp::MAX);
        self.elements = elements;
    }
}

impl<T> Default for PushbackBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
