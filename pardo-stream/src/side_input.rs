// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use pardo_core::{SideInputId, Window, WindowedValue};
use tracing::warn;

use crate::config::SideInputSpec;
use crate::error::ParDoError;

/// Read access to side-input values, handed to user code.
pub trait SideInputReader<V> {
    /// Value of the side input at `index` for the window of a main-input element.
    fn get(&self, index: usize, main_window: &Window) -> Option<&V>;

    /// Value of the side input with the given id for the window of a main-input element.
    fn get_by_id(&self, id: &SideInputId, main_window: &Window) -> Option<&V>;

    fn is_ready(&self, index: usize, main_window: &Window) -> bool {
        self.get(index, main_window).is_some()
    }
}

/// Latest value of every side input, per side-input window.
///
/// Populated only by side-input signals, values are never removed. Receiving a second value for
/// the same side input and window overwrites the first one.
#[derive(Debug)]
pub struct SideInputStore<V> {
    specs: Vec<SideInputSpec>,
    values: HashMap<(usize, Window), V>,
}

impl<V> SideInputStore<V> {
    pub fn new(specs: Vec<SideInputSpec>) -> Self {
        Self {
            specs,
            values: HashMap::new(),
        }
    }

    /// Number of configured side inputs.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Stores a side-input value for every window it was assigned to.
    pub fn insert(&mut self, index: usize, value: WindowedValue<V>) -> Result<(), ParDoError>
    where
        V: Clone,
    {
        self.check_index(index)?;

        for single in value.explode_windows() {
            let Some(window) = single.windows().first().copied() else {
                warn!(
                    "dropping value for side input {} without windows at timestamp {}",
                    index,
                    single.timestamp()
                );
                continue;
            };
            self.values.insert((index, window), single.into_value());
        }

        Ok(())
    }

    /// Returns true if every configured side input has a value for the given main-input window.
    pub fn all_ready(&self, main_window: &Window) -> bool {
        (0..self.specs.len()).all(|index| self.is_ready(index, main_window))
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), ParDoError> {
        if index >= self.specs.len() {
            return Err(ParDoError::UnknownSideInput {
                index,
                len: self.specs.len(),
            });
        }

        Ok(())
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (usize, Window, &V)> {
        self.values
            .iter()
            .map(|((index, window), value)| (*index, *window, value))
    }

    pub(crate) fn insert_raw(
        &mut self,
        index: usize,
        window: Window,
        value: V,
    ) -> Result<(), ParDoError> {
        self.check_index(index)?;
        self.values.insert((index, window), value);
        Ok(())
    }
}

impl<V> SideInputReader<V> for SideInputStore<V> {
    fn get(&self, index: usize, main_window: &Window) -> Option<&V> {
        let spec = self.specs.get(index)?;
        let side_window = spec.mapping.map(main_window);
        self.values.get(&(index, side_window))
    }

    fn get_by_id(&self, id: &SideInputId, main_window: &Window) -> Option<&V> {
        let index = self.specs.iter().position(|spec| &spec.id == id)?;
        self.get(index, main_window)
    }
}

#[cfg(test)]
mod tests {
    use pardo_core::{SideInputId, Window, WindowedValue};

    use crate::config::SideInputSpec;
    use crate::error::ParDoError;

    use super::{SideInputReader, SideInputStore};

    #[test]
    fn values_are_kept_per_window() {
        let mut store = SideInputStore::new(vec![SideInputSpec::new("rates")]);
        let wa = Window::interval(0, 10);
        let wb = Window::interval(10, 20);

        assert!(!store.all_ready(&wa));

        store.insert(0, WindowedValue::of(1.5, 3, wa)).unwrap();
        assert!(store.all_ready(&wa));
        assert!(!store.all_ready(&wb));
        assert_eq!(store.get(0, &wa), Some(&1.5));
        assert_eq!(store.get_by_id(&SideInputId::from("rates"), &wa), Some(&1.5));
        assert_eq!(store.get_by_id(&SideInputId::from("unknown"), &wa), None);
    }

    #[test]
    fn last_write_wins() {
        let mut store = SideInputStore::new(vec![SideInputSpec::new("rates")]);
        let window = Window::interval(0, 10);

        store.insert(0, WindowedValue::of(1, 1, window)).unwrap();
        store.insert(0, WindowedValue::of(2, 2, window)).unwrap();
        assert_eq!(store.get(0, &window), Some(&2));
    }

    #[test]
    fn multi_window_values_fill_every_window() {
        let mut store = SideInputStore::new(vec![SideInputSpec::new("rates")]);
        let wa = Window::interval(0, 10);
        let wb = Window::interval(5, 15);

        store.insert(0, WindowedValue::new(7, 6, vec![wa, wb])).unwrap();
        assert!(store.all_ready(&wa));
        assert!(store.all_ready(&wb));
    }

    #[test]
    fn global_side_input_serves_every_window() {
        let mut store =
            SideInputStore::new(vec![SideInputSpec::new("a"), SideInputSpec::global("b")]);
        let window = Window::interval(0, 10);

        store.insert(1, WindowedValue::in_global_window("x", 0)).unwrap();
        assert!(store.is_ready(1, &window));
        assert!(store.is_ready(1, &Window::interval(100, 200)));

        // The first side input is still missing.
        assert!(!store.all_ready(&window));
    }

    #[test]
    fn ignore_values_without_windows() {
        let mut store = SideInputStore::new(vec![SideInputSpec::global("rates")]);
        store.insert(0, WindowedValue::new(1, 0, vec![])).unwrap();
        assert!(!store.all_ready(&Window::Global));
        assert_eq!(store.entries().count(), 0);
    }

    #[test]
    fn unknown_index() {
        let mut store = SideInputStore::new(vec![SideInputSpec::new("rates")]);
        let result = store.insert(1, WindowedValue::in_global_window(0, 0));
        assert!(matches!(
            result,
            Err(ParDoError::UnknownSideInput { index: 1, len: 1 })
        ));
    }
}
