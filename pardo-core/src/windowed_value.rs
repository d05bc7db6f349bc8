// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{Timestamp, Window};

/// A payload together with its event-time and the windows it was assigned to.
///
/// Values are never mutated after they were produced upstream, transformations always yield new
/// values.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowedValue<T> {
    value: T,
    timestamp: Timestamp,
    windows: Vec<Window>,
}

impl<T> WindowedValue<T> {
    pub fn new(value: T, timestamp: impl Into<Timestamp>, windows: Vec<Window>) -> Self {
        Self {
            value,
            timestamp: timestamp.into(),
            windows,
        }
    }

    /// Value in a single window.
    pub fn of(value: T, timestamp: impl Into<Timestamp>, window: Window) -> Self {
        Self::new(value, timestamp, vec![window])
    }

    /// Value in the global window.
    pub fn in_global_window(value: T, timestamp: impl Into<Timestamp>) -> Self {
        Self::of(value, timestamp, Window::Global)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Splits the value into one value per window, each keeping the original timestamp.
    pub fn explode_windows(self) -> Vec<WindowedValue<T>>
    where
        T: Clone,
    {
        if self.windows.len() <= 1 {
            return vec![self];
        }

        let WindowedValue {
            value,
            timestamp,
            windows,
        } = self;

        windows
            .into_iter()
            .map(|window| WindowedValue::of(value.clone(), timestamp, window))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Timestamp, Window};

    use super::WindowedValue;

    #[test]
    fn explode_into_single_windows() {
        let value = WindowedValue::new(
            "hello",
            12,
            vec![Window::interval(0, 20), Window::interval(10, 30)],
        );

        let exploded = value.explode_windows();
        assert_eq!(exploded.len(), 2);
        assert_eq!(exploded[0].windows(), &[Window::interval(0, 20)]);
        assert_eq!(exploded[1].windows(), &[Window::interval(10, 30)]);
        assert!(exploded.iter().all(|v| v.timestamp() == Timestamp::new(12)));
        assert!(exploded.iter().all(|v| *v.value() == "hello"));
    }

    #[test]
    fn single_window_is_kept_as_is() {
        let value = WindowedValue::in_global_window(1u8, 5);
        assert_eq!(value.clone().explode_windows(), vec![value]);
    }
}
