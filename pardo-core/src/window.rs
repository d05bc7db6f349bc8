// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Logical grouping key attached to an element.
///
/// Side inputs are partitioned by window and their availability is checked independently for
/// every window an element belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Window {
    /// The single window spanning all of event-time.
    Global,

    /// Half-open interval `[start, end)` of event-time.
    Interval { start: Timestamp, end: Timestamp },
}

impl Window {
    pub fn interval(start: impl Into<Timestamp>, end: impl Into<Timestamp>) -> Self {
        Self::Interval {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Global => write!(f, "global"),
            Window::Interval { start, end } => write!(f, "[{start}, {end})"),
        }
    }
}

/// Maps the window of a main-input element to the window a side input is looked up in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowMapping {
    /// The side input is windowed like the main input.
    #[default]
    Identity,

    /// The side input holds a single value for all of event-time.
    Global,
}

impl WindowMapping {
    pub fn map(&self, main_window: &Window) -> Window {
        match self {
            WindowMapping::Identity => *main_window,
            WindowMapping::Global => Window::Global,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Timestamp;

    use super::{Window, WindowMapping};

    #[test]
    fn display() {
        assert_eq!(Window::interval(0, 10).to_string(), "[0, 10)");
        assert_eq!(Window::Global.to_string(), "global");
        assert_eq!(
            Window::Interval {
                start: Timestamp::MIN,
                end: Timestamp::new(5)
            }
            .to_string(),
            "[-inf, 5)"
        );
    }

    #[test]
    fn window_mapping() {
        let window = Window::interval(10, 20);
        assert_eq!(WindowMapping::Identity.map(&window), window);
        assert_eq!(WindowMapping::Global.map(&window), Window::Global);
    }
}
