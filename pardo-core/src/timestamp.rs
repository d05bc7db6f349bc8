// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logical event-time used for element timestamps and watermarks.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Event-time in milliseconds since the UNIX epoch.
///
/// Two values carry a special meaning: [`Timestamp::MIN`] stands for "negative infinity" and is
/// used for watermarks which are not known yet, [`Timestamp::MAX`] stands for "positive infinity",
/// for example the minimum over an empty set of timestamps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Negative infinity, "nothing is known yet".
    pub const MIN: Timestamp = Timestamp(i64::MIN);

    /// Positive infinity.
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    pub const fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn millis(&self) -> i64 {
        self.0
    }

    pub fn is_max(&self) -> bool {
        *self == Self::MAX
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MIN => write!(f, "-inf"),
            Self::MAX => write!(f, "+inf"),
            Self(millis) => write!(f, "{millis}"),
        }
    }
}
