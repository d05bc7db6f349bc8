// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one output of a processing unit, either its main output or one of its side outputs.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputTag(String);

impl OutputTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl From<&str> for OutputTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for OutputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one side input of a processing unit.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SideInputId(String);

impl SideInputId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl From<&str> for SideInputId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for SideInputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputTag, SideInputId};

    #[test]
    fn serialize_as_plain_strings() {
        let tag = OutputTag::new("late");
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"late\"");

        let id: SideInputId = serde_json::from_str("\"rates\"").unwrap();
        assert_eq!(id, SideInputId::from("rates"));
    }
}
