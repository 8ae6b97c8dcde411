//! Pin modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much of a subgraph a pin keeps alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinMode {
    /// The root and everything reachable from it.
    Recursive,
    /// The root block only.
    Direct,
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recursive => write!(f, "recursive"),
            Self::Direct => write!(f, "direct"),
        }
    }
}
