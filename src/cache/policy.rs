//! Eviction Policy Module
//!
//! Placement, promotion and victim-selection rules for FIFO, LRU and MRU.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{Handle, Sequence};
use crate::error::CacheError;

// == Placement ==
/// Where a newly inserted entry is linked into the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Front,
    Back,
}

// == Eviction Policy ==
/// Rule deciding ordering and which entry is removed on overflow.
///
/// | Policy | New key      | Hit             | Victim |
/// |--------|--------------|-----------------|--------|
/// | FIFO   | back         | no reordering   | head   |
/// | LRU    | front        | move to front   | tail   |
/// | MRU    | front        | move to front   | head   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    Fifo,
    #[default]
    Lru,
    Mru,
}

impl EvictionPolicy {
    /// All supported policies.
    pub const ALL: [EvictionPolicy; 3] = [
        EvictionPolicy::Fifo,
        EvictionPolicy::Lru,
        EvictionPolicy::Mru,
    ];

    /// Where a new key goes.
    pub fn placement(self) -> Placement {
        match self {
            EvictionPolicy::Fifo => Placement::Back,
            EvictionPolicy::Lru | EvictionPolicy::Mru => Placement::Front,
        }
    }

    /// Whether a `get` or `put` hit moves the entry to the front.
    pub fn promotes_on_hit(self) -> bool {
        !matches!(self, EvictionPolicy::Fifo)
    }

    // == Victim Selection ==
    /// Picks the entry to evict from a full sequence.
    ///
    /// Called before the incoming key is linked, so under MRU the victim is
    /// the entry promoted by the most recent earlier call.
    pub fn victim(self, sequence: &Sequence) -> Option<Handle> {
        match self {
            EvictionPolicy::Fifo | EvictionPolicy::Mru => sequence.head(),
            EvictionPolicy::Lru => sequence.tail(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvictionPolicy::Fifo => "fifo",
            EvictionPolicy::Lru => "lru",
            EvictionPolicy::Mru => "mru",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(EvictionPolicy::Fifo),
            "lru" => Ok(EvictionPolicy::Lru),
            "mru" => Ok(EvictionPolicy::Mru),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown eviction policy '{}', expected fifo, lru or mru",
                other
            ))),
        }
    }
}
