//! Cache Module
//!
//! Provides a fixed-capacity key/value cache with FIFO, LRU and MRU eviction.

mod entry;
pub mod hash;
mod index;
mod policy;
mod sequence;
mod store;


// Re-export public types
pub use entry::{Entry, Handle};
pub use index::ChainedIndex;
pub use policy::{EvictionPolicy, Placement};
pub use sequence::Sequence;
pub use store::{Cache, PutOutcome};
