//! Evict Cache - an in-process key/value cache engine
//!
//! Provides a fixed-capacity cache with O(1) average lookup, insert and
//! eviction under FIFO, LRU or MRU policy.

pub mod cache;
pub mod cipher;
pub mod config;
pub mod error;
pub mod feeder;
pub mod metrics;

pub use cache::{Cache, EvictionPolicy, PutOutcome};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
