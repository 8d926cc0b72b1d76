//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

use crate::cache::EvictionPolicy;
use crate::error::{CacheError, Result};

// == Defaults ==
const DEFAULT_CAPACITY: usize = 1000;
const DEFAULT_MAX_KEY_LENGTH: usize = 31;
const DEFAULT_MAX_VALUE_LENGTH: usize = 255;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub capacity: usize,
    /// Eviction policy applied on overflow
    pub policy: EvictionPolicy,
    /// Maximum key length in bytes
    pub max_key_len: usize,
    /// Maximum value length in bytes
    pub max_value_len: usize,
    /// Number of index buckets
    pub bucket_count: usize,
}

impl CacheConfig {
    /// Creates a config with the given capacity and policy, other fields defaulted.
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            capacity,
            policy,
            bucket_count: default_bucket_count(capacity),
            ..Self::default()
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum live entries (default: 1000)
    /// - `CACHE_POLICY` - `fifo`, `lru` or `mru` (default: lru)
    /// - `MAX_KEY_LENGTH` - Maximum key bytes (default: 31)
    /// - `MAX_VALUE_LENGTH` - Maximum value bytes (default: 255)
    /// - `BUCKET_COUNT` - Index buckets (default: twice the capacity)
    pub fn from_env() -> Self {
        let capacity = parse_var("CACHE_CAPACITY").unwrap_or(DEFAULT_CAPACITY);
        Self {
            capacity,
            policy: parse_var("CACHE_POLICY").unwrap_or_default(),
            max_key_len: parse_var("MAX_KEY_LENGTH").unwrap_or(DEFAULT_MAX_KEY_LENGTH),
            max_value_len: parse_var("MAX_VALUE_LENGTH").unwrap_or(DEFAULT_MAX_VALUE_LENGTH),
            bucket_count: parse_var("BUCKET_COUNT")
                .unwrap_or_else(|| default_bucket_count(capacity)),
        }
    }

    // == Builder Helpers ==
    pub fn with_key_limit(mut self, max_key_len: usize) -> Self {
        self.max_key_len = max_key_len;
        self
    }

    pub fn with_value_limit(mut self, max_value_len: usize) -> Self {
        self.max_value_len = max_value_len;
        self
    }

    pub fn with_bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    /// Rejects configurations the cache cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.bucket_count == 0 {
            return Err(CacheError::InvalidConfig(
                "bucket count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: EvictionPolicy::default(),
            max_key_len: DEFAULT_MAX_KEY_LENGTH,
            max_value_len: DEFAULT_MAX_VALUE_LENGTH,
            bucket_count: default_bucket_count(DEFAULT_CAPACITY),
        }
    }
}

fn default_bucket_count(capacity: usize) -> usize {
    capacity.saturating_mul(2).max(1)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
