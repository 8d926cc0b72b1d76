//! Cache Store Module
//!
//! Main cache engine combining the chained index with the ordered sequence
//! under a pluggable eviction policy.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::cache::{ChainedIndex, EvictionPolicy, Handle, Placement, Sequence};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Put Outcome ==
/// What a successful `put` did to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// A new key was stored without displacing anything
    Inserted,
    /// An existing key had its value replaced in place
    Updated,
    /// A new key was stored and this victim was evicted to make room
    Evicted { key: String, value: String },
}

// == Cache ==
/// Fixed-capacity key/value cache.
///
/// Every live entry is owned by the sequence arena and registered exactly
/// once in the index. Both views are updated together inside each call.
#[derive(Debug)]
pub struct Cache {
    /// Key to handle mapping
    index: ChainedIndex,
    /// Entry arena and eviction order
    sequence: Sequence,
    /// Ordering and victim rules
    policy: EvictionPolicy,
    /// Maximum number of live entries
    capacity: usize,
    max_key_len: usize,
    max_value_len: usize,
}

impl Cache {
    // == Constructor ==
    /// Creates a new cache from a validated configuration.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index: ChainedIndex::new(config.bucket_count)?,
            sequence: Sequence::with_capacity(config.capacity)?,
            policy: config.policy,
            capacity: config.capacity,
            max_key_len: config.max_key_len,
            max_value_len: config.max_value_len,
        })
    }

    /// Creates a cache with default length limits.
    pub fn with_policy(capacity: usize, policy: EvictionPolicy) -> Result<Self> {
        Self::new(&CacheConfig::new(capacity, policy))
    }

    // == Put ==
    /// Stores a key/value pair.
    ///
    /// An existing key has its value replaced in place (and is promoted under
    /// LRU/MRU). A new key is linked according to the policy; if the cache is
    /// full the policy's victim is evicted first, so the incoming entry is
    /// never its own victim.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<PutOutcome> {
        let key = key.into();
        let value = value.into();
        self.check_lengths(&key, &value)?;

        if let Some(handle) = self.index.lookup(&key, &self.sequence) {
            if let Some(entry) = self.sequence.get_mut(handle) {
                entry.value = value;
            }
            if self.policy.promotes_on_hit() {
                self.sequence.move_to_front(handle);
            }
            debug!(key = %key, "updated entry in place");
            return Ok(PutOutcome::Updated);
        }

        let outcome = if self.sequence.len() >= self.capacity {
            match self.evict()? {
                Some((key, value)) => PutOutcome::Evicted { key, value },
                None => PutOutcome::Inserted,
            }
        } else {
            PutOutcome::Inserted
        };

        let handle = match self.policy.placement() {
            Placement::Front => self.sequence.push_front(key, value)?,
            Placement::Back => self.sequence.push_back(key, value)?,
        };
        let stored = live_key(&self.sequence, handle)?;
        self.index.insert(stored, handle);
        debug!(key = %stored, handle = %handle, size = self.sequence.len(), "inserted entry");

        Ok(outcome)
    }

    // == Get ==
    /// Retrieves a value by key, applying the policy's promotion on a hit.
    ///
    /// A missing key is `None`, not an error.
    pub fn get(&mut self, key: &str) -> Option<&str> {
        let handle = self.index.lookup(key, &self.sequence)?;
        if self.policy.promotes_on_hit() {
            self.sequence.move_to_front(handle);
        }
        self.sequence.get(handle).map(|entry| entry.value.as_str())
    }

    // == Peek ==
    /// Retrieves a value without touching the eviction order.
    pub fn peek(&self, key: &str) -> Option<&str> {
        let handle = self.index.lookup(key, &self.sequence)?;
        self.sequence.get(handle).map(|entry| entry.value.as_str())
    }

    /// Checks if a key is live, without touching the eviction order.
    pub fn contains(&self, key: &str) -> bool {
        self.index.lookup(key, &self.sequence).is_some()
    }

    // == Remove ==
    /// Deletes an entry by key, returning its value if it was live.
    pub fn remove(&mut self, key: &str) -> Result<Option<String>> {
        let Some(handle) = self.index.lookup(key, &self.sequence) else {
            return Ok(None);
        };
        self.index.remove(key, handle)?;
        let entry = self.sequence.unlink(handle).ok_or_else(|| {
            CacheError::InvariantViolation(format!("indexed key '{}' has no live entry", key))
        })?;
        debug!(key = %key, "removed entry");
        Ok(Some(entry.value))
    }

    // == Clear ==
    /// Releases every entry and resets both views to empty.
    pub fn clear(&mut self) {
        let dropped = self.sequence.len();
        self.index.clear();
        self.sequence.clear();
        info!(dropped, "cache cleared");
    }

    // == Accessors ==
    /// Returns the current number of live entries.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Returns the `(max_key_len, max_value_len)` bounds.
    pub fn limits(&self) -> (usize, usize) {
        (self.max_key_len, self.max_value_len)
    }

    /// Length of the longest index chain, for diagnostics.
    pub fn longest_chain(&self) -> usize {
        self.index.longest_chain()
    }

    // == Traversal ==
    /// Iterates live `(key, value)` pairs from head to tail.
    ///
    /// Under LRU/MRU the head is the most recently used entry; under FIFO it
    /// is the oldest arrival.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.sequence
            .iter()
            .map(|(_, entry)| (entry.key.as_str(), entry.value.as_str()))
    }

    /// Copies every live pair out in sequence order.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Visits every live entry in sequence order with a mutable value.
    ///
    /// Keys, membership and ordering cannot change through this call.
    pub fn for_each_value_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut String),
    {
        self.sequence
            .for_each_mut(|_, entry| f(&entry.key, &mut entry.value));
    }

    // == Transform ==
    /// Rewrites every key and value in place and re-indexes the entries.
    ///
    /// Sequence order and membership are preserved. New texts are validated
    /// before anything is touched: on error the cache is left unchanged.
    pub fn transform<F>(&mut self, f: F) -> Result<()>
    where
        F: Fn(&str) -> String,
    {
        let mut plan: Vec<(Handle, String, String)> = Vec::with_capacity(self.sequence.len());
        let mut seen = HashSet::with_capacity(self.sequence.len());
        for (handle, entry) in self.sequence.iter() {
            let key = f(&entry.key);
            let value = f(&entry.value);
            self.check_lengths(&key, &value)?;
            if !seen.insert(key.clone()) {
                warn!(key = %key, "transform maps two entries to one key");
                return Err(CacheError::KeyCollision(key));
            }
            plan.push((handle, key, value));
        }

        for (handle, _, _) in &plan {
            let old_key = live_key(&self.sequence, *handle)?;
            self.index.remove(old_key, *handle)?;
        }
        for (handle, key, value) in plan {
            self.index.insert(&key, handle);
            if let Some(entry) = self.sequence.get_mut(handle) {
                entry.key = key;
                entry.value = value;
            }
        }
        debug!(entries = self.sequence.len(), "transformed and re-indexed entries");
        Ok(())
    }

    // == Verify ==
    /// Checks that the index and the sequence describe the same entry set.
    pub fn verify(&self) -> Result<()> {
        self.sequence.verify_links()?;

        if self.sequence.len() > self.capacity {
            return Err(CacheError::InvariantViolation(format!(
                "size {} exceeds capacity {}",
                self.sequence.len(),
                self.capacity
            )));
        }
        if self.index.len() != self.sequence.len() {
            return Err(CacheError::InvariantViolation(format!(
                "index holds {} handles but sequence holds {} entries",
                self.index.len(),
                self.sequence.len()
            )));
        }

        let mut handles = HashSet::with_capacity(self.index.len());
        for handle in self.index.handles() {
            if self.sequence.get(handle).is_none() || !handles.insert(handle) {
                return Err(CacheError::InvariantViolation(format!(
                    "index handle {} is dead or duplicated",
                    handle
                )));
            }
        }

        let mut keys = HashSet::with_capacity(self.sequence.len());
        for (handle, entry) in self.sequence.iter() {
            if !keys.insert(entry.key.as_str()) {
                return Err(CacheError::InvariantViolation(format!(
                    "duplicate key '{}' in sequence",
                    entry.key
                )));
            }
            if self.index.lookup(&entry.key, &self.sequence) != Some(handle) {
                return Err(CacheError::InvariantViolation(format!(
                    "key '{}' is not reachable through the index",
                    entry.key
                )));
            }
        }
        Ok(())
    }

    // == Internal ==
    /// Removes the policy's victim from both views.
    fn evict(&mut self) -> Result<Option<(String, String)>> {
        let Some(victim) = self.policy.victim(&self.sequence) else {
            return Ok(None);
        };
        let entry = self.sequence.unlink(victim).ok_or_else(|| {
            CacheError::InvariantViolation(format!("victim {} is not a live entry", victim))
        })?;
        self.index.remove(&entry.key, victim)?;
        debug!(key = %entry.key, policy = %self.policy, "evicted entry");
        Ok(Some((entry.key, entry.value)))
    }

    fn check_lengths(&self, key: &str, value: &str) -> Result<()> {
        if key.len() > self.max_key_len {
            warn!(len = key.len(), max = self.max_key_len, "rejected key");
            return Err(CacheError::KeyTooLong {
                len: key.len(),
                max: self.max_key_len,
            });
        }
        if value.len() > self.max_value_len {
            warn!(len = value.len(), max = self.max_value_len, "rejected value");
            return Err(CacheError::ValueTooLong {
                len: value.len(),
                max: self.max_value_len,
            });
        }
        Ok(())
    }
}

fn live_key(sequence: &Sequence, handle: Handle) -> Result<&str> {
    sequence
        .get(handle)
        .map(|entry| entry.key.as_str())
        .ok_or_else(|| {
            CacheError::InvariantViolation(format!("handle {} is not a live entry", handle))
        })
}
