//! Hash Index Module
//!
//! Maps keys to entry handles through DJB2-hashed buckets with chaining.

use tracing::error;

use crate::cache::hash::bucket_for;
use crate::cache::{Handle, Sequence};
use crate::error::{CacheError, Result};

// == Chained Index ==
/// Separate-chaining hash table from key to [`Handle`].
///
/// Chains hold handles only; key text is read back from the [`Sequence`]
/// that owns the entries, so the index never duplicates stored keys.
#[derive(Debug)]
pub struct ChainedIndex {
    buckets: Vec<Vec<Handle>>,
    len: usize,
}

impl ChainedIndex {
    // == Constructor ==
    /// Creates an index with a fixed number of buckets.
    pub fn new(bucket_count: usize) -> Result<Self> {
        if bucket_count == 0 {
            return Err(CacheError::InvalidConfig(
                "bucket count must be at least 1".to_string(),
            ));
        }
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(bucket_count).map_err(|e| {
            CacheError::AllocationFailure(format!("reserving {} buckets: {}", bucket_count, e))
        })?;
        buckets.resize_with(bucket_count, Vec::new);
        Ok(Self { buckets, len: 0 })
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of handles registered across all chains.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Lookup ==
    /// Finds the handle stored under `key`. Never allocates.
    pub fn lookup(&self, key: &str, sequence: &Sequence) -> Option<Handle> {
        self.buckets[self.bucket(key)]
            .iter()
            .copied()
            .find(|&handle| sequence.get(handle).is_some_and(|entry| entry.key == key))
    }

    // == Insert ==
    /// Appends `handle` to the chain for `key`.
    ///
    /// The caller must have checked that `key` is not already present.
    pub fn insert(&mut self, key: &str, handle: Handle) {
        let bucket = self.bucket(key);
        self.buckets[bucket].push(handle);
        self.len += 1;
    }

    // == Remove ==
    /// Splices `handle` out of the chain for `key`.
    ///
    /// A handle missing from its bucket means the index and sequence have
    /// diverged; that is reported rather than ignored.
    pub fn remove(&mut self, key: &str, handle: Handle) -> Result<()> {
        let bucket = self.bucket(key);
        let chain = &mut self.buckets[bucket];
        match chain.iter().position(|&h| h == handle) {
            Some(pos) => {
                chain.remove(pos);
                self.len -= 1;
                Ok(())
            }
            None => {
                error!(key = %key, handle = %handle, bucket, "handle missing from index bucket");
                Err(CacheError::InvariantViolation(format!(
                    "handle {} for key '{}' not found in bucket {}",
                    handle, key, bucket
                )))
            }
        }
    }

    // == Clear ==
    /// Empties every chain, keeping the bucket count.
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.len = 0;
    }

    /// Iterates over every registered handle, bucket by bucket.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.buckets.iter().flatten().copied()
    }

    /// Length of the longest chain.
    pub fn longest_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn bucket(&self, key: &str) -> usize {
        bucket_for(key, self.buckets.len())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn store(seq: &mut Sequence, index: &mut ChainedIndex, key: &str) -> Handle {
        let handle = seq.push_back(key.to_string(), format!("v_{}", key)).unwrap();
        index.insert(key, handle);
        handle
    }

    #[test]
    fn test_index_rejects_zero_buckets() {
        assert!(matches!(
            ChainedIndex::new(0),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_index_insert_and_lookup() {
        let mut seq = Sequence::new();
        let mut index = ChainedIndex::new(16).unwrap();

        let a = store(&mut seq, &mut index, "a");
        let b = store(&mut seq, &mut index, "b");

        assert_eq!(index.lookup("a", &seq), Some(a));
        assert_eq!(index.lookup("b", &seq), Some(b));
        assert_eq!(index.lookup("c", &seq), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_index_collisions_are_chained() {
        // a single bucket forces every key into one chain
        let mut seq = Sequence::new();
        let mut index = ChainedIndex::new(1).unwrap();

        let handles: Vec<_> = (0..20)
            .map(|i| store(&mut seq, &mut index, &format!("k{}", i)))
            .collect();

        assert_eq!(index.longest_chain(), 20);
        for (i, handle) in handles.iter().enumerate() {
            assert_eq!(index.lookup(&format!("k{}", i), &seq), Some(*handle));
        }
    }

    #[test]
    fn test_index_remove_from_chain() {
        let mut seq = Sequence::new();
        let mut index = ChainedIndex::new(1).unwrap();

        let a = store(&mut seq, &mut index, "a");
        let b = store(&mut seq, &mut index, "b");
        let c = store(&mut seq, &mut index, "c");

        index.remove("b", b).unwrap();
        seq.unlink(b).unwrap();

        assert_eq!(index.lookup("a", &seq), Some(a));
        assert_eq!(index.lookup("b", &seq), None);
        assert_eq!(index.lookup("c", &seq), Some(c));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_index_remove_missing_is_invariant_violation() {
        let mut seq = Sequence::new();
        let mut index = ChainedIndex::new(8).unwrap();
        let a = store(&mut seq, &mut index, "a");

        index.remove("a", a).unwrap();
        let result = index.remove("a", a);
        assert!(matches!(result, Err(CacheError::InvariantViolation(_))));
        assert!(index.is_empty());
    }

    #[test]
    fn test_index_clear_keeps_buckets() {
        let mut seq = Sequence::new();
        let mut index = ChainedIndex::new(8).unwrap();
        store(&mut seq, &mut index, "a");
        store(&mut seq, &mut index, "b");

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.bucket_count(), 8);
        assert_eq!(index.handles().count(), 0);
    }
}
