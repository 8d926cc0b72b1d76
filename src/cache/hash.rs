//! Key Hashing Module
//!
//! DJB2-family multiplicative hash used to pick an index bucket.

/// Hashes a key with `h = h * 33 + byte`, starting from zero.
///
/// Arithmetic wraps at 32 bits so long keys never overflow.
pub fn djb2(key: &str) -> u32 {
    key.bytes().fold(0u32, |h, b| {
        (h << 5).wrapping_add(h).wrapping_add(u32::from(b))
    })
}

/// Maps a key to a bucket in `0..bucket_count`.
///
/// `bucket_count` must be non-zero.
pub fn bucket_for(key: &str, bucket_count: usize) -> usize {
    debug_assert!(bucket_count > 0, "bucket_count must be non-zero");
    djb2(key) as usize % bucket_count
}
