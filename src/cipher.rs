//! Substitution Cipher Module
//!
//! Rotating substitution applied to a cache's live keys and values. The
//! cipher lives outside the cache core and only drives `Cache::transform`.

use tracing::info;

use crate::cache::Cache;
use crate::error::Result;

// == Substitution Cipher ==
/// Rotates ASCII letters within their case and digits within `0-9`.
///
/// Every other character passes through untouched, so encrypted text has the
/// same byte length as the input and never violates the cache's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionCipher {
    shift: u8,
}

impl SubstitutionCipher {
    /// Creates a cipher rotating by `shift` positions.
    pub fn new(shift: u8) -> Self {
        Self { shift }
    }

    /// Number of positions each letter or digit is rotated by.
    pub fn shift(&self) -> u8 {
        self.shift
    }

    pub fn encrypt(&self, text: &str) -> String {
        text.chars().map(|c| rotate(c, self.shift, true)).collect()
    }

    pub fn decrypt(&self, text: &str) -> String {
        text.chars().map(|c| rotate(c, self.shift, false)).collect()
    }

    // == Cache Integration ==
    /// Encrypts every live key and value, keeping order and membership.
    pub fn encrypt_cache(&self, cache: &mut Cache) -> Result<()> {
        cache.transform(|text| self.encrypt(text))?;
        info!(entries = cache.len(), shift = self.shift, "encrypted cache contents");
        Ok(())
    }

    /// Reverses [`encrypt_cache`](Self::encrypt_cache).
    pub fn decrypt_cache(&self, cache: &mut Cache) -> Result<()> {
        cache.transform(|text| self.decrypt(text))?;
        info!(entries = cache.len(), shift = self.shift, "decrypted cache contents");
        Ok(())
    }
}

impl Default for SubstitutionCipher {
    fn default() -> Self {
        Self::new(3)
    }
}

fn rotate(c: char, shift: u8, forward: bool) -> char {
    let (base, span) = match c {
        'a'..='z' => (b'a', 26),
        'A'..='Z' => (b'A', 26),
        '0'..='9' => (b'0', 10),
        _ => return c,
    };
    let offset = c as u8 - base;
    let shift = shift % span;
    let rotated = if forward {
        (offset + shift) % span
    } else {
        (offset + span - shift) % span
    };
    char::from(base + rotated)
}
