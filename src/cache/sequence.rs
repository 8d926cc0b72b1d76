//! Ordered Sequence Module
//!
//! Arena of entries threaded by a doubly linked list.

use crate::cache::{Entry, Handle};
use crate::error::{CacheError, Result};

// == Sequence ==
/// Owns every live entry and keeps them in a total order.
///
/// Entries live in `slots` and are addressed by [`Handle`]. Freed slots are
/// recycled through `free`, so the arena never grows beyond the peak number
/// of simultaneously live entries.
///
/// - Head = front of the sequence
/// - Tail = rear of the sequence
#[derive(Debug, Default)]
pub struct Sequence {
    slots: Vec<Option<Entry>>,
    free: Vec<Handle>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl Sequence {
    // == Constructor ==
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sequence with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).map_err(|e| {
            CacheError::AllocationFailure(format!("reserving {} entry slots: {}", capacity, e))
        })?;
        Ok(Self {
            slots,
            ..Self::default()
        })
    }

    // == Accessors ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<Handle> {
        self.head
    }

    pub fn tail(&self) -> Option<Handle> {
        self.tail
    }

    /// Returns the live entry behind a handle.
    pub fn get(&self, handle: Handle) -> Option<&Entry> {
        self.slots.get(handle.slot()).and_then(Option::as_ref)
    }

    /// Returns the live entry behind a handle, mutably.
    ///
    /// Links are crate-private, so callers can only change key or value text.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entry> {
        self.slots.get_mut(handle.slot()).and_then(Option::as_mut)
    }

    // == Push Front ==
    /// Stores a new entry at the head of the sequence.
    pub fn push_front(&mut self, key: String, value: String) -> Result<Handle> {
        let handle = self.alloc(Entry::new(key, value))?;
        self.link_front(handle);
        Ok(handle)
    }

    // == Push Back ==
    /// Stores a new entry at the tail of the sequence.
    pub fn push_back(&mut self, key: String, value: String) -> Result<Handle> {
        let handle = self.alloc(Entry::new(key, value))?;
        self.link_back(handle);
        Ok(handle)
    }

    // == Move To Front ==
    /// Relinks a live entry at the head. No-op if it is already there.
    pub fn move_to_front(&mut self, handle: Handle) {
        if self.head == Some(handle) || self.get(handle).is_none() {
            return;
        }
        self.detach(handle);
        self.link_front(handle);
    }

    // == Unlink ==
    /// Removes an entry from the sequence and releases its slot.
    ///
    /// Returns None if the handle does not name a live entry.
    pub fn unlink(&mut self, handle: Handle) -> Option<Entry> {
        self.get(handle)?;
        self.detach(handle);
        let mut entry = self.slots.get_mut(handle.slot())?.take()?;
        entry.prev = None;
        entry.next = None;
        self.free.push(handle);
        Some(entry)
    }

    // == Clear ==
    /// Drops every entry and resets the sequence to empty.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iteration ==
    /// Walks live entries from head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            sequence: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Visits every live entry from head to tail with mutable access.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(Handle, &mut Entry),
    {
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            match self.get_mut(handle) {
                Some(entry) => {
                    cursor = entry.next;
                    f(handle, entry);
                }
                None => break,
            }
        }
    }

    /// Checks that links, head/tail and the length counter agree.
    pub fn verify_links(&self) -> Result<()> {
        if self.head.is_none() != self.tail.is_none() || self.head.is_none() != (self.len == 0) {
            return Err(CacheError::InvariantViolation(format!(
                "head/tail presence disagrees with length {}",
                self.len
            )));
        }

        let mut walked = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            let entry = self.get(handle).ok_or_else(|| {
                CacheError::InvariantViolation(format!("link to dead slot {}", handle))
            })?;
            if entry.prev != prev {
                return Err(CacheError::InvariantViolation(format!(
                    "back link of {} does not match its predecessor",
                    handle
                )));
            }
            walked += 1;
            if walked > self.len {
                return Err(CacheError::InvariantViolation(
                    "sequence is longer than its length counter".to_string(),
                ));
            }
            prev = Some(handle);
            cursor = entry.next;
        }

        if walked != self.len || prev != self.tail {
            return Err(CacheError::InvariantViolation(format!(
                "walked {} entries but length is {}",
                walked, self.len
            )));
        }

        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        if occupied != self.len {
            return Err(CacheError::InvariantViolation(format!(
                "{} occupied slots but {} linked entries",
                occupied, self.len
            )));
        }
        Ok(())
    }

    // == Internal: Slot Management ==
    fn alloc(&mut self, entry: Entry) -> Result<Handle> {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.slot()] = Some(entry);
            return Ok(handle);
        }
        self.slots.try_reserve(1).map_err(|e| {
            CacheError::AllocationFailure(format!("growing entry arena: {}", e))
        })?;
        let handle = Handle::new(self.slots.len());
        self.slots.push(Some(entry));
        Ok(handle)
    }

    // == Internal: Linking ==
    fn link_front(&mut self, handle: Handle) {
        let old_head = self.head;
        if let Some(entry) = self.get_mut(handle) {
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head.and_then(|h| self.get_mut(h)) {
            Some(head) => head.prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        self.len += 1;
    }

    fn link_back(&mut self, handle: Handle) {
        let old_tail = self.tail;
        if let Some(entry) = self.get_mut(handle) {
            entry.prev = old_tail;
            entry.next = None;
        }
        match old_tail.and_then(|h| self.get_mut(h)) {
            Some(tail) => tail.next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.len += 1;
    }

    /// Splices an entry out of the list, leaving it in its slot.
    fn detach(&mut self, handle: Handle) {
        let (prev, next) = match self.get(handle) {
            Some(entry) => (entry.prev, entry.next),
            None => return,
        };

        match prev.and_then(|h| self.get_mut(h)) {
            Some(entry) => entry.next = next,
            None => self.head = next,
        }
        match next.and_then(|h| self.get_mut(h)) {
            Some(entry) => entry.prev = prev,
            None => self.tail = prev,
        }
        if let Some(entry) = self.get_mut(handle) {
            entry.prev = None;
            entry.next = None;
        }
        self.len -= 1;
    }
}

// == Iterator ==
/// Head-to-tail iterator over live entries.
pub struct Iter<'a> {
    sequence: &'a Sequence,
    cursor: Option<Handle>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (Handle, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let entry = self.sequence.get(handle)?;
        self.cursor = entry.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((handle, entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(seq: &Sequence) -> Vec<String> {
        seq.iter().map(|(_, e)| e.key.clone()).collect()
    }

    fn push_front(seq: &mut Sequence, key: &str) -> Handle {
        seq.push_front(key.to_string(), format!("v_{}", key)).unwrap()
    }

    fn push_back(seq: &mut Sequence, key: &str) -> Handle {
        seq.push_back(key.to_string(), format!("v_{}", key)).unwrap()
    }

    #[test]
    fn test_sequence_new() {
        let seq = Sequence::new();
        assert!(seq.is_empty());
        assert_eq!(seq.head(), None);
        assert_eq!(seq.tail(), None);
        seq.verify_links().unwrap();
    }

    #[test]
    fn test_push_front_order() {
        let mut seq = Sequence::new();
        push_front(&mut seq, "a");
        push_front(&mut seq, "b");
        push_front(&mut seq, "c");

        assert_eq!(keys(&seq), vec!["c", "b", "a"]);
        assert_eq!(seq.len(), 3);
        seq.verify_links().unwrap();
    }

    #[test]
    fn test_push_back_order() {
        let mut seq = Sequence::new();
        push_back(&mut seq, "a");
        push_back(&mut seq, "b");
        push_back(&mut seq, "c");

        assert_eq!(keys(&seq), vec!["a", "b", "c"]);
        seq.verify_links().unwrap();
    }

    #[test]
    fn test_move_to_front() {
        let mut seq = Sequence::new();
        let a = push_back(&mut seq, "a");
        push_back(&mut seq, "b");
        let c = push_back(&mut seq, "c");

        seq.move_to_front(c);
        assert_eq!(keys(&seq), vec!["c", "a", "b"]);
        assert_eq!(seq.head(), Some(c));

        // already at head
        seq.move_to_front(c);
        assert_eq!(keys(&seq), vec!["c", "a", "b"]);

        seq.move_to_front(a);
        assert_eq!(keys(&seq), vec!["a", "c", "b"]);
        seq.verify_links().unwrap();
    }

    #[test]
    fn test_unlink_middle_head_tail() {
        let mut seq = Sequence::new();
        let a = push_back(&mut seq, "a");
        let b = push_back(&mut seq, "b");
        let c = push_back(&mut seq, "c");

        let removed = seq.unlink(b).unwrap();
        assert_eq!(removed.key, "b");
        assert!(removed.is_detached());
        assert_eq!(keys(&seq), vec!["a", "c"]);

        seq.unlink(a).unwrap();
        assert_eq!(seq.head(), Some(c));
        seq.unlink(c).unwrap();
        assert!(seq.is_empty());
        assert_eq!(seq.head(), None);
        assert_eq!(seq.tail(), None);
        seq.verify_links().unwrap();
    }

    #[test]
    fn test_unlink_dead_handle() {
        let mut seq = Sequence::new();
        let a = push_back(&mut seq, "a");
        seq.unlink(a).unwrap();

        assert!(seq.unlink(a).is_none());
        assert!(seq.unlink(Handle::new(99)).is_none());
        assert!(seq.is_empty());
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut seq = Sequence::new();
        let a = push_back(&mut seq, "a");
        push_back(&mut seq, "b");
        seq.unlink(a).unwrap();

        let c = push_back(&mut seq, "c");
        assert_eq!(c.slot(), a.slot());
        assert_eq!(seq.get(c).unwrap().key, "c");
        seq.verify_links().unwrap();
    }

    #[test]
    fn test_for_each_mut_in_order() {
        let mut seq = Sequence::new();
        push_back(&mut seq, "a");
        push_back(&mut seq, "b");

        let mut visited = Vec::new();
        seq.for_each_mut(|_, entry| {
            visited.push(entry.key.clone());
            entry.value.push('!');
        });

        assert_eq!(visited, vec!["a", "b"]);
        let values: Vec<_> = seq.iter().map(|(_, e)| e.value.clone()).collect();
        assert_eq!(values, vec!["v_a!", "v_b!"]);
    }

    #[test]
    fn test_clear() {
        let mut seq = Sequence::with_capacity(4).unwrap();
        push_front(&mut seq, "a");
        push_front(&mut seq, "b");
        seq.clear();

        assert!(seq.is_empty());
        assert_eq!(seq.iter().count(), 0);
        seq.verify_links().unwrap();
    }

    // == Link Verification Failures ==
    fn assert_violation(seq: &Sequence) {
        assert!(matches!(
            seq.verify_links(),
            Err(CacheError::InvariantViolation(_))
        ));
    }

    fn three() -> (Sequence, [Handle; 3]) {
        let mut seq = Sequence::new();
        let handles = [
            push_back(&mut seq, "a"),
            push_back(&mut seq, "b"),
            push_back(&mut seq, "c"),
        ];
        seq.verify_links().unwrap();
        (seq, handles)
    }

    #[test]
    fn test_verify_detects_length_too_large() {
        let (mut seq, _) = three();
        seq.len += 1;
        assert_violation(&seq);
    }

    #[test]
    fn test_verify_detects_length_too_small() {
        let (mut seq, _) = three();
        seq.len -= 1;
        assert_violation(&seq);
    }

    #[test]
    fn test_verify_detects_broken_back_link() {
        let (mut seq, [_, b, _]) = three();
        seq.slots[b.slot()].as_mut().unwrap().prev = None;
        assert_violation(&seq);
    }

    #[test]
    fn test_verify_detects_missing_tail() {
        let (mut seq, _) = three();
        seq.tail = None;
        assert_violation(&seq);
    }

    #[test]
    fn test_verify_detects_link_to_dead_slot() {
        let (mut seq, [_, _, c]) = three();
        seq.slots[c.slot()].as_mut().unwrap().next = Some(Handle::new(99));
        assert_violation(&seq);
    }

    #[test]
    fn test_verify_detects_orphan_slot() {
        let (mut seq, _) = three();
        seq.slots.push(Some(Entry::new("x".to_string(), "y".to_string())));
        assert_violation(&seq);
    }
}
