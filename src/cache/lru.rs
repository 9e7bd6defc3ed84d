//! LRU Index Module
//!
//! Recency-ordered storage for cache entries: an arena of slots linked into
//! a doubly linked list by index, paired with a key lookup map.

use std::collections::HashMap;

use crate::cache::CacheEntry;

/// One arena cell. `entry` is `None` while the slot sits on the free list.
#[derive(Debug)]
struct Slot {
    entry: Option<CacheEntry>,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Index ==
/// Owns every live entry, ordered by recency.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Insert, touch, remove and pop are O(1) (amortized for the map). Freed
/// slots are recycled so the arena never grows past the peak entry count.
#[derive(Debug, Default)]
pub struct LruIndex {
    slots: Vec<Slot>,
    map: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Vec<usize>,
}

impl LruIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Inserts an entry as most recently used.
    ///
    /// If the key is already present its entry is replaced in place, moved to
    /// the head, and the previous entry is returned.
    pub fn insert(&mut self, entry: CacheEntry) -> Option<CacheEntry> {
        if let Some(&idx) = self.map.get(&entry.key) {
            let previous = self.slots[idx].entry.replace(entry);
            self.move_to_front(idx);
            return previous;
        }

        let key = entry.key.clone();
        let idx = self.allocate(entry);
        self.link_front(idx);
        self.map.insert(key, idx);
        None
    }

    // == Touch ==
    /// Marks a key as recently used (moves to head). Returns false if absent.
    pub fn touch(&mut self, key: &str) -> bool {
        match self.map.get(key) {
            Some(&idx) => {
                self.move_to_front(idx);
                true
            }
            None => false,
        }
    }

    // == Lookup ==
    /// Returns the entry for a key without changing recency.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.map
            .get(key)
            .and_then(|&idx| self.slots[idx].entry.as_ref())
    }

    // == Remove ==
    /// Removes a key from both the map and the recency list.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let idx = self.map.remove(key)?;
        self.unlink(idx);
        self.release(idx)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used entry.
    pub fn pop_oldest(&mut self) -> Option<CacheEntry> {
        let idx = self.tail?;
        self.unlink(idx);
        let entry = self.release(idx)?;
        self.map.remove(&entry.key);
        Some(entry)
    }

    // == Remove Where ==
    /// Removes every entry matching `predicate`, leaving the relative order
    /// of the survivors untouched. Returns the removed entries.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Vec<CacheEntry>
    where
        F: FnMut(&CacheEntry) -> bool,
    {
        let doomed: Vec<String> = self
            .iter()
            .filter(|entry| predicate(entry))
            .map(|entry| entry.key.clone())
            .collect();

        doomed.iter().filter_map(|key| self.remove(key)).collect()
    }

    // == Iteration ==
    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            cursor: self.head,
            newest_first: true,
        }
    }

    /// Iterates entries from least to most recently used.
    pub fn iter_oldest_first(&self) -> Iter<'_> {
        Iter {
            index: self,
            cursor: self.tail,
            newest_first: false,
        }
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    // == Internal list plumbing ==
    fn allocate(&mut self, entry: CacheEntry) -> usize {
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx];
            slot.entry = Some(entry);
            slot.prev = None;
            slot.next = None;
            return idx;
        }
        self.slots.push(Slot {
            entry: Some(entry),
            prev: None,
            next: None,
        });
        self.slots.len() - 1
    }

    fn release(&mut self, idx: usize) -> Option<CacheEntry> {
        let entry = self.slots[idx].entry.take();
        self.free.push(idx);
        entry
    }

    fn link_front(&mut self, idx: usize) {
        self.slots[idx].prev = None;
        self.slots[idx].next = self.head;
        match self.head {
            Some(old_head) => self.slots[old_head].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.slots[idx].prev.take();
        let next = self.slots[idx].next.take();

        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.unlink(idx);
            self.link_front(idx);
        }
    }

    /// Walks the list both ways and cross-checks it against the map.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let slot = &self.slots[idx];
            let entry = slot
                .entry
                .as_ref()
                .ok_or_else(|| format!("linked slot {idx} is empty"))?;
            if slot.prev != prev {
                return Err(format!("slot {idx} has a stale prev link"));
            }
            if self.map.get(&entry.key) != Some(&idx) {
                return Err(format!("key '{}' does not map to slot {idx}", entry.key));
            }
            if !seen.insert(entry.key.clone()) {
                return Err(format!("key '{}' linked twice", entry.key));
            }
            prev = Some(idx);
            cursor = slot.next;
        }
        if self.tail != prev {
            return Err("tail does not match the last linked slot".to_string());
        }
        if seen.len() != self.map.len() {
            return Err(format!(
                "list holds {} keys but map holds {}",
                seen.len(),
                self.map.len()
            ));
        }
        if self.slots.len() != self.map.len() + self.free.len() {
            return Err("arena slots leaked".to_string());
        }
        Ok(())
    }
}

// == Iterator ==
/// Borrowing iterator over an [`LruIndex`] in recency order.
pub struct Iter<'a> {
    index: &'a LruIndex,
    cursor: Option<usize>,
    newest_first: bool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a CacheEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let slot = &self.index.slots[idx];
        self.cursor = if self.newest_first { slot.next } else { slot.prev };
        slot.entry.as_ref()
    }
}
