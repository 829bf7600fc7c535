//! Indexed Min-Heap Module
//!
//! Binary min-heap of `(priority, key)` records with a key → position index,
//! so an arbitrary key can be removed in O(log n) instead of only the minimum.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

// == Indexed Min Heap ==
/// Min-heap ordered by priority, holding at most one record per key.
///
/// Invariant: for every key in the heap, `entries[index[key]].1 == key`.
/// Every swap performed while sifting updates the index of both elements.
#[derive(Debug)]
pub struct IndexedMinHeap<P, K> {
    /// Heap array, `entries[0]` is the minimum
    entries: Vec<(P, K)>,
    /// Position of each key in `entries`
    index: HashMap<K, usize>,
}

impl<P, K> IndexedMinHeap<P, K>
where
    P: Ord,
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    // == Push ==
    /// Inserts a record in O(log n).
    ///
    /// A key that is already present has its old record replaced.
    pub fn push(&mut self, priority: P, key: K) {
        if self.index.contains_key(&key) {
            self.remove(&key);
        }

        let pos = self.entries.len();
        self.index.insert(key.clone(), pos);
        self.entries.push((priority, key));
        self.sift_up(pos);
    }

    // == Pop ==
    /// Removes and returns the minimum record, or `None` when empty.
    pub fn pop(&mut self) -> Option<(P, K)> {
        self.remove_at(0)
    }

    // == Peek ==
    /// Returns the minimum record without removing it.
    pub fn peek(&self) -> Option<(&P, &K)> {
        self.entries.first().map(|(priority, key)| (priority, key))
    }

    // == Remove ==
    /// Removes the record for `key`, wherever it sits in the heap.
    ///
    /// The target is swapped with the last element and truncated; the moved
    /// element is then sifted up or down. Removing the last element is O(1).
    ///
    /// Returns the removed priority, or `None` if the key was absent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<P>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = *self.index.get(key)?;
        self.remove_at(pos).map(|(priority, _)| priority)
    }

    // == Contains ==
    /// Checks whether a record exists for `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Length ==
    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the heap holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Takes out the record at `pos` by swapping it with the last slot, then
    /// restores the heap property around the element moved into `pos`.
    fn remove_at(&mut self, pos: usize) -> Option<(P, K)> {
        let last = self.entries.len().checked_sub(1)?;
        if pos > last {
            return None;
        }
        self.swap(pos, last);

        let (priority, key) = self.entries.pop()?;
        self.index.remove(&key);

        if pos < self.entries.len() && !self.sift_up(pos) {
            self.sift_down(pos);
        }
        Some((priority, key))
    }

    // == Sifting ==
    /// Moves the element at `pos` towards the root. Returns whether it moved.
    fn sift_up(&mut self, mut pos: usize) -> bool {
        let start = pos;
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.entries[pos].0 >= self.entries[parent].0 {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
        pos != start
    }

    /// Moves the element at `pos` towards the leaves.
    fn sift_down(&mut self, mut pos: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let smallest = if right < len && self.entries[right].0 < self.entries[left].0 {
                right
            } else {
                left
            };

            if self.entries[smallest].0 >= self.entries[pos].0 {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }

    /// Swaps two slots and keeps the index in step.
    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.entries.swap(i, j);
        if let Some(slot) = self.index.get_mut(&self.entries[i].1) {
            *slot = i;
        }
        if let Some(slot) = self.index.get_mut(&self.entries[j].1) {
            *slot = j;
        }
    }

    // == Consistency Check ==
    /// Verifies the heap property and that the index matches array positions.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        if self.index.len() != self.entries.len() {
            return false;
        }

        let ordered = (1..self.entries.len())
            .all(|child| self.entries[(child - 1) / 2].0 <= self.entries[child].0);

        let indexed = self
            .entries
            .iter()
            .enumerate()
            .all(|(pos, (_, key))| self.index.get(key) == Some(&pos));

        ordered && indexed
    }
}

impl<P, K> Default for IndexedMinHeap<P, K>
where
    P: Ord,
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
