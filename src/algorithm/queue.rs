//! Min-priority queue with lazy re-prioritization
//!
//! Re-pushing an item whose identity is already queued does not search the
//! heap. The old entry is left in place as a tombstone and skipped when it
//! reaches the root; only the entry carrying the latest sequence number for an
//! identity is live. Equal priorities pop in push order.

use crate::io::configuration::QUEUE_COMPACTION_FLOOR;
use crate::io::error::{AlgorithmError, Result};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// An item that can be ordered by the priority queue
pub trait Prioritized {
    /// Identity used to detect re-pushes of the same item
    type Key: Eq + Hash + Clone;

    /// Identity of this item
    fn key(&self) -> Self::Key;

    /// Priority, lower values pop first
    fn priority(&self) -> f64;
}

/// Queue entry for a grid cell, prioritized by its entropy at push time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellEntry {
    /// Flat index of the cell in the grid
    pub index: usize,
    /// Entropy of the cell when it was pushed
    pub entropy: f64,
}

impl CellEntry {
    /// Create an entry for the cell at `index`
    pub const fn new(index: usize, entropy: f64) -> Self {
        Self { index, entropy }
    }
}

impl Prioritized for CellEntry {
    type Key = usize;

    fn key(&self) -> usize {
        self.index
    }

    fn priority(&self) -> f64 {
        self.entropy
    }
}

#[derive(Debug)]
struct HeapEntry<T> {
    priority: f64,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for HeapEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for HeapEntry<T> {}

impl<T> PartialOrd for HeapEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap yields the lowest (priority, sequence) first
impl<T> Ord for HeapEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-priority queue supporting priority updates by re-pushing
#[derive(Debug)]
pub struct UpdatablePriorityQueue<T: Prioritized> {
    heap: BinaryHeap<HeapEntry<T>>,
    /// Latest sequence number pushed for each live identity
    live: HashMap<T::Key, u64>,
    next_sequence: u64,
}

impl<T: Prioritized> Default for UpdatablePriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Prioritized> UpdatablePriorityQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Insert an item, replacing the queued priority of an item with the same key
    pub fn push(&mut self, item: T) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let _ = self.live.insert(item.key(), sequence);
        self.heap.push(HeapEntry {
            priority: item.priority(),
            sequence,
            item,
        });

        let tombstones = self.tombstones();
        if tombstones > QUEUE_COMPACTION_FLOOR && tombstones > self.live.len() {
            self.compact();
        }
    }

    /// Remove and return the live item with the lowest priority
    ///
    /// # Errors
    ///
    /// Returns `EmptyQueue` if no live item remains
    pub fn pop(&mut self) -> Result<T> {
        while let Some(entry) = self.heap.pop() {
            if self.is_live(&entry) {
                let _ = self.live.remove(&entry.item.key());
                return Ok(entry.item);
            }
        }
        Err(AlgorithmError::EmptyQueue)
    }

    /// Return the live item with the lowest priority without removing it
    ///
    /// Tombstones sitting at the root are discarded on the way.
    ///
    /// # Errors
    ///
    /// Returns `EmptyQueue` if no live item remains
    pub fn peek(&mut self) -> Result<&T> {
        self.discard_dead_root();
        self.heap
            .peek()
            .map(|entry| &entry.item)
            .ok_or(AlgorithmError::EmptyQueue)
    }

    /// Remove every entry and restart sequence numbering
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
        self.next_sequence = 0;
    }

    /// Number of live items
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no live item remains
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Whether an item with this key is queued
    pub fn contains(&self, key: &T::Key) -> bool {
        self.live.contains_key(key)
    }

    /// Number of superseded entries still held by the heap
    pub fn tombstones(&self) -> usize {
        self.heap.len().saturating_sub(self.live.len())
    }

    /// Physically drop every superseded entry
    pub fn compact(&mut self) {
        let live = &self.live;
        self.heap
            .retain(|entry| live.get(&entry.item.key()) == Some(&entry.sequence));
    }

    fn is_live(&self, entry: &HeapEntry<T>) -> bool {
        self.live.get(&entry.item.key()) == Some(&entry.sequence)
    }

    fn discard_dead_root(&mut self) {
        while let Some(root) = self.heap.peek() {
            if self.is_live(root) {
                break;
            }
            let _ = self.heap.pop();
        }
    }
}

impl<T: Prioritized> Extend<T> for UpdatablePriorityQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.push(item);
        }
    }
}

impl<T: Prioritized> FromIterator<T> for UpdatablePriorityQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(items: I) -> Self {
        let mut queue = Self::new();
        queue.extend(items);
        queue
    }
}
