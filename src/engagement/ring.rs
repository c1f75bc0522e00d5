//! Fixed-capacity circular buffer
//!
//! Once full, each push overwrites the oldest slot and advances the head, so
//! eviction is O(1) and iteration is always oldest first.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Bounded FIFO backed by a circular buffer
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: Vec<T>,
    /// Slot holding the oldest item once the buffer is full
    head: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer. A capacity of zero retains nothing.
    ///
    /// Storage grows with use, so the capacity is only an upper bound.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            head: 0,
            capacity,
        }
    }

    /// Append an item, returning the evicted oldest item when full
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        if self.items.len() < self.capacity {
            self.items.push(item);
            return None;
        }
        let evicted = std::mem::replace(&mut self.items[self.head], item);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Item at logical position `index` (0 = oldest)
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.items.len() {
            return None;
        }
        Some(&self.items[(self.head + index) % self.items.len()])
    }

    /// Most recently pushed item
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (newer, older) = self.items.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.head = 0;
    }
}

#[derive(Serialize)]
struct RingSnapshotRef<'a, T> {
    capacity: usize,
    items: Vec<&'a T>,
}

#[derive(Deserialize)]
struct RingSnapshot<T> {
    capacity: usize,
    items: Vec<T>,
}

impl<T: Serialize> Serialize for RingBuffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RingSnapshotRef {
            capacity: self.capacity,
            items: self.iter().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RingBuffer<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = RingSnapshot::<T>::deserialize(deserializer)?;
        if snapshot.capacity == 0 {
            return Err(de::Error::custom("ring capacity must be greater than 0"));
        }
        let mut ring = RingBuffer::new(snapshot.capacity);
        for item in snapshot.items {
            ring.push(item);
        }
        Ok(ring)
    }
}
