//! Time-ordered queue of signed transactions waiting for their release time.

use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledTransaction {
    pub tx: Transaction,
    pub time: DateTime<Utc>,
}

/// Heap entry. `sequence` keeps insertion order among equal times.
#[derive(Debug)]
struct Entry {
    time: DateTime<Utc>,
    sequence: u64,
    tx: Transaction,
}

impl Entry {
    fn key(&self) -> (DateTime<Utc>, u64) {
        (self.time, self.sequence)
    }

    fn into_scheduled(self) -> ScheduledTransaction {
        ScheduledTransaction {
            tx: self.tx,
            time: self.time,
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Debug, Default)]
struct Inner {
    heap: BinaryHeap<Reverse<Entry>>,
    next_sequence: u64,
}

/// Thread-safe min-heap of transactions keyed by release time.
#[derive(Debug, Default)]
pub struct Schedule {
    inner: RwLock<Inner>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, tx: Transaction, time: DateTime<Utc>) {
        let mut inner = self.write();
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.heap.push(Reverse(Entry { time, sequence, tx }));
    }

    /// Remove and return the earliest transaction.
    pub fn pop(&self) -> Option<ScheduledTransaction> {
        self.write()
            .heap
            .pop()
            .map(|Reverse(entry)| entry.into_scheduled())
    }

    /// Earliest transaction, left in place.
    pub fn top(&self) -> Option<ScheduledTransaction> {
        self.read().heap.peek().map(|Reverse(entry)| ScheduledTransaction {
            tx: entry.tx.clone(),
            time: entry.time,
        })
    }

    /// Remove every transaction due at or before `now`, earliest first.
    pub fn pop_due(&self, now: DateTime<Utc>) -> Vec<ScheduledTransaction> {
        let mut inner = self.write();
        let mut due = Vec::new();
        while inner
            .heap
            .peek()
            .is_some_and(|Reverse(entry)| entry.time <= now)
        {
            if let Some(Reverse(entry)) = inner.heap.pop() {
                due.push(entry.into_scheduled());
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.read().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().heap.is_empty()
    }
}
