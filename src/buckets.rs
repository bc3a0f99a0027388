//! Bucket array: chain heads indexed by `hash_key(key, bucket_count)`.
//!
//! Bucket counts come from a fixed ascending schedule of primes. A
//! `Buckets` value remembers which step of the schedule it was built
//! from so the table can ask for the next one when it grows.

use crate::hash::hash_key;
use std::collections::TryReserveError;

slotmap::new_key_type! {
    /// Arena key of a chain node.
    pub(crate) struct NodeId;
}

/// Bucket counts in growth order. A new table starts at the first entry.
pub const BUCKET_COUNTS: [usize; 8] = [509, 1021, 2039, 4093, 8191, 16381, 32749, 65521];

#[derive(Debug)]
pub(crate) struct Buckets {
    heads: Vec<Option<NodeId>>,
    step: usize,
}

impl Buckets {
    pub(crate) fn with_step(step: usize) -> Self {
        Self {
            heads: vec![None; BUCKET_COUNTS[step]],
            step,
        }
    }

    /// Like `with_step`, but reports allocation failure instead of aborting.
    pub(crate) fn try_with_step(step: usize) -> Result<Self, TryReserveError> {
        let count = BUCKET_COUNTS[step];
        let mut heads = Vec::new();
        heads.try_reserve_exact(count)?;
        heads.resize(count, None);
        Ok(Self { heads, step })
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.heads.len()
    }

    /// Schedule step for the next larger bucket count, if any.
    pub(crate) fn next_step(&self) -> Option<usize> {
        let next = self.step + 1;
        (next < BUCKET_COUNTS.len()).then_some(next)
    }

    #[inline]
    pub(crate) fn index_of(&self, key: &str) -> usize {
        hash_key(key, self.heads.len())
    }

    #[inline]
    pub(crate) fn head(&self, index: usize) -> Option<NodeId> {
        self.heads[index]
    }

    #[inline]
    pub(crate) fn set_head(&mut self, index: usize, head: Option<NodeId>) {
        self.heads[index] = head;
    }

    pub(crate) fn heads(&self) -> &[Option<NodeId>] {
        &self.heads
    }
}
