//! SymTable: string-keyed bindings chained per bucket in a slot arena.

use crate::buckets::{Buckets, NodeId};
use core::fmt;
use slotmap::SlotMap;
use std::collections::TryReserveError;

/// Load factor (`len / bucket_count`) above which a growing table moves
/// to the next bucket count.
pub const MAX_LOAD_FACTOR: usize = 1;

/// Whether a table moves up the bucket-count schedule as it fills.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Growth {
    /// Relink every binding into the next bucket count once the load
    /// factor exceeds `MAX_LOAD_FACTOR`.
    #[default]
    Rehash,
    /// Keep the initial bucket count for the table's whole life.
    Fixed,
}

#[derive(Debug)]
struct Node<V> {
    key: Box<str>,
    value: V,
    next: Option<NodeId>,
    // Insertion order, used to keep chains newest-first across a rehash.
    stamp: u64,
}

/// A table of unique string keys bound to caller-chosen values.
///
/// Keys are copied on insert; the caller's buffer is never retained.
/// Values are moved in and moved back out by `replace` and `remove`,
/// and are otherwise never cloned or inspected.
pub struct SymTable<V> {
    buckets: Buckets,
    nodes: SlotMap<NodeId, Node<V>>,
    growth: Growth,
    next_stamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    DuplicateKey,
    OutOfMemory(TryReserveError),
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey => f.write_str("key is already bound"),
            InsertError::OutOfMemory(e) => write!(f, "could not allocate binding: {e}"),
        }
    }
}

impl std::error::Error for InsertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InsertError::DuplicateKey => None,
            InsertError::OutOfMemory(e) => Some(e),
        }
    }
}

/// The bucket array of a new table could not be allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocError(TryReserveError);

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not allocate bucket array: {}", self.0)
    }
}

impl std::error::Error for AllocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

fn copy_key(key: &str) -> Result<Box<str>, TryReserveError> {
    let mut owned = String::new();
    owned.try_reserve_exact(key.len())?;
    owned.push_str(key);
    Ok(owned.into_boxed_str())
}

impl<V> SymTable<V> {
    /// Empty table with `Growth::Rehash`.
    pub fn new() -> Self {
        Self::with_growth(Growth::Rehash)
    }

    /// Empty table that never leaves the initial bucket count.
    pub fn fixed() -> Self {
        Self::with_growth(Growth::Fixed)
    }

    pub fn with_growth(growth: Growth) -> Self {
        Self::from_buckets(Buckets::with_step(0), growth)
    }

    /// Empty table with `Growth::Rehash`, or `AllocError` if the bucket
    /// array cannot be allocated. Nothing is left allocated on failure.
    pub fn try_new() -> Result<Self, AllocError> {
        Self::try_with_growth(Growth::Rehash)
    }

    pub fn try_with_growth(growth: Growth) -> Result<Self, AllocError> {
        let buckets = Buckets::try_with_step(0).map_err(AllocError)?;
        Ok(Self::from_buckets(buckets, growth))
    }

    fn from_buckets(buckets: Buckets, growth: Growth) -> Self {
        Self {
            buckets,
            nodes: SlotMap::with_key(),
            growth,
            next_stamp: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.count()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count() as f64
    }

    pub fn growth(&self) -> Growth {
        self.growth
    }

    fn chain(&self, index: usize) -> Chain<'_, V> {
        Chain {
            nodes: &self.nodes,
            cur: self.buckets.head(index),
        }
    }

    fn find(&self, key: &str) -> Option<NodeId> {
        self.chain(self.buckets.index_of(key))
            .find(|(_, node)| &*node.key == key)
            .map(|(id, _)| id)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let id = self.find(key)?;
        self.nodes.get(id).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let id = self.find(key)?;
        self.nodes.get_mut(id).map(|n| &mut n.value)
    }

    /// Bind `key` to `value` if `key` is not bound yet.
    ///
    /// On `DuplicateKey` the existing binding is untouched. On
    /// `OutOfMemory` the node or the key copy could not be allocated and
    /// the table is unchanged. In both cases `value` is dropped.
    pub fn put(&mut self, key: &str, value: V) -> Result<(), InsertError> {
        if self.contains(key) {
            return Err(InsertError::DuplicateKey);
        }
        // Reserve the node slot first so the insert below cannot allocate.
        self.reserve_nodes(1)?;
        let key = copy_key(key).map_err(InsertError::OutOfMemory)?;

        let index = self.buckets.index_of(&key);
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        let id = self.nodes.insert(Node {
            key,
            value,
            next: self.buckets.head(index),
            stamp,
        });
        self.buckets.set_head(index, Some(id));

        self.maybe_grow();
        Ok(())
    }

    fn reserve_nodes(&mut self, additional: usize) -> Result<(), InsertError> {
        self.nodes
            .try_reserve(additional)
            .map_err(InsertError::OutOfMemory)
    }

    /// Swap in `value` for an existing binding and return the old value.
    /// Returns `None`, dropping `value`, when `key` is not bound.
    pub fn replace(&mut self, key: &str, value: V) -> Option<V> {
        let slot = self.get_mut(key)?;
        Some(core::mem::replace(slot, value))
    }

    /// Unbind `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.buckets.index_of(key);
        let mut prev: Option<NodeId> = None;
        let mut cur = self.buckets.head(index);

        while let Some(id) = cur {
            let node = &self.nodes[id];
            if &*node.key == key {
                let next = node.next;
                match prev {
                    None => self.buckets.set_head(index, next),
                    Some(p) => self.nodes[p].next = next,
                }
                return self.nodes.remove(id).map(|n| n.value);
            }
            prev = cur;
            cur = node.next;
        }
        None
    }

    /// Iterate bindings bucket by bucket, newest first within a bucket.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            nodes: &self.nodes,
            heads: self.buckets.heads().iter(),
            cur: None,
            remaining: self.nodes.len(),
        }
    }

    /// Call `f` once per binding, in `iter` order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &V),
    {
        for (key, value) in self.iter() {
            f(key, value);
        }
    }

    /// Call `f` once per binding, handing it `extra` alongside the key and value.
    pub fn for_each_with<X, F>(&self, extra: &mut X, mut f: F)
    where
        X: ?Sized,
        F: FnMut(&str, &V, &mut X),
    {
        for (key, value) in self.iter() {
            f(key, value, &mut *extra);
        }
    }

    /// Like `for_each`, with mutable access to values. Keys and chain
    /// structure stay fixed while `f` runs.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut V),
    {
        for index in 0..self.buckets.count() {
            let mut cur = self.buckets.head(index);
            while let Some(id) = cur {
                let node = &mut self.nodes[id];
                f(&*node.key, &mut node.value);
                cur = node.next;
            }
        }
    }

    fn maybe_grow(&mut self) {
        if self.growth != Growth::Rehash || self.len() <= self.bucket_count() * MAX_LOAD_FACTOR {
            return;
        }
        let Some(step) = self.buckets.next_step() else {
            return;
        };
        // Growth is best effort: the insert that triggered it already succeeded.
        let Ok(buckets) = Buckets::try_with_step(step) else {
            return;
        };
        let mut order: Vec<(u64, NodeId)> = Vec::new();
        if order.try_reserve_exact(self.len()).is_err() {
            return;
        }
        order.extend(self.nodes.iter().map(|(id, n)| (n.stamp, id)));
        self.rehash(buckets, order);
    }

    /// Relink every node into `buckets`. Nodes are pushed oldest first so
    /// each new chain ends up newest first.
    fn rehash(&mut self, mut buckets: Buckets, mut order: Vec<(u64, NodeId)>) {
        order.sort_unstable_by_key(|&(stamp, _)| stamp);
        for (_, id) in order {
            let node = &mut self.nodes[id];
            let index = buckets.index_of(&node.key);
            node.next = buckets.head(index);
            buckets.set_head(index, Some(id));
        }
        self.buckets = buckets;
    }

    /// Panics if any binding sits in the wrong bucket, chains disagree
    /// with the arena, or a chain is not newest first.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut linked = 0usize;
        for index in 0..self.bucket_count() {
            let mut last_stamp = u64::MAX;
            for (_, node) in self.chain(index) {
                assert_eq!(self.buckets.index_of(&node.key), index, "misplaced key {:?}", node.key);
                assert!(node.stamp < last_stamp, "chain {index} not newest first");
                last_stamp = node.stamp;
                linked += 1;
            }
        }
        assert_eq!(linked, self.len(), "chain lengths disagree with len()");
        let at_cap = self.buckets.next_step().is_none();
        assert!(self.growth == Growth::Fixed || at_cap || self.len() <= self.bucket_count());
    }
}

impl<V> Default for SymTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for SymTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a SymTable<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Walks one bucket's chain.
struct Chain<'a, V> {
    nodes: &'a SlotMap<NodeId, Node<V>>,
    cur: Option<NodeId>,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = (NodeId, &'a Node<V>);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let id = self.cur?;
        let node = nodes.get(id)?;
        self.cur = node.next;
        Some((id, node))
    }
}

/// Iterator over the bindings of a `SymTable`.
pub struct Iter<'a, V> {
    nodes: &'a SlotMap<NodeId, Node<V>>,
    heads: core::slice::Iter<'a, Option<NodeId>>,
    cur: Option<NodeId>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            if let Some(node) = self.cur.and_then(|id| nodes.get(id)) {
                self.cur = node.next;
                self.remaining -= 1;
                return Some((&*node.key, &node.value));
            }
            self.cur = *self.heads.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> core::iter::FusedIterator for Iter<'_, V> {}
