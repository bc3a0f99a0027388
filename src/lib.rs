//! symtable: an unordered table of string-keyed bindings, backed by
//! separate chaining over a prime-sized bucket array.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: fast string-keyed storage for client code such as compilers
//!   and interpreters, with a small contract that does not commit the
//!   caller to a particular backing structure.
//! - Layers:
//!   - `hash`: the multiplicative string hash (`acc * 65599 + byte`,
//!     wrapping) reduced modulo the bucket count.
//!   - `buckets`: the array of chain heads and the prime schedule of
//!     bucket counts it is sized from.
//!   - `SymTable<V>`: bindings stored as nodes in a `SlotMap` arena and
//!     linked into per-bucket singly linked chains by arena key.
//!
//! Constraints
//! - Single-threaded; callers serialize access themselves.
//! - Keys are unique. `put` on a bound key fails and changes nothing.
//! - Every binding lives in bucket `hash_key(key, bucket_count)`.
//! - `len()` always equals the total length of all chains.
//! - Keys are copied on insert; the table never aliases the caller's
//!   key buffer.
//! - New bindings are prepended, so each chain is newest first.
//!
//! Ownership
//! - The table owns its bucket array, its nodes, and every key copy.
//!   Dropping the table releases all of them.
//! - Values are opaque. The table never clones or inspects a `V`;
//!   `replace` and `remove` move the value back to the caller. Use
//!   `&T`, `Rc<T>` or an index as `V` to keep the referent owned
//!   elsewhere.
//!
//! Outcomes
//! - Absence (`get`, `replace`, `remove` on an unbound key) is `None`.
//! - `put` on a bound key is `Err(InsertError::DuplicateKey)`.
//! - Allocation failure while reserving a node slot or copying a key in
//!   `put`, or while building the bucket array in `try_new`, is reported
//!   as an error and leaves no partial state behind.
//!
//! Growth
//! - `Growth::Rehash` (the default) moves to the next prime in
//!   `BUCKET_COUNTS` once `len > bucket_count`, relinking nodes without
//!   copying keys or moving values, and stops at the last prime.
//! - `Growth::Fixed` keeps the initial 509 buckets forever.
//!
//! Traversal
//! - `iter`, `for_each`, `for_each_with` and `for_each_mut` visit every
//!   binding once, bucket by bucket. Structural mutation during a
//!   traversal is ruled out by the borrow checker.

mod buckets;
mod hash;
mod sym_table;
mod sym_table_proptest;

// Public surface
pub use buckets::BUCKET_COUNTS;
pub use hash::{hash_key, HASH_MULTIPLIER};
pub use sym_table::{AllocError, Growth, InsertError, Iter, SymTable, MAX_LOAD_FACTOR};
