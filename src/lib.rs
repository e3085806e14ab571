//! fxtable: a string-keyed, `i32`-valued open-addressing hash table with
//! its own hash function, Fibonacci index reduction and a collision
//! diagnostic reported on every resize.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small table whose placement is fully determined by the key
//!   bytes, so the primary-slot contention it reports on growth can be
//!   recomputed by anyone from the keys alone.
//! - Layers:
//!   - `hash`: `mix32` (FxHash-style rotate/xor/multiply over 4-byte
//!     little-endian words, then trailing bytes) and `reduce` (multiply by
//!     2^32/φ, keep the top `log2(capacity)` bits).
//!   - `table::StrTable`: a flat `Vec` of optional slots, linear probing,
//!     doubling growth and the `collisions` diagnostic.
//!   - `observer`: the hook through which growth is reported; the table
//!     itself only emits `tracing` events and never prints.
//!   - `bigram`: a thin client that counts word pairs using nothing but
//!     the table's public operations.
//!
//! Constraints
//! - Single-threaded; there is no interior mutability and no locking.
//! - Capacity is a power of two, starting at 128.
//! - No deletion, so no tombstones: an empty slot always ends a probe.
//! - Each slot owns a copy of its key; values are plain `i32`.
//!
//! Growth
//! - Every `set` checks the load factor before looking the key up; at
//!   `len / capacity >= 0.5` the table doubles first, even when the call
//!   turns out to be an update. The table therefore never fills, which is
//!   what bounds every probe.
//! - Growth allocates the new slot array up front, moves every entry into
//!   it against the new size and drops the old array. Keys are moved, not
//!   copied, and `set` is not re-entered, so growth never cascades.
//!
//! Failure semantics
//! - Fallible allocations (`try_new`, the slot array on growth, key copies)
//!   surface as `TableError::Allocation`.
//! - `reduce` asserts its power-of-two precondition.
//! - Lookups report absence with `None`; they never fail.
//!
//! Enumeration
//! - `capacity` plus `probe(index)` expose slots positionally; `iter` walks
//!   the same slots in order. Indices are invalidated by growth.

pub mod bigram;
pub mod error;
pub mod hash;
pub mod observer;
pub mod table;
mod table_proptest;

// Public surface
pub use error::TableError;
pub use observer::{GrowthEvent, GrowthObserver};
pub use table::StrTable;
