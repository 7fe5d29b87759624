#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Slot storage shared by every bucket of a table.
pub mod bucket;

mod error;

/// A key-value map over the chaining `HashTable`.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with a pluggable key hasher.
pub mod hash_map;

/// A hash set over the chaining `HashTable`.
pub mod hash_set;

/// The separate-chaining table both containers are built on.
pub mod hash_table;

/// The per-type hash contract and the hasher seam used by the containers.
pub mod type_hash;

pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;
pub use type_hash::KeyHasher;
pub use type_hash::TypeHash;
pub use type_hash::TypeHashing;
