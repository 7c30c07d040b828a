//! A flat open-addressing hash map that keeps one control byte per slot next to its key-value
//! storage.
//!
//! The control byte of a slot records whether the slot is empty, a tombstone, or occupied, and
//! for occupied slots holds a 7-bit fragment (H2) of the key's hash. The remaining hash bits (H1)
//! choose where probing starts. Lookups compare control bytes first and only compare keys when
//! the fragment matches:
//!
//! ```text
//!  ctrl   | E | 3f| E | 12| D | E | 3f| E | ...
//!  slots  | - | k0| - | k1| - | - | k2| - | ...
//! ```
//!
//! Two probing strategies are provided. [`LinearProbe`] visits one slot after the other, while
//! [`GroupProbe`] compares the control bytes of 16 slots at once and probes groups
//! quadratically.
//!
//! The canonical instantiation [`ByteMap`] maps byte sequences to `i32` values using the
//! [`Adler32`] checksum as hash:
//!
//! ```rust
//! use flat_table::ByteMap;
//!
//! let mut map = ByteMap::new();
//! map.insert(b"foo".to_vec(), 2);
//! map.insert(b"bar".to_vec(), 4);
//! map.insert(b"spam".to_vec(), 5);
//!
//! assert_eq!(map.find(&b"foo"[..]), Some(2));
//! assert_eq!(map.find(&b"baz"[..]), None);
//! ```
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

pub mod checksum;
pub mod ctrl;
pub mod error;
pub mod group;
pub mod hash;
pub mod probe;
pub mod split;

mod slots;
mod table;

#[cfg(test)]
mod test_table;

pub use checksum::Adler32;
pub use error::TryReserveError;
pub use hash::{KeyHasher, StdHasher};
pub use probe::{GroupProbe, LinearProbe, Probe};
pub use table::{FlatTable, DEFAULT_CAPACITY, LOAD_FACTOR};

/// Map from byte sequences to `i32` values using linear probing.
pub type ByteMap = FlatTable<Vec<u8>, i32>;

/// Map from byte sequences to `i32` values using grouped probing.
pub type GroupedByteMap = FlatTable<Vec<u8>, i32, Adler32, GroupProbe>;
