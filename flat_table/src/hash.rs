//! Caller-supplied key hashing.
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use zwohash::ZwoHasher;

/// Computes the hash of keys of type `Q`.
///
/// A [`FlatTable`](crate::FlatTable) with keys of type `K` requires `KeyHasher<K>` for insertion
/// and `KeyHasher<Q>` for lookups by a borrowed form `Q` of `K`. Implementations must return the
/// same hash for a key and every borrowed form of it that compares equal.
pub trait KeyHasher<Q: ?Sized> {
    /// Returns the hash of `key`.
    fn hash_key(&self, key: &Q) -> u64;
}

impl<Q: ?Sized, H: KeyHasher<Q> + ?Sized> KeyHasher<Q> for &H {
    #[inline]
    fn hash_key(&self, key: &Q) -> u64 {
        (**self).hash_key(key)
    }
}

/// Adapts a [`BuildHasher`] into a [`KeyHasher`] for any key implementing [`Hash`].
///
/// The default build hasher is zwohash's [`ZwoHasher`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StdHasher<S = BuildHasherDefault<ZwoHasher>>(pub S);

impl<Q: Hash + ?Sized, S: BuildHasher> KeyHasher<Q> for StdHasher<S> {
    #[inline]
    fn hash_key(&self, key: &Q) -> u64 {
        self.0.hash_one(key)
    }
}

