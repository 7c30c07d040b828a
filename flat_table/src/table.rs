//! [`FlatTable`] is an open-addressing hash map with per-slot control bytes.
use std::{borrow::Borrow, fmt, marker::PhantomData};

use crate::{
    checksum::Adler32,
    error::TryReserveError,
    hash::KeyHasher,
    probe::{LinearProbe, Probe, Slot},
    slots::SlotArray,
    split::SplitHash,
};

/// Number of slots of a table created by [`FlatTable::new`], before rounding by the probe
/// strategy.
pub const DEFAULT_CAPACITY: usize = 10;

/// Maximal fraction of occupied slots before an insertion grows the table.
pub const LOAD_FACTOR: f64 = 0.875;

/// An open-addressing hash map storing one control byte per slot.
///
/// Each slot's control byte is either empty, a tombstone, or a 7-bit fragment of the hash of the
/// slot's key. Lookups compare this byte before comparing keys, so most non-matching slots are
/// rejected without touching their entries. Whether a slot is in use is determined solely by its
/// control byte, so any key, including an empty byte sequence, can be stored.
///
/// Keys are hashed with the caller-supplied [`KeyHasher`] `S` (by default [`Adler32`]) and the
/// slot visiting order is chosen by the [`Probe`] strategy `P` (by default [`LinearProbe`]).
///
/// Before every insertion the table doubles its capacity if more than [`LOAD_FACTOR`] of its slots
/// are occupied. Capacity never shrinks.
pub struct FlatTable<K, V, S = Adler32, P = LinearProbe> {
    slots: SlotArray<K, V>,
    len: usize,
    hasher: S,
    _probe: PhantomData<fn() -> P>,
}

impl<K, V, S: Default, P: Probe> Default for FlatTable<K, V, S, P> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S: Default, P: Probe> FlatTable<K, V, S, P> {
    /// Returns an empty table with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns an empty table with at least the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
    /// Returns an empty table with at least the specified capacity, or an error if the storage
    /// cannot be allocated.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::try_with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S, P: Probe> FlatTable<K, V, S, P> {
    /// Returns an empty table with the default capacity and the provided key hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }
    /// Returns an empty table with at least the specified capacity and the provided key hasher.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::try_with_capacity_and_hasher(capacity, hasher).unwrap_or_else(|err| err.fatal())
    }
    /// Returns an empty table with at least the specified capacity and the provided key hasher,
    /// or an error if the storage cannot be allocated.
    ///
    /// A capacity of zero is treated as one.
    pub fn try_with_capacity_and_hasher(
        capacity: usize,
        hasher: S,
    ) -> Result<Self, TryReserveError> {
        let capacity =
            P::round_capacity(capacity.max(1)).ok_or(TryReserveError::CapacityOverflow)?;
        Ok(FlatTable {
            slots: SlotArray::try_new(capacity)?,
            len: 0,
            hasher,
            _probe: PhantomData,
        })
    }
}

impl<K, V, S, P> FlatTable<K, V, S, P> {
    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.len
    }
    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }
    /// Returns the fraction of occupied slots.
    pub fn load(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }
    /// Returns a reference to the table's key hasher.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn exceeds_load_factor(&self) -> bool {
        self.load() > LOAD_FACTOR
    }
}

impl<K: Eq, V, S: KeyHasher<K>, P: Probe> FlatTable<K, V, S, P> {
    /// Inserts `value` at `key`, replacing and returning any previous value.
    ///
    /// Returns `None` if the key was newly added. Replacing a value does not change
    /// [`len`](Self::len).
    ///
    /// # Panics
    /// Panics if the new capacity overflows and aborts if growing the table fails to allocate.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.try_insert(key, value).unwrap_or_else(|err| err.fatal())
    }

    /// Inserts `value` at `key`, replacing and returning any previous value, or returns an error
    /// if the table needed to grow and the new storage could not be allocated.
    ///
    /// On error the table is left unchanged and `key` and `value` are dropped.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, TryReserveError> {
        if self.exceeds_load_factor() {
            self.try_grow()?;
        }
        let hash = SplitHash::new(self.hasher.hash_key(&key));
        loop {
            let slots = &self.slots;
            let found = P::find_or_vacant(slots.ctrl(), hash, |index| {
                slots.get(index).is_some_and(|(existing, _)| *existing == key)
            });
            match found {
                Some(Slot::Occupied(index)) => {
                    let Some((_, existing)) = self.slots.get_mut(index) else {
                        unreachable!()
                    };
                    return Ok(Some(std::mem::replace(existing, value)));
                }
                Some(Slot::Vacant(index)) => {
                    self.slots.occupy(index, hash.h2(), key, value);
                    self.len += 1;
                    return Ok(None);
                }
                // Every slot was visited and none is vacant.
                None => self.try_grow()?,
            }
        }
    }

    /// Moves all entries into new storage with at least `new_capacity` slots.
    ///
    /// Requests below the current capacity rehash at the current capacity, as tables never
    /// shrink.
    ///
    /// # Panics
    /// Panics if the new capacity overflows and aborts if the new storage fails to allocate.
    pub fn rehash(&mut self, new_capacity: usize) {
        self.try_rehash(new_capacity).unwrap_or_else(|err| err.fatal())
    }

    /// Moves all entries into new storage with at least `new_capacity` slots, or returns an error
    /// if the storage cannot be allocated, in which case the table is left unchanged.
    pub fn try_rehash(&mut self, new_capacity: usize) -> Result<(), TryReserveError> {
        let new_capacity = P::round_capacity(new_capacity.max(self.capacity()))
            .ok_or(TryReserveError::CapacityOverflow)?;
        let new_slots = SlotArray::try_new(new_capacity)?;

        log::trace!(
            "rehashing {} entries from {} to {} slots",
            self.len,
            self.capacity(),
            new_capacity
        );

        let old_slots = std::mem::replace(&mut self.slots, new_slots);
        for (key, value) in old_slots.into_entries() {
            let hash = SplitHash::new(self.hasher.hash_key(&key));
            // Keys are distinct, so only a vacant slot can be found.
            match P::find_or_vacant(self.slots.ctrl(), hash, |_| false) {
                Some(Slot::Vacant(index)) => {
                    self.slots.occupy(index, hash.h2(), key, value);
                }
                _ => unreachable!("no vacant slot while rehashing"),
            }
        }
        Ok(())
    }

    /// Grows the table so that `additional` more entries can be inserted without growing again.
    ///
    /// # Panics
    /// Panics if the new capacity overflows and aborts if the new storage fails to allocate.
    pub fn reserve(&mut self, additional: usize) {
        self.try_reserve(additional).unwrap_or_else(|err| err.fatal())
    }

    /// Grows the table so that `additional` more entries can be inserted without growing again, or
    /// returns an error if the storage cannot be allocated.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)?;
        // The last of the reserved insertions checks the load with `required - 1` entries.
        let checked = required.saturating_sub(1);
        let mut capacity = self.capacity();
        while checked as f64 / capacity as f64 > LOAD_FACTOR {
            capacity = capacity
                .checked_mul(2)
                .ok_or(TryReserveError::CapacityOverflow)?;
        }
        if capacity > self.capacity() {
            self.try_rehash(capacity)?;
        }
        Ok(())
    }

    fn try_grow(&mut self) -> Result<(), TryReserveError> {
        let new_capacity = self
            .capacity()
            .checked_mul(2)
            .ok_or(TryReserveError::CapacityOverflow)?;
        log::debug!(
            "growing table with {} entries from {} to {} slots",
            self.len,
            self.capacity(),
            new_capacity
        );
        self.try_rehash(new_capacity)
    }
}

impl<K, V, S, P: Probe> FlatTable<K, V, S, P> {
    fn find_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        let hash = SplitHash::new(self.hasher.hash_key(key));
        P::find(self.slots.ctrl(), hash, |index| {
            self.slots
                .get(index)
                .is_some_and(|(existing, _)| existing.borrow() == key)
        })
    }

    /// Returns a reference to the value stored at `key`, if present.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        let index = self.find_index(key)?;
        self.slots.get(index).map(|(_, value)| value)
    }

    /// Returns a reference to the stored key and value at `key`, if present.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        let index = self.find_index(key)?;
        self.slots.get(index).map(|(key, value)| (key, value))
    }

    /// Returns a mutable reference to the value stored at `key`, if present.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        let index = self.find_index(key)?;
        self.slots.get_mut(index).map(|(_, value)| value)
    }

    /// Returns a copy of the value stored at `key`, if present.
    pub fn find<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
        V: Copy,
    {
        self.get(key).copied()
    }

    /// Returns `true` if the table contains an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        self.find_index(key).is_some()
    }
}

impl<K: Clone, V: Clone, S: Clone, P> Clone for FlatTable<K, V, S, P> {
    fn clone(&self) -> Self {
        FlatTable {
            slots: self.slots.clone(),
            len: self.len,
            hasher: self.hasher.clone(),
            _probe: PhantomData,
        }
    }
}

impl<K, V, S, P> fmt::Debug for FlatTable<K, V, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatTable")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

impl<K: Eq, V, S: KeyHasher<K>, P: Probe> Extend<(K, V)> for FlatTable<K, V, S, P> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Eq, V, S: KeyHasher<K> + Default, P: Probe> FromIterator<(K, V)>
    for FlatTable<K, V, S, P>
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

#[cfg(test)]
impl<K: Eq, V, S: KeyHasher<K>, P: Probe> FlatTable<K, V, S, P> {
    pub(crate) fn check(&self) {
        let ctrl = self.slots.ctrl();
        assert_eq!(ctrl.iter().filter(|ctrl| ctrl.is_full()).count(), self.len);
        for (index, &slot_ctrl) in ctrl.iter().enumerate() {
            if let Some((key, _)) = self.slots.get(index) {
                let hash = SplitHash::new(self.hasher.hash_key(key));
                assert_eq!(slot_ctrl, crate::ctrl::Ctrl::full(hash.h2()));
                assert_eq!(self.find_index(key), Some(index));
            } else {
                assert!(slot_ctrl.is_vacant());
            }
        }
    }

    pub(crate) fn vacate<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        let index = self.find_index(key)?;
        let entry = self.slots.vacate(index)?;
        self.len -= 1;
        Some(entry)
    }

    pub(crate) fn ctrl(&self) -> &[crate::ctrl::Ctrl] {
        self.slots.ctrl()
    }
}
