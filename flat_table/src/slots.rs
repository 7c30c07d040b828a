//! Paired control plane and slot storage.
use std::mem::MaybeUninit;

use crate::{ctrl::Ctrl, error::TryReserveError};

/// Fixed-capacity storage of key-value entries together with their control bytes.
///
/// Both arrays always have the same length and are index aligned: `ctrl()[i]` describes slot `i`.
/// A slot holds an initialized entry if and only if its control byte is full.
pub struct SlotArray<K, V> {
    ctrl: Vec<Ctrl>,
    slots: Vec<MaybeUninit<(K, V)>>,
}

fn try_alloc<T>(len: usize, fill: impl FnMut() -> T) -> Result<Vec<T>, TryReserveError> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| TryReserveError::for_array::<T>(len))?;
    vec.resize_with(len, fill);
    Ok(vec)
}

impl<K, V> SlotArray<K, V> {
    /// Allocates storage for `capacity` entries, all initially empty.
    pub fn try_new(capacity: usize) -> Result<Self, TryReserveError> {
        let ctrl = try_alloc(capacity, || Ctrl::EMPTY)?;
        let slots = try_alloc(capacity, MaybeUninit::uninit)?;
        Ok(SlotArray { ctrl, slots })
    }

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ctrl.len()
    }

    /// Returns the control plane.
    #[inline]
    pub fn ctrl(&self) -> &[Ctrl] {
        &self.ctrl
    }

    /// Returns the entry in slot `index` if the slot is occupied.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&(K, V)> {
        if self.ctrl[index].is_full() {
            // SAFETY: a full control byte means the slot was initialized by `occupy`
            Some(unsafe { self.slots[index].assume_init_ref() })
        } else {
            None
        }
    }

    /// Returns the entry in slot `index` if the slot is occupied, allowing mutation.
    ///
    /// Callers must not change the key in a way that changes its hash or equality.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut (K, V)> {
        if self.ctrl[index].is_full() {
            // SAFETY: a full control byte means the slot was initialized by `occupy`
            Some(unsafe { self.slots[index].assume_init_mut() })
        } else {
            None
        }
    }

    /// Stores an entry in the vacant slot `index` and marks it full with fragment `h2`.
    ///
    /// # Panics
    /// Panics if the slot is already occupied.
    #[inline]
    pub fn occupy(&mut self, index: usize, h2: u8, key: K, value: V) {
        assert!(
            self.ctrl[index].is_vacant(),
            "slot {index} is not vacant: {:?}",
            self.ctrl[index]
        );
        self.slots[index].write((key, value));
        self.ctrl[index] = Ctrl::full(h2);
    }

    /// Removes the entry in slot `index`, leaving a tombstone.
    #[cfg(test)]
    pub fn vacate(&mut self, index: usize) -> Option<(K, V)> {
        if !self.ctrl[index].is_full() {
            return None;
        }
        self.ctrl[index] = Ctrl::DELETED;
        // SAFETY: the slot was full and is now marked deleted, so it is read exactly once
        Some(unsafe { self.slots[index].assume_init_read() })
    }

    /// Consumes the storage, yielding all occupied entries in slot order.
    pub fn into_entries(self) -> IntoEntries<K, V> {
        IntoEntries {
            array: self,
            pos: 0,
        }
    }
}

impl<K, V> Drop for SlotArray<K, V> {
    fn drop(&mut self) {
        if !std::mem::needs_drop::<(K, V)>() {
            return;
        }
        for (ctrl, slot) in self.ctrl.iter().zip(self.slots.iter_mut()) {
            if ctrl.is_full() {
                // SAFETY: full slots are initialized and each is dropped once here
                unsafe { slot.assume_init_drop() };
            }
        }
    }
}

impl<K: Clone, V: Clone> Clone for SlotArray<K, V> {
    fn clone(&self) -> Self {
        let mut clone = SlotArray::try_new(self.capacity()).unwrap_or_else(|err| err.fatal());
        for (index, &ctrl) in self.ctrl.iter().enumerate() {
            if let Some((key, value)) = self.get(index) {
                clone.slots[index].write((key.clone(), value.clone()));
            }
            // Written after the entry so that a panicking clone never leaves an uninitialized
            // full slot behind.
            clone.ctrl[index] = ctrl;
        }
        clone
    }
}

/// Owning iterator over the occupied entries of a [`SlotArray`].
pub struct IntoEntries<K, V> {
    array: SlotArray<K, V>,
    pos: usize,
}

impl<K, V> Iterator for IntoEntries<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        while self.pos < self.array.capacity() {
            let index = self.pos;
            self.pos += 1;
            if self.array.ctrl[index].is_full() {
                self.array.ctrl[index] = Ctrl::EMPTY;
                // SAFETY: the slot was full and is now marked empty, so it is read exactly once
                return Some(unsafe { self.array.slots[index].assume_init_read() });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.array.capacity() - self.pos))
    }
}
