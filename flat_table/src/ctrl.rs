//! Per-slot control bytes.
//!
//! Each slot of a [`FlatTable`](crate::FlatTable) has a single control byte describing its state.
//! Occupied slots store a 7-bit fragment of their key's hash with the high bit clear, while all
//! special states have the high bit set:
//!
//! ```text
//! Empty    = 0b1000_0000
//! Deleted  = 0b1111_1110
//! Sentinel = 0b1111_1111
//! Full     = 0b0xxx_xxxx
//! ```
use std::fmt;

/// A control byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Ctrl(u8);

/// Decoded state of a [`Ctrl`] byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CtrlState {
    /// Unused slot. Terminates a probe sequence.
    Empty,
    /// Tombstone left by a removed entry. Probing continues past it, insertion may reuse it.
    Deleted,
    /// Guard marker that pads partial groups. Never describes a real slot.
    Sentinel,
    /// Occupied slot with the given hash fragment.
    Full(u8),
}

impl Ctrl {
    /// Control byte of an unused slot.
    pub const EMPTY: Ctrl = Ctrl(0b1000_0000);
    /// Control byte of a tombstone.
    pub const DELETED: Ctrl = Ctrl(0b1111_1110);
    /// Control byte padding a group past the end of the control plane.
    pub const SENTINEL: Ctrl = Ctrl(0b1111_1111);

    /// Returns the control byte of an occupied slot holding a key with hash fragment `h2`.
    #[inline]
    pub fn full(h2: u8) -> Ctrl {
        debug_assert!(h2 & 0x80 == 0, "fragment {h2:#x} has the high bit set");
        Ctrl(h2 & 0x7f)
    }

    /// Returns the raw byte.
    #[inline]
    pub fn to_byte(self) -> u8 {
        self.0
    }

    /// Decodes the control byte.
    #[inline]
    pub fn state(self) -> CtrlState {
        match self {
            Ctrl::EMPTY => CtrlState::Empty,
            Ctrl::DELETED => CtrlState::Deleted,
            Ctrl::SENTINEL => CtrlState::Sentinel,
            Ctrl(byte) if byte & 0x80 == 0 => CtrlState::Full(byte),
            // Remaining high-bit patterns are never written.
            Ctrl(byte) => unreachable!("invalid control byte {byte:#010b}"),
        }
    }

    /// Returns `true` for an occupied slot.
    #[inline]
    pub fn is_full(self) -> bool {
        self.0 & 0x80 == 0
    }

    /// Returns `true` for an unused slot.
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Ctrl::EMPTY
    }

    /// Returns `true` for a slot that can accept a new entry, i.e. an empty slot or a tombstone.
    #[inline]
    pub fn is_vacant(self) -> bool {
        self == Ctrl::EMPTY || self == Ctrl::DELETED
    }
}

impl From<CtrlState> for Ctrl {
    fn from(state: CtrlState) -> Self {
        match state {
            CtrlState::Empty => Ctrl::EMPTY,
            CtrlState::Deleted => Ctrl::DELETED,
            CtrlState::Sentinel => Ctrl::SENTINEL,
            CtrlState::Full(h2) => Ctrl::full(h2),
        }
    }
}

impl fmt::Debug for Ctrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.state(), f)
    }
}
