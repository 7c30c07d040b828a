//! Probing strategies.
//!
//! A strategy decides in which order the slots of a control plane are visited when looking for a
//! key or for a slot to insert into. It is selected by a type parameter of
//! [`FlatTable`](crate::FlatTable), so swapping it never changes the table's public operations.
//!
//! Every strategy visits each slot at most once per call, which makes probing terminate even on a
//! table without empty slots. Tombstones never stop a probe sequence.
use crate::{
    ctrl::Ctrl,
    group::{Group, GROUP_WIDTH},
    split::SplitHash,
};

/// A slot found by [`Probe::find_or_vacant`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Index of the occupied slot holding the key.
    Occupied(usize),
    /// Index of the slot the key should be inserted into.
    Vacant(usize),
}

/// Order in which slots are visited.
pub trait Probe {
    /// Rounds a requested non-zero capacity up to a capacity supported by this strategy.
    ///
    /// Returns `None` if the rounded capacity does not fit into a `usize`.
    fn round_capacity(capacity: usize) -> Option<usize>;

    /// Returns the index of the occupied slot with fragment `hash.h2()` for which `eq` holds.
    ///
    /// `eq` is only called for slots whose control byte matches the fragment.
    fn find(ctrl: &[Ctrl], hash: SplitHash, eq: impl FnMut(usize) -> bool) -> Option<usize>;

    /// Like [`find`](Probe::find) but returns the first vacant slot along the probe sequence if
    /// no occupied slot matches.
    ///
    /// Tombstones passed before reaching an empty slot are preferred over that empty slot.
    /// Returns `None` only if every slot was visited without finding a match or a vacant slot.
    fn find_or_vacant(
        ctrl: &[Ctrl],
        hash: SplitHash,
        eq: impl FnMut(usize) -> bool,
    ) -> Option<Slot>;
}

/// Visits slots one by one, starting at `H1 mod capacity` and wrapping around.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearProbe;

impl Probe for LinearProbe {
    #[inline]
    fn round_capacity(capacity: usize) -> Option<usize> {
        Some(capacity)
    }

    fn find(ctrl: &[Ctrl], hash: SplitHash, mut eq: impl FnMut(usize) -> bool) -> Option<usize> {
        if ctrl.is_empty() {
            return None;
        }
        let target = Ctrl::full(hash.h2());
        let mut index = hash.reduce(ctrl.len());
        for _ in 0..ctrl.len() {
            let current = ctrl[index];
            if current == target && eq(index) {
                return Some(index);
            }
            if current.is_empty() {
                return None;
            }
            index = next_index(index, ctrl.len());
        }
        None
    }

    fn find_or_vacant(
        ctrl: &[Ctrl],
        hash: SplitHash,
        mut eq: impl FnMut(usize) -> bool,
    ) -> Option<Slot> {
        if ctrl.is_empty() {
            return None;
        }
        let target = Ctrl::full(hash.h2());
        let mut index = hash.reduce(ctrl.len());
        let mut tombstone = None;
        for _ in 0..ctrl.len() {
            let current = ctrl[index];
            if current == target && eq(index) {
                return Some(Slot::Occupied(index));
            }
            if current.is_empty() {
                return Some(Slot::Vacant(tombstone.unwrap_or(index)));
            }
            if current == Ctrl::DELETED && tombstone.is_none() {
                tombstone = Some(index);
            }
            index = next_index(index, ctrl.len());
        }
        tombstone.map(Slot::Vacant)
    }
}

#[inline]
fn next_index(index: usize, len: usize) -> usize {
    let next = index + 1;
    if next == len {
        0
    } else {
        next
    }
}

/// Visits groups of [`GROUP_WIDTH`] slots, comparing all fragments of a group at once.
///
/// With `G` groups, the `i`-th group visited is `P(i)` where `P(0) = H1 mod G` and
/// `P(i) = (P(i - 1) + i) mod G`. Capacities are rounded so that `G` is a power of two, for which
/// this sequence visits every group exactly once within `G` steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupProbe;

impl GroupProbe {
    /// Calls `visit` with the start index and contents of each group along the probe sequence
    /// until it returns `Some`.
    #[inline]
    fn probe_groups<T>(
        ctrl: &[Ctrl],
        hash: SplitHash,
        mut visit: impl FnMut(usize, Group) -> Option<T>,
    ) -> Option<T> {
        let groups = ctrl.len().div_ceil(GROUP_WIDTH);
        if groups == 0 {
            return None;
        }
        let mut group_index = hash.reduce(groups);
        for stride in 1..=groups {
            let start = group_index * GROUP_WIDTH;
            if let Some(found) = visit(start, Group::load(ctrl, start)) {
                return Some(found);
            }
            group_index = (group_index + stride) % groups;
        }
        None
    }
}

impl Probe for GroupProbe {
    #[inline]
    fn round_capacity(capacity: usize) -> Option<usize> {
        capacity
            .max(1)
            .div_ceil(GROUP_WIDTH)
            .checked_next_power_of_two()?
            .checked_mul(GROUP_WIDTH)
    }

    fn find(ctrl: &[Ctrl], hash: SplitHash, mut eq: impl FnMut(usize) -> bool) -> Option<usize> {
        Self::probe_groups(ctrl, hash, |start, group| {
            for offset in group.match_fragment(hash.h2()) {
                if eq(start + offset) {
                    return Some(Some(start + offset));
                }
            }
            // An empty slot in this group ends the probe sequence.
            (!group.match_empty().is_empty()).then_some(None)
        })
        .flatten()
    }

    fn find_or_vacant(
        ctrl: &[Ctrl],
        hash: SplitHash,
        mut eq: impl FnMut(usize) -> bool,
    ) -> Option<Slot> {
        let mut vacant = None;
        let found = Self::probe_groups(ctrl, hash, |start, group| {
            for offset in group.match_fragment(hash.h2()) {
                if eq(start + offset) {
                    return Some(Slot::Occupied(start + offset));
                }
            }
            if vacant.is_none() {
                vacant = group.match_vacant().lowest().map(|offset| start + offset);
            }
            if group.match_empty().is_empty() {
                None
            } else {
                vacant.map(Slot::Vacant)
            }
        });
        found.or(vacant.map(Slot::Vacant))
    }
}
