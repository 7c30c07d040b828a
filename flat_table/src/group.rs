//! Parallel matching of control bytes in fixed-size groups.
use std::num::NonZeroU16;

use crate::ctrl::Ctrl;

/// Number of control bytes matched at once.
pub const GROUP_WIDTH: usize = 16;

/// A copy of [`GROUP_WIDTH`] consecutive control bytes.
#[derive(Clone, Copy, Debug)]
pub struct Group([u8; GROUP_WIDTH]);

impl Group {
    /// Loads the group starting at `start`.
    ///
    /// Positions past the end of `ctrl` read as [`Ctrl::SENTINEL`], which neither matches a
    /// fragment nor counts as vacant.
    #[inline]
    pub fn load(ctrl: &[Ctrl], start: usize) -> Self {
        let mut bytes = [Ctrl::SENTINEL.to_byte(); GROUP_WIDTH];
        let end = ctrl.len().min(start + GROUP_WIDTH);
        for (byte, ctrl) in bytes.iter_mut().zip(&ctrl[start.min(end)..end]) {
            *byte = ctrl.to_byte();
        }
        Group(bytes)
    }

    /// Returns the positions holding the control byte of an occupied slot with fragment `h2`.
    #[inline]
    pub fn match_fragment(&self, h2: u8) -> BitMask {
        BitMask(find_byte_among_16(Ctrl::full(h2).to_byte(), &self.0))
    }

    /// Returns the positions of empty slots.
    #[inline]
    pub fn match_empty(&self) -> BitMask {
        BitMask(find_byte_among_16(Ctrl::EMPTY.to_byte(), &self.0))
    }

    /// Returns the positions of empty slots and tombstones.
    #[inline]
    pub fn match_vacant(&self) -> BitMask {
        BitMask(
            find_byte_among_16(Ctrl::EMPTY.to_byte(), &self.0)
                | find_byte_among_16(Ctrl::DELETED.to_byte(), &self.0),
        )
    }
}

/// Set of positions within a [`Group`], iterated in ascending order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitMask(u16);

impl BitMask {
    /// Returns `true` if no position is set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the lowest set position.
    #[inline]
    pub fn lowest(self) -> Option<usize> {
        NonZeroU16::new(self.0).map(|bits| bits.trailing_zeros() as usize)
    }
}

impl Iterator for BitMask {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let lowest = self.lowest()?;
        self.0 &= self.0 - 1;
        Some(lowest)
    }
}

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "sse2"
))]
fn find_byte_among_16(needle: u8, haystack: &[u8; 16]) -> u16 {
    #[cfg(target_arch = "x86")]
    use core::arch::x86;
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64 as x86;

    // SAFETY: SSE2 is enabled for this target and the pointer to haystack is valid for an
    // unaligned 16 byte load
    unsafe {
        let bytes = x86::_mm_loadu_si128((haystack as *const [u8; 16]).cast::<x86::__m128i>());

        let needle = x86::_mm_set1_epi8(needle as i8);

        x86::_mm_movemask_epi8(x86::_mm_cmpeq_epi8(bytes, needle)) as u16
    }
}

#[cfg(not(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "sse2"
)))]
fn find_byte_among_16(needle: u8, haystack: &[u8; 16]) -> u16 {
    let mut found = 0;
    for (i, &candidate) in haystack.iter().enumerate() {
        found |= ((candidate == needle) as u16) << i;
    }
    found
}
