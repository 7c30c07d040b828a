//! Splitting a key hash into a probe start (H1) and a control byte fragment (H2).

/// Number of low hash bits stored in the control byte of an occupied slot.
pub const FRAGMENT_BITS: u32 = 7;

const FRAGMENT_MASK: u64 = (1 << FRAGMENT_BITS) - 1;

/// Returns the starting probe position for `hash` in a table with `capacity` slots.
///
/// The fragment bits are shifted off first so that the slot choice and the stored fragment are
/// derived from disjoint bits.
#[inline]
pub fn index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    ((hash >> FRAGMENT_BITS) % capacity as u64) as usize
}

/// Returns the 7-bit fragment stored in the control byte of an occupied slot.
#[inline]
pub fn metadata(hash: u64) -> u8 {
    (hash & FRAGMENT_MASK) as u8
}

/// A key hash split into its two halves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitHash {
    h1: u64,
    h2: u8,
}

impl SplitHash {
    /// Splits `hash`.
    #[inline]
    pub fn new(hash: u64) -> Self {
        SplitHash {
            h1: hash >> FRAGMENT_BITS,
            h2: metadata(hash),
        }
    }

    /// Returns the unreduced probe seed.
    #[inline]
    pub fn h1(self) -> u64 {
        self.h1
    }

    /// Returns the fragment, which always has its high bit clear.
    #[inline]
    pub fn h2(self) -> u8 {
        self.h2
    }

    /// Returns the probe seed reduced modulo `len`.
    #[inline]
    pub fn reduce(self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.h1 % len as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_use_disjoint_bits() {
        let hash = 0x0001_0203_0405_06ffu64;
        let split = SplitHash::new(hash);
        assert_eq!(split.h2(), 0x7f);
        assert_eq!(split.h1(), hash >> 7);
        assert_eq!(split.reduce(10), index(hash, 10));
    }

    #[test]
    fn fragment_never_sets_high_bit() {
        for hash in [0, 0x80, 0xff, u64::MAX, 0x1234_5678] {
            assert!(metadata(hash) < 0x80);
        }
    }

    #[test]
    fn index_stays_in_bounds() {
        for capacity in [1, 7, 10, 16, 1000] {
            for hash in [0, 1, 0x7f, 0x80, u64::MAX] {
                assert!(index(hash, capacity) < capacity);
            }
        }
    }
}
