//! Errors reported when table storage cannot be allocated.
use std::{alloc::Layout, fmt};

/// The error returned by the fallible `try_*` methods of [`FlatTable`](crate::FlatTable).
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// The requested capacity exceeds the maximum size of an allocation.
    CapacityOverflow,
    /// The allocator returned an error.
    AllocError {
        /// The layout of the allocation request that failed.
        layout: Layout,
    },
}

impl TryReserveError {
    /// Returns the error for a failed allocation of an array of `len` values of type `T`.
    pub(crate) fn for_array<T>(len: usize) -> Self {
        match Layout::array::<T>(len) {
            Ok(layout) => TryReserveError::AllocError { layout },
            Err(_) => TryReserveError::CapacityOverflow,
        }
    }

    /// Reports the error as fatal.
    ///
    /// Running out of memory aborts through [`std::alloc::handle_alloc_error`], an overflowing
    /// capacity panics.
    pub(crate) fn fatal(self) -> ! {
        match self {
            TryReserveError::CapacityOverflow => panic!("flat table capacity overflow"),
            TryReserveError::AllocError { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => {
                f.write_str("requested capacity exceeds the maximum allocation size")
            }
            TryReserveError::AllocError { layout } => write!(
                f,
                "failed to allocate {} bytes with alignment {}",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl std::error::Error for TryReserveError {}
