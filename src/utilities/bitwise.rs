//! Bit level checks on flash contents.
//!
//! NOR flash cells can only be driven from `1` to `0` by a program
//! cycle; going back to `1` takes an erase. These helpers answer
//! whether some data can be programmed over what is already stored.

use core::ops::BitOr;

/// Value of every byte in a freshly erased sector.
pub const ERASED_BYTE: u8 = 0xFF;

/// Checks that every '1' bit is a '1' on the right hand side.
pub trait BitSubset: Copy {
    fn is_subset_of(self, rhs: Self) -> bool;
}

/// Variant of the BitSubset trait for slices.
pub trait SliceBitSubset {
    /// Checks that every '1' in self is '1' in rhs, element by element.
    fn is_subset_of(self, rhs: Self) -> bool;
}

impl<U: Copy + BitOr<Output = Self> + PartialEq> BitSubset for U {
    fn is_subset_of(self, rhs: Self) -> bool { (self | rhs) == rhs }
}

impl<T: BitSubset> SliceBitSubset for &[T] {
    fn is_subset_of(self, rhs: Self) -> bool {
        self.len() <= rhs.len() && self.iter().zip(rhs.iter()).all(|(a, b)| a.is_subset_of(*b))
    }
}

/// Whether `data` can be written over `stored` without an erase.
pub fn is_programmable_over(data: &[u8], stored: &[u8]) -> bool { data.is_subset_of(stored) }

/// Whether every byte in `memory` is in the erased state.
pub fn is_erased(memory: &[u8]) -> bool { memory.iter().all(|&byte| byte == ERASED_BYTE) }
