//! Flash controller interface.
//!
//! Every controller supplies the two mutating primitives. Geometry
//! reporting, mass erase and readback are optional: a controller that
//! lacks them keeps the default methods, which report the capability as
//! absent (`None`) rather than doing anything.
use crate::error::Error;
use core::{
    fmt,
    ops::{Add, Sub},
};

/// Absolute flash address.
#[derive(Default, Copy, Clone, Debug, PartialOrd, Ord, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Address(pub u32);

impl Add<u32> for Address {
    type Output = Address;
    fn add(self, rhs: u32) -> Address { Address(self.0 + rhs) }
}

impl Add<usize> for Address {
    type Output = Address;
    fn add(self, rhs: usize) -> Address { Address(self.0 + rhs as u32) }
}

impl Sub<Address> for Address {
    type Output = u32;
    fn sub(self, rhs: Address) -> u32 { self.0.saturating_sub(rhs.0) }
}

/// Flash geometry, all sizes in bytes.
///
/// `sector_count * sector_size` usually equals `size`, but consumers
/// must not rely on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Info {
    pub start: Address,
    pub size: u32,
    pub sector_size: u32,
    pub sector_count: u32,
}

impl Info {
    /// Whether `[address, address + length)` lies entirely inside the flash.
    pub fn contains(&self, address: Address, length: u32) -> bool {
        address >= self.start
            && (address.0 as u64 + length as u64) <= (self.start.0 as u64 + self.size as u64)
    }

    /// Absolute index of the sector holding `address`.
    pub fn sector(&self, address: Address) -> Option<u32> {
        if !self.contains(address, 1) || self.sector_size == 0 {
            return None;
        }
        let index = (address - self.start) / self.sector_size;
        (index < self.sector_count).then(|| index)
    }

    /// Start address of a sector.
    pub fn sector_start(&self, index: u32) -> Address { self.start + index * self.sector_size }
}

/// Physical erase and program cycles of a flash controller.
///
/// `WouldBlock` signals a busy controller before any cell has been
/// touched; the call can be repeated as is.
pub trait Flash {
    type Error: Copy + fmt::Debug + Into<Error>;

    /// Erases every sector covering `[start, start + length)`. Both ends
    /// must be sector aligned.
    fn erase_region(&mut self, start: Address, length: u32) -> nb::Result<(), Self::Error>;

    /// Programs `bytes` at `address`. The destination must have been
    /// erased, and the length must be a multiple of the program
    /// granularity.
    fn program(&mut self, address: Address, bytes: &[u8]) -> nb::Result<(), Self::Error>;

    fn info(&self) -> Option<Info> { None }

    fn erase_all(&mut self) -> Option<nb::Result<(), Self::Error>> { None }

    fn read(
        &mut self,
        _address: Address,
        _bytes: &mut [u8],
    ) -> Option<nb::Result<(), Self::Error>> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const GEOMETRY: Info =
        Info { start: Address(0x0800_0000), size: 0x1_0000, sector_size: 0x400, sector_count: 64 };

    #[test]
    fn addresses_map_to_sectors() {
        assert_eq!(GEOMETRY.sector(Address(0x0800_0000)), Some(0));
        assert_eq!(GEOMETRY.sector(Address(0x0800_07FF)), Some(1));
        assert_eq!(GEOMETRY.sector(Address(0x0800_FFFF)), Some(63));
        assert_eq!(GEOMETRY.sector(Address(0x0801_0000)), None);
        assert_eq!(GEOMETRY.sector(Address(0x07FF_FFFF)), None);
        assert_eq!(GEOMETRY.sector_start(3), Address(0x0800_0C00));
    }

    #[test]
    fn ranges_must_fit_inside_the_flash() {
        assert!(GEOMETRY.contains(Address(0x0800_0000), 0x1_0000));
        assert!(!GEOMETRY.contains(Address(0x0800_0400), 0x1_0000));
        assert!(!GEOMETRY.contains(Address(0xFFFF_FFFF), 2));
    }

    #[test]
    fn sector_lookup_honours_a_short_sector_count() {
        let geometry = Info { sector_count: 2, ..GEOMETRY };
        assert_eq!(geometry.sector(Address(0x0800_0400)), Some(1));
        assert_eq!(geometry.sector(Address(0x0800_0800)), None);
    }
}
