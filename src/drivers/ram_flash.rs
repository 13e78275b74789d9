//! Memory backed flash controller.
//!
//! Emulates a uniformly sectored NOR flash over caller owned storage:
//! erasing sets a whole sector to `0xFF`, and programming can only
//! clear bits. Useful to stage images in RAM, and as the reference
//! behaviour of the [`Flash`] contract.
use crate::{
    error::Error as BootloaderError,
    hal::flash::{Address, Flash, Info},
    utilities::{
        bitwise::{is_programmable_over, ERASED_BYTE},
        memory::{is_aligned, IterableBySectors},
    },
};
use core::ops::Range;
use static_assertions::const_assert;

/// Smallest programmable unit, in bytes. Addresses and lengths of
/// program operations must be multiples of it.
pub const PROGRAM_GRANULARITY: u32 = 4;
const_assert!(PROGRAM_GRANULARITY.is_power_of_two());

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Error {
    /// Storage and sector size don't describe a whole number of sectors
    BadGeometry,
    MisalignedAccess,
    OutOfBounds,
    /// Programming would need to set bits that are cleared
    NotErased { sector: u32 },
    /// Sector is write protected
    Protected { sector: u32 },
}

impl From<Error> for BootloaderError {
    fn from(error: Error) -> Self {
        match error {
            Error::BadGeometry | Error::MisalignedAccess | Error::OutOfBounds => {
                BootloaderError::InvalidArgument
            }
            Error::NotErased { sector } | Error::Protected { sector } => {
                BootloaderError::SectorFailure(sector)
            }
        }
    }
}

pub struct RamFlash<'a> {
    memory: &'a mut [u8],
    start: Address,
    sector_size: u32,
    protected: Range<u32>,
}

impl<'a> RamFlash<'a> {
    /// Maps `memory` at `start`, split in sectors of `sector_size` bytes.
    ///
    /// Contents are left as found; erase before programming.
    pub fn new(memory: &'a mut [u8], start: Address, sector_size: u32) -> Result<Self, Error> {
        let size = u32::try_from(memory.len()).map_err(|_| Error::BadGeometry)?;
        let sound = size > 0
            && is_aligned(sector_size, PROGRAM_GRANULARITY)
            && is_aligned(size, sector_size)
            && is_aligned(start.0, PROGRAM_GRANULARITY)
            && start.0.checked_add(size).is_some();
        if !sound {
            return Err(Error::BadGeometry);
        }
        Ok(Self { memory, start, sector_size, protected: 0..0 })
    }

    /// Write protects a range of sectors (absolute indices), replacing
    /// any previous protection.
    pub fn protect(&mut self, sectors: Range<u32>) { self.protected = sectors; }

    pub fn geometry(&self) -> Info {
        let size = self.memory.len() as u32;
        Info {
            start: self.start,
            size,
            sector_size: self.sector_size,
            sector_count: size / self.sector_size,
        }
    }

    /// Offset into the backing storage, if the whole range is mapped.
    fn offset(&self, address: Address, length: u32) -> Result<usize, Error> {
        if self.geometry().contains(address, length) {
            Ok((address - self.start) as usize)
        } else {
            Err(Error::OutOfBounds)
        }
    }

    fn sector_mut(&mut self, sector: u32) -> &mut [u8] {
        let offset = (self.geometry().sector_start(sector) - self.start) as usize;
        &mut self.memory[offset..][..self.sector_size as usize]
    }
}

impl<'a> Flash for RamFlash<'a> {
    type Error = Error;

    fn erase_region(&mut self, start: Address, length: u32) -> nb::Result<(), Self::Error> {
        let offset = self.offset(start, length)? as u32;
        if !is_aligned(offset, self.sector_size) || length % self.sector_size != 0 {
            return Err(nb::Error::Other(Error::MisalignedAccess));
        }

        let first = match self.geometry().sector(start) {
            Some(sector) => sector,
            None if length == 0 => return Ok(()),
            None => return Err(nb::Error::Other(Error::OutOfBounds)),
        };
        for sector in first..(first + length / self.sector_size) {
            if self.protected.contains(&sector) {
                log!(warn, "Refusing to erase protected sector {:?}", sector);
                return Err(nb::Error::Other(Error::Protected { sector }));
            }
            self.sector_mut(sector).iter_mut().for_each(|byte| *byte = ERASED_BYTE);
        }
        Ok(())
    }

    fn program(&mut self, address: Address, bytes: &[u8]) -> nb::Result<(), Self::Error> {
        let length = u32::try_from(bytes.len()).map_err(|_| Error::OutOfBounds)?;
        self.offset(address, length)?;
        if !is_aligned(address.0, PROGRAM_GRANULARITY) || !is_aligned(length, PROGRAM_GRANULARITY)
        {
            return Err(nb::Error::Other(Error::MisalignedAccess));
        }

        for (sector, piece_address, piece) in
            bytes.chunks_per_sector(address.0, self.start.0, self.sector_size)
        {
            if self.protected.contains(&sector) {
                return Err(nb::Error::Other(Error::Protected { sector }));
            }
            let offset = (Address(piece_address) - self.start) as usize;
            let cells = &mut self.memory[offset..offset + piece.len()];
            if !is_programmable_over(piece, cells) {
                return Err(nb::Error::Other(Error::NotErased { sector }));
            }
            cells.iter_mut().zip(piece).for_each(|(cell, byte)| *cell &= *byte);
        }
        Ok(())
    }

    fn info(&self) -> Option<Info> { Some(self.geometry()) }

    fn erase_all(&mut self) -> Option<nb::Result<(), Self::Error>> {
        let Info { start, size, .. } = self.geometry();
        Some(self.erase_region(start, size))
    }

    fn read(&mut self, address: Address, bytes: &mut [u8]) -> Option<nb::Result<(), Self::Error>> {
        let offset = match u32::try_from(bytes.len()).map(|length| self.offset(address, length)) {
            Ok(Ok(offset)) => offset,
            Ok(Err(error)) => return Some(Err(nb::Error::Other(error))),
            Err(_) => return Some(Err(nb::Error::Other(Error::OutOfBounds))),
        };
        let end = offset + bytes.len();
        bytes.copy_from_slice(&self.memory[offset..end]);
        Some(Ok(()))
    }
}
