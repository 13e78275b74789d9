//! Controller independent flash service.
//!
//! A thin, stateless view over whichever [`Flash`] driver the board
//! binds. It blocks on the driver's non-blocking primitives, converts
//! driver errors into the bootloader taxonomy, and reports optional
//! capabilities the driver lacks as `Unsupported` (or absent geometry)
//! instead of failing in some driver specific way.
//!
//! The driver owns all controller state and must outlive the service.
//! Only one operation runs at a time, enforced by the exclusive borrow.
use crate::{
    error::Error,
    hal::flash::{Address, Flash, Info},
};
use nb::block;

pub struct FlashService<'a, F: Flash> {
    driver: &'a mut F,
}

impl<'a, F: Flash> FlashService<'a, F> {
    pub fn new(driver: &'a mut F) -> Self { Self { driver } }

    /// Erases the whole sectors covering `[start, start + length)`.
    pub fn erase_region(&mut self, start: Address, length: u32) -> Result<(), Error> {
        block!(self.driver.erase_region(start, length)).map_err(|error| {
            let error: Error = error.into();
            log!(warn, "Flash erase at {:?} failed: {:?}", start.0, error);
            error
        })
    }

    /// Programs `bytes` at `address`, which must have been erased.
    pub fn program(&mut self, address: Address, bytes: &[u8]) -> Result<(), Error> {
        block!(self.driver.program(address, bytes)).map_err(|error| {
            let error: Error = error.into();
            log!(warn, "Flash program at {:?} failed: {:?}", address.0, error);
            error
        })
    }

    /// Geometry of the bound flash, when the driver reports it.
    pub fn info(&self) -> Option<Info> { self.driver.info() }

    pub fn erase_all(&mut self) -> Result<(), Error> {
        loop {
            match self.driver.erase_all() {
                None => return Err(Error::Unsupported),
                Some(Ok(())) => return Ok(()),
                Some(Err(nb::Error::WouldBlock)) => continue,
                Some(Err(nb::Error::Other(error))) => return Err(error.into()),
            }
        }
    }

    pub fn read(&mut self, address: Address, bytes: &mut [u8]) -> Result<(), Error> {
        loop {
            match self.driver.read(address, bytes) {
                None => return Err(Error::Unsupported),
                Some(Ok(())) => return Ok(()),
                Some(Err(nb::Error::WouldBlock)) => continue,
                Some(Err(nb::Error::Other(error))) => return Err(error.into()),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::doubles::{
        error::FakeError,
        flash::{FakeFlash, Operation},
    };

    const GEOMETRY: Info =
        Info { start: Address(0x0800_0000), size: 0x1_0000, sector_size: 0x400, sector_count: 64 };

    /// Driver that implements only the mandatory primitives.
    struct BareFlash {
        erases: usize,
    }

    impl Flash for BareFlash {
        type Error = FakeError;
        fn erase_region(&mut self, _start: Address, _length: u32) -> nb::Result<(), FakeError> {
            self.erases += 1;
            Ok(())
        }
        fn program(&mut self, _address: Address, _bytes: &[u8]) -> nb::Result<(), FakeError> {
            Ok(())
        }
    }

    #[test]
    fn operations_are_forwarded_to_the_driver() {
        // Given
        let mut flash = FakeFlash::new(GEOMETRY);
        let mut service = FlashService::new(&mut flash);
        let data = [0x5Au8; 256];

        // When
        service.erase_region(Address(0x0800_0000), 1024).unwrap();
        service.program(Address(0x0800_0000), &data).unwrap();
        service.erase_all().unwrap();

        // Then
        assert_eq!(service.info(), Some(GEOMETRY));
        assert_eq!(
            flash.operations,
            vec![
                Operation::EraseRegion(Address(0x0800_0000), 1024),
                Operation::Program(Address(0x0800_0000), 256),
                Operation::EraseAll,
            ]
        );
    }

    #[test]
    fn busy_driver_is_polled_until_done() {
        // Given
        let mut flash = FakeFlash::new(GEOMETRY);
        flash.busy_polls = 3;
        let mut service = FlashService::new(&mut flash);
        let mut readback = [0u8; 4];

        // When
        service.program(Address(0x0800_0010), &[1, 2, 3, 4]).unwrap();
        service.read(Address(0x0800_0010), &mut readback).unwrap();

        // Then
        assert_eq!(readback, [1, 2, 3, 4]);
        assert_eq!(flash.operations.len(), 2);
    }

    #[test]
    fn driver_errors_are_converted() {
        let mut flash = FakeFlash::new(GEOMETRY);
        flash.fail_with = Some(FakeError);
        let mut service = FlashService::new(&mut flash);

        assert!(matches!(
            service.erase_region(Address(0x0800_0000), 1024),
            Err(Error::DriverError(_))
        ));
        assert!(matches!(service.erase_all(), Err(Error::DriverError(_))));
    }

    #[test]
    fn missing_capabilities_are_reported_without_side_effects() {
        // Given
        let mut flash = BareFlash { erases: 0 };
        let mut service = FlashService::new(&mut flash);
        let mut buffer = [0u8; 8];

        // Then
        assert_eq!(service.info(), None);
        assert_eq!(service.erase_all(), Err(Error::Unsupported));
        assert_eq!(service.read(Address(0), &mut buffer), Err(Error::Unsupported));
        assert_eq!(flash.erases, 0);
    }

    #[test]
    fn capabilities_can_be_switched_off_on_a_full_driver() {
        let mut flash = FakeFlash::new(GEOMETRY);
        flash.reports_info = false;
        flash.supports_erase_all = false;
        let mut service = FlashService::new(&mut flash);

        assert_eq!(service.info(), None);
        assert_eq!(service.erase_all(), Err(Error::Unsupported));
        assert!(flash.operations.is_empty());
    }
}
