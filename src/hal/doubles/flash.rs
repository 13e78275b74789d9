use super::error::FakeError;
use crate::hal::flash::{self, Address, Info};
use std::vec::Vec;

/// What the fake was asked to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    EraseRegion(Address, u32),
    Program(Address, usize),
    EraseAll,
    Read(Address, usize),
}

/// Flash double with switchable optional capabilities and scripted
/// busy periods. Performs no validation: it stores whatever it is told.
pub struct FakeFlash {
    pub geometry: Info,
    pub data: Vec<u8>,
    pub operations: Vec<Operation>,
    /// Number of `WouldBlock` answers before each operation goes through
    pub busy_polls: usize,
    pub reports_info: bool,
    pub supports_erase_all: bool,
    pub supports_read: bool,
    pub fail_with: Option<FakeError>,
    polls: usize,
}

impl FakeFlash {
    pub fn new(geometry: Info) -> FakeFlash {
        FakeFlash {
            geometry,
            data: vec![0xFF; geometry.size as usize],
            operations: Vec::new(),
            busy_polls: 0,
            reports_info: true,
            supports_erase_all: true,
            supports_read: true,
            fail_with: None,
            polls: 0,
        }
    }

    fn ready(&mut self) -> nb::Result<(), FakeError> {
        if self.polls < self.busy_polls {
            self.polls += 1;
            return Err(nb::Error::WouldBlock);
        }
        self.polls = 0;
        match self.fail_with {
            Some(error) => Err(nb::Error::Other(error)),
            None => Ok(()),
        }
    }

    fn offset(&self, address: Address) -> usize { (address - self.geometry.start) as usize }
}

impl flash::Flash for FakeFlash {
    type Error = FakeError;

    fn erase_region(&mut self, start: Address, length: u32) -> nb::Result<(), Self::Error> {
        self.ready()?;
        self.operations.push(Operation::EraseRegion(start, length));
        let offset = self.offset(start);
        self.data.iter_mut().skip(offset).take(length as usize).for_each(|byte| *byte = 0xFF);
        Ok(())
    }

    fn program(&mut self, address: Address, bytes: &[u8]) -> nb::Result<(), Self::Error> {
        self.ready()?;
        self.operations.push(Operation::Program(address, bytes.len()));
        let offset = self.offset(address);
        self.data.iter_mut().skip(offset).zip(bytes).for_each(|(o, i)| *o = *i);
        Ok(())
    }

    fn info(&self) -> Option<Info> { self.reports_info.then(|| self.geometry) }

    fn erase_all(&mut self) -> Option<nb::Result<(), Self::Error>> {
        if !self.supports_erase_all {
            return None;
        }
        Some(self.ready().map(|_| {
            self.operations.push(Operation::EraseAll);
            self.data.iter_mut().for_each(|byte| *byte = 0xFF);
        }))
    }

    fn read(&mut self, address: Address, bytes: &mut [u8]) -> Option<nb::Result<(), Self::Error>> {
        if !self.supports_read {
            return None;
        }
        Some(self.ready().map(|_| {
            self.operations.push(Operation::Read(address, bytes.len()));
            let offset = self.offset(address);
            self.data.iter().skip(offset).zip(bytes.iter_mut()).for_each(|(i, o)| *o = *i);
        }))
    }
}
