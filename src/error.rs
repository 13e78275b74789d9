//! Error type for the bootloader core as a whole.
//!
//! Driver level errors are converted into this type at the HAL
//! boundary, so the orchestrating bootloader only ever sees one
//! taxonomy. All variants are plain values: nothing in this crate
//! aborts on error, retry policy belongs to the caller.

use crate::hal::flash::Address;
use ufmt::{uWrite, uwriteln};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Error {
    /// Malformed configuration, misaligned address or wrong size multiple
    InvalidArgument,
    /// No complete frame has been captured yet. Retry after more signal
    NotReady,
    /// The estimated bit period lies outside the supported baud range
    OutOfRange,
    /// A flash operation failed at the given sector (absolute index)
    SectorFailure(u32),
    /// The bound driver does not offer this capability
    Unsupported,
    /// Readback found the first differing byte at the given address
    VerifyFailure(Address),
    /// Error caused by a low level peripheral driver
    DriverError(&'static str),
}

impl Error {
    /// Whether waiting for more signal (or re-prompting the host) may
    /// resolve the error.
    pub fn is_retryable(&self) -> bool { matches!(self, Error::NotReady | Error::OutOfRange) }

    /// Reports error via abstract serial device
    pub fn report<W: uWrite>(&self, serial: &mut W) -> Result<(), W::Error> {
        match self {
            Error::InvalidArgument => uwriteln!(serial, "[Argument Error] -> Invalid argument"),
            Error::NotReady => {
                uwriteln!(serial, "[Autobaud Error] -> No complete frame captured yet")
            }
            Error::OutOfRange => {
                uwriteln!(serial, "[Autobaud Error] -> Baud rate outside supported range")
            }
            Error::SectorFailure(sector) => {
                uwriteln!(serial, "[Flash Error] -> Operation failed at sector {}", *sector)
            }
            Error::Unsupported => {
                uwriteln!(serial, "[Flash Error] -> Capability not supported by driver")
            }
            Error::VerifyFailure(address) => {
                uwriteln!(serial, "[Flash Error] -> Readback mismatch at address {}", address.0)
            }
            Error::DriverError(text) => uwriteln!(serial, "[Driver Error] -> {}", *text),
        }
    }
}
