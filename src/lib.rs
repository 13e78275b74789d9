//! # Serial Bootloader Core
//!
//! Timing critical building blocks of a serial firmware update
//! bootloader, in library form:
//!
//! * An autobaud detector that infers the host baud rate from the
//!   timing of UART edges captured by a hardware timer.
//! * A flash service that erases and programs firmware images through
//!   a uniform contract, regardless of the flash controller behind it.
//!
//! Board wiring (which timer, which pins, which interrupt handlers) is
//! left to the application, which binds concrete drivers to the
//! abstract interfaces in [`hal`].
#![cfg_attr(test, allow(unused_imports))]
#![cfg_attr(target_arch = "arm", no_std)]

extern crate static_assertions;

#[macro_use]
pub mod utilities {
    #[macro_use]
    mod macros;
    pub mod bitwise;
    pub mod memory;
}

pub mod hal;
pub mod devices;
pub mod drivers;
pub mod error;
