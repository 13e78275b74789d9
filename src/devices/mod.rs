//! Modules with business logic related to the problem domain, that
//! lay on top of abstract drivers. Devices are generic: the board
//! binds concrete drivers and interrupt handlers to them.

pub mod autobaud;
pub mod flash;
pub mod verify;
