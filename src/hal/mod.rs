//! Hardware Abstraction Layer, containing interfaces
//! for low level drivers.

pub mod capture;
pub mod flash;
pub mod time;

#[cfg(not(target_arch = "arm"))]
#[doc(hidden)]
pub mod doubles;
