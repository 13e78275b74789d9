//! Test doubles for the HAL interfaces. Host only.

pub mod capture;
pub mod error;
pub mod flash;
pub mod time;
