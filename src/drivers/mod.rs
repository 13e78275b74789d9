//! Driver implementations of the [`hal`](crate::hal) interfaces that
//! don't depend on a specific microcontroller.

pub mod ram_flash;
pub mod systick;
