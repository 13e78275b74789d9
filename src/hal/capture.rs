//! Input capture interface.
//!
//! A capture channel latches the value of a free running hardware
//! counter whenever the monitored line changes level. The raw counter
//! value is handed to whoever services the capture interrupt; this
//! trait only covers channel setup and time conversion.
use crate::{error::Error, hal::time::Nanoseconds};
use core::fmt;

/// Capture channel index, as numbered by the timer peripheral.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Channel(pub u8);

/// Signal transition that latches the counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

pub trait Capture {
    type Error: Copy + fmt::Debug + Into<Error>;

    /// Selects the latching edge for a channel. Events are not delivered
    /// until the channel is enabled.
    fn configure(&mut self, channel: Channel, edge: Edge) -> Result<(), Self::Error>;
    fn enable(&mut self, channel: Channel) -> Result<(), Self::Error>;
    fn disable(&mut self, channel: Channel) -> Result<(), Self::Error>;

    /// Elapsed time between two counter values. `end` may exceed the
    /// counter width when the counter wrapped after `start`.
    fn count_to_time(
        &self,
        channel: Channel,
        start: u64,
        end: u64,
    ) -> Result<Nanoseconds, Self::Error>;
}
