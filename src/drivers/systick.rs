//! SysTick based periodic tick source.
//!
//! Fires the SysTick exception once per configured period. The board's
//! exception handler is expected to forward each tick to
//! [`Session::on_tick`](crate::devices::autobaud::Session::on_tick).
use crate::{
    error,
    hal::time::{Hertz, Milliseconds, Ticker},
};
use cortex_m::peripheral::{syst::SystClkSource, SYST};

/// Largest value the 24 bit reload register accepts.
const MAX_RELOAD: u32 = 0x00FF_FFFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Error {
    /// The period is shorter than a single core clock cycle.
    PeriodTooShort,
    /// The period does not fit in the reload register at this clock.
    PeriodTooLong,
}

impl From<Error> for error::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::PeriodTooShort => error::Error::DriverError("[SysTick] Period too short"),
            Error::PeriodTooLong => error::Error::DriverError("[SysTick] Period too long"),
        }
    }
}

pub struct SysTick {
    syst: SYST,
    clock: Hertz,
}

impl SysTick {
    /// Takes ownership of the core SysTick, clocked from the core clock.
    pub fn new(syst: SYST, clock: impl Into<Hertz>) -> Self {
        Self { syst, clock: clock.into() }
    }

    /// Returns the underlying peripheral, stopping it first.
    pub fn free(mut self) -> SYST {
        self.stop();
        self.syst
    }
}

/// Reload register value producing one wrap every `period`.
pub fn reload_value(clock: Hertz, period: Milliseconds) -> Result<u32, Error> {
    let ticks = (clock.0 as u64 * period.0 as u64) / 1000;
    match ticks {
        0 => Err(Error::PeriodTooShort),
        ticks if ticks - 1 > MAX_RELOAD as u64 => Err(Error::PeriodTooLong),
        ticks => Ok((ticks - 1) as u32),
    }
}

impl Ticker for SysTick {
    type Error = Error;

    fn start(&mut self, period: Milliseconds) -> Result<(), Self::Error> {
        let reload = reload_value(self.clock, period)?;
        self.syst.disable_counter();
        self.syst.set_clock_source(SystClkSource::Core);
        self.syst.set_reload(reload);
        self.syst.clear_current();
        self.syst.enable_interrupt();
        self.syst.enable_counter();
        Ok(())
    }

    fn stop(&mut self) {
        self.syst.disable_interrupt();
        self.syst.disable_counter();
    }
}
