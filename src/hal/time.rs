//! Time units, and the periodic tick interface.
use crate::error::Error;
use core::fmt;

#[derive(Clone, Copy, Debug, PartialOrd, Ord, PartialEq, Eq)]
pub struct Nanoseconds(pub u32);

#[derive(Clone, Copy, Debug, PartialOrd, Ord, PartialEq, Eq)]
pub struct Milliseconds(pub u32);

/// Bits per second
#[derive(Clone, Copy, Debug, PartialOrd, Ord, PartialEq, Eq)]
pub struct Bps(pub u32);

/// Hertz
#[derive(Clone, Copy, Debug, PartialOrd, Ord, PartialEq, Eq)]
pub struct Hertz(pub u32);

/// MegaHertz
#[derive(Clone, Copy, Debug, PartialOrd, Ord, PartialEq, Eq)]
pub struct MegaHertz(pub u32);

/// Periodic tick source, used as a coarse watchdog clock.
///
/// Once started, the implementer arranges for its interrupt (or
/// cooperative poll) to fire every `period`. Whatever handles that event
/// forwards it to the interested party; the trait only controls the
/// source itself.
pub trait Ticker {
    type Error: Copy + fmt::Debug + Into<Error>;
    fn start(&mut self, period: Milliseconds) -> Result<(), Self::Error>;
    fn stop(&mut self);
}

/// Extension trait that adds convenience methods to the `u32` type
pub trait U32Ext {
    /// Wrap in `Bps`
    fn bps(self) -> Bps;

    /// Wrap in `Hertz`
    fn hz(self) -> Hertz;

    /// Wrap in `MegaHertz`
    fn mhz(self) -> MegaHertz;

    /// Wrap in `Milliseconds`
    fn ms(self) -> Milliseconds;

    /// Wrap in `Nanoseconds`
    fn ns(self) -> Nanoseconds;
}

impl U32Ext for u32 {
    fn bps(self) -> Bps { Bps(self) }

    fn hz(self) -> Hertz { Hertz(self) }

    fn mhz(self) -> MegaHertz { MegaHertz(self) }

    fn ms(self) -> Milliseconds { Milliseconds(self) }

    fn ns(self) -> Nanoseconds { Nanoseconds(self) }
}

impl From<MegaHertz> for Hertz {
    fn from(mhz: MegaHertz) -> Hertz { Hertz(mhz.0 * 1_000_000) }
}

impl Nanoseconds {
    /// Bit rate of a line whose bit period is this long. Integer division,
    /// so the result rounds down.
    pub const fn as_bit_rate(self) -> Option<Bps> {
        if self.0 == 0 {
            None
        } else {
            Some(Bps(1_000_000_000 / self.0))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unit_conversions() {
        assert_eq!(Hertz(84_000_000), Hertz::from(84.mhz()));
    }

    #[test]
    fn bit_periods_convert_to_rates() {
        assert_eq!(8_680.ns().as_bit_rate(), Some(Bps(115_207)));
        assert_eq!(104_166.ns().as_bit_rate(), Some(Bps(9_600)));
        assert_eq!(0.ns().as_bit_rate(), None);
    }
}
