use super::error::FakeError;
use crate::hal::{
    capture::{Capture, Channel, Edge},
    time::Nanoseconds,
};

/// Capture channel whose counter advances one tick every
/// `tick_period` nanoseconds.
#[derive(Debug)]
pub struct MockCapture {
    pub tick_period: Nanoseconds,
    pub configured: Option<(Channel, Edge)>,
    pub enabled: Option<Channel>,
    pub disables: usize,
    pub fail_conversions: bool,
}

impl MockCapture {
    pub fn new(tick_period: Nanoseconds) -> Self {
        Self { tick_period, configured: None, enabled: None, disables: 0, fail_conversions: false }
    }
}

impl Capture for MockCapture {
    type Error = FakeError;

    fn configure(&mut self, channel: Channel, edge: Edge) -> Result<(), Self::Error> {
        self.configured = Some((channel, edge));
        Ok(())
    }

    fn enable(&mut self, channel: Channel) -> Result<(), Self::Error> {
        match self.configured {
            Some((configured, _)) if configured == channel => {
                self.enabled = Some(channel);
                Ok(())
            }
            _ => Err(FakeError),
        }
    }

    fn disable(&mut self, _channel: Channel) -> Result<(), Self::Error> {
        self.disables += 1;
        self.enabled = None;
        Ok(())
    }

    fn count_to_time(
        &self,
        _channel: Channel,
        start: u64,
        end: u64,
    ) -> Result<Nanoseconds, Self::Error> {
        if self.fail_conversions || end < start {
            return Err(FakeError);
        }
        let nanoseconds = (end - start).saturating_mul(self.tick_period.0 as u64);
        Ok(Nanoseconds(nanoseconds.min(u32::MAX as u64) as u32))
    }
}
