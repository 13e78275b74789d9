use super::error::FakeError;
use crate::hal::time::{Milliseconds, Ticker};

/// Records how the tick source was driven.
#[derive(Debug, Default)]
pub struct MockTicker {
    pub period: Option<Milliseconds>,
    pub starts: usize,
    pub stops: usize,
    pub fail_to_start: bool,
}

impl MockTicker {
    pub fn is_running(&self) -> bool { self.period.is_some() }
}

impl Ticker for MockTicker {
    type Error = FakeError;

    fn start(&mut self, period: Milliseconds) -> Result<(), Self::Error> {
        if self.fail_to_start {
            return Err(FakeError);
        }
        self.starts += 1;
        self.period = Some(period);
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.period = None;
    }
}
