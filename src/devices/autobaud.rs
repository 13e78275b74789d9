//! Automatic baud rate detection.
//!
//! The host starts talking at an unknown baud rate. Every transition on
//! the receive line latches a hardware counter through a capture
//! channel, and a 1 ms tick measures the silence between characters.
//! Once the line has been quiet for the configured timeout, the edges
//! seen so far form a closed frame, and the shortest interval between
//! two of them is taken as the bit period.
//!
//! Interrupt handlers own nothing but a shared reference to a
//! [`Session`], usually a `static`:
//!
//! ```ignore
//! static AUTOBAUD: Session = Session::new();
//!
//! #[interrupt]
//! fn TIM1_CC() { AUTOBAUD.on_edge(capture_register_value()) }
//!
//! #[exception]
//! fn SysTick() { AUTOBAUD.on_tick() }
//! ```
use crate::{
    error::Error,
    hal::{
        capture::{Capture, Channel, Edge},
        time::{Bps, Milliseconds, Nanoseconds, Ticker},
    },
};
use core::cell::RefCell;
use critical_section::Mutex;
use static_assertions::const_assert;

/// Edges kept per frame: start bit, eight data bits and stop bit.
pub const FRAME_CAPACITY: usize = 10;

/// A frame needs at least one interval to say anything about timing.
const MINIMUM_FRAME_EDGES: usize = 2;
const_assert!(FRAME_CAPACITY >= MINIMUM_FRAME_EDGES);

/// Period of the watchdog tick. The timeout is counted in these.
pub const TICK_PERIOD: Milliseconds = Milliseconds(1);

/// Shortest supported bit period (500000 bps).
pub const MIN_BIT_PERIOD: Nanoseconds = Nanoseconds(2_000);
/// Longest supported bit period (1000 bps).
pub const MAX_BIT_PERIOD: Nanoseconds = Nanoseconds(1_000_000);

/// Static description of the capture hardware backing a detector.
#[derive(Copy, Clone, Debug)]
pub struct Config {
    pub channel: Channel,
    /// Width of the capture counter, in bits
    pub counter_width: u8,
    /// Line silence that closes a frame
    pub timeout: Milliseconds,
    pub edge: Edge,
    /// Capture pin, for information only
    pub pin: Option<u8>,
    /// Runs before the capture channel is armed, e.g. to set the timer
    /// prescaler so captured ticks land in a useful range
    pub platform_init: Option<fn()>,
    pub platform_deinit: Option<fn()>,
    /// Reports whether the capture counter overflowed
    pub overflow_status: Option<fn() -> bool>,
}

impl Config {
    /// 16 bit counter, 10 ms timeout, rising edges, no hooks.
    pub const fn new(channel: Channel) -> Self {
        Self {
            channel,
            counter_width: 16,
            timeout: Milliseconds(10),
            edge: Edge::Rising,
            pin: None,
            platform_init: None,
            platform_deinit: None,
            overflow_status: None,
        }
    }

    pub const fn with_counter_width(self, counter_width: u8) -> Self {
        Self { counter_width, ..self }
    }

    pub const fn with_timeout(self, timeout: Milliseconds) -> Self { Self { timeout, ..self } }

    pub const fn with_edge(self, edge: Edge) -> Self { Self { edge, ..self } }

    pub const fn with_pin(self, pin: u8) -> Self { Self { pin: Some(pin), ..self } }

    pub const fn with_platform_hooks(self, init: Option<fn()>, deinit: Option<fn()>) -> Self {
        Self { platform_init: init, platform_deinit: deinit, ..self }
    }

    pub const fn with_overflow_status(self, status: fn() -> bool) -> Self {
        Self { overflow_status: Some(status), ..self }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let width_valid = (1..=32).contains(&self.counter_width);
        let timeout_valid = self.timeout.0 > 0;
        if width_valid && timeout_valid {
            Ok(())
        } else {
            Err(Error::InvalidArgument)
        }
    }
}

#[derive(Debug)]
struct Frame {
    edges: [u32; FRAME_CAPACITY],
    /// Edges captured since the last frame closed
    edge_count: usize,
    /// Edges in the last closed frame, zero once consumed
    pulses: usize,
    /// Ticks since the last edge
    elapsed: u32,
    /// Ticks of silence that close a frame. Zero while disarmed
    timeout: u32,
    ready: bool,
}

impl Frame {
    const fn new() -> Self {
        Self {
            edges: [0; FRAME_CAPACITY],
            edge_count: 0,
            pulses: 0,
            elapsed: 0,
            timeout: 0,
            ready: false,
        }
    }

    fn is_armed(&self) -> bool { self.timeout > 0 }

    fn record(&mut self, counter: u32) {
        if !self.is_armed() {
            return;
        }
        if self.edge_count < FRAME_CAPACITY {
            self.edges[self.edge_count] = counter;
            self.edge_count += 1;
        }
        self.ready = true;
        self.elapsed = 0;
    }

    fn tick(&mut self) {
        if !self.is_armed() {
            return;
        }
        self.elapsed += 1;
        if self.elapsed < self.timeout {
            return;
        }

        // A silent period expires the previous frame. A lone edge carries
        // no interval and closes nothing either.
        self.elapsed = 0;
        self.pulses = if self.edge_count < MINIMUM_FRAME_EDGES { 0 } else { self.edge_count };
        self.edge_count = 0;
    }

    fn is_complete(&self) -> bool { self.ready && self.edge_count == 0 && self.pulses > 0 }

    fn closed(&self) -> &[u32] { &self.edges[..self.pulses] }

    fn consume(&mut self) {
        self.edges = [0; FRAME_CAPACITY];
        self.pulses = 0;
        self.ready = false;
    }
}

/// Detector state shared between the capture interrupt, the tick
/// interrupt and the mainline. Every access happens inside a critical
/// section.
pub struct Session {
    frame: Mutex<RefCell<Frame>>,
}

impl Session {
    /// Disarmed session. Events are ignored until a detector is
    /// initialised on it.
    pub const fn new() -> Self { Self { frame: Mutex::new(RefCell::new(Frame::new())) } }

    /// Capture interrupt entry point, with the latched counter value.
    pub fn on_edge(&self, counter: u32) {
        critical_section::with(|cs| self.frame.borrow_ref_mut(cs).record(counter));
    }

    /// Tick interrupt entry point.
    pub fn on_tick(&self) { critical_section::with(|cs| self.frame.borrow_ref_mut(cs).tick()); }

    /// Whether a closed frame is waiting to be measured.
    pub fn is_ready(&self) -> bool {
        critical_section::with(|cs| self.frame.borrow_ref(cs).is_complete())
    }

    fn arm(&self, timeout: Milliseconds) {
        critical_section::with(|cs| {
            let mut frame = self.frame.borrow_ref_mut(cs);
            *frame = Frame::new();
            frame.timeout = timeout.0;
        });
    }

    fn disarm(&self) {
        critical_section::with(|cs| *self.frame.borrow_ref_mut(cs) = Frame::new());
    }
}

impl Default for Session {
    fn default() -> Self { Self::new() }
}

/// Counter ticks between two captures of a `width` bit counter. Only a
/// single wrap between the two is accounted for.
pub fn wrapped_delta(earlier: u32, later: u32, width: u8) -> u64 {
    let (earlier, later) = (earlier as u64, later as u64);
    if later < earlier {
        later + ((1u64 << width) - 1) - earlier
    } else {
        later - earlier
    }
}

/// Whether `width` is 1.4 to 1.6 times `minimum`, in tenths.
fn is_one_and_a_half(width: u32, minimum: u32) -> bool {
    minimum != 0 && (14..=16).contains(&(width as u64 * 10 / minimum as u64))
}

/// Shortest bit interval in a closed frame.
///
/// Intervals are walked in arrival order against a running minimum.
/// Every interval that measures about one and a half times the minimum
/// so far reveals that minimum as two bits wide, so it is halved.
fn estimate_bit_period<F>(
    edges: &[u32],
    counter_width: u8,
    mut to_time: F,
) -> Result<Nanoseconds, Error>
where
    F: FnMut(u64, u64) -> Result<Nanoseconds, Error>,
{
    let mut minimum: Option<u32> = None;
    for pair in edges.windows(2) {
        let start = pair[0] as u64;
        let end = start + wrapped_delta(pair[0], pair[1], counter_width);
        let width = to_time(start, end)?.0;
        minimum = Some(match minimum {
            None => width,
            Some(minimum) if is_one_and_a_half(width, minimum) => minimum / 2,
            Some(minimum) => minimum.min(width),
        });
    }
    minimum.map(Nanoseconds).ok_or(Error::NotReady)
}

/// Autobaud detector bound to a capture channel and a tick source.
pub struct Autobaud<'s, C: Capture, T: Ticker> {
    session: &'s Session,
    capture: C,
    ticker: T,
    config: Config,
}

impl<'s, C: Capture, T: Ticker> Autobaud<'s, C, T> {
    /// Resets the session and starts listening. From this point on the
    /// board is expected to forward capture and tick events to `session`.
    pub fn init(
        session: &'s Session,
        config: Config,
        mut capture: C,
        mut ticker: T,
    ) -> Result<Self, Error> {
        config.validate()?;
        session.arm(config.timeout);
        if let Some(init) = config.platform_init {
            init();
        }

        if let Err(error) = Self::start_sources(&config, &mut capture, &mut ticker) {
            session.disarm();
            ticker.stop();
            capture.disable(config.channel).ok();
            if let Some(deinit) = config.platform_deinit {
                deinit();
            }
            log!(warn, "Autobaud failed to start: {:?}", error);
            return Err(error);
        }

        log!(info, "Autobaud listening on capture channel {:?}", config.channel.0);
        Ok(Self { session, capture, ticker, config })
    }

    fn start_sources(config: &Config, capture: &mut C, ticker: &mut T) -> Result<(), Error> {
        capture.configure(config.channel, config.edge).map_err(Into::<Error>::into)?;
        capture.enable(config.channel).map_err(Into::<Error>::into)?;
        ticker.start(TICK_PERIOD).map_err(Into::<Error>::into)
    }

    /// Stops the watchdog and the capture channel, runs the platform
    /// deinit hook, and hands the drivers back.
    pub fn deinit(mut self) -> (C, T) {
        self.ticker.stop();
        if let Err(error) = self.capture.disable(self.config.channel) {
            let error: Error = error.into();
            log!(warn, "Failed to disable capture channel: {:?}", error);
        }
        self.session.disarm();
        if let Some(deinit) = self.config.platform_deinit {
            deinit();
        }
        log!(info, "Autobaud stopped");
        (self.capture, self.ticker)
    }

    /// Measures the last closed frame.
    ///
    /// `NotReady` leaves the session untouched. Any other outcome of a
    /// measurement consumes the frame, except a failed counter
    /// conversion, which keeps it for a later attempt.
    pub fn baudrate(&mut self) -> Result<Bps, Error> {
        let Self { session, capture, config, .. } = self;
        let result = critical_section::with(|cs| {
            let mut frame = session.frame.borrow_ref_mut(cs);
            if !frame.is_complete() {
                return Err(Error::NotReady);
            }

            let period = estimate_bit_period(frame.closed(), config.counter_width, |start, end| {
                capture.count_to_time(config.channel, start, end).map_err(Into::<Error>::into)
            })?;
            frame.consume();

            if period < MIN_BIT_PERIOD || period > MAX_BIT_PERIOD {
                return Err(Error::OutOfRange);
            }
            period.as_bit_rate().ok_or(Error::OutOfRange)
        });

        match result {
            Ok(baud) => log!(info, "Baud rate detected: {:?} bps", baud.0),
            Err(Error::OutOfRange) => log!(warn, "Bit period out of range, frame discarded"),
            Err(_) => {}
        }
        result
    }

    /// Whether a closed frame is waiting to be measured.
    pub fn is_ready(&self) -> bool { self.session.is_ready() }

    /// Queries the platform overflow flag, if a hook was configured.
    pub fn counter_overflowed(&self) -> Option<bool> {
        self.config.overflow_status.map(|status| status())
    }

    pub fn pin(&self) -> Option<u8> { self.config.pin }

    pub fn config(&self) -> &Config { &self.config }
}
