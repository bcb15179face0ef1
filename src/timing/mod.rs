//! # Timing facility
//!
//! A free-running tick counter abstraction plus a start/stop measurement used
//! to time every diagnostic pass. Elapsed ticks are converted to whole
//! milliseconds; sub-millisecond precision is not provided.
//!
//! ```rust
//! use core::cell::Cell;
//! use sdramdiag::timing::{Clock, Measurement};
//!
//! struct Counter(Cell<u32>);
//!
//! impl Clock for Counter {
//!     fn now(&self) -> u32 {
//!         let t = self.0.get();
//!         self.0.set(t + 84_000);
//!         t
//!     }
//!
//!     fn frequency(&self) -> u32 {
//!         168_000_000
//!     }
//! }
//!
//! let clock = Counter(Cell::new(0));
//! let mut tm = Measurement::new();
//! tm.start(&clock);
//! tm.stop(&clock);
//! assert_eq!(tm.last_ms(&clock), 0);
//! ```

/// A monotonic, wrapping tick counter.
///
/// On Cortex-M parts this is usually the DWT cycle counter, in which case
/// [`frequency`](Clock::frequency) is the core clock.
pub trait Clock {
    /// Current counter value. Wraps around on overflow.
    fn now(&self) -> u32;

    /// Counter frequency in ticks per second.
    fn frequency(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> u32 {
        (**self).now()
    }

    fn frequency(&self) -> u32 {
        (**self).frequency()
    }
}

/// Convert a tick count to whole milliseconds, rounding down.
///
/// A zero frequency yields zero rather than dividing by zero.
pub fn ticks_to_ms(ticks: u32, frequency: u32) -> u32 {
    if frequency == 0 {
        return 0;
    }
    (u64::from(ticks) * 1000 / u64::from(frequency)) as u32
}

/// One time measurement: the tick at which it was started and the duration
/// of the last completed start/stop pair.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    start: u32,
    last: u32,
}

impl Measurement {
    /// A measurement with no recorded duration.
    pub const fn new() -> Self {
        Self { start: 0, last: 0 }
    }

    /// Record the current tick as the starting point.
    pub fn start<C: Clock>(&mut self, clock: &C) {
        self.start = clock.now();
    }

    /// Record the ticks elapsed since [`start`](Self::start). Counter
    /// wrap-around between start and stop is handled.
    pub fn stop<C: Clock>(&mut self, clock: &C) {
        self.last = clock.now().wrapping_sub(self.start);
    }

    /// Duration of the last start/stop pair in ticks.
    pub fn last(&self) -> u32 {
        self.last
    }

    /// Duration of the last start/stop pair in whole milliseconds.
    pub fn last_ms<C: Clock>(&self, clock: &C) -> u32 {
        ticks_to_ms(self.last, clock.frequency())
    }
}

/// Run `f` between a start and a stop and return its result together with
/// the elapsed milliseconds.
pub fn timed<C: Clock, T>(clock: &C, f: impl FnOnce() -> T) -> (T, u32) {
    let mut tm = Measurement::new();
    tm.start(clock);
    let value = f();
    tm.stop(clock);
    (value, tm.last_ms(clock))
}
