//! Heartbeat LED task body.

use crate::runtime::Sleep;
use embedded_hal::digital::OutputPin;

/// Toggles an LED: off for one half period, on for the next.
#[derive(Debug)]
pub struct Blinker<P, S> {
    pin: P,
    sleep: S,
    half_period_ms: u32,
}

impl<P: OutputPin, S: Sleep> Blinker<P, S> {
    /// Blink `pin`, sleeping through `sleep` between edges.
    pub fn new(pin: P, sleep: S, half_period_ms: u32) -> Self {
        Self {
            pin,
            sleep,
            half_period_ms,
        }
    }

    /// Time spent in each LED state.
    pub fn half_period_ms(&self) -> u32 {
        self.half_period_ms
    }

    /// One full period: clear, wait, set, wait.
    pub fn cycle(&mut self) -> Result<(), P::Error> {
        self.pin.set_low()?;
        self.sleep.sleep_ms(self.half_period_ms);
        self.pin.set_high()?;
        self.sleep.sleep_ms(self.half_period_ms);
        Ok(())
    }

    /// Blink forever.
    pub fn run(mut self) -> ! {
        loop {
            if self.cycle().is_err() {
                warn!("LED pin write failed");
                self.sleep.sleep_ms(self.half_period_ms);
            }
        }
    }

    /// Give back the pin and the sleeper.
    pub fn release(self) -> (P, S) {
        (self.pin, self.sleep)
    }
}
