//! Periodic tick driver.
//!
//! One driver feeds the whole registry instead of each countdown
//! rescheduling itself. The driver is wall-clock based: `poll()` reports how
//! many whole seconds elapsed since the last reported boundary and carries
//! the sub-second remainder forward, so irregular polling neither loses nor
//! duplicates seconds.

use std::cell::Cell;
use std::rc::Rc;

/// Source of the current time in milliseconds since the epoch.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Manually advanced clock for deterministic tests. Clones share the time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Debug, Clone)]
pub struct TickDriver<C: Clock> {
    clock: C,
    /// Last whole-second boundary reported, in epoch milliseconds.
    last_tick_ms: Option<u64>,
    max_catch_up_secs: u64,
}

impl<C: Clock> TickDriver<C> {
    pub fn new(clock: C, max_catch_up_secs: u64) -> Self {
        Self {
            clock,
            last_tick_ms: None,
            max_catch_up_secs,
        }
    }

    /// Resume from a previously persisted boundary.
    pub fn resume_from(clock: C, last_tick_ms: u64, max_catch_up_secs: u64) -> Self {
        Self {
            clock,
            last_tick_ms: Some(last_tick_ms),
            max_catch_up_secs,
        }
    }

    pub fn last_tick_ms(&self) -> Option<u64> {
        self.last_tick_ms
    }

    /// Anchor the driver at the current time without reporting ticks.
    pub fn start(&mut self) {
        self.last_tick_ms = Some(self.clock.now_ms());
    }

    /// Number of whole seconds due since the last poll.
    ///
    /// Gaps longer than `max_catch_up_secs` are capped; the boundary still
    /// moves forward by the full elapsed time.
    pub fn poll(&mut self) -> u64 {
        let now = self.clock.now_ms();
        let Some(last) = self.last_tick_ms else {
            self.last_tick_ms = Some(now);
            return 0;
        };
        let whole_secs = now.saturating_sub(last) / 1000;
        self.last_tick_ms = Some(last.saturating_add(whole_secs.saturating_mul(1000)));
        whole_secs.min(self.max_catch_up_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_poll_anchors() {
        let clock = ManualClock::new(10_000);
        let mut driver = TickDriver::new(clock.clone(), 60);
        assert_eq!(driver.poll(), 0);
        assert_eq!(driver.last_tick_ms(), Some(10_000));
    }

    #[test]
    fn carries_sub_second_remainder() {
        let clock = ManualClock::new(0);
        let mut driver = TickDriver::new(clock.clone(), 60);
        driver.start();
        clock.advance(700);
        assert_eq!(driver.poll(), 0);
        clock.advance(700);
        assert_eq!(driver.poll(), 1);
        clock.advance(600);
        assert_eq!(driver.poll(), 1);
        assert_eq!(driver.last_tick_ms(), Some(2_000));
    }

    #[test]
    fn catch_up_is_capped() {
        let clock = ManualClock::new(0);
        let mut driver = TickDriver::new(clock.clone(), 5);
        driver.start();
        clock.advance(60_000);
        assert_eq!(driver.poll(), 5);
        assert_eq!(driver.poll(), 0);
    }

    #[test]
    fn resume_from_persisted_boundary() {
        let clock = ManualClock::new(15_500);
        let mut driver = TickDriver::resume_from(clock, 10_000, 3600);
        assert_eq!(driver.poll(), 5);
    }

    #[test]
    fn clock_going_backwards_yields_nothing() {
        let clock = ManualClock::new(5_000);
        let mut driver = TickDriver::new(clock.clone(), 60);
        driver.start();
        clock.set(1_000);
        assert_eq!(driver.poll(), 0);
    }
}
