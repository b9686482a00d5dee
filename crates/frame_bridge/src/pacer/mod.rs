//! Demand-driven frame pacing
//!
//! The pacer keeps a refresh source running while frames are wanted and
//! stops it once nobody has asked for one in a while. Every `request_frame`
//! refills the idle budget; every tick spends one unit. When the budget hits
//! zero the source is stopped, so an idle window costs nothing.
//!
//! A tick is split in two so the caller can run the render callback without
//! holding its lock:
//!
//! ```text
//! lock   -> begin_tick() -> unlock
//!           callback
//! lock   -> end_tick()   -> unlock
//! ```
//!
//! A frame request made from inside the callback renews the budget and is
//! not consumed by the tick that was running at the time.

pub mod source;

pub use source::{
    ManualRefreshSource, RefreshSource, RefreshSourceError, ThreadRefreshSource, TickTarget,
    Ticker,
};

use crate::error::BridgeResult;

/// Ticks the pacer keeps running after the last frame request
pub const DEFAULT_IDLE_BUDGET: u32 = 12;

/// Result of finishing a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No tick was in progress; nothing was delivered
    Idle,
    /// The source keeps running
    Continue {
        /// Ticks left before the source stops
        remaining: u32,
    },
    /// This tick used up the budget, or the pacer was stopped meanwhile
    Stopped,
}

/// Idle-budget frame pacer over a refresh source
#[derive(Debug)]
pub struct FramePacer<S: RefreshSource> {
    source: S,
    budget: u32,
    idle_budget: u32,
    running: bool,
    in_tick: bool,
    renewed_in_tick: bool,
    ticks_delivered: u64,
}

impl<S: RefreshSource> FramePacer<S> {
    /// Create a stopped pacer with the default idle budget
    pub fn new(source: S) -> Self {
        Self::with_budget(source, DEFAULT_IDLE_BUDGET)
    }

    /// Create a stopped pacer with a custom idle budget
    pub fn with_budget(source: S, budget: u32) -> Self {
        debug_assert!(budget > 0, "idle budget must be at least one tick");
        Self {
            source,
            budget: budget.max(1),
            idle_budget: 0,
            running: false,
            in_tick: false,
            renewed_in_tick: false,
            ticks_delivered: 0,
        }
    }

    /// Ask for frames: refill the budget and start the source if needed
    ///
    /// On failure the pacer stays stopped and the error is returned; the next
    /// call tries again.
    pub fn request_frame(&mut self) -> BridgeResult<()> {
        self.idle_budget = self.budget;
        if self.in_tick {
            self.renewed_in_tick = true;
        }
        if self.running {
            return Ok(());
        }

        match self.source.start() {
            Ok(()) => {
                self.running = true;
                log::debug!("Frame pacer started ({} tick budget)", self.budget);
                Ok(())
            }
            Err(e) => {
                log::warn!("Frame pacer could not start its refresh source: {}", e);
                self.idle_budget = 0;
                Err(e.into())
            }
        }
    }

    /// Start a tick
    ///
    /// Returns `false` when the pacer is not running or another tick is
    /// still in progress; the caller must then skip the render callback.
    /// The second case happens when a restarted source fires while a tick
    /// from the one it replaced has not finished.
    pub fn begin_tick(&mut self) -> bool {
        if !self.running || self.in_tick {
            return false;
        }
        self.in_tick = true;
        self.renewed_in_tick = false;
        self.ticks_delivered += 1;
        true
    }

    /// Finish a tick started with [`begin_tick`](Self::begin_tick)
    pub fn end_tick(&mut self) -> TickOutcome {
        if !self.in_tick {
            return TickOutcome::Idle;
        }
        self.in_tick = false;

        if !self.running {
            return TickOutcome::Stopped;
        }
        if std::mem::take(&mut self.renewed_in_tick) {
            return TickOutcome::Continue {
                remaining: self.idle_budget,
            };
        }

        self.idle_budget = self.idle_budget.saturating_sub(1);
        if self.idle_budget == 0 {
            log::debug!("Frame pacer idle, stopping refresh source");
            self.halt();
            TickOutcome::Stopped
        } else {
            TickOutcome::Continue {
                remaining: self.idle_budget,
            }
        }
    }

    /// Run a whole tick, delivering through `deliver`
    ///
    /// For single-owner use; the window splits the tick to drop its lock
    /// around the callback instead.
    pub fn on_tick(&mut self, deliver: impl FnOnce(&mut Self)) -> TickOutcome {
        if !self.begin_tick() {
            return TickOutcome::Idle;
        }
        deliver(self);
        self.end_tick()
    }

    /// Stop the source unconditionally
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Frame pacer stopped");
        }
        self.halt();
    }

    /// Whether the source is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks left before the source stops
    pub fn idle_budget(&self) -> u32 {
        self.idle_budget
    }

    /// Budget restored by each frame request
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Total ticks delivered since creation
    pub fn ticks_delivered(&self) -> u64 {
        self.ticks_delivered
    }

    /// The refresh source
    pub fn source(&self) -> &S {
        &self.source
    }

    fn halt(&mut self) {
        self.source.stop();
        self.running = false;
        self.idle_budget = 0;
        self.renewed_in_tick = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;

    fn pacer() -> (FramePacer<ManualRefreshSource>, ManualRefreshSource) {
        let clock = ManualRefreshSource::new();
        (FramePacer::new(clock.clone()), clock)
    }

    fn count_ticks(pacer: &mut FramePacer<ManualRefreshSource>, max: usize) -> usize {
        let mut delivered = 0;
        for _ in 0..max {
            let mut called = false;
            pacer.on_tick(|_| called = true);
            if called {
                delivered += 1;
            }
        }
        delivered
    }

    #[test]
    fn test_request_starts_source() {
        let (mut pacer, clock) = pacer();
        assert!(!pacer.is_running());

        pacer.request_frame().unwrap();
        assert!(pacer.is_running());
        assert!(clock.is_running());
        assert_eq!(pacer.idle_budget(), DEFAULT_IDLE_BUDGET);
    }

    #[test]
    fn test_stops_after_budget() {
        let (mut pacer, clock) = pacer();
        pacer.request_frame().unwrap();

        assert_eq!(count_ticks(&mut pacer, 20), 12);
        assert!(!pacer.is_running());
        assert!(!clock.is_running());
        assert_eq!(clock.stop_count(), 1);
    }

    #[test]
    fn test_thirteenth_tick_not_delivered() {
        let (mut pacer, _clock) = pacer();
        pacer.request_frame().unwrap();

        for tick in 1..=12 {
            let outcome = pacer.on_tick(|_| {});
            if tick < 12 {
                assert_eq!(outcome, TickOutcome::Continue { remaining: 12 - tick });
            } else {
                assert_eq!(outcome, TickOutcome::Stopped);
            }
        }

        let mut called = false;
        assert_eq!(pacer.on_tick(|_| called = true), TickOutcome::Idle);
        assert!(!called);
    }

    #[test]
    fn test_request_renews_budget() {
        let (mut pacer, clock) = pacer();
        pacer.request_frame().unwrap();

        assert_eq!(count_ticks(&mut pacer, 5), 5);
        assert_eq!(pacer.idle_budget(), 7);

        pacer.request_frame().unwrap();
        assert_eq!(pacer.idle_budget(), 12);
        assert_eq!(count_ticks(&mut pacer, 20), 12);
        assert_eq!(clock.start_count(), 1);
    }

    #[test]
    fn test_no_double_start() {
        let (mut pacer, clock) = pacer();
        pacer.request_frame().unwrap();
        pacer.request_frame().unwrap();
        pacer.request_frame().unwrap();
        assert_eq!(clock.start_count(), 1);
    }

    #[test]
    fn test_request_inside_tick_not_consumed() {
        let (mut pacer, _clock) = pacer();
        pacer.request_frame().unwrap();
        assert_eq!(count_ticks(&mut pacer, 11), 11);
        assert_eq!(pacer.idle_budget(), 1);

        // Last tick of the budget asks for more frames
        let outcome = pacer.on_tick(|pacer| pacer.request_frame().unwrap());
        assert_eq!(outcome, TickOutcome::Continue { remaining: 12 });
        assert!(pacer.is_running());
        assert_eq!(count_ticks(&mut pacer, 20), 12);
    }

    #[test]
    fn test_start_failure_is_recoverable() {
        let (mut pacer, clock) = pacer();
        clock.fail_next_starts(1);

        let result = pacer.request_frame();
        assert!(matches!(result, Err(BridgeError::PacerStartFailed(_))));
        assert!(!pacer.is_running());
        assert_eq!(count_ticks(&mut pacer, 3), 0);

        pacer.request_frame().unwrap();
        assert!(pacer.is_running());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut pacer, clock) = pacer();
        pacer.request_frame().unwrap();
        pacer.stop();
        pacer.stop();

        assert!(!pacer.is_running());
        assert!(!clock.is_running());
        assert_eq!(count_ticks(&mut pacer, 3), 0);
    }

    #[test]
    fn test_stop_during_tick() {
        let (mut pacer, _clock) = pacer();
        pacer.request_frame().unwrap();

        assert!(pacer.begin_tick());
        pacer.stop();
        assert_eq!(pacer.end_tick(), TickOutcome::Stopped);
        assert_eq!(pacer.end_tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_overlapping_tick_dropped() {
        let (mut pacer, _clock) = pacer();
        pacer.request_frame().unwrap();

        // Old tick still running when the restarted source fires
        assert!(pacer.begin_tick());
        pacer.stop();
        pacer.request_frame().unwrap();
        assert!(!pacer.begin_tick());
        assert_eq!(pacer.ticks_delivered(), 1);

        // The request was made mid-tick, so the old tick does not spend it
        assert_eq!(pacer.end_tick(), TickOutcome::Continue { remaining: 12 });
        assert_eq!(pacer.end_tick(), TickOutcome::Idle);

        assert!(pacer.begin_tick());
        assert_eq!(pacer.end_tick(), TickOutcome::Continue { remaining: 11 });
    }

    #[test]
    fn test_custom_budget() {
        let clock = ManualRefreshSource::new();
        let mut pacer = FramePacer::with_budget(clock, 3);
        pacer.request_frame().unwrap();
        assert_eq!(count_ticks(&mut pacer, 10), 3);
        assert_eq!(pacer.ticks_delivered(), 3);
    }
}
