//! Refresh sources
//!
//! A refresh source is the display-link equivalent: a periodic signal on its
//! own thread. The pacer only needs `start`, `stop` and `is_running`, which
//! keeps its logic testable with [`ManualRefreshSource`] instead of real
//! hardware timing.
//!
//! Sources deliver ticks through a [`Ticker`], a weak capability pointing at
//! the owning window. A ticker outliving its window simply stops doing
//! anything.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use thiserror::Error;

use crate::config::BridgeConfig;

/// Refresh source errors
#[derive(Error, Debug)]
pub enum RefreshSourceError {
    /// The timing thread could not be spawned
    #[error("Failed to spawn refresh thread: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// The platform refused to arm the source
    #[error("Refresh source unavailable: {0}")]
    Unavailable(String),
}

/// Periodic display-refresh signal
///
/// `stop` must be idempotent. Once `stop` returns, ticks that are still in
/// flight on the source's thread must no longer reach a running pacer; the
/// window enforces this by re-checking pacer state under its lock.
pub trait RefreshSource: Send {
    /// Start firing ticks
    fn start(&mut self) -> Result<(), RefreshSourceError>;

    /// Stop firing ticks
    fn stop(&mut self);

    /// Whether the source is currently firing
    fn is_running(&self) -> bool;
}

impl<S: RefreshSource + ?Sized> RefreshSource for Box<S> {
    fn start(&mut self) -> Result<(), RefreshSourceError> {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }
}

/// Receiver of refresh ticks
pub trait TickTarget: Send + Sync {
    /// Handle one refresh tick
    fn on_tick(self: Arc<Self>);
}

/// Weak handle a refresh source uses to deliver ticks
#[derive(Clone)]
pub struct Ticker {
    target: Weak<dyn TickTarget>,
}

impl Ticker {
    /// Create a ticker for the given target
    pub fn new(target: Weak<dyn TickTarget>) -> Self {
        Self { target }
    }

    /// Deliver one tick; returns `false` if the target is gone
    pub fn tick(&self) -> bool {
        match self.target.upgrade() {
            Some(target) => {
                target.on_tick();
                true
            }
            None => false,
        }
    }

    /// Whether the target still exists
    pub fn is_attached(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[derive(Default)]
struct ManualShared {
    running: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    failing_starts: AtomicUsize,
    ticker: Mutex<Option<Ticker>>,
}

/// Hand-driven refresh source for tests and headless hosts
///
/// Clones share state, so a test can keep one clone and give another to a
/// window, then drive ticks and inspect start/stop counts.
#[derive(Clone, Default)]
pub struct ManualRefreshSource {
    shared: Arc<ManualShared>,
}

impl ManualRefreshSource {
    /// Create a stopped source with no ticker
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the ticker ticks are delivered to, returning a clone for the window
    pub fn attach(&self, ticker: Ticker) -> Self {
        *self.shared.ticker.lock() = Some(ticker);
        self.clone()
    }

    /// Make the next `count` calls to `start` fail
    pub fn fail_next_starts(&self, count: usize) {
        self.shared.failing_starts.store(count, Ordering::SeqCst);
    }

    /// Deliver one tick, whether or not the source is running
    ///
    /// Models a tick that was already on its way when the source stopped.
    pub fn tick(&self) -> bool {
        let ticker = self.shared.ticker.lock().clone();
        ticker.is_some_and(|ticker| ticker.tick())
    }

    /// Deliver up to `count` ticks, stopping early once the source stops
    ///
    /// Returns the number of ticks delivered.
    pub fn advance(&self, count: usize) -> usize {
        let mut delivered = 0;
        for _ in 0..count {
            if !self.is_running() || !self.tick() {
                break;
            }
            delivered += 1;
        }
        delivered
    }

    /// Number of successful starts
    pub fn start_count(&self) -> usize {
        self.shared.starts.load(Ordering::SeqCst)
    }

    /// Number of stop calls
    pub fn stop_count(&self) -> usize {
        self.shared.stops.load(Ordering::SeqCst)
    }
}

impl RefreshSource for ManualRefreshSource {
    fn start(&mut self) -> Result<(), RefreshSourceError> {
        let failing = self.shared.failing_starts.load(Ordering::SeqCst);
        if failing > 0 {
            self.shared.failing_starts.store(failing - 1, Ordering::SeqCst);
            return Err(RefreshSourceError::Unavailable(
                "manual source scripted to fail".to_string(),
            ));
        }
        self.shared.starts.fetch_add(1, Ordering::SeqCst);
        self.shared.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.stops.fetch_add(1, Ordering::SeqCst);
        self.shared.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }
}

struct Worker {
    stop_tx: Sender<()>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn signal(&self) {
        self.running.store(false, Ordering::SeqCst);
        // Capacity one; a full channel already carries a stop
        let _ = self.stop_tx.try_send(());
    }
}

/// Refresh source backed by a timing thread
///
/// Fires at a fixed interval. `stop` never blocks: it signals the thread,
/// which exits at its next wake. This matters because `stop` runs under the
/// window lock, possibly on the timing thread itself when the pacer runs
/// out of budget. The thread is joined on drop when that is safe.
pub struct ThreadRefreshSource {
    ticker: Ticker,
    interval: Duration,
    thread_name: String,
    worker: Option<Worker>,
    retired: Vec<JoinHandle<()>>,
}

impl ThreadRefreshSource {
    /// Create a stopped source ticking at `interval`
    pub fn new(ticker: Ticker, interval: Duration, thread_name: impl Into<String>) -> Self {
        Self {
            ticker,
            interval,
            thread_name: thread_name.into(),
            worker: None,
            retired: Vec::new(),
        }
    }

    /// Create a stopped source using the configured rate and thread name
    pub fn from_config(ticker: Ticker, config: &BridgeConfig) -> Self {
        Self::new(ticker, config.refresh_interval(), config.thread_name.clone())
    }

    /// Tick interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn reap_retired(&mut self) {
        let (finished, pending): (Vec<_>, Vec<_>) =
            self.retired.drain(..).partition(JoinHandle::is_finished);
        self.retired = pending;
        for handle in finished {
            let _ = handle.join();
        }
    }
}

impl RefreshSource for ThreadRefreshSource {
    fn start(&mut self) -> Result<(), RefreshSourceError> {
        if self.is_running() {
            return Ok(());
        }
        // A worker that stopped itself from its own tick is still around
        self.stop();
        self.reap_retired();

        let (stop_tx, stop_rx) = bounded(1);
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let ticker = self.ticker.clone();
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || {
                log::trace!("Refresh thread started ({:?} interval)", interval);
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if !thread_running.load(Ordering::SeqCst) || !ticker.tick() {
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                thread_running.store(false, Ordering::SeqCst);
                log::trace!("Refresh thread exiting");
            })?;

        self.worker = Some(Worker {
            stop_tx,
            running,
            handle: Some(handle),
        });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.signal();
            if let Some(handle) = worker.handle.take() {
                self.retired.push(handle);
            }
        }
    }

    fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| worker.running.load(Ordering::SeqCst))
    }
}

impl Drop for ThreadRefreshSource {
    fn drop(&mut self) {
        self.stop();
        let current = thread::current().id();
        for handle in self.retired.drain(..) {
            // Dropped from the timing thread itself when it held the last
            // strong reference to the window; that thread is exiting anyway
            if handle.thread().id() != current {
                let _ = handle.join();
            }
        }
    }
}
