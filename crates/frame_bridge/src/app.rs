//! Application object
//!
//! The app-level counterpart of a window: its own readiness gate and event
//! queue, drained in batches rather than polled one event at a time. The app
//! also keeps a registry of the windows created through it so termination
//! can close them all.

use std::fmt;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::bridge::{CallbackBridge, CallbackContext};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::events::{AppEvent, EventKind, EventQueue};
use crate::lifecycle::{LifecycleState, ReadinessGate};
use crate::pacer::{RefreshSource, Ticker};
use crate::window::handle::WindowShared;
use crate::window::{ContentRect, WindowBuilder, WindowHandle};

new_key_type! {
    /// Key of a window in the app's registry
    pub struct WindowKey;
}

/// Native application notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppNotification {
    /// The application finished launching
    FinishedLaunching,
    /// The application is about to terminate
    WillTerminate,
}

struct AppState {
    gate: ReadinessGate,
    queue: EventQueue<AppEvent>,
    terminated: bool,
    windows: SlotMap<WindowKey, Weak<WindowShared>>,
}

impl AppState {
    fn live_windows(&self) -> Vec<WindowHandle> {
        self.windows
            .values()
            .filter_map(Weak::upgrade)
            .map(WindowHandle::from_shared)
            .collect()
    }
}

struct AppShared {
    owner: ThreadId,
    config: BridgeConfig,
    callback: CallbackBridge<AppHandle>,
    state: Mutex<AppState>,
}

/// Handle to the bridged application
#[derive(Clone)]
pub struct AppHandle {
    shared: Arc<AppShared>,
}

/// Create an app with the default configuration
pub fn create_app<F>(callback: F) -> AppHandle
where
    F: Fn(&AppHandle, CallbackContext) + Send + Sync + 'static,
{
    AppHandle::build(BridgeConfig::default(), callback)
}

impl AppHandle {
    /// Create an app whose windows use `config`
    pub fn with_config<F>(config: BridgeConfig, callback: F) -> BridgeResult<Self>
    where
        F: Fn(&AppHandle, CallbackContext) + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self::build(config, callback))
    }

    fn build<F>(config: BridgeConfig, callback: F) -> Self
    where
        F: Fn(&AppHandle, CallbackContext) + Send + Sync + 'static,
    {
        log::info!("Created app (idle budget {}, {} Hz)", config.idle_budget, config.refresh_rate_hz);
        Self {
            shared: Arc::new(AppShared {
                owner: thread::current().id(),
                config,
                callback: CallbackBridge::new(callback),
                state: Mutex::new(AppState {
                    gate: ReadinessGate::armed(),
                    queue: EventQueue::new(),
                    terminated: false,
                    windows: SlotMap::with_key(),
                }),
            }),
        }
    }

    /// Configuration used for windows created through this app
    pub fn config(&self) -> &BridgeConfig {
        &self.shared.config
    }

    /// Deliver a native application notification
    ///
    /// Returns the event that was queued, if any. Like window events,
    /// `Terminating` only passes once launching has finished. `WillTerminate`
    /// always closes and tears down every live window created through this
    /// app.
    pub fn notify(&self, notification: AppNotification) -> Option<AppEvent> {
        let (event, windows) = {
            let mut state = self.shared.state.lock();
            if state.terminated {
                log::warn!("Ignoring {:?} after termination", notification);
                return None;
            }

            match notification {
                AppNotification::FinishedLaunching => {
                    if !state.gate.on_first_update() {
                        return None;
                    }
                    state.queue.enqueue(AppEvent::Ready);
                    log::debug!("App ready");
                    (Some(AppEvent::Ready), Vec::new())
                }
                AppNotification::WillTerminate => {
                    state.terminated = true;
                    let event = if state.gate.admits(EventKind::Terminating) {
                        state.queue.enqueue(AppEvent::Terminating);
                        Some(AppEvent::Terminating)
                    } else {
                        log::debug!("App terminating before launch finished");
                        None
                    };
                    let windows = state.live_windows();
                    state.windows.clear();
                    log::info!("App terminating, closing {} windows", windows.len());
                    (event, windows)
                }
            }
        };

        for window in windows {
            window.shutdown();
        }
        if event.is_some() {
            self.signal();
        }
        event
    }

    /// Take every queued event, oldest first
    pub fn drain_events(&self) -> Vec<AppEvent> {
        self.shared.state.lock().queue.drain()
    }

    /// Invoke the callback without queueing anything
    ///
    /// Lets any thread nudge the renderer into draining.
    pub fn wake(&self) {
        self.signal();
    }

    /// Whether launching has finished
    pub fn is_ready(&self) -> bool {
        self.shared.state.lock().gate.is_ready()
    }

    /// Whether termination has started
    pub fn is_terminated(&self) -> bool {
        self.shared.state.lock().terminated
    }

    /// Create a window owned by this app, using the app's configuration
    pub fn create_window<F, M, S>(
        &self,
        rect: ContentRect,
        callback: F,
        make_source: M,
    ) -> BridgeResult<WindowHandle>
    where
        F: Fn(&WindowHandle, CallbackContext) + Send + Sync + 'static,
        M: FnOnce(Ticker, &BridgeConfig) -> S,
        S: RefreshSource + 'static,
    {
        if self.is_terminated() {
            return Err(BridgeError::InvalidTransition {
                from: LifecycleState::Closed,
                operation: "create_window",
            });
        }

        let window = WindowBuilder::new(rect)
            .with_config(self.shared.config.clone())
            .build(callback, make_source)?;

        {
            let mut state = self.shared.state.lock();
            if !state.terminated {
                state.windows.retain(|_, weak| weak.strong_count() > 0);
                state.windows.insert(window.downgrade());
                return Ok(window);
            }
        }

        // Terminated while the window was being built
        log::warn!("App terminated during creation of window {}", window.id().as_u64());
        window.shutdown();
        Err(BridgeError::InvalidTransition {
            from: LifecycleState::Closed,
            operation: "create_window",
        })
    }

    /// Live windows created through this app
    pub fn windows(&self) -> Vec<WindowHandle> {
        self.shared.state.lock().live_windows()
    }

    fn signal(&self) {
        self.shared
            .callback
            .invoke(self, CallbackContext::event(self.shared.owner));
    }
}

impl fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("AppHandle")
            .field("ready", &state.gate.is_ready())
            .field("terminated", &state.terminated)
            .field("pending_events", &state.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WindowEvent;
    use crate::lifecycle::Notification;
    use crate::pacer::ManualRefreshSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_app() -> (AppHandle, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let app = create_app(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (app, calls)
    }

    fn rect() -> ContentRect {
        ContentRect::new(0.0, 0.0, 320, 240)
    }

    #[test]
    fn test_ready_once() {
        let (app, calls) = counting_app();
        assert!(!app.is_ready());

        assert_eq!(app.notify(AppNotification::FinishedLaunching), Some(AppEvent::Ready));
        assert_eq!(app.notify(AppNotification::FinishedLaunching), None);

        assert!(app.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.drain_events(), vec![AppEvent::Ready]);
        assert!(app.drain_events().is_empty());
    }

    #[test]
    fn test_drain_returns_batch_in_order() {
        let (app, _calls) = counting_app();
        app.notify(AppNotification::FinishedLaunching);
        app.notify(AppNotification::WillTerminate);

        assert_eq!(app.drain_events(), vec![AppEvent::Ready, AppEvent::Terminating]);
    }

    #[test]
    fn test_wake_signals_without_events() {
        let (app, calls) = counting_app();
        app.wake();
        app.wake();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(app.drain_events().is_empty());
    }

    #[test]
    fn test_callback_can_drain() {
        let drained = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&drained);
        let app = create_app(move |app, ctx| {
            assert!(!ctx.render_requested);
            sink.lock().extend(app.drain_events());
        });

        app.notify(AppNotification::FinishedLaunching);
        assert_eq!(*drained.lock(), vec![AppEvent::Ready]);
    }

    #[test]
    fn test_invalid_config() {
        let result = AppHandle::with_config(BridgeConfig::default().with_refresh_rate(-1.0), |_, _| {});
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_windows_use_app_config() {
        let app = AppHandle::with_config(BridgeConfig::default().with_idle_budget(2), |_, _| {}).unwrap();
        let clock = ManualRefreshSource::new();
        let window = app
            .create_window(rect(), |_, _| {}, |ticker, _| clock.attach(ticker))
            .unwrap();

        window.notify(Notification::Updated);
        window.request_frame().unwrap();
        assert_eq!(clock.advance(10), 2);
    }

    #[test]
    fn test_registry_tracks_live_windows() {
        let (app, _calls) = counting_app();
        let first = app.create_window(rect(), |_, _| {}, |ticker, _| ManualRefreshSource::new().attach(ticker)).unwrap();
        let second = app.create_window(rect(), |_, _| {}, |ticker, _| ManualRefreshSource::new().attach(ticker)).unwrap();
        assert_eq!(app.windows().len(), 2);

        drop(first);
        let live = app.windows();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id(), second.id());
    }

    #[test]
    fn test_terminate_closes_windows() {
        let (app, _calls) = counting_app();
        app.notify(AppNotification::FinishedLaunching);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let clock = ManualRefreshSource::new();
        let window = app
            .create_window(
                rect(),
                move |window, _| {
                    while let Some(event) = window.dequeue_event() {
                        sink.lock().push(event);
                    }
                },
                |ticker, _| clock.attach(ticker),
            )
            .unwrap();
        window.notify(Notification::Updated);
        window.request_frame().unwrap();

        assert_eq!(app.notify(AppNotification::WillTerminate), Some(AppEvent::Terminating));

        assert_eq!(window.state(), LifecycleState::Closed);
        assert!(!clock.is_running());
        assert_eq!(*seen.lock(), vec![WindowEvent::Ready, WindowEvent::WillClose]);
        assert!(app.windows().is_empty());
    }

    #[test]
    fn test_terminate_is_final() {
        let (app, calls) = counting_app();
        app.notify(AppNotification::FinishedLaunching);
        app.notify(AppNotification::WillTerminate);
        assert_eq!(app.notify(AppNotification::WillTerminate), None);
        assert_eq!(app.notify(AppNotification::FinishedLaunching), None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let result = app.create_window(rect(), |_, _| {}, |ticker, _| ManualRefreshSource::new().attach(ticker));
        assert!(matches!(result, Err(BridgeError::InvalidTransition { operation: "create_window", .. })));
    }

    #[test]
    fn test_terminate_before_launch_is_gated() {
        let (app, calls) = counting_app();
        let clock = ManualRefreshSource::new();
        let window = app
            .create_window(rect(), |_, _| {}, |ticker, _| clock.attach(ticker))
            .unwrap();

        assert_eq!(app.notify(AppNotification::WillTerminate), None);

        assert!(app.is_terminated());
        assert!(app.drain_events().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        // Windows are still closed even though nothing reached the app queue
        assert_eq!(window.state(), LifecycleState::Closed);
        assert!(app.windows().is_empty());
    }

    #[test]
    fn test_terminate_during_window_creation() {
        let (app, _calls) = counting_app();
        let terminator = app.clone();
        let clock = ManualRefreshSource::new();
        let result = app.create_window(
            rect(),
            |_, _| {},
            |ticker, _| {
                terminator.notify(AppNotification::WillTerminate);
                clock.attach(ticker)
            },
        );

        assert!(matches!(
            result,
            Err(BridgeError::InvalidTransition { operation: "create_window", .. })
        ));
        assert!(app.is_terminated());
        assert!(app.windows().is_empty());
        // The half-built window was shut down and is gone
        assert_eq!(clock.stop_count(), 1);
        assert!(!clock.tick());
    }
}
