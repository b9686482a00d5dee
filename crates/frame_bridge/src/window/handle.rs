//! Shared window handle
//!
//! [`WindowHandle`] is a cheap clonable reference to one window's shared
//! state. The UI thread feeds it notifications, the refresh source feeds it
//! ticks, and the renderer polls it from inside its callback.
//!
//! All mutable state sits behind a single lock, so event order observed by
//! `dequeue_event` is exactly the order in which producers enqueued, no
//! matter which thread they ran on. The renderer callback always runs with
//! that lock released.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::bridge::{CallbackBridge, CallbackContext};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::events::{EventQueue, WindowEvent};
use crate::foundation::math::Size2;
use crate::input::native::{translate, NativeInput};
use crate::lifecycle::{Dispatch, DropReason, LifecycleState, Notification, WindowLifecycle};
use crate::pacer::{FramePacer, RefreshSource, TickOutcome, TickTarget, Ticker};

use super::{ContentRect, SurfaceHandle, WindowBuilder, WindowId};

struct WindowState {
    lifecycle: WindowLifecycle,
    queue: EventQueue<WindowEvent>,
    pacer: FramePacer<Box<dyn RefreshSource>>,
    render_target: Option<SurfaceHandle>,
    rect: ContentRect,
    scale_factor: f64,
}

impl WindowState {
    fn teardown(&mut self, id: WindowId) -> bool {
        if !self.lifecycle.teardown() {
            return false;
        }
        self.pacer.stop();
        let discarded = self.queue.len();
        self.queue.clear();
        self.render_target = None;
        log::info!("Window {} torn down ({} undelivered events discarded)", id.as_u64(), discarded);
        true
    }
}

pub(crate) struct WindowShared {
    id: WindowId,
    owner: ThreadId,
    callback: CallbackBridge<WindowHandle>,
    state: Mutex<WindowState>,
}

impl TickTarget for WindowShared {
    fn on_tick(self: Arc<Self>) {
        WindowHandle { shared: self }.tick();
    }
}

impl Drop for WindowShared {
    fn drop(&mut self) {
        self.state.get_mut().teardown(self.id);
    }
}

/// Handle to a bridged native window
///
/// Clones refer to the same window. The window is torn down when
/// [`teardown`](Self::teardown) is called or the last handle is dropped,
/// whichever comes first.
#[derive(Clone)]
pub struct WindowHandle {
    shared: Arc<WindowShared>,
}

impl WindowHandle {
    pub(super) fn create<F, M, S>(builder: WindowBuilder, callback: F, make_source: M) -> Self
    where
        F: Fn(&WindowHandle, CallbackContext) + Send + Sync + 'static,
        M: FnOnce(Ticker, &BridgeConfig) -> S,
        S: RefreshSource + 'static,
    {
        let WindowBuilder {
            rect,
            config,
            visible,
            scale_factor,
        } = builder;
        let id = WindowId::next();

        let shared = Arc::new_cyclic(|weak: &std::sync::Weak<WindowShared>| {
            let target: std::sync::Weak<dyn TickTarget> = weak.clone();
            let source: Box<dyn RefreshSource> = Box::new(make_source(Ticker::new(target), &config));
            let lifecycle = if visible {
                WindowLifecycle::new()
            } else {
                WindowLifecycle::hidden()
            };

            WindowShared {
                id,
                owner: thread::current().id(),
                callback: CallbackBridge::new(callback),
                state: Mutex::new(WindowState {
                    lifecycle,
                    queue: EventQueue::new(),
                    pacer: FramePacer::with_budget(source, config.idle_budget),
                    render_target: None,
                    rect,
                    scale_factor,
                }),
            }
        });

        log::info!(
            "Created window {} ({}x{}{})",
            id.as_u64(),
            rect.width,
            rect.height,
            if visible { "" } else { ", hidden" }
        );
        Self { shared }
    }

    /// Window identifier
    pub fn id(&self) -> WindowId {
        self.shared.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.shared.state.lock().lifecycle.state()
    }

    /// Current content size in points
    pub fn content_size(&self) -> Size2 {
        self.shared.state.lock().rect.size()
    }

    /// Current content rect
    pub fn content_rect(&self) -> ContentRect {
        self.shared.state.lock().rect
    }

    /// Points-to-pixels ratio of the backing store
    pub fn backing_scale_factor(&self) -> f64 {
        self.shared.state.lock().scale_factor
    }

    /// Deliver a native window notification
    ///
    /// If an event is produced it is queued and the renderer callback is
    /// invoked once the lock is released.
    ///
    /// # Panics
    /// In debug builds, when the window has been torn down.
    pub fn notify(&self, notification: Notification) -> Dispatch {
        let dispatch = {
            let mut state = self.shared.state.lock();
            if !state.lifecycle.is_closed() {
                match notification {
                    Notification::Resized { width, height } => {
                        state.rect.width = width;
                        state.rect.height = height;
                    }
                    Notification::BackingChanged { scale_factor }
                        if scale_factor.is_finite() && scale_factor > 0.0 =>
                    {
                        state.scale_factor = scale_factor;
                    }
                    _ => {}
                }
            }
            let dispatch = state.lifecycle.on_notification(notification);
            if let Dispatch::Emit(event) = &dispatch {
                log::trace!("Window {} queued {:?}", self.shared.id.as_u64(), event.kind());
                state.queue.enqueue(event.clone());
            }
            dispatch
        };

        if dispatch.is_emit() {
            self.signal();
        }
        dispatch
    }

    /// Forward a raw native input event
    ///
    /// Events with no toolkit-neutral meaning are dropped with
    /// [`DropReason::Untranslated`].
    pub fn send_event(&self, input: &NativeInput) -> Dispatch {
        match translate(input) {
            Some(payload) => self.notify(Notification::Input(payload)),
            None => {
                log::trace!("Ignoring native event type {}", input.event_type);
                Dispatch::Dropped(DropReason::Untranslated)
            }
        }
    }

    /// Close the window: queue WillClose and move to Closing
    pub fn close(&self) -> Dispatch {
        self.notify(Notification::WillClose)
    }

    /// Pop the oldest queued event
    pub fn dequeue_event(&self) -> Option<WindowEvent> {
        self.shared.state.lock().queue.dequeue()
    }

    /// Number of queued events
    pub fn pending_events(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Ask for frames
    ///
    /// Refills the idle budget and starts the refresh source if it is not
    /// running. Safe to call from any thread, including from inside the
    /// renderer callback.
    pub fn request_frame(&self) -> BridgeResult<()> {
        let mut state = self.shared.state.lock();
        if state.lifecycle.is_closed() {
            return Err(BridgeError::InvalidTransition {
                from: LifecycleState::Closed,
                operation: "request_frame",
            });
        }
        state.pacer.request_frame()
    }

    /// Whether the refresh source is currently running
    pub fn is_pacing(&self) -> bool {
        self.shared.state.lock().pacer.is_running()
    }

    /// Ticks left before pacing stops
    pub fn idle_budget(&self) -> u32 {
        self.shared.state.lock().pacer.idle_budget()
    }

    /// Set the surface the renderer presents into
    pub fn set_render_target(&self, surface: SurfaceHandle) {
        let mut state = self.shared.state.lock();
        if state.lifecycle.is_closed() {
            log::warn!("Ignoring render target for torn down window {}", self.shared.id.as_u64());
            return;
        }
        state.render_target = Some(surface);
    }

    /// Surface the renderer presents into, if one was set
    pub fn render_target(&self) -> Option<SurfaceHandle> {
        self.shared.state.lock().render_target
    }

    /// Stop pacing, discard queued events and move to Closed
    ///
    /// Returns `false` if the window was already torn down. Safe to call
    /// while a tick is in flight: that tick's callback still completes, but
    /// no further tick reaches the renderer.
    pub fn teardown(&self) -> bool {
        self.shared.state.lock().teardown(self.shared.id)
    }

    /// Close (if still open) then tear down, giving the renderer a chance to
    /// see WillClose in between
    pub(crate) fn shutdown(&self) {
        let emitted = {
            let mut state = self.shared.state.lock();
            match state.lifecycle.state() {
                LifecycleState::Closed => return,
                LifecycleState::Closing => false,
                LifecycleState::NotReady | LifecycleState::Ready => {
                    match state.lifecycle.close() {
                        Dispatch::Emit(event) => {
                            state.queue.enqueue(event);
                            true
                        }
                        _ => false,
                    }
                }
            }
        };
        if emitted {
            self.signal();
        }
        self.teardown();
    }

    pub(crate) fn downgrade(&self) -> std::sync::Weak<WindowShared> {
        Arc::downgrade(&self.shared)
    }

    pub(crate) fn from_shared(shared: Arc<WindowShared>) -> Self {
        Self { shared }
    }

    fn signal(&self) {
        self.shared
            .callback
            .invoke(self, CallbackContext::event(self.shared.owner));
    }

    fn tick(&self) {
        let delivered = self.shared.state.lock().pacer.begin_tick();
        if !delivered {
            log::trace!("Window {} dropped tick (not pacing or tick in flight)", self.shared.id.as_u64());
            return;
        }

        self.shared.callback.invoke(self, CallbackContext::frame());

        let outcome = self.shared.state.lock().pacer.end_tick();
        if outcome == TickOutcome::Stopped {
            log::trace!("Window {} pacing stopped", self.shared.id.as_u64());
        }
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowHandle")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .finish()
    }
}
