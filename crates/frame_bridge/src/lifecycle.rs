//! Window lifecycle state machine and readiness gate
//!
//! Native notifications are reduced to [`Notification`] values and fed to
//! [`WindowLifecycle::on_notification`], which decides whether an event is
//! produced. The state machine never touches the queue or the callback; the
//! window does that with the returned [`Dispatch`].
//!
//! States only move forward: `NotReady -> Ready -> Closing -> Closed`, with
//! `NotReady -> Closing` allowed for a window closed before its first paint.

use crate::events::{EventKind, WindowEvent};
use crate::input::InputPayload;

/// Current state of a window's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleState {
    /// Created, first display update not seen yet
    NotReady,
    /// Visible and accepting events
    Ready,
    /// Close notification received, teardown pending
    Closing,
    /// Torn down; nothing is accepted any more
    Closed,
}

/// Guard that keeps events away from the renderer until the first paint
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    ready: bool,
    pending_ready_signal: bool,
}

impl ReadinessGate {
    /// Gate for a window that has not been shown yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate for a window shown at creation
    pub fn armed() -> Self {
        let mut gate = Self::new();
        gate.arm();
        gate
    }

    /// The window was shown; the next update notification signals readiness
    pub fn arm(&mut self) {
        if !self.ready {
            self.pending_ready_signal = true;
        }
    }

    /// Handle an update notification
    ///
    /// Returns `true` exactly once per gate: on the first update after the
    /// window was shown. The caller must emit a single Ready event then.
    pub fn on_first_update(&mut self) -> bool {
        if self.ready || !self.pending_ready_signal {
            return false;
        }
        self.ready = true;
        self.pending_ready_signal = false;
        true
    }

    /// Whether an event of this kind may be queued
    pub fn admits(&self, kind: EventKind) -> bool {
        self.ready || kind == EventKind::Ready
    }

    /// Whether the gate has opened
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether a Ready signal is owed on the next update
    pub fn is_pending(&self) -> bool {
        self.pending_ready_signal
    }
}

/// Toolkit-neutral native window notifications
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The window was ordered on screen
    Shown,
    /// The window performed a display update
    Updated,
    /// The content area changed size
    Resized {
        /// New content width in points
        width: u32,
        /// New content height in points
        height: u32,
    },
    /// Backing scale factor or color space changed
    BackingChanged {
        /// Device pixels per point after the change
        scale_factor: f64,
    },
    /// The window is about to close
    WillClose,
    /// Translated raw input
    Input(InputPayload),
}

/// Why a notification produced no event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Arrived before the window became ready
    GateRejected,
    /// Update after Ready was already emitted
    AlreadyReady,
    /// Update before the window was shown
    NotShown,
    /// Close after the window was already closing
    AlreadyClosing,
    /// Native input with no toolkit-neutral equivalent
    Untranslated,
}

/// Outcome of feeding a notification to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Queue this event and signal the renderer
    Emit(WindowEvent),
    /// Nothing to queue; expected steady-state behavior
    Dropped(DropReason),
    /// State changed but there is nothing to queue
    StateOnly,
    /// The window is closed; the notification was refused
    Rejected,
}

impl Dispatch {
    /// Whether an event was produced
    pub fn is_emit(&self) -> bool {
        matches!(self, Self::Emit(_))
    }
}

/// Window lifecycle: state plus its readiness gate
#[derive(Debug, Clone)]
pub struct WindowLifecycle {
    state: LifecycleState,
    gate: ReadinessGate,
}

impl WindowLifecycle {
    /// Lifecycle for a window that is shown immediately
    pub fn new() -> Self {
        Self::with_gate(ReadinessGate::armed())
    }

    /// Lifecycle for a window created hidden
    pub fn hidden() -> Self {
        Self::with_gate(ReadinessGate::new())
    }

    fn with_gate(gate: ReadinessGate) -> Self {
        Self {
            state: LifecycleState::NotReady,
            gate,
        }
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Readiness gate
    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    /// Whether the window is torn down
    pub fn is_closed(&self) -> bool {
        self.state == LifecycleState::Closed
    }

    /// Dispatch a native notification
    pub fn on_notification(&mut self, notification: Notification) -> Dispatch {
        if self.is_closed() {
            return self.reject("notification");
        }

        match notification {
            Notification::Shown => {
                self.gate.arm();
                Dispatch::StateOnly
            }
            Notification::Updated => self.on_update(),
            Notification::WillClose => self.close(),
            Notification::Resized { width, height } => {
                self.push(WindowEvent::Resized { width, height })
            }
            Notification::BackingChanged { .. } => self.push(WindowEvent::BackingChanged),
            Notification::Input(payload) => self.push(WindowEvent::Input(payload)),
        }
    }

    /// Offer an event to the gate
    ///
    /// A Ready event is only ever produced through the first update, so
    /// pushing one directly is treated as an update notification.
    pub fn push(&mut self, event: WindowEvent) -> Dispatch {
        if self.is_closed() {
            return self.reject("push");
        }
        if matches!(event, WindowEvent::Ready) {
            return self.on_update();
        }
        if !self.gate.admits(event.kind()) {
            log::trace!("Gate dropped {:?} before ready", event.kind());
            return Dispatch::Dropped(DropReason::GateRejected);
        }
        Dispatch::Emit(event)
    }

    /// Handle the close notification
    ///
    /// WillClose still goes through the gate, then the state moves to
    /// Closing regardless of whether it was admitted.
    pub fn close(&mut self) -> Dispatch {
        match self.state {
            LifecycleState::Closed => return self.reject("close"),
            LifecycleState::Closing => return Dispatch::Dropped(DropReason::AlreadyClosing),
            LifecycleState::NotReady | LifecycleState::Ready => {}
        }

        let dispatch = if self.gate.admits(EventKind::WillClose) {
            Dispatch::Emit(WindowEvent::WillClose)
        } else {
            Dispatch::Dropped(DropReason::GateRejected)
        };
        self.transition(LifecycleState::Closing);
        dispatch
    }

    /// Move to Closed
    ///
    /// Returns `false` if the window was already closed, making a second
    /// teardown a no-op.
    pub fn teardown(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.transition(LifecycleState::Closed);
        true
    }

    fn on_update(&mut self) -> Dispatch {
        match self.state {
            LifecycleState::NotReady => {
                if self.gate.on_first_update() {
                    self.transition(LifecycleState::Ready);
                    Dispatch::Emit(WindowEvent::Ready)
                } else {
                    Dispatch::Dropped(DropReason::NotShown)
                }
            }
            LifecycleState::Ready => Dispatch::Dropped(DropReason::AlreadyReady),
            // Closed before first paint: the gate stays shut for good
            LifecycleState::Closing => Dispatch::Dropped(DropReason::GateRejected),
            LifecycleState::Closed => self.reject("update"),
        }
    }

    fn transition(&mut self, next: LifecycleState) {
        debug_assert!(next > self.state, "lifecycle must move forward");
        log::debug!("Window lifecycle {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn reject(&self, operation: &'static str) -> Dispatch {
        if cfg!(debug_assertions) {
            panic!("invalid transition: {operation} while {:?}", self.state);
        }
        log::warn!("Ignoring {} on a {:?} window", operation, self.state);
        Dispatch::Rejected
    }
}

impl Default for WindowLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_lifecycle() -> WindowLifecycle {
        let mut lifecycle = WindowLifecycle::new();
        assert!(lifecycle.on_notification(Notification::Updated).is_emit());
        lifecycle
    }

    #[test]
    fn test_gate_opens_once() {
        let mut gate = ReadinessGate::armed();
        assert!(gate.is_pending());
        assert!(!gate.admits(EventKind::Resized));
        assert!(gate.admits(EventKind::Ready));

        assert!(gate.on_first_update());
        assert!(!gate.on_first_update());
        assert!(gate.is_ready());
        assert!(!gate.is_pending());
        assert!(gate.admits(EventKind::Resized));

        gate.arm();
        assert!(!gate.is_pending());
    }

    #[test]
    fn test_unshown_gate_ignores_updates() {
        let mut gate = ReadinessGate::new();
        assert!(!gate.on_first_update());
        gate.arm();
        assert!(gate.on_first_update());
    }

    #[test]
    fn test_first_update_emits_ready() {
        let mut lifecycle = WindowLifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::NotReady);

        let dispatch = lifecycle.on_notification(Notification::Updated);
        assert_eq!(dispatch, Dispatch::Emit(WindowEvent::Ready));
        assert_eq!(lifecycle.state(), LifecycleState::Ready);

        let again = lifecycle.on_notification(Notification::Updated);
        assert_eq!(again, Dispatch::Dropped(DropReason::AlreadyReady));
    }

    #[test]
    fn test_hidden_window_waits_for_shown() {
        let mut lifecycle = WindowLifecycle::hidden();
        assert_eq!(
            lifecycle.on_notification(Notification::Updated),
            Dispatch::Dropped(DropReason::NotShown)
        );
        assert_eq!(lifecycle.on_notification(Notification::Shown), Dispatch::StateOnly);
        assert_eq!(
            lifecycle.on_notification(Notification::Updated),
            Dispatch::Emit(WindowEvent::Ready)
        );
    }

    #[test]
    fn test_events_before_ready_are_dropped() {
        let mut lifecycle = WindowLifecycle::new();
        let dispatch = lifecycle.on_notification(Notification::Resized { width: 10, height: 10 });
        assert_eq!(dispatch, Dispatch::Dropped(DropReason::GateRejected));
        assert_eq!(
            lifecycle.on_notification(Notification::BackingChanged { scale_factor: 2.0 }),
            Dispatch::Dropped(DropReason::GateRejected)
        );
    }

    #[test]
    fn test_events_after_ready_are_emitted() {
        let mut lifecycle = ready_lifecycle();
        assert_eq!(
            lifecycle.on_notification(Notification::Resized { width: 640, height: 480 }),
            Dispatch::Emit(WindowEvent::Resized { width: 640, height: 480 })
        );
        assert_eq!(
            lifecycle.on_notification(Notification::BackingChanged { scale_factor: 2.0 }),
            Dispatch::Emit(WindowEvent::BackingChanged)
        );
    }

    #[test]
    fn test_pushing_ready_acts_as_update() {
        let mut lifecycle = WindowLifecycle::new();
        assert_eq!(lifecycle.push(WindowEvent::Ready), Dispatch::Emit(WindowEvent::Ready));
        assert_eq!(
            lifecycle.push(WindowEvent::Ready),
            Dispatch::Dropped(DropReason::AlreadyReady)
        );
    }

    #[test]
    fn test_close_emits_will_close() {
        let mut lifecycle = ready_lifecycle();
        assert_eq!(lifecycle.close(), Dispatch::Emit(WindowEvent::WillClose));
        assert_eq!(lifecycle.state(), LifecycleState::Closing);
        assert_eq!(lifecycle.close(), Dispatch::Dropped(DropReason::AlreadyClosing));

        // Still accepts events while closing
        assert!(lifecycle.on_notification(Notification::BackingChanged { scale_factor: 2.0 }).is_emit());
    }

    #[test]
    fn test_close_before_ready_is_gated() {
        let mut lifecycle = WindowLifecycle::new();
        assert_eq!(
            lifecycle.on_notification(Notification::WillClose),
            Dispatch::Dropped(DropReason::GateRejected)
        );
        assert_eq!(lifecycle.state(), LifecycleState::Closing);
        assert_eq!(
            lifecycle.on_notification(Notification::Updated),
            Dispatch::Dropped(DropReason::GateRejected)
        );
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut lifecycle = ready_lifecycle();
        lifecycle.close();
        assert!(lifecycle.teardown());
        assert!(lifecycle.is_closed());
        assert!(!lifecycle.teardown());
        assert_eq!(lifecycle.state(), LifecycleState::Closed);
    }

    #[test]
    fn test_teardown_from_any_state() {
        let mut lifecycle = WindowLifecycle::new();
        assert!(lifecycle.teardown());
        assert_eq!(lifecycle.state(), LifecycleState::Closed);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid transition")]
    fn test_push_after_closed_asserts_in_debug() {
        let mut lifecycle = ready_lifecycle();
        lifecycle.teardown();
        lifecycle.on_notification(Notification::BackingChanged { scale_factor: 2.0 });
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_push_after_closed_is_rejected_in_release() {
        let mut lifecycle = ready_lifecycle();
        lifecycle.teardown();
        assert_eq!(
            lifecycle.on_notification(Notification::BackingChanged { scale_factor: 2.0 }),
            Dispatch::Rejected
        );
        assert_eq!(lifecycle.state(), LifecycleState::Closed);
    }
}
