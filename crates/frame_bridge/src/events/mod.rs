//! Events handed from the native layer to the renderer
//!
//! The first event any window queue yields is always [`WindowEvent::Ready`].
//! No ordering is promised between events that come in pairs across
//! queues, such as [`AppEvent::Terminating`] and [`WindowEvent::WillClose`].

use crate::input::InputPayload;

pub mod queue;

pub use queue::EventQueue;

/// Window-scoped events
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// The window finished its first display update and is ready for use
    Ready,

    /// Raw input forwarded from the window system
    Input(InputPayload),

    /// The content area was resized
    Resized {
        /// New content width in points
        width: u32,
        /// New content height in points
        height: u32,
    },

    /// The backing scale factor or color space changed
    BackingChanged,

    /// The window is about to close
    WillClose,
}

impl WindowEvent {
    /// Payload-free discriminant of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Ready => EventKind::Ready,
            Self::Input(_) => EventKind::RawInput,
            Self::Resized { .. } => EventKind::Resized,
            Self::BackingChanged => EventKind::BackingChanged,
            Self::WillClose => EventKind::WillClose,
        }
    }
}

/// Application-scoped events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEvent {
    /// The application finished launching
    Ready,

    /// The application is about to terminate
    Terminating,
}

impl AppEvent {
    /// Payload-free discriminant of this event
    pub fn kind(self) -> EventKind {
        match self {
            Self::Ready => EventKind::Ready,
            Self::Terminating => EventKind::Terminating,
        }
    }
}

/// Event discriminant, used by the readiness gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Synthetic ready signal
    Ready,
    /// Raw input
    RawInput,
    /// Content resize
    Resized,
    /// Backing properties change
    BackingChanged,
    /// Window about to close
    WillClose,
    /// Application about to terminate
    Terminating,
}
