//! Callback bridge
//!
//! The renderer registers one callback per window (and one per app). The
//! bridge invokes it from whichever thread produced the signal: the UI thread
//! for native notifications, the refresh thread for frame ticks. Callbacks
//! are never invoked while bridge state is locked, so a callback may call
//! back into its window freely.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Thread a callback was invoked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceThread {
    /// The thread that created the window or app
    Main,
    /// Any other thread, typically the refresh source's
    Background,
}

impl SourceThread {
    /// Classify the current thread against the owning thread
    pub fn relative_to(owner: ThreadId) -> Self {
        if thread::current().id() == owner {
            Self::Main
        } else {
            Self::Background
        }
    }
}

/// Extra information passed with every callback invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackContext {
    /// Where the invocation came from
    pub source_thread: SourceThread,
    /// `true` for frame ticks, `false` for event signals
    pub render_requested: bool,
}

impl CallbackContext {
    /// Context for a refresh tick
    pub fn frame() -> Self {
        Self {
            source_thread: SourceThread::Background,
            render_requested: true,
        }
    }

    /// Context for an event signal raised on the current thread
    pub fn event(owner: ThreadId) -> Self {
        Self {
            source_thread: SourceThread::relative_to(owner),
            render_requested: false,
        }
    }
}

/// Shareable renderer callback
///
/// `T` is the handle type passed back to the renderer, so it can drain
/// events or request frames from inside the callback.
pub struct CallbackBridge<T: ?Sized> {
    callback: Arc<dyn Fn(&T, CallbackContext) + Send + Sync>,
}

impl<T: ?Sized> CallbackBridge<T> {
    /// Wrap a renderer callback
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&T, CallbackContext) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invoke the callback
    pub fn invoke(&self, target: &T, context: CallbackContext) {
        (self.callback)(target, context);
    }
}

impl<T: ?Sized> Clone for CallbackBridge<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T: ?Sized> fmt::Debug for CallbackBridge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackBridge").finish_non_exhaustive()
    }
}
