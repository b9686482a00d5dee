//! Window objects
//!
//! A window ties together everything the renderer sees of one native window:
//!
//! ```text
//!  UI thread                      refresh thread
//!  notify / send_event            Ticker::tick
//!        │                              │
//!        ▼                              ▼
//!  ┌──────────────── WindowState (one lock) ────────────────┐
//!  │ WindowLifecycle + ReadinessGate │ EventQueue │ FramePacer │
//!  └─────────────────────────────────────────────────────────┘
//!        │ (lock released)              │ (lock released)
//!        ▼                              ▼
//!            CallbackBridge → renderer callback
//! ```
//!
//! - **`handle`**: the shared, clonable [`WindowHandle`]
//! - [`WindowBuilder`] and [`create_window`]: construction

pub mod handle;

pub use handle::WindowHandle;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::bridge::CallbackContext;
use crate::config::BridgeConfig;
use crate::error::BridgeResult;
use crate::foundation::math::Size2;
use crate::pacer::{RefreshSource, Ticker};

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique window identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    pub(crate) fn next() -> Self {
        Self(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Window content area in screen points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentRect {
    /// Left edge
    pub x: f64,
    /// Bottom edge
    pub y: f64,
    /// Width in points
    pub width: u32,
    /// Height in points
    pub height: u32,
}

impl ContentRect {
    /// Create a content rect
    pub fn new(x: f64, y: f64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Content size as a vector
    pub fn size(&self) -> Size2 {
        Size2::new(self.width, self.height)
    }
}

/// Opaque presentable surface the renderer draws into
///
/// The bridge only stores it; creating and presenting the surface belong
/// to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    /// Wrap a raw surface identifier
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw surface identifier
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Window construction options
#[derive(Debug, Clone)]
pub struct WindowBuilder {
    rect: ContentRect,
    config: BridgeConfig,
    visible: bool,
    scale_factor: f64,
}

impl WindowBuilder {
    /// Visible window with the default configuration
    pub fn new(rect: ContentRect) -> Self {
        Self {
            rect,
            config: BridgeConfig::default(),
            visible: true,
            scale_factor: 1.0,
        }
    }

    /// Use a specific bridge configuration
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Initial backing scale factor; non-positive or non-finite values are
    /// ignored
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        if scale_factor.is_finite() && scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
        self
    }

    /// Create the window hidden; it becomes ready only after a
    /// [`Notification::Shown`](crate::lifecycle::Notification::Shown)
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Create the window
    ///
    /// `make_source` receives the ticker the refresh source must drive. The
    /// source is not started until the first frame request.
    pub fn build<F, M, S>(self, callback: F, make_source: M) -> BridgeResult<WindowHandle>
    where
        F: Fn(&WindowHandle, CallbackContext) + Send + Sync + 'static,
        M: FnOnce(Ticker, &BridgeConfig) -> S,
        S: RefreshSource + 'static,
    {
        self.config.validate()?;
        Ok(WindowHandle::create(self, callback, make_source))
    }
}

/// Create a visible window with the default configuration
pub fn create_window<F, M, S>(rect: ContentRect, callback: F, make_source: M) -> BridgeResult<WindowHandle>
where
    F: Fn(&WindowHandle, CallbackContext) + Send + Sync + 'static,
    M: FnOnce(Ticker, &BridgeConfig) -> S,
    S: RefreshSource + 'static,
{
    WindowBuilder::new(rect).build(callback, make_source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::BridgeError;
    use crate::pacer::ManualRefreshSource;

    #[test]
    fn test_window_ids_are_unique() {
        let a = WindowId::next();
        let b = WindowId::next();
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
    }

    #[test]
    fn test_content_rect_size() {
        let rect = ContentRect::new(10.0, 20.0, 800, 600);
        assert_eq!(rect.size(), Size2::new(800, 600));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let clock = ManualRefreshSource::new();
        let result = WindowBuilder::new(ContentRect::new(0.0, 0.0, 1, 1))
            .with_config(BridgeConfig::default().with_idle_budget(0))
            .build(|_, _| {}, |ticker, _| clock.attach(ticker));

        assert!(matches!(
            result,
            Err(BridgeError::Config(ConfigError::Invalid { field: "idle_budget", .. }))
        ));
        assert_eq!(clock.start_count(), 0);
    }
}
