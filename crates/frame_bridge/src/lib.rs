//! # Frame Bridge
//!
//! Boundary layer between a native window/input subsystem and an external
//! renderer.
//!
//! ## Features
//!
//! - **Ordered Events**: asynchronous window and input notifications become a
//!   FIFO queue the renderer polls (windows) or drains (app)
//! - **Readiness Gate**: nothing reaches the renderer before the first paint
//! - **Frame Pacing**: a refresh source runs while frames are requested and
//!   shuts itself off after an idle budget of ticks
//! - **Lock-free Callbacks**: the renderer is signalled with all bridge
//!   state unlocked, so it can call straight back in
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frame_bridge::prelude::*;
//!
//! fn main() -> Result<(), BridgeError> {
//!     let window = create_window(
//!         ContentRect::new(0.0, 0.0, 800, 600),
//!         |window, ctx| {
//!             while let Some(event) = window.dequeue_event() {
//!                 // React to the event
//!                 let _ = event;
//!             }
//!             if ctx.render_requested {
//!                 // Draw a frame
//!             }
//!         },
//!         |ticker, config| ThreadRefreshSource::from_config(ticker, config),
//!     )?;
//!
//!     window.notify(Notification::Updated);
//!     window.request_frame()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod foundation;
pub mod config;
pub mod events;
pub mod input;
pub mod lifecycle;
pub mod pacer;
pub mod bridge;
pub mod window;

mod app;
mod error;

#[cfg(test)]
mod tests;

pub use app::{create_app, AppHandle, AppNotification, WindowKey};
pub use error::{BridgeError, BridgeResult};

/// Common imports for bridge users
pub mod prelude {
    pub use crate::{
        create_app, AppHandle, AppNotification, BridgeError, BridgeResult,
        bridge::{CallbackContext, SourceThread},
        config::{BridgeConfig, Config},
        events::{AppEvent, WindowEvent},
        input::{native::NativeInput, InputPayload},
        lifecycle::{Dispatch, LifecycleState, Notification},
        pacer::{ManualRefreshSource, RefreshSource, ThreadRefreshSource, Ticker},
        window::{create_window, ContentRect, SurfaceHandle, WindowBuilder, WindowHandle},
    };
}
