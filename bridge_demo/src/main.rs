//! Frame bridge demo
//!
//! Drives a bridged window with a threaded refresh source and a simulated
//! stream of native notifications. The "renderer" only logs what it sees.
//!
//! Usage: `bridge_demo [config.toml|config.ron]`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use frame_bridge::input::native::{NativeEventType, NativeInput, MODIFIER_SHIFT};
use frame_bridge::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Config error: {0}")]
    Config(#[from] frame_bridge::config::ConfigError),

    #[error("Pacer did not go idle within {0:?}")]
    NeverIdle(Duration),

    #[error("Input thread panicked")]
    InputThread,
}

/// Stand-in renderer: drains events and counts frames
#[derive(Default)]
struct LoggingRenderer {
    frames: AtomicU32,
    events: AtomicU32,
}

impl LoggingRenderer {
    fn on_window_signal(&self, window: &WindowHandle, ctx: CallbackContext) {
        while let Some(event) = window.dequeue_event() {
            self.events.fetch_add(1, Ordering::Relaxed);
            log::info!("Window {} event: {:?}", window.id().as_u64(), event);

            // Keep animating after anything that changes what is on screen
            if matches!(event, WindowEvent::Resized { .. } | WindowEvent::Input(_)) {
                if let Err(e) = window.request_frame() {
                    log::warn!("Frame request failed: {}", e);
                }
            }
        }

        if ctx.render_requested {
            let frame = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
            let size = window.content_size();
            log::debug!("Frame {} at {}x{} ({:?})", frame, size.x, size.y, ctx.source_thread);
        }
    }
}

fn load_config() -> Result<BridgeConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading bridge config from {}", path);
            Ok(BridgeConfig::load_from_file(&path)?)
        }
        None => Ok(BridgeConfig::default()),
    }
}

fn wait_for_idle(window: &WindowHandle, timeout: Duration) -> Result<(), DemoError> {
    let deadline = Instant::now() + timeout;
    while window.is_pacing() {
        if Instant::now() > deadline {
            return Err(DemoError::NeverIdle(timeout));
        }
        thread::sleep(Duration::from_millis(5));
    }
    Ok(())
}

fn join_input(handle: thread::JoinHandle<()>) -> Result<(), DemoError> {
    handle.join().map_err(|_| DemoError::InputThread)
}

fn run() -> Result<(), DemoError> {
    let config = load_config()?;
    let idle_timeout = config
        .refresh_interval()
        .saturating_mul(config.idle_budget.saturating_add(10).saturating_mul(4));

    let app = AppHandle::with_config(config, |app, _| {
        for event in app.drain_events() {
            log::info!("App event: {:?}", event);
        }
    })?;
    app.notify(AppNotification::FinishedLaunching);

    let renderer = Arc::new(LoggingRenderer::default());
    let window_renderer = Arc::clone(&renderer);
    let window = app.create_window(
        ContentRect::new(100.0, 100.0, 800, 600),
        move |window, ctx| window_renderer.on_window_signal(window, ctx),
        |ticker, config| ThreadRefreshSource::from_config(ticker, config),
    )?;
    window.set_render_target(SurfaceHandle::from_raw(0x5eed));

    // Resizes before the first paint never reach the renderer
    window.notify(Notification::Resized { width: 1024, height: 768 });
    window.notify(Notification::Updated);
    window.request_frame()?;
    wait_for_idle(&window, idle_timeout)?;
    log::info!("Idle after first paint, {} frames", renderer.frames.load(Ordering::Relaxed));

    // Input from another thread, as a native event tap would deliver it
    let remote = window.clone();
    let input_thread = thread::spawn(move || {
        let key = NativeInput::of_type(NativeEventType::KeyDown)
            .with_key(0, "A", "a")
            .with_modifier_flags(MODIFIER_SHIFT);
        remote.send_event(&key);
        remote.send_event(&NativeInput::of_type(NativeEventType::MouseMoved).at(400.0, 300.0));
    });
    join_input(input_thread)?;

    window.notify(Notification::Resized { width: 1280, height: 720 });
    wait_for_idle(&window, idle_timeout)?;

    app.notify(AppNotification::WillTerminate);
    log::info!(
        "Done: {} frames, {} events, window {:?}",
        renderer.frames.load(Ordering::Relaxed),
        renderer.events.load(Ordering::Relaxed),
        window.state()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting frame bridge demo");

    if let Err(e) = run() {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
