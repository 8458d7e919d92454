use std::sync::Arc;

use anyhow::Context;
use feedback_gpu::error::RenderError;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

mod app;
mod input;

use app::App;
use input::Key;

// ---------------------------------------------------------------------------
// Handler — winit ApplicationHandler driving the feedback loop
// ---------------------------------------------------------------------------

struct Handler {
    window: Option<Arc<Window>>,
    app: Option<App>,
}

impl Handler {
    /// Map a winit key code to the windowing-independent `Key`.
    fn map_key(code: KeyCode) -> Option<Key> {
        match code {
            KeyCode::Space => Some(Key::Space),
            KeyCode::KeyR => Some(Key::R),
            KeyCode::KeyQ => Some(Key::Q),
            KeyCode::Escape => Some(Key::Escape),
            _ => None,
        }
    }
}

impl ApplicationHandler for Handler {
    /// Called once on desktop when the event loop starts.
    /// Creates the window then initialises the wgpu surface.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attrs = Window::default_attributes()
            .with_title("Feedback Loop")
            .with_inner_size(winit::dpi::LogicalSize::new(800u32, 600u32));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        log::info!("Window created (800×600)");

        match App::new(Arc::clone(&window)) {
            Ok(app) => {
                self.window = Some(window);
                self.app = Some(app);
            }
            Err(err) => {
                // Fatal setup error; the diagnostic names what failed.
                log::error!("setup failed: {err:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            // ----------------------------------------------------------------
            // Exit — checked here, at the iteration boundary, never mid-frame
            // ----------------------------------------------------------------
            WindowEvent::CloseRequested => {
                log::info!("Close requested — exiting");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let Some(app) = &mut self.app else { return };
                let Some(key) = Self::map_key(code) else { return };
                if let Some(action) = app.on_key_pressed(key) {
                    match app.handle_action(action) {
                        Ok(true) => {
                            log::info!("Quit — exiting");
                            event_loop.exit();
                        }
                        Ok(false) => {}
                        Err(err) => {
                            log::error!("fatal render error: {err}");
                            event_loop.exit();
                        }
                    }
                }
            }

            // ----------------------------------------------------------------
            // Resize — reconfigure the surface and offscreen targets
            // ----------------------------------------------------------------
            WindowEvent::Resized(new_size) => {
                if let Some(app) = &mut self.app {
                    if let Err(err) = app.resize(new_size.width, new_size.height) {
                        log::error!("fatal resize error: {err}");
                        event_loop.exit();
                    }
                }
            }

            // ----------------------------------------------------------------
            // Redraw — run one frame of the ping-pong loop
            // ----------------------------------------------------------------
            WindowEvent::RedrawRequested => {
                if let Some(app) = &mut self.app {
                    match app.render() {
                        Ok(()) => {}
                        // Surface lost / outdated: reconfigure and try again next frame.
                        Err(RenderError::Surface(
                            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                        )) => {
                            if let Some(window) = &self.window {
                                let size = window.inner_size();
                                if let Err(err) = app.resize(size.width, size.height) {
                                    log::error!("fatal resize error: {err}");
                                    event_loop.exit();
                                }
                            }
                        }
                        Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                            log::error!("GPU out of memory — exiting");
                            event_loop.exit();
                        }
                        Err(RenderError::Surface(err)) => log::warn!("render error: {err:?}"),
                        Err(err) => {
                            // Render state is no longer verifiable — abort the loop.
                            log::error!("fatal render error: {err}");
                            event_loop.exit();
                        }
                    }
                }
            }

            _ => {}
        }
    }

    /// Drive continuous redraws (game-loop style).
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = Handler {
        window: None,
        app: None,
    };
    event_loop
        .run_app(&mut handler)
        .context("event loop error")?;
    Ok(())
}
