use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use feedback_core::extent::Extent;
use feedback_gpu::driver::FrameDriver;
use feedback_gpu::error::RenderError;
use feedback_gpu::pipeline::PassPipelines;
use feedback_gpu::quad::QuadBuffer;
use feedback_gpu::target::TargetPair;
use winit::window::Window;

use crate::input::{InputAction, InputState, Key};

/// Offscreen storage is allocated at this multiple of the window size
/// (supersampling). Storage-to-output ratio, not a GPU requirement.
const OVERSHOOT: f32 = 2.0;

// ---------------------------------------------------------------------------
// Simple FPS counter — logs to console once per second
// ---------------------------------------------------------------------------

struct FpsCounter {
    frames: u32,
    last_report: Instant,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            last_report: Instant::now(),
        }
    }

    /// Increment the frame count. Returns the FPS value if a full second has
    /// elapsed since the last report (so the caller can log it).
    fn tick(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.last_report.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.last_report = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// App — owns every GPU handle; constructed once, passed into the loop
// ---------------------------------------------------------------------------

pub struct App {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,

    pipelines: PassPipelines,
    pair: TargetPair,
    quad: QuadBuffer,
    driver: FrameDriver,
    window_extent: Extent,

    input: InputState,
    paused: bool,

    // Frame timing
    last_frame: Instant,
    fps: FpsCounter,
}

impl App {
    /// Initialise wgpu for a given window. The window is wrapped in `Arc` so
    /// that the surface can safely hold a `'static` reference to it.
    ///
    /// Every failure here is a fatal setup error: the caller logs the
    /// diagnostic and aborts startup.
    pub fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let extent = Extent::new(size.width, size.height).clamped();

        // ---- Instance -------------------------------------------------------
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // ---- Surface --------------------------------------------------------
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create wgpu surface")?;

        // ---- Adapter --------------------------------------------------------
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter found")?;

        log::info!("GPU adapter: {}", adapter.get_info().name);

        // ---- Device & Queue -------------------------------------------------
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("feedback-app device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create GPU device")?;

        // ---- Surface configuration ------------------------------------------
        let surface_caps = surface.get_capabilities(&adapter);

        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: extent.width,
            height: extent.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);
        log::info!("Surface configured: {extent} {format:?} Fifo");

        // ---- Render stack ---------------------------------------------------
        let pipelines = PassPipelines::new(&device, format)
            .context("failed to build render pipelines")?;
        let pair = TargetPair::new(&device, extent, OVERSHOOT)
            .context("failed to allocate offscreen targets")?;
        let quad = QuadBuffer::new(&device);
        let driver = FrameDriver::new(&device, &pipelines);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            pipelines,
            pair,
            quad,
            driver,
            window_extent: extent,
            input: InputState::new(),
            paused: false,
            last_frame: Instant::now(),
            fps: FpsCounter::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Resize
    // -------------------------------------------------------------------------

    /// Reconfigure the surface and reallocate the offscreen pair. Zero-size
    /// events (minimize, live drags) are skipped; the pair clamps anything
    /// degenerate that still gets through.
    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), RenderError> {
        let extent = Extent::new(new_width, new_height);
        if extent.is_degenerate() {
            return Ok(());
        }
        self.surface_config.width = extent.width;
        self.surface_config.height = extent.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.window_extent = extent;

        self.pair.resize(&self.device, extent)?;
        log::debug!("surface resized to {extent}");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Input — called by main.rs window_event handler
    // -------------------------------------------------------------------------

    /// Translate a key press and return the resulting action, if any.
    pub fn on_key_pressed(&self, key: Key) -> Option<InputAction> {
        self.input.on_key(key)
    }

    /// Apply an action to the app state.
    ///
    /// Returns `Ok(true)` if the app should exit (i.e. action was `Quit`).
    pub fn handle_action(&mut self, action: InputAction) -> Result<bool, RenderError> {
        match action {
            InputAction::TogglePause => {
                self.paused = !self.paused;
                if !self.paused {
                    // Don't fold the paused wall time into the next delta.
                    self.last_frame = Instant::now();
                }
                log::info!("{}", if self.paused { "paused" } else { "resumed" });
            }

            InputAction::Reset => {
                // Fresh textures start zeroed, so reallocating the pair wipes
                // the accumulated history.
                self.pair = TargetPair::new(&self.device, self.window_extent, OVERSHOOT)?;
                self.driver.reset_clock();
                log::info!("feedback history reset");
            }

            InputAction::Quit => return Ok(true),
        }
        Ok(false)
    }

    // -------------------------------------------------------------------------
    // Render
    // -------------------------------------------------------------------------

    /// Run one full frame: effect pass, present pass, swap, clock advance.
    pub fn render(&mut self) -> Result<(), RenderError> {
        // --- Timing ----------------------------------------------------------
        let now = Instant::now();
        let dt = if self.paused {
            0.0
        } else {
            now.duration_since(self.last_frame).as_secs_f32()
        };
        self.last_frame = now;

        if let Some(fps) = self.fps.tick() {
            let clock = self.driver.clock();
            log::debug!(
                "FPS: {fps:.1}  frame: {}  t: {:.1}s  storage: {}",
                clock.frame(),
                clock.elapsed(),
                self.pair.storage_extent(),
            );
        }

        // --- Acquire surface texture and drive the frame ---------------------
        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.driver.render_frame(
            &self.device,
            &self.queue,
            &self.pipelines,
            &mut self.pair,
            &self.quad,
            &surface_view,
            self.window_extent,
            dt,
        )?;

        output.present();
        Ok(())
    }
}
