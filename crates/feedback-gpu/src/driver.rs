use feedback_core::clock::FrameClock;
use feedback_core::extent::Extent;
use feedback_core::pingpong::FramePlan;
use feedback_core::PassMode;
use wgpu::{Device, Queue};

use crate::context::FrameUniforms;
use crate::error::RenderError;
use crate::pipeline::PassPipelines;
use crate::quad::QuadBuffer;
use crate::target::TargetPair;
use crate::uniforms::UniformBinder;

/// Background clear color for both passes.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

// ---------------------------------------------------------------------------
// FrameDriver — the per-frame ping-pong state machine
// ---------------------------------------------------------------------------

/// Sequences one frame: effect pass into the write target (sampling the read
/// target), present pass onto the screen (sampling the just-written target),
/// then the role swap and clock advance.
///
/// The screen view is a parameter (the surface texture in the app, an
/// offscreen texture in tests), so N frames can be driven deterministically
/// without a display.
pub struct FrameDriver {
    clock: FrameClock,
    effect_uniforms: UniformBinder,
    present_uniforms: UniformBinder,
}

impl FrameDriver {
    pub fn new(device: &Device, pipelines: &PassPipelines) -> Self {
        // One binder per pass: both draws live in one submission, so they
        // cannot share a buffer without the second write clobbering the first.
        Self {
            clock: FrameClock::new(),
            effect_uniforms: UniformBinder::new(device, &pipelines.uniform_layout, "effect uniforms"),
            present_uniforms: UniformBinder::new(device, &pipelines.uniform_layout, "present uniforms"),
        }
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Restart frame numbering and elapsed time (the accumulated images are
    /// the pair's concern, not the driver's).
    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }

    /// Run one full frame and advance the state machine.
    ///
    /// Returns the routing plan that was executed, so callers (and tests)
    /// can observe which targets were written, sampled, and presented.
    #[allow(clippy::too_many_arguments)]
    pub fn render_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        pipelines: &PassPipelines,
        pair: &mut TargetPair,
        quad: &QuadBuffer,
        screen: &wgpu::TextureView,
        screen_extent: Extent,
        dt: f32,
    ) -> Result<FramePlan, RenderError> {
        let plan = FramePlan::for_frame(pair.roles(), self.clock.frame());

        let write = pair.write_target();
        let read = pair.read_target();
        // Binding an unverified render destination mid-loop is fatal.
        let effect_dest = write.attachment()?;
        let storage = write.extent();

        self.effect_uniforms.set_frame(
            queue,
            &FrameUniforms {
                resolution: [storage.width as f32, storage.height as f32],
                time: self.clock.elapsed(),
                frame: self.clock.frame() as u32,
                mode: plan.effect_mode.shader_index(),
                _pad: [0; 3],
            },
        );
        self.present_uniforms.set_frame(
            queue,
            &FrameUniforms {
                resolution: [screen_extent.width as f32, screen_extent.height as f32],
                time: self.clock.elapsed(),
                frame: self.clock.frame() as u32,
                mode: PassMode::Present.shader_index(),
                _pad: [0; 3],
            },
        );

        // The effect samples last frame's image; the present pass samples
        // what the effect just wrote, never the pre-swap read target.
        let history_bg = pipelines.source_bind_group(device, read.view());
        let written_bg = pipelines.source_bind_group(device, write.view());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("effect pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: effect_dest,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&pipelines.effect);
            pass.set_bind_group(0, &self.effect_uniforms.bind_group, &[]);
            pass.set_bind_group(1, &history_bg, &[]);
            quad.draw(&mut pass);
        }
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: screen,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&pipelines.present);
            pass.set_bind_group(0, &self.present_uniforms.bind_group, &[]);
            pass.set_bind_group(1, &written_bg, &[]);
            quad.draw(&mut pass);
        }
        queue.submit(std::iter::once(encoder.finish()));

        // Role swap happens after the frame is recorded: it only changes
        // which target the *next* frame writes, not what was presented.
        pair.swap();
        self.clock.advance(dt);
        Ok(plan)
    }
}

// ---------------------------------------------------------------------------
// Tests (headless; skipped when no adapter is available)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GpuContext;
    use crate::pipeline::TARGET_FORMAT;
    use crate::readback::read_rgba8;
    use crate::testing;
    use feedback_core::TargetRole;

    struct Harness {
        ctx: GpuContext,
        pipelines: PassPipelines,
        pair: TargetPair,
        quad: QuadBuffer,
        driver: FrameDriver,
        screen: wgpu::Texture,
        screen_extent: Extent,
    }

    fn harness(extent: Extent) -> Option<Harness> {
        let ctx = testing::context()?;
        let pipelines = PassPipelines::new(&ctx.device, TARGET_FORMAT).unwrap();
        let pair = TargetPair::new(&ctx.device, extent, 1.0).unwrap();
        let quad = QuadBuffer::new(&ctx.device);
        let driver = FrameDriver::new(&ctx.device, &pipelines);
        let screen = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test screen"),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        Some(Harness {
            ctx,
            pipelines,
            pair,
            quad,
            driver,
            screen,
            screen_extent: extent,
        })
    }

    impl Harness {
        fn step(&mut self) -> FramePlan {
            let view = self.screen.create_view(&Default::default());
            self.driver
                .render_frame(
                    &self.ctx.device,
                    &self.ctx.queue,
                    &self.pipelines,
                    &mut self.pair,
                    &self.quad,
                    &view,
                    self.screen_extent,
                    1.0 / 60.0,
                )
                .unwrap()
        }
    }

    // --- Two full frames, end to end --------------------------------------------

    #[test]
    fn two_frames_present_a_then_b() {
        let Some(mut h) = harness(Extent::new(8, 8)) else { return };

        assert_eq!(h.pair.write_target().role(), TargetRole::A);
        assert_eq!(h.pair.read_target().role(), TargetRole::B);

        let frame1 = h.step();
        assert_eq!(frame1.effect_dest, TargetRole::A);
        assert_eq!(frame1.effect_source, TargetRole::B);
        assert_eq!(frame1.present_source, TargetRole::A);
        // After the end-of-frame swap, B is the next write target.
        assert_eq!(h.pair.write_target().role(), TargetRole::B);

        let frame2 = h.step();
        // The second frame presents B; A was only a sample source.
        assert_eq!(frame2.present_source, TargetRole::B);
        assert_eq!(frame2.effect_source, TargetRole::A);
    }

    #[test]
    fn executed_plans_alternate_and_never_self_sample() {
        let Some(mut h) = harness(Extent::new(8, 8)) else { return };
        let plans: Vec<FramePlan> = (0..6).map(|_| h.step()).collect();
        for pair in plans.windows(2) {
            assert_ne!(pair[0].effect_dest, pair[1].effect_dest);
        }
        for plan in &plans {
            assert_ne!(plan.effect_source, plan.effect_dest);
            assert_eq!(plan.present_source, plan.effect_dest);
        }
    }

    #[test]
    fn clock_advances_once_per_frame() {
        let Some(mut h) = harness(Extent::new(8, 8)) else { return };
        assert_eq!(h.driver.clock().frame(), 0);
        h.step();
        h.step();
        assert_eq!(h.driver.clock().frame(), 2);
        assert!((h.driver.clock().elapsed() - 2.0 / 60.0).abs() < 1e-6);
    }

    // --- Idempotent present mode ------------------------------------------------

    #[test]
    fn present_mode_copies_the_sampled_texture_verbatim() {
        let Some(ctx) = testing::context() else { return };
        let extent = Extent::new(16, 16);
        let pipelines = PassPipelines::new(&ctx.device, TARGET_FORMAT).unwrap();
        let pair = TargetPair::new(&ctx.device, extent, 1.0).unwrap();
        let quad = QuadBuffer::new(&ctx.device);
        let source = pair.write_target();

        // Fill the source with a solid, exactly-representable color.
        let mut encoder = ctx.device.create_command_encoder(&Default::default());
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fill source"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: source.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 1.0,
                        g: 0.0,
                        b: 0.0,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        ctx.queue.submit(Some(encoder.finish()));

        // One present-mode draw of the quad, sampling the source.
        let dest = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("present dest"),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let dest_view = dest.create_view(&Default::default());
        let uniforms = UniformBinder::new(&ctx.device, &pipelines.uniform_layout, "present test");
        uniforms.set_frame(
            &ctx.queue,
            &FrameUniforms {
                resolution: [extent.width as f32, extent.height as f32],
                time: 123.0, // present mode must ignore time entirely
                frame: 7,
                mode: PassMode::Present.shader_index(),
                _pad: [0; 3],
            },
        );
        let source_bg = pipelines.source_bind_group(&ctx.device, source.view());
        let mut encoder = ctx.device.create_command_encoder(&Default::default());
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dest_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&pipelines.present);
            pass.set_bind_group(0, &uniforms.bind_group, &[]);
            pass.set_bind_group(1, &source_bg, &[]);
            quad.draw(&mut pass);
        }
        ctx.queue.submit(Some(encoder.finish()));

        let original = read_rgba8(&ctx.device, &ctx.queue, source.texture(), extent).unwrap();
        let presented = read_rgba8(&ctx.device, &ctx.queue, &dest, extent).unwrap();
        assert_eq!(original, presented, "present pass altered the image");
    }
}
