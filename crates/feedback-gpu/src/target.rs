use feedback_core::extent::Extent;
use feedback_core::pingpong::RoleState;
use feedback_core::TargetRole;
use wgpu::Device;

use crate::error::RenderError;
use crate::pipeline::TARGET_FORMAT;

// ---------------------------------------------------------------------------
// OffscreenTarget
// ---------------------------------------------------------------------------

/// One offscreen color target: the render destination texture plus its
/// sampleable view and fixed dimensions. Storage is replaced only by
/// `TargetPair::resize`.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    extent: Extent,
    role: TargetRole,
    complete: bool,
}

impl OffscreenTarget {
    /// Allocate the backing texture inside a validation error scope. Any
    /// device rejection surfaces as `IncompleteTarget` naming the role and
    /// dimensions; setup cannot proceed with a broken render target.
    fn new(device: &Device, role: TargetRole, extent: Extent) -> Result<Self, RenderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(match role {
                TargetRole::A => "offscreen target A",
                TargetRole::B => "offscreen target B",
            }),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::IncompleteTarget {
                role,
                extent,
                reason: err.to_string(),
            });
        }

        let view = texture.create_view(&Default::default());
        Ok(Self {
            texture,
            view,
            extent,
            role,
            complete: true,
        })
    }

    /// The view to bind as a render destination. Fatal if the target is no
    /// longer complete — rendering into an unverified target is never
    /// attempted.
    pub fn attachment(&self) -> Result<&wgpu::TextureView, RenderError> {
        if !self.complete {
            return Err(RenderError::IncompleteTarget {
                role: self.role,
                extent: self.extent,
                reason: "target is not framebuffer-complete".into(),
            });
        }
        Ok(&self.view)
    }

    /// The view to bind as a sample source.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn role(&self) -> TargetRole {
        self.role
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

// ---------------------------------------------------------------------------
// TargetPair
// ---------------------------------------------------------------------------

/// The two equally-sized offscreen targets plus the role state deciding which
/// one the next effect pass writes. `swap()` is the only role mutator and is
/// called exactly once per frame by the driver.
pub struct TargetPair {
    a: OffscreenTarget,
    b: OffscreenTarget,
    roles: RoleState,
    overshoot: f32,
}

impl TargetPair {
    /// Allocate both targets at `extent` scaled by `overshoot` (storage may
    /// exceed the window for supersampling; the ratio is configurable).
    /// Degenerate extents are clamped to 1×1 before allocation.
    pub fn new(device: &Device, extent: Extent, overshoot: f32) -> Result<Self, RenderError> {
        let storage = extent.clamped().scaled(overshoot);
        log::info!("allocating offscreen targets at {storage} (output {extent}, overshoot {overshoot})");
        Ok(Self {
            a: OffscreenTarget::new(device, TargetRole::A, storage)?,
            b: OffscreenTarget::new(device, TargetRole::B, storage)?,
            roles: RoleState::new(TargetRole::A),
            overshoot,
        })
    }

    pub fn target(&self, role: TargetRole) -> &OffscreenTarget {
        match role {
            TargetRole::A => &self.a,
            TargetRole::B => &self.b,
        }
    }

    /// The target the next effect pass writes into.
    pub fn write_target(&self) -> &OffscreenTarget {
        self.target(self.roles.write_role())
    }

    /// The target the next effect pass samples.
    pub fn read_target(&self) -> &OffscreenTarget {
        self.target(self.roles.read_role())
    }

    pub fn roles(&self) -> RoleState {
        self.roles
    }

    /// Flip write/read roles. No GPU-visible side effect by itself; only
    /// subsequent routing changes.
    pub fn swap(&mut self) {
        self.roles.swap();
    }

    /// Reallocate both targets' storage for a new output size. The A/B role
    /// assignment is preserved; only the backing storage changes. The old
    /// textures are dropped with the replaced targets.
    pub fn resize(&mut self, device: &Device, extent: Extent) -> Result<(), RenderError> {
        let storage = extent.clamped().scaled(self.overshoot);
        log::debug!("offscreen targets resized to {storage}");
        self.a = OffscreenTarget::new(device, TargetRole::A, storage)?;
        self.b = OffscreenTarget::new(device, TargetRole::B, storage)?;
        Ok(())
    }

    /// Dimensions of the backing storage (both targets always match).
    pub fn storage_extent(&self) -> Extent {
        self.a.extent()
    }
}

// ---------------------------------------------------------------------------
// Tests (headless; skipped when no adapter is available)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn creation_allocates_complete_targets_at_overshoot_size() {
        let Some(ctx) = testing::context() else { return };
        let pair = TargetPair::new(&ctx.device, Extent::new(320, 240), 2.0).unwrap();
        assert_eq!(pair.storage_extent(), Extent::new(640, 480));
        assert!(pair.target(TargetRole::A).is_complete());
        assert!(pair.target(TargetRole::B).is_complete());
    }

    #[test]
    fn initial_roles_write_a_read_b() {
        let Some(ctx) = testing::context() else { return };
        let pair = TargetPair::new(&ctx.device, Extent::new(8, 8), 1.0).unwrap();
        assert_eq!(pair.write_target().role(), TargetRole::A);
        assert_eq!(pair.read_target().role(), TargetRole::B);
    }

    #[test]
    fn swap_exchanges_write_and_read() {
        let Some(ctx) = testing::context() else { return };
        let mut pair = TargetPair::new(&ctx.device, Extent::new(8, 8), 1.0).unwrap();
        pair.swap();
        assert_eq!(pair.write_target().role(), TargetRole::B);
        assert_eq!(pair.read_target().role(), TargetRole::A);
    }

    #[test]
    fn resize_reallocates_both_targets_to_the_new_dimensions() {
        let Some(ctx) = testing::context() else { return };
        let mut pair = TargetPair::new(&ctx.device, Extent::new(800, 600), 1.0).unwrap();
        pair.resize(&ctx.device, Extent::new(400, 300)).unwrap();
        for role in [TargetRole::A, TargetRole::B] {
            let target = pair.target(role);
            assert_eq!(target.extent(), Extent::new(400, 300));
            assert!(target.is_complete());
        }
    }

    #[test]
    fn resize_preserves_the_role_assignment() {
        let Some(ctx) = testing::context() else { return };
        let mut pair = TargetPair::new(&ctx.device, Extent::new(64, 64), 1.0).unwrap();
        pair.swap(); // B is now the write target
        pair.resize(&ctx.device, Extent::new(32, 32)).unwrap();
        assert_eq!(pair.write_target().role(), TargetRole::B);
    }

    #[test]
    fn degenerate_resize_clamps_instead_of_failing() {
        let Some(ctx) = testing::context() else { return };
        let mut pair = TargetPair::new(&ctx.device, Extent::new(64, 64), 1.0).unwrap();
        pair.resize(&ctx.device, Extent::new(0, 0)).unwrap();
        assert_eq!(pair.storage_extent(), Extent::new(1, 1));
    }

    #[test]
    fn overshoot_applies_on_resize_too() {
        let Some(ctx) = testing::context() else { return };
        let mut pair = TargetPair::new(&ctx.device, Extent::new(100, 100), 2.0).unwrap();
        pair.resize(&ctx.device, Extent::new(50, 50)).unwrap();
        assert_eq!(pair.storage_extent(), Extent::new(100, 100));
    }
}
