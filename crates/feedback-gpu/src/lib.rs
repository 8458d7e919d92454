pub mod context;
pub mod driver;
pub mod error;
pub mod pipeline;
pub mod quad;
pub mod readback;
pub mod target;
pub mod uniforms;

// ---------------------------------------------------------------------------
// Test support — headless context acquisition with graceful skip
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use crate::context::GpuContext;

    /// Acquire a headless GPU context for a test, or `None` when the machine
    /// has no usable adapter (CI runners without a GPU). Callers return early
    /// on `None` so the suite still passes everywhere.
    pub fn context() -> Option<GpuContext> {
        match pollster::block_on(GpuContext::new_headless()) {
            Ok(ctx) => Some(ctx),
            Err(err) => {
                eprintln!("skipping GPU test: {err}");
                None
            }
        }
    }
}
