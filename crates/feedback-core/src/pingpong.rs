use crate::{PassMode, TargetRole};

// ---------------------------------------------------------------------------
// RoleState — which target is written this frame
// ---------------------------------------------------------------------------

/// The alternation state of a target pair: exactly one target is the write
/// target at any instant, the other is the read target.
///
/// `swap()` is the only mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleState {
    active: TargetRole,
}

impl RoleState {
    pub const fn new(active: TargetRole) -> Self {
        Self { active }
    }

    /// The target the next effect pass writes into.
    pub const fn write_role(&self) -> TargetRole {
        self.active
    }

    /// The target the next effect pass samples — always the other one.
    pub const fn read_role(&self) -> TargetRole {
        self.active.other()
    }

    /// Flip the write/read roles. Called exactly once per frame, after the
    /// effect pass and before the next frame's effect pass.
    pub fn swap(&mut self) {
        self.active = self.active.other();
    }
}

// ---------------------------------------------------------------------------
// FramePlan — the per-frame routing decision
// ---------------------------------------------------------------------------

/// Everything the frame driver needs to route one frame's two passes.
///
/// Built purely from the current role state and frame index, so a test can
/// step the state machine any number of frames and inspect the routing
/// without a GPU. Invariants upheld by construction:
///
/// * `effect_source != effect_dest` — the effect pass never samples the
///   target it is writing;
/// * `present_source == effect_dest` — the presented image is the one
///   written *this* frame, not the pre-swap read target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    pub frame: u64,
    pub effect_dest: TargetRole,
    pub effect_source: TargetRole,
    pub effect_mode: PassMode,
    pub present_source: TargetRole,
}

impl FramePlan {
    pub fn for_frame(roles: RoleState, frame: u64) -> Self {
        let dest = roles.write_role();
        Self {
            frame,
            effect_dest: dest,
            effect_source: roles.read_role(),
            effect_mode: PassMode::effect_into(dest),
            present_source: dest,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
