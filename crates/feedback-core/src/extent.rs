// ---------------------------------------------------------------------------
// Extent — pixel dimensions with degenerate-size and overshoot handling
// ---------------------------------------------------------------------------

/// Width and height of a render target or surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero. Window systems report 0×0 while a
    /// window is being minimized or dragged; allocating at that size would
    /// fail, so degenerate extents must be clamped or skipped.
    pub const fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clamp both dimensions to at least 1 pixel so a transient zero-size
    /// event can never turn into a fatal allocation failure.
    pub fn clamped(self) -> Extent {
        if self.is_degenerate() {
            log::warn!(
                "degenerate extent {}×{} clamped to minimum 1×1",
                self.width,
                self.height
            );
        }
        Extent {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }

    /// Scale by the storage-overshoot ratio. Offscreen storage may be larger
    /// than the window (supersampling); the ratio is configurable rather than
    /// a fixed ×2. The result is rounded and never below 1×1.
    pub fn scaled(self, factor: f32) -> Extent {
        let scale = |v: u32| ((v as f32 * factor).round() as u32).max(1);
        Extent {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_leaves_normal_sizes_alone() {
        assert_eq!(Extent::new(800, 600).clamped(), Extent::new(800, 600));
    }

    #[test]
    fn zero_width_clamps_to_one() {
        assert_eq!(Extent::new(0, 600).clamped(), Extent::new(1, 600));
    }

    #[test]
    fn zero_both_clamps_to_one_by_one() {
        assert_eq!(Extent::new(0, 0).clamped(), Extent::new(1, 1));
    }

    #[test]
    fn degenerate_detection() {
        assert!(Extent::new(0, 10).is_degenerate());
        assert!(Extent::new(10, 0).is_degenerate());
        assert!(!Extent::new(1, 1).is_degenerate());
    }

    #[test]
    fn scaled_by_two_doubles_storage() {
        // Supersampled targets: 800×600 window, 1600×1200 storage.
        assert_eq!(Extent::new(800, 600).scaled(2.0), Extent::new(1600, 1200));
    }

    #[test]
    fn scaled_by_one_is_identity() {
        assert_eq!(Extent::new(1728, 1051).scaled(1.0), Extent::new(1728, 1051));
    }

    #[test]
    fn scaled_rounds_fractional_results() {
        // 3 * 1.5 = 4.5 → 5 (round-half-up), 5 * 1.5 = 7.5 → 8
        assert_eq!(Extent::new(3, 5).scaled(1.5), Extent::new(5, 8));
    }

    #[test]
    fn scaled_never_drops_below_one() {
        assert_eq!(Extent::new(1, 1).scaled(0.1), Extent::new(1, 1));
    }

    #[test]
    fn display_uses_dimensions() {
        assert_eq!(Extent::new(400, 300).to_string(), "400×300");
    }
}
