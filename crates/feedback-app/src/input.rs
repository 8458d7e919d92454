// ---------------------------------------------------------------------------
// Key — windowing-library-independent key representation
// ---------------------------------------------------------------------------

/// A keyboard key, independent of any windowing library.
///
/// `main.rs` maps `winit::keyboard::PhysicalKey` → `Key`; everything else
/// works purely with this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    R,
    Q,
    Escape,
}

// ---------------------------------------------------------------------------
// InputAction — what the app does in response to input
// ---------------------------------------------------------------------------

/// High-level action produced by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Freeze/unfreeze the effect clock; the accumulated image holds still.
    TogglePause,
    /// Restart the feedback accumulation from a blank history.
    Reset,
    Quit,
}

// ---------------------------------------------------------------------------
// InputState
// ---------------------------------------------------------------------------

pub struct InputState;

impl InputState {
    pub fn new() -> Self {
        Self
    }

    /// Translate a `Key` press into an `InputAction`, if the key is mapped.
    pub fn on_key(&self, key: Key) -> Option<InputAction> {
        match key {
            Key::Space => Some(InputAction::TogglePause),
            Key::R => Some(InputAction::Reset),
            Key::Q | Key::Escape => Some(InputAction::Quit),
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> InputState {
        InputState::new()
    }

    #[test]
    fn space_toggles_pause() {
        assert_eq!(input().on_key(Key::Space), Some(InputAction::TogglePause));
    }

    #[test]
    fn r_resets_the_accumulation() {
        assert_eq!(input().on_key(Key::R), Some(InputAction::Reset));
    }

    #[test]
    fn q_and_escape_both_quit() {
        assert_eq!(input().on_key(Key::Q), Some(InputAction::Quit));
        assert_eq!(input().on_key(Key::Escape), Some(InputAction::Quit));
    }
}
