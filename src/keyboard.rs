use crate::types::KeyboardHandler;
use winit::event::{ElementState, VirtualKeyCode};

/// Level state of every key, fed from winit keyboard events.
///
/// `VirtualKeyCode` is the symbolic name of a key, so the key labelled 1 is
/// `Key1` on any layout. The winit `VirtualKeyCode` enum currently has 163
/// entries and there is no stable way to count them, so the table is sized
/// with some room to spare.
///
/// The session's trigger layer only reads the current level and does its own
/// edge detection per action. `tick` and `is_just_pressed` are for
/// application code that wants edges per key instead.
const ARRAY_SIZE: usize = 180;

pub struct Keyboard {
    current_keys: [bool; ARRAY_SIZE],
    previous_keys: [bool; ARRAY_SIZE],
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardHandler for Keyboard {
    fn input(&mut self, keycode: VirtualKeyCode, state: ElementState) {
        self.set(keycode, state == ElementState::Pressed);
    }
}

impl Keyboard {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current_keys: [false; ARRAY_SIZE],
            previous_keys: [false; ARRAY_SIZE],
        }
    }

    /// Call at the end of a frame to remember which keys were down
    pub fn tick(&mut self) {
        self.previous_keys = self.current_keys;
    }

    /// Sets a key's level directly, for scripted input or tests
    pub fn set(&mut self, keycode: VirtualKeyCode, pressed: bool) {
        self.current_keys[keycode as usize] = pressed;
    }

    /// Releases every key, e.g. when the window loses focus and release
    /// events would be missed
    pub fn release_all(&mut self) {
        self.current_keys = [false; ARRAY_SIZE];
    }

    #[must_use]
    pub const fn is_pressed(&self, keycode: VirtualKeyCode) -> bool {
        self.current_keys[keycode as usize]
    }

    /// Pressed now but not at the last `tick`
    #[must_use]
    pub const fn is_just_pressed(&self, keycode: VirtualKeyCode) -> bool {
        self.current_keys[keycode as usize]
            && !self.previous_keys[keycode as usize]
    }
}
