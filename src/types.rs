use winit::event::{ElementState, VirtualKeyCode};

/// Trait for something that handles keyboard input events
pub trait KeyboardHandler {
    fn input(&mut self, keycode: VirtualKeyCode, state: ElementState);
}

/// Direction requested by one of the level triggered movement keys
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Trait for something that moves while a movement key is held, typically a
/// camera owned by the application. Called once per frame per held key with
/// that frame's delta time in seconds.
pub trait MovementHandler {
    fn movement(&mut self, movement: Movement, delta: f32);
}

/// Applications without a camera can pass `&mut ()`
impl MovementHandler for () {
    fn movement(&mut self, _movement: Movement, _delta: f32) {}
}

/// The two clips a session switches between. The primary clip hides the prop
/// and the secondary clip shows it and starts the attach countdown.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClipSlot {
    Primary,
    Secondary,
}

impl ClipSlot {
    /// Position of the slot's clip in the session's clip list
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}
