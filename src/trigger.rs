use crate::{
    keyboard::Keyboard,
    types::{ClipSlot, Movement, MovementHandler},
};
use ahash::{HashMap, HashMapExt};
use log::trace;
use smallvec::SmallVec;
use std::hash::Hash;
use winit::event::VirtualKeyCode;

/// Something a key can be bound to
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Action {
    SelectClip(ClipSlot),
    Quit,
    Move(Movement),
}

/// Discrete commands produced by key presses
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    SwitchClip(ClipSlot),
    Quit,
}

/// Commands from one frame. Rarely more than one.
pub type Commands = SmallVec<[Command; 2]>;

/// Rising edge detection keyed by an action id. Remembers whether each
/// action was active in the previous update.
#[derive(Clone, Debug)]
pub struct EdgeDetector<A> {
    previous: HashMap<A, bool>,
}

impl<A: Copy + Eq + Hash> Default for EdgeDetector<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Copy + Eq + Hash> EdgeDetector<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            previous: HashMap::new(),
        }
    }

    /// Records the current level of `action` and returns `true` only if it
    /// is active now and wasn't at the previous update
    pub fn update(&mut self, action: A, active: bool) -> bool {
        let was_active = self.previous.insert(action, active).unwrap_or(false);
        active && !was_active
    }

    /// Forgets all previous levels, so an action still held counts as a new
    /// press
    pub fn reset(&mut self) {
        self.previous.clear();
    }
}

/// Table of action to key. Each action has at most one key and the table
/// order is the order actions are polled in.
#[derive(Clone, Debug)]
pub struct Bindings {
    table: Vec<(Action, VirtualKeyCode)>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            table: vec![
                (Action::Quit, VirtualKeyCode::Escape),
                (Action::SelectClip(ClipSlot::Primary), VirtualKeyCode::Key1),
                (Action::SelectClip(ClipSlot::Secondary), VirtualKeyCode::Key2),
                (Action::Move(Movement::Forward), VirtualKeyCode::W),
                (Action::Move(Movement::Backward), VirtualKeyCode::S),
                (Action::Move(Movement::Left), VirtualKeyCode::A),
                (Action::Move(Movement::Right), VirtualKeyCode::D),
            ],
        }
    }
}

impl Bindings {
    /// Bindings with nothing bound
    #[must_use]
    pub const fn empty() -> Self {
        Self { table: Vec::new() }
    }

    /// Binds `action` to `keycode`, replacing any key it had
    #[must_use]
    pub fn bind(mut self, action: Action, keycode: VirtualKeyCode) -> Self {
        if let Some(entry) = self.table.iter_mut().find(|(a, _)| *a == action) {
            entry.1 = keycode;
        } else {
            self.table.push((action, keycode));
        }
        self
    }

    #[must_use]
    pub fn key_for(&self, action: Action) -> Option<VirtualKeyCode> {
        self.table
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, k)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Action, VirtualKeyCode)> {
        self.table.iter()
    }
}

/// Turns keyboard state into commands once per frame. Clip selection and
/// quit fire once per press. Movement keys are forwarded every frame they
/// are held.
#[derive(Clone, Debug, Default)]
pub struct TriggerLayer {
    bindings: Bindings,
    edges: EdgeDetector<Action>,
}

impl TriggerLayer {
    #[must_use]
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings,
            edges: EdgeDetector::new(),
        }
    }

    #[must_use]
    pub const fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn poll<M: MovementHandler + ?Sized>(
        &mut self,
        keyboard: &Keyboard,
        delta: f32,
        mover: &mut M,
    ) -> Commands {
        let mut commands = Commands::new();
        for &(action, keycode) in self.bindings.iter() {
            let pressed = keyboard.is_pressed(keycode);
            match action {
                Action::Move(movement) => {
                    if pressed {
                        mover.movement(movement, delta);
                    }
                }
                Action::SelectClip(slot) => {
                    if self.edges.update(action, pressed) {
                        trace!("{keycode:?} pressed, select {slot:?}");
                        commands.push(Command::SwitchClip(slot));
                    }
                }
                Action::Quit => {
                    if self.edges.update(action, pressed) {
                        commands.push(Command::Quit);
                    }
                }
            }
        }
        commands
    }
}
