//! Named input actions and the keyboard state that answers them.
//!
//! Everything downstream (camera, fire trigger, debug view) only asks
//! [`InputIntent::is_action_active`]; which key produced the action is decided
//! by [`KeyBindings`].

use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    RotateLeft,
    RotateRight,
    RotateUp,
    RotateDown,
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Fire,
    ViewShaded,
    ViewNormals,
    ViewUv,
}

/// Polled once per tick by everything that reacts to input.
pub trait InputIntent {
    fn is_action_active(&self, action: Action) -> bool;
}

impl InputIntent for HashSet<Action> {
    fn is_action_active(&self, action: Action) -> bool {
        self.contains(&action)
    }
}

#[derive(Clone, Debug)]
pub struct KeyBindings(HashMap<KeyCode, Action>);

impl Default for KeyBindings {
    fn default() -> Self {
        Self(HashMap::from([
            (KeyCode::ArrowLeft, Action::RotateLeft),
            (KeyCode::ArrowRight, Action::RotateRight),
            (KeyCode::ArrowUp, Action::RotateUp),
            (KeyCode::ArrowDown, Action::RotateDown),
            (KeyCode::KeyW, Action::MoveForward),
            (KeyCode::KeyS, Action::MoveBackward),
            (KeyCode::KeyA, Action::MoveLeft),
            (KeyCode::KeyD, Action::MoveRight),
            (KeyCode::KeyQ, Action::MoveUp),
            (KeyCode::KeyE, Action::MoveDown),
            (KeyCode::KeyF, Action::Fire),
            (KeyCode::Digit1, Action::ViewShaded),
            (KeyCode::Digit2, Action::ViewNormals),
            (KeyCode::Digit3, Action::ViewUv),
        ]))
    }
}

impl KeyBindings {
    pub fn action(&self, key: KeyCode) -> Option<Action> {
        self.0.get(&key).copied()
    }

    /// Rebinds `key`, returning the action it was bound to before.
    pub fn bind(&mut self, key: KeyCode, action: Action) -> Option<Action> {
        self.0.insert(key, action)
    }
}

/// Keys currently held, as reported by window events.
#[derive(Clone, Debug, Default)]
pub struct KeyboardState {
    bindings: KeyBindings,
    held: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
        }
    }

    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Returns true if the event changed the keyboard state.
    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                self.set_key(*code, *state == ElementState::Pressed);
                true
            }
            // keys released while unfocused never arrive
            WindowEvent::Focused(false) => {
                self.clear();
                true
            }
            _ => false,
        }
    }
}

impl InputIntent for KeyboardState {
    fn is_action_active(&self, action: Action) -> bool {
        self.held
            .iter()
            .any(|key| self.bindings.action(*key) == Some(action))
    }
}
