use std::collections::{HashMap, HashSet};

use winit::event::ElementState;

pub use winit::keyboard::KeyCode;

use crate::error::{EngineError, Result};

/// Table from human readable key names (`"up"`, `"a"`, `"space"`) to key codes.
///
/// Lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct KeyMap {
    names: HashMap<String, KeyCode>,
}

impl Default for KeyMap {
    fn default() -> Self {
        const LETTERS: [KeyCode; 26] = [
            KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
            KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
            KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
            KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
            KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
            KeyCode::KeyZ,
        ];
        const DIGITS: [KeyCode; 10] = [
            KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
            KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
        ];
        const NAMED: [(&str, KeyCode); 16] = [
            ("up", KeyCode::ArrowUp),
            ("down", KeyCode::ArrowDown),
            ("left", KeyCode::ArrowLeft),
            ("right", KeyCode::ArrowRight),
            ("space", KeyCode::Space),
            ("enter", KeyCode::Enter),
            ("return", KeyCode::Enter),
            ("escape", KeyCode::Escape),
            ("esc", KeyCode::Escape),
            ("tab", KeyCode::Tab),
            ("backspace", KeyCode::Backspace),
            ("lshift", KeyCode::ShiftLeft),
            ("shift", KeyCode::ShiftLeft),
            ("rshift", KeyCode::ShiftRight),
            ("lctrl", KeyCode::ControlLeft),
            ("rctrl", KeyCode::ControlRight),
        ];

        let mut names = HashMap::new();
        for (letter, code) in ('a'..='z').zip(LETTERS) {
            names.insert(letter.to_string(), code);
        }
        for (digit, code) in ('0'..='9').zip(DIGITS) {
            names.insert(digit.to_string(), code);
        }
        for (name, code) in NAMED {
            names.insert(name.to_string(), code);
        }
        names.insert("ctrl".to_string(), KeyCode::ControlLeft);

        Self { names }
    }
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: AsRef<str>>(&mut self, name: S, code: KeyCode) -> Option<KeyCode> {
        self.names.insert(name.as_ref().to_ascii_lowercase(), code)
    }

    pub fn lookup(&self, name: &str) -> Result<KeyCode> {
        self.names.get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| EngineError::invalid_argument(format!("unknown key name '{name}'")))
    }
}

/// Keyboard state for the current frame.
///
/// The frame driver feeds toolkit key events through [`Input::handle_key`] and
/// calls [`Input::end_frame`] once the frame is done. Queries never change the
/// state, so any number of scripts can ask about the same key in one frame.
#[derive(Debug, Default)]
pub struct Input {
    key_map: KeyMap,
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    released: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_map(key_map: KeyMap) -> Self {
        Self {
            key_map,
            ..Default::default()
        }
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub fn key_map_mut(&mut self) -> &mut KeyMap {
        &mut self.key_map
    }

    pub fn handle_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if !repeat && self.held.insert(code) {
                    log::trace!("Key {code:?} pressed");
                    self.pressed.insert(code);
                }
            },
            ElementState::Released => {
                if self.held.remove(&code) {
                    log::trace!("Key {code:?} released");
                    self.released.insert(code);
                }
            },
        }
    }

    /// Key is currently held down.
    pub fn get_key(&self, name: &str) -> Result<bool> {
        Ok(self.is_held(self.key_map.lookup(name)?))
    }

    /// Key went down since the last [`Input::end_frame`].
    pub fn get_key_down(&self, name: &str) -> Result<bool> {
        Ok(self.was_pressed(self.key_map.lookup(name)?))
    }

    /// Key went up since the last [`Input::end_frame`].
    pub fn get_key_up(&self, name: &str) -> Result<bool> {
        Ok(self.was_released(self.key_map.lookup(name)?))
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    pub fn was_released(&self, code: KeyCode) -> bool {
        self.released.contains(&code)
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    /// Drops every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        let held: Vec<_> = self.held.drain().collect();
        self.released.extend(held);
    }
}
