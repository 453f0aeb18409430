//! Host-neutral input events.
//!
//! Window systems and browsers report input differently; front ends translate
//! their events into [`InputEvent`] and hand them to the garden.

use crate::environment::{Environment, Mood};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed at pixel coordinates (origin top-left).
    PointerDown { x: f32, y: f32 },
    KeyDown(Key),
    /// Viewport resized, in pixels.
    Resize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Number row or keypad digit 0-9.
    Digit(u8),
    Other,
}

impl Key {
    /// Translate a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_digit() => Key::Digit(c as u8 - b'0'),
            _ => Key::Other,
        }
    }
}

/// What a key press asks the garden to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetMood(Mood),
    SetEnvironment(Environment),
}

/// Digits 1-3 pick a mood, 4-6 an environment. Everything else is ignored.
pub fn command_for_key(key: Key) -> Option<Command> {
    match key {
        Key::Digit(1) => Some(Command::SetMood(Mood::Morning)),
        Key::Digit(2) => Some(Command::SetMood(Mood::Sunset)),
        Key::Digit(3) => Some(Command::SetMood(Mood::Night)),
        Key::Digit(4) => Some(Command::SetEnvironment(Environment::Valley)),
        Key::Digit(5) => Some(Command::SetEnvironment(Environment::Forest)),
        Key::Digit(6) => Some(Command::SetEnvironment(Environment::Park)),
        _ => None,
    }
}
