//! Platform input events
//!
//! Raw pointer and keyboard input as delivered by the windowing layer.

use serde::{Deserialize, Serialize};

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button (usually left)
    Primary,
    /// Auxiliary button (usually middle/wheel)
    Auxiliary,
    /// Secondary button (usually right)
    Secondary,
    /// Fourth button (usually back)
    Fourth,
    /// Fifth button (usually forward)
    Fifth,
}

impl MouseButton {
    /// Convert from button number (0-4)
    pub fn from_number(n: i16) -> Option<Self> {
        match n {
            0 => Some(Self::Primary),
            1 => Some(Self::Auxiliary),
            2 => Some(Self::Secondary),
            3 => Some(Self::Fourth),
            4 => Some(Self::Fifth),
            _ => None,
        }
    }
}

/// Keyboard/mouse modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Self::NONE
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Self::NONE
    };
}

/// Keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
}

impl Key {
    /// Case-insensitive for character keys
    pub fn matches(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.to_lowercase().eq(b.to_lowercase()),
            _ => self == other,
        }
    }
}

/// Key plus the exact modifier set that must be held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn matches(&self, key: &Key, modifiers: Modifiers) -> bool {
        self.modifiers == modifiers && self.key.matches(key)
    }
}

/// Raw input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseDown {
        x: f32,
        y: f32,
        button: MouseButton,
        modifiers: Modifiers,
    },
    MouseUp {
        x: f32,
        y: f32,
        button: MouseButton,
        modifiers: Modifiers,
    },
    MouseMove {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    DoubleClick {
        x: f32,
        y: f32,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Wheel {
        x: f32,
        y: f32,
        delta_x: f32,
        delta_y: f32,
        modifiers: Modifiers,
    },
    /// Context menu request
    Context {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    /// Pointer position, `None` for keyboard events
    pub fn position(&self) -> Option<(f32, f32)> {
        match *self {
            InputEvent::MouseDown { x, y, .. }
            | InputEvent::MouseUp { x, y, .. }
            | InputEvent::MouseMove { x, y, .. }
            | InputEvent::DoubleClick { x, y, .. }
            | InputEvent::Wheel { x, y, .. }
            | InputEvent::Context { x, y, .. } => Some((x, y)),
            InputEvent::KeyDown { .. } => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match *self {
            InputEvent::MouseDown { modifiers, .. }
            | InputEvent::MouseUp { modifiers, .. }
            | InputEvent::MouseMove { modifiers, .. }
            | InputEvent::DoubleClick { modifiers, .. }
            | InputEvent::Wheel { modifiers, .. }
            | InputEvent::Context { modifiers, .. }
            | InputEvent::KeyDown { modifiers, .. } => modifiers,
        }
    }
}
