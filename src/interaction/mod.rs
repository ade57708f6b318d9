//! Toolkit-agnostic input: gestures, events and the command bindings that
//! drive a [`PlotController`].

mod bindings;
mod controller;

pub use bindings::{BindingTable, BindingTableBuilder, CustomCommand, PlotCommand};
pub use controller::PlotController;

use serde::{Deserialize, Serialize};

use crate::core::ScreenPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    Escape,
    /// `+`, including the keypad key.
    Add,
    /// `-`, including the keypad key.
    Subtract,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
    };
    pub const CONTROL: Self = Self {
        shift: false,
        control: true,
        alt: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
    };
}

/// Trigger part of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputGesture {
    MouseDown { button: MouseButton, click_count: u8 },
    MouseWheel,
    MouseEnter,
    KeyDown(Key),
}

/// Gesture plus the exact modifier set that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputBinding {
    pub gesture: InputGesture,
    pub modifiers: Modifiers,
}

impl InputBinding {
    #[must_use]
    pub const fn new(gesture: InputGesture, modifiers: Modifiers) -> Self {
        Self { gesture, modifiers }
    }
}

/// Input event translated from the host toolkit. Positions are in the same
/// screen space as the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    MouseDown {
        position: ScreenPoint,
        button: MouseButton,
        click_count: u8,
        modifiers: Modifiers,
    },
    MouseMove {
        position: ScreenPoint,
        modifiers: Modifiers,
    },
    MouseUp {
        position: ScreenPoint,
        button: MouseButton,
    },
    /// Positive `delta` scrolls up (zoom in).
    MouseWheel {
        position: ScreenPoint,
        delta: f64,
        modifiers: Modifiers,
    },
    MouseEnter {
        position: ScreenPoint,
        modifiers: Modifiers,
    },
    MouseLeave,
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    #[must_use]
    pub fn mouse_down(position: ScreenPoint, button: MouseButton) -> Self {
        Self::MouseDown {
            position,
            button,
            click_count: 1,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub fn key_down(key: Key) -> Self {
        Self::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Binding this event can trigger; move, up and leave events only feed
    /// running manipulations.
    #[must_use]
    pub fn binding(&self) -> Option<InputBinding> {
        let (gesture, modifiers) = match *self {
            Self::MouseDown {
                button,
                click_count,
                modifiers,
                ..
            } => (
                InputGesture::MouseDown {
                    button,
                    click_count,
                },
                modifiers,
            ),
            Self::MouseWheel { modifiers, .. } => (InputGesture::MouseWheel, modifiers),
            Self::MouseEnter { modifiers, .. } => (InputGesture::MouseEnter, modifiers),
            Self::KeyDown { key, modifiers } => (InputGesture::KeyDown(key), modifiers),
            Self::MouseMove { .. } | Self::MouseUp { .. } | Self::MouseLeave => return None,
        };
        Some(InputBinding::new(gesture, modifiers))
    }

    #[must_use]
    pub fn position(&self) -> Option<ScreenPoint> {
        match *self {
            Self::MouseDown { position, .. }
            | Self::MouseMove { position, .. }
            | Self::MouseUp { position, .. }
            | Self::MouseWheel { position, .. }
            | Self::MouseEnter { position, .. } => Some(position),
            Self::MouseLeave | Self::KeyDown { .. } => None,
        }
    }
}
