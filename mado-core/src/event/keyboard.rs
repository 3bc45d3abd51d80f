use bitflags::bitflags;

use super::event::EventFlags;
use super::mouse::PointerState;

bitflags! {
    #[derive(Default)]
    pub struct Modifiers: u32 {
        const SHIFT       = 1 << 0;
        const CTRL        = 1 << 1;
        const ALT         = 1 << 2;
        const SUPER       = 1 << 3;
        const NUM_LOCK    = 1 << 4;
        const SCROLL_LOCK = 1 << 5;
        const CAPS_LOCK   = 1 << 6;
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    Character(char),
    Backspace,
    Tab,
    Enter,
    Escape,
    Delete,
    F(u8),
    Left,
    Up,
    Right,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    ShiftL,
    ShiftR,
    CtrlL,
    CtrlR,
    AltL,
    AltR,
    SuperL,
    SuperR,
    Menu,
    CapsLock,
    ScrollLock,
    NumLock,
    PrintScreen,
    Pause,
    Unknown,
}

impl Key {
    /// Returns the character this key produces as text input, if any.
    pub fn text(&self) -> Option<char> {
        match self {
            Self::Character(c) if !c.is_control() => Some(*c),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    pub flags: EventFlags,
    pub pointer: PointerState,
    pub keycode: u32,
    pub key: Key,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextEvent {
    pub flags: EventFlags,
    pub pointer: PointerState,
    pub keycode: u32,
    pub character: char,
}

impl TextEvent {
    /// Builds the text event that accompanies a key press, unless the key
    /// produces no text or is used as a shortcut.
    pub fn from_key_press(event: &KeyEvent) -> Option<Self> {
        if event.pointer.state.intersects(Modifiers::CTRL | Modifiers::SUPER) {
            return None;
        }
        event.key.text().map(|character| Self {
            flags: event.flags,
            pointer: event.pointer,
            keycode: event.keycode,
            character,
        })
    }
}
