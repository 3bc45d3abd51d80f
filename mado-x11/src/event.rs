use mado_core::event::{CrossingMode, Key, Modifiers, MouseButton, PointerState, ScrollDirection};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{self, ConnectionExt as _};

pub(crate) fn pointer_state(
    time: f64,
    (event_x, event_y): (i16, i16),
    (root_x, root_y): (i16, i16),
    state: u16,
) -> PointerState {
    PointerState {
        time,
        x: event_x as f64,
        y: event_y as f64,
        x_root: root_x as f64,
        y_root: root_y as f64,
        state: to_modifiers(state),
    }
}

pub(crate) fn to_mouse_button(button: u8) -> MouseButton {
    match button {
        1 => MouseButton::Left,
        2 => MouseButton::Middle,
        3 => MouseButton::Right,
        8 => MouseButton::X1,
        9 => MouseButton::X2,
        _ => {
            log::debug!("unmapped pointer button {}", button);
            MouseButton::Other(button)
        }
    }
}

pub(crate) fn to_scroll_direction(button: u8) -> Option<ScrollDirection> {
    match button {
        4 => Some(ScrollDirection::Up),
        5 => Some(ScrollDirection::Down),
        6 => Some(ScrollDirection::Left),
        7 => Some(ScrollDirection::Right),
        _ => None,
    }
}

pub(crate) fn to_modifiers(state: u16) -> Modifiers {
    let mut flags = Modifiers::empty();
    if u16::from(xproto::KeyButMask::SHIFT) & state != 0 {
        flags |= Modifiers::SHIFT;
    }
    if u16::from(xproto::KeyButMask::CONTROL) & state != 0 {
        flags |= Modifiers::CTRL;
    }
    if u16::from(xproto::KeyButMask::MOD1) & state != 0 {
        flags |= Modifiers::ALT;
    }
    if u16::from(xproto::KeyButMask::MOD2) & state != 0 {
        flags |= Modifiers::NUM_LOCK;
    }
    if u16::from(xproto::KeyButMask::MOD4) & state != 0 {
        flags |= Modifiers::SUPER;
    }
    if u16::from(xproto::KeyButMask::LOCK) & state != 0 {
        flags |= Modifiers::CAPS_LOCK;
    }
    flags
}

pub(crate) fn to_crossing_mode(mode: xproto::NotifyMode) -> CrossingMode {
    match mode {
        xproto::NotifyMode::GRAB => CrossingMode::Grab,
        xproto::NotifyMode::UNGRAB => CrossingMode::Ungrab,
        _ => CrossingMode::Normal,
    }
}

pub(crate) fn keysym_to_key(keysym: u32) -> Key {
    match keysym {
        0xff08 => Key::Backspace,
        0xff09 => Key::Tab,
        0xff0d | 0xff8d => Key::Enter,
        0xff13 => Key::Pause,
        0xff14 => Key::ScrollLock,
        0xff1b => Key::Escape,
        0xff50 => Key::Home,
        0xff51 => Key::Left,
        0xff52 => Key::Up,
        0xff53 => Key::Right,
        0xff54 => Key::Down,
        0xff55 => Key::PageUp,
        0xff56 => Key::PageDown,
        0xff57 => Key::End,
        0xff61 => Key::PrintScreen,
        0xff63 => Key::Insert,
        0xff67 => Key::Menu,
        0xff7f => Key::NumLock,
        0xffb0..=0xffb9 => {
            char::from_digit(keysym - 0xffb0, 10).map_or(Key::Unknown, Key::Character)
        }
        0xffbe..=0xffd5 => Key::F((keysym - 0xffbe + 1) as u8),
        0xffe1 => Key::ShiftL,
        0xffe2 => Key::ShiftR,
        0xffe3 => Key::CtrlL,
        0xffe4 => Key::CtrlR,
        0xffe5 => Key::CapsLock,
        0xffe9 => Key::AltL,
        0xffea => Key::AltR,
        0xffeb => Key::SuperL,
        0xffec => Key::SuperR,
        0xffff => Key::Delete,
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(keysym).map_or(Key::Unknown, Key::Character),
        0x0100_0000..=0x0110_ffff => {
            char::from_u32(keysym - 0x0100_0000).map_or(Key::Unknown, Key::Character)
        }
        _ => Key::Unknown,
    }
}

/// The keycode to keysym table of the server.
#[derive(Clone, Debug)]
pub(crate) struct Keyboard {
    min_keycode: u8,
    keysyms_per_keycode: u8,
    keysyms: Vec<u32>,
}

impl Keyboard {
    pub(crate) fn load(connection: &impl Connection) -> Result<Self, ReplyError> {
        let setup = connection.setup();
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - min_keycode + 1;
        let reply = connection
            .get_keyboard_mapping(min_keycode, count)?
            .reply()?;
        Ok(Self {
            min_keycode,
            keysyms_per_keycode: reply.keysyms_per_keycode,
            keysyms: reply.keysyms,
        })
    }

    pub(crate) fn keysym(&self, keycode: u8, state: u16) -> u32 {
        let per_keycode = self.keysyms_per_keycode as usize;
        if keycode < self.min_keycode || per_keycode == 0 {
            return 0;
        }
        let start = (keycode - self.min_keycode) as usize * per_keycode;
        let column = |index: usize| {
            if index < per_keycode {
                self.keysyms.get(start + index).copied().unwrap_or(0)
            } else {
                0
            }
        };

        let lower = column(0);
        let upper = match column(1) {
            0 => lower,
            keysym => keysym,
        };
        let shifted = u16::from(xproto::KeyButMask::SHIFT) & state != 0;
        let caps_lock = u16::from(xproto::KeyButMask::LOCK) & state != 0;
        let is_letter = char::from_u32(lower).map_or(false, |c| c.is_ascii_lowercase());
        if shifted ^ (caps_lock && is_letter) {
            upper
        } else {
            lower
        }
    }

    pub(crate) fn key(&self, keycode: u8, state: u16) -> Key {
        keysym_to_key(self.keysym(keycode, state))
    }
}
