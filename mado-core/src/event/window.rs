use bitflags::bitflags;

use super::event::EventFlags;
use super::mouse::CrossingMode;
use crate::geometrics::Rectangle;

bitflags! {
    #[derive(Default)]
    pub struct ViewStyle: u32 {
        const MAPPED     = 1 << 0;
        const MODAL      = 1 << 1;
        const ABOVE      = 1 << 2;
        const BELOW      = 1 << 3;
        const HIDDEN     = 1 << 4;
        const TALL       = 1 << 5;
        const WIDE       = 1 << 6;
        const FULLSCREEN = 1 << 7;
        const RESIZING   = 1 << 8;
        const DEMANDING  = 1 << 9;
    }
}

/// The geometry and window-manager state of a view.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConfigureEvent {
    pub flags: EventFlags,
    pub frame: Rectangle,
    pub style: ViewStyle,
}

impl ConfigureEvent {
    #[inline]
    pub fn new(frame: Rectangle, style: ViewStyle) -> Self {
        Self {
            flags: EventFlags::empty(),
            frame,
            style,
        }
    }

    /// Compares the parts that matter to a view, ignoring flags.
    #[inline]
    pub fn same_geometry(&self, other: &Self) -> bool {
        self.frame == other.frame && self.style == other.style
    }
}

/// A damaged area of a view that must be redrawn.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExposeEvent {
    pub flags: EventFlags,
    pub area: Rectangle,
}

impl ExposeEvent {
    #[inline]
    pub fn new(area: Rectangle) -> Self {
        Self {
            flags: EventFlags::empty(),
            area,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FocusEvent {
    pub flags: EventFlags,
    pub mode: CrossingMode,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimerEvent {
    pub flags: EventFlags,
    pub id: usize,
}

/// An application-defined message sent to a view through the platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClientEvent {
    pub flags: EventFlags,
    pub data1: usize,
    pub data2: usize,
}

impl ClientEvent {
    #[inline]
    pub fn new(data1: usize, data2: usize) -> Self {
        Self {
            flags: EventFlags::empty(),
            data1,
            data2,
        }
    }
}
