use super::event::EventFlags;
use super::keyboard::Modifiers;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
    Other(u8),
}

/// Where the pointer was, and what was held, when an event happened.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub x_root: f64,
    pub y_root: f64,
    pub state: Modifiers,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonEvent {
    pub flags: EventFlags,
    pub pointer: PointerState,
    pub button: MouseButton,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionEvent {
    pub flags: EventFlags,
    pub pointer: PointerState,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
    Smooth,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    pub flags: EventFlags,
    pub pointer: PointerState,
    pub direction: ScrollDirection,
    pub dx: f64,
    pub dy: f64,
}

impl ScrollEvent {
    /// Builds a discrete scroll of one step in `direction`.
    pub fn step(flags: EventFlags, pointer: PointerState, direction: ScrollDirection) -> Self {
        let (dx, dy) = match direction {
            ScrollDirection::Up => (0.0, 1.0),
            ScrollDirection::Down => (0.0, -1.0),
            ScrollDirection::Left => (-1.0, 0.0),
            ScrollDirection::Right => (1.0, 0.0),
            ScrollDirection::Smooth => (0.0, 0.0),
        };
        Self {
            flags,
            pointer,
            direction,
            dx,
            dy,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CrossingMode {
    Normal,
    Grab,
    Ungrab,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossingEvent {
    pub flags: EventFlags,
    pub pointer: PointerState,
    pub mode: CrossingMode,
}
