use bitflags::bitflags;

use super::keyboard::{KeyEvent, TextEvent};
use super::mouse::{ButtonEvent, CrossingEvent, MotionEvent, ScrollEvent};
use super::window::{ClientEvent, ConfigureEvent, ExposeEvent, FocusEvent, TimerEvent};

bitflags! {
    #[derive(Default)]
    pub struct EventFlags: u32 {
        /// Generated by the application or the library rather than read from
        /// the native event stream.
        const IS_SEND_EVENT = 1 << 0;
        /// More events of the same kind are already known to follow.
        const IS_HINT = 1 << 1;
    }
}

/// A single occurrence delivered to a view's event handler.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Realize,
    Unrealize,
    Configure(ConfigureEvent),
    Update,
    Expose(ExposeEvent),
    Close,
    FocusIn(FocusEvent),
    FocusOut(FocusEvent),
    KeyPress(KeyEvent),
    KeyRelease(KeyEvent),
    Text(TextEvent),
    PointerIn(CrossingEvent),
    PointerOut(CrossingEvent),
    ButtonPress(ButtonEvent),
    ButtonRelease(ButtonEvent),
    Motion(MotionEvent),
    Scroll(ScrollEvent),
    Client(ClientEvent),
    Timer(TimerEvent),
    LoopEnter,
    LoopLeave,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventType {
    Realize,
    Unrealize,
    Configure,
    Update,
    Expose,
    Close,
    FocusIn,
    FocusOut,
    KeyPress,
    KeyRelease,
    Text,
    PointerIn,
    PointerOut,
    ButtonPress,
    ButtonRelease,
    Motion,
    Scroll,
    Client,
    Timer,
    LoopEnter,
    LoopLeave,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SimpleEvent {
    Realize,
    Unrealize,
    Update,
    Close,
    LoopEnter,
    LoopLeave,
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Realize => EventType::Realize,
            Self::Unrealize => EventType::Unrealize,
            Self::Configure(_) => EventType::Configure,
            Self::Update => EventType::Update,
            Self::Expose(_) => EventType::Expose,
            Self::Close => EventType::Close,
            Self::FocusIn(_) => EventType::FocusIn,
            Self::FocusOut(_) => EventType::FocusOut,
            Self::KeyPress(_) => EventType::KeyPress,
            Self::KeyRelease(_) => EventType::KeyRelease,
            Self::Text(_) => EventType::Text,
            Self::PointerIn(_) => EventType::PointerIn,
            Self::PointerOut(_) => EventType::PointerOut,
            Self::ButtonPress(_) => EventType::ButtonPress,
            Self::ButtonRelease(_) => EventType::ButtonRelease,
            Self::Motion(_) => EventType::Motion,
            Self::Scroll(_) => EventType::Scroll,
            Self::Client(_) => EventType::Client,
            Self::Timer(_) => EventType::Timer,
            Self::LoopEnter => EventType::LoopEnter,
            Self::LoopLeave => EventType::LoopLeave,
        }
    }

    pub fn flags(&self) -> EventFlags {
        match self {
            Self::Configure(event) => event.flags,
            Self::Expose(event) => event.flags,
            Self::FocusIn(event) | Self::FocusOut(event) => event.flags,
            Self::KeyPress(event) | Self::KeyRelease(event) => event.flags,
            Self::Text(event) => event.flags,
            Self::PointerIn(event) | Self::PointerOut(event) => event.flags,
            Self::ButtonPress(event) | Self::ButtonRelease(event) => event.flags,
            Self::Motion(event) => event.flags,
            Self::Scroll(event) => event.flags,
            Self::Client(event) => event.flags,
            Self::Timer(event) => event.flags,
            Self::Realize
            | Self::Unrealize
            | Self::Update
            | Self::Close
            | Self::LoopEnter
            | Self::LoopLeave => EventFlags::empty(),
        }
    }

    pub fn time(&self) -> Option<f64> {
        match self {
            Self::KeyPress(event) | Self::KeyRelease(event) => Some(event.pointer.time),
            Self::Text(event) => Some(event.pointer.time),
            Self::PointerIn(event) | Self::PointerOut(event) => Some(event.pointer.time),
            Self::ButtonPress(event) | Self::ButtonRelease(event) => Some(event.pointer.time),
            Self::Motion(event) => Some(event.pointer.time),
            Self::Scroll(event) => Some(event.pointer.time),
            _ => None,
        }
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.flags().contains(EventFlags::IS_SEND_EVENT)
    }
}

impl From<SimpleEvent> for Event {
    fn from(event: SimpleEvent) -> Self {
        match event {
            SimpleEvent::Realize => Self::Realize,
            SimpleEvent::Unrealize => Self::Unrealize,
            SimpleEvent::Update => Self::Update,
            SimpleEvent::Close => Self::Close,
            SimpleEvent::LoopEnter => Self::LoopEnter,
            SimpleEvent::LoopLeave => Self::LoopLeave,
        }
    }
}
