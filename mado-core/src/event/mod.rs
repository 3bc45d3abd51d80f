mod event;
mod keyboard;
mod mouse;
mod window;

pub use event::{Event, EventFlags, EventType, SimpleEvent};
pub use keyboard::{Key, KeyEvent, Modifiers, TextEvent};
pub use mouse::{
    ButtonEvent, CrossingEvent, CrossingMode, MotionEvent, MouseButton, PointerState,
    ScrollDirection, ScrollEvent,
};
pub use window::{ClientEvent, ConfigureEvent, ExposeEvent, FocusEvent, TimerEvent, ViewStyle};
