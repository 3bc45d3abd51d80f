mod headless;

pub use headless::{HeadlessPlatform, HeadlessProxy};

use std::time::Duration;

use bitflags::bitflags;
use raw_window_handle::RawWindowHandle;

use crate::clipboard::ClipboardData;
use crate::error::Result;
use crate::event::{ClientEvent, Event};
use crate::geometrics::{Point, Size};
use crate::view::View;
use crate::world::Clock;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WindowId(pub u64);

bitflags! {
    /// Optional facilities a platform may or may not provide.
    pub struct Capabilities: u32 {
        const TIMERS    = 1 << 0;
        const CLIPBOARD = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PollStatus {
    Events,
    Empty,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShowCommand {
    Passive,
    Raise,
    ForceRaise,
}

impl Default for ShowCommand {
    #[inline]
    fn default() -> Self {
        Self::Raise
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NativeEvent {
    pub window: WindowId,
    pub event: Event,
}

impl NativeEvent {
    #[inline]
    pub fn new(window: WindowId, event: Event) -> Self {
        Self { window, event }
    }
}

/// The connection to a windowing system.
pub trait Platform {
    fn capabilities(&self) -> Capabilities;

    /// Creates the native window of a view being realized. Dropping the
    /// returned value destroys the window.
    fn create_window(&self, view: &View) -> Result<Box<dyn NativeWindow>>;

    /// Waits up to `timeout` for native events, then translates every
    /// pending one into `events` in delivery order.
    ///
    /// `None` waits indefinitely and `Some(Duration::ZERO)` never blocks.
    fn poll_events(
        &self,
        timeout: Option<Duration>,
        clock: &Clock,
        events: &mut Vec<NativeEvent>,
    ) -> Result<PollStatus>;
}

/// The native window of a realized view.
pub trait NativeWindow {
    fn id(&self) -> WindowId;

    fn raw_window_handle(&self) -> Option<RawWindowHandle>;

    fn show(&self, command: ShowCommand) -> Result<()>;

    fn hide(&self) -> Result<()>;

    fn set_title(&self, title: &str) -> Result<()>;

    fn set_position(&self, position: Point) -> Result<()>;

    fn set_size(&self, size: Size) -> Result<()>;

    fn set_size_constraints(&self, view: &View) -> Result<()>;

    fn send_client_event(&self, event: ClientEvent) -> Result<()>;

    fn start_timer(&self, id: usize, period: Duration) -> Result<()>;

    fn stop_timer(&self, id: usize) -> Result<()>;

    fn set_clipboard(&self, data: ClipboardData) -> Result<()>;

    fn clipboard(&self) -> Result<ClipboardData>;
}
