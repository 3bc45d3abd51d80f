use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use raw_window_handle::RawWindowHandle;

use super::{Capabilities, NativeEvent, NativeWindow, Platform, PollStatus, ShowCommand, WindowId};
use crate::clipboard::ClipboardData;
use crate::error::{Error, Result};
use crate::event::{
    ClientEvent, ConfigureEvent, Event, EventFlags, ExposeEvent, TimerEvent, ViewStyle,
};
use crate::geometrics::{Point, Rectangle, Size};
use crate::hints::SizeHint;
use crate::timer::TimerQueue;
use crate::view::View;
use crate::world::Clock;

/// A platform without a display, where windows exist only in memory.
///
/// Behaves like a cooperative window manager: every geometry request is
/// granted and reported back as a configure event, and mapping a window
/// exposes all of it. A [`HeadlessProxy`] plays the part of the user.
pub struct HeadlessPlatform {
    state: Rc<RefCell<HeadlessState>>,
    capabilities: Capabilities,
}

/// Injects native events into a [`HeadlessPlatform`] and inspects its windows.
#[derive(Clone)]
pub struct HeadlessProxy {
    state: Rc<RefCell<HeadlessState>>,
}

#[derive(Default)]
struct HeadlessState {
    next_window: u64,
    windows: BTreeMap<WindowId, WindowState>,
    queue: VecDeque<NativeEvent>,
    timers: TimerQueue,
    clipboard: Option<ClipboardData>,
}

struct WindowState {
    frame: Rectangle,
    style: ViewStyle,
    title: String,
    min_size: Option<Size>,
    max_size: Option<Size>,
}

struct HeadlessWindow {
    id: WindowId,
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::all())
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState::default())),
            capabilities,
        }
    }

    pub fn proxy(&self) -> HeadlessProxy {
        HeadlessProxy {
            state: self.state.clone(),
        }
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn create_window(&self, view: &View) -> Result<Box<dyn NativeWindow>> {
        let mut state = self.state.borrow_mut();
        state.next_window += 1;
        let id = WindowId(state.next_window);
        let frame = view.initial_frame();
        state.windows.insert(
            id,
            WindowState {
                frame,
                style: ViewStyle::empty(),
                title: view.title().unwrap_or_default().to_owned(),
                min_size: view.size_hint(SizeHint::Min),
                max_size: view.size_hint(SizeHint::Max),
            },
        );
        state.push_configure(id);
        log::debug!("created headless window {:?} at {:?}", id, frame);
        Ok(Box::new(HeadlessWindow {
            id,
            state: self.state.clone(),
        }))
    }

    fn poll_events(
        &self,
        timeout: Option<Duration>,
        _clock: &Clock,
        events: &mut Vec<NativeEvent>,
    ) -> Result<PollStatus> {
        let wait = {
            let state = self.state.borrow();
            if state.queue.is_empty() {
                state.timers.wait_timeout(timeout, Instant::now())
            } else {
                Some(Duration::ZERO)
            }
        };

        match wait {
            Some(wait) if !wait.is_zero() => thread::sleep(wait),
            Some(_) => {}
            None => log::debug!("nothing can wake an indefinite wait, returning immediately"),
        }

        let mut state = self.state.borrow_mut();
        for (window, id) in state.timers.expire(Instant::now()) {
            let event = Event::Timer(TimerEvent {
                flags: EventFlags::empty(),
                id,
            });
            state.queue.push_back(NativeEvent::new(window, event));
        }

        if state.queue.is_empty() {
            return Ok(PollStatus::Empty);
        }
        events.extend(state.queue.drain(..));
        Ok(PollStatus::Events)
    }
}

impl HeadlessState {
    fn window_mut(&mut self, id: WindowId) -> Result<&mut WindowState> {
        self.windows.get_mut(&id).ok_or(Error::Unknown)
    }

    fn push_configure(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get(&id) {
            let event = ConfigureEvent::new(window.frame, window.style);
            self.queue
                .push_back(NativeEvent::new(id, Event::Configure(event)));
        }
    }

    fn push_full_expose(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get(&id) {
            let area = Rectangle::from_size(window.frame.size());
            self.queue
                .push_back(NativeEvent::new(id, Event::Expose(ExposeEvent::new(area))));
        }
    }
}

impl WindowState {
    fn constrain(&self, size: Size) -> Size {
        let mut size = size;
        if let Some(min) = self.min_size {
            size.width = size.width.max(min.width);
            size.height = size.height.max(min.height);
        }
        if let Some(max) = self.max_size {
            size.width = size.width.min(max.width);
            size.height = size.height.min(max.height);
        }
        size
    }
}

impl NativeWindow for HeadlessWindow {
    #[inline]
    fn id(&self) -> WindowId {
        self.id
    }

    fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        None
    }

    fn show(&self, _command: ShowCommand) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let window = state.window_mut(self.id)?;
        if window.style.contains(ViewStyle::MAPPED) {
            return Ok(());
        }
        window.style.insert(ViewStyle::MAPPED);
        state.push_configure(self.id);
        state.push_full_expose(self.id);
        Ok(())
    }

    fn hide(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let window = state.window_mut(self.id)?;
        if !window.style.contains(ViewStyle::MAPPED) {
            return Ok(());
        }
        window.style.remove(ViewStyle::MAPPED);
        state.push_configure(self.id);
        Ok(())
    }

    fn set_title(&self, title: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.window_mut(self.id)?.title = title.to_owned();
        Ok(())
    }

    fn set_position(&self, position: Point) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let window = state.window_mut(self.id)?;
        window.frame.x = position.x;
        window.frame.y = position.y;
        state.push_configure(self.id);
        Ok(())
    }

    fn set_size(&self, size: Size) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let window = state.window_mut(self.id)?;
        window.frame.width = size.width;
        window.frame.height = size.height;
        let mapped = window.style.contains(ViewStyle::MAPPED);
        state.push_configure(self.id);
        if mapped {
            state.push_full_expose(self.id);
        }
        Ok(())
    }

    fn set_size_constraints(&self, view: &View) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let window = state.window_mut(self.id)?;
        window.min_size = view.size_hint(SizeHint::Min);
        window.max_size = view.size_hint(SizeHint::Max);
        Ok(())
    }

    fn send_client_event(&self, event: ClientEvent) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.window_mut(self.id)?;
        let event = ClientEvent {
            flags: event.flags | EventFlags::IS_SEND_EVENT,
            ..event
        };
        state
            .queue
            .push_back(NativeEvent::new(self.id, Event::Client(event)));
        Ok(())
    }

    fn start_timer(&self, id: usize, period: Duration) -> Result<()> {
        self.state
            .borrow_mut()
            .timers
            .start(self.id, id, period, Instant::now())
    }

    fn stop_timer(&self, id: usize) -> Result<()> {
        self.state.borrow_mut().timers.stop(self.id, id)
    }

    fn set_clipboard(&self, data: ClipboardData) -> Result<()> {
        self.state.borrow_mut().clipboard = Some(data);
        Ok(())
    }

    fn clipboard(&self) -> Result<ClipboardData> {
        self.state.borrow().clipboard.clone().ok_or(Error::Failure)
    }
}

impl Drop for HeadlessWindow {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.windows.remove(&self.id);
        state.queue.retain(|event| event.window != self.id);
        state.timers.remove_window(self.id);
        log::debug!("destroyed headless window {:?}", self.id);
    }
}

impl HeadlessProxy {
    pub fn push_event(&self, window: WindowId, event: Event) {
        self.state
            .borrow_mut()
            .queue
            .push_back(NativeEvent::new(window, event));
    }

    /// Acts like the user clicking the close button of the window.
    pub fn request_close(&self, window: WindowId) {
        self.push_event(window, Event::Close);
    }

    /// Acts like the user dragging the window border, honoring size limits.
    pub fn resize(&self, window: WindowId, size: Size) {
        let mut state = self.state.borrow_mut();
        let mapped = match state.windows.get_mut(&window) {
            Some(native) => {
                let size = native.constrain(size);
                native.frame.width = size.width;
                native.frame.height = size.height;
                native.style.contains(ViewStyle::MAPPED)
            }
            None => return,
        };
        state.push_configure(window);
        if mapped {
            state.push_full_expose(window);
        }
    }

    pub fn damage(&self, window: WindowId, area: Rectangle) {
        self.push_event(window, Event::Expose(ExposeEvent::new(area)));
    }

    pub fn window_count(&self) -> usize {
        self.state.borrow().windows.len()
    }

    pub fn title(&self, window: WindowId) -> Option<String> {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map(|window| window.title.clone())
    }

    pub fn frame(&self, window: WindowId) -> Option<Rectangle> {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map(|window| window.frame)
    }

    pub fn is_mapped(&self, window: WindowId) -> bool {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map_or(false, |window| window.style.contains(ViewStyle::MAPPED))
    }

    pub fn clipboard(&self) -> Option<ClipboardData> {
        self.state.borrow().clipboard.clone()
    }
}
