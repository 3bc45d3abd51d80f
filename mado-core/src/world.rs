use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::event::{Event, SimpleEvent};
use crate::platform::{Capabilities, NativeEvent, Platform, PollStatus};
use crate::view::View;

pub const DEFAULT_CLASS_NAME: &str = "Mado";

/// A monotonic clock whose epoch is the creation of the world.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Seconds since the epoch.
    #[inline]
    pub fn now(&self) -> f64 {
        self.time_at(Instant::now())
    }

    #[inline]
    pub fn time_at(&self, instant: Instant) -> f64 {
        instant.saturating_duration_since(self.start).as_secs_f64()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// What the world is doing at the moment, used to reject calls that are
/// unsafe in that situation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WorldState {
    Idle,
    Updating,
    Exposing,
    /// Inside a modal loop that the platform runs on its own, such as during
    /// an interactive resize.
    Recursing,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ViewId(u64);

pub(crate) struct WorldShared {
    pub(crate) platform: Box<dyn Platform>,
    pub(crate) clock: Clock,
    pub(crate) state: Cell<WorldState>,
    pub(crate) class_name: RefCell<Cow<'static, str>>,
}

pub struct World {
    views: Vec<View>,
    shared: Rc<WorldShared>,
    next_view_id: u64,
}

impl World {
    pub fn new<P>(platform: P) -> Self
    where
        P: Platform + 'static,
    {
        Self {
            views: Vec::new(),
            shared: Rc::new(WorldShared {
                platform: Box::new(platform),
                clock: Clock::new(),
                state: Cell::new(WorldState::Idle),
                class_name: RefCell::new(Cow::Borrowed(DEFAULT_CLASS_NAME)),
            }),
            next_view_id: 0,
        }
    }

    /// Seconds since the world was created.
    #[inline]
    pub fn time(&self) -> f64 {
        self.shared.clock.now()
    }

    #[inline]
    pub fn clock(&self) -> &Clock {
        &self.shared.clock
    }

    #[inline]
    pub fn state(&self) -> WorldState {
        self.shared.state.get()
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.shared.platform.capabilities()
    }

    pub fn class_name(&self) -> String {
        self.shared.class_name.borrow().to_string()
    }

    pub fn set_class_name(&mut self, class_name: impl Into<Cow<'static, str>>) {
        *self.shared.class_name.borrow_mut() = class_name.into();
    }

    pub fn create_view(&mut self) -> ViewId {
        self.next_view_id += 1;
        let id = ViewId(self.next_view_id);
        self.views.push(View::new(id, Rc::downgrade(&self.shared)));
        id
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.iter().find(|view| view.id == id)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.iter_mut().find(|view| view.id == id)
    }

    #[inline]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn destroy_view(&mut self, id: ViewId) -> Result<()> {
        let index = self
            .views
            .iter()
            .position(|view| view.id == id)
            .ok_or(Error::Failure)?;
        let mut view = self.views.remove(index);
        let result = if view.is_realized() {
            view.unrealize()
        } else {
            Ok(())
        };
        drop(view);
        result
    }

    /// Runs one pass of event processing.
    pub fn update(&mut self, timeout: Option<Duration>) -> Result<PollStatus> {
        if self.shared.state.get() != WorldState::Idle {
            return Err(Error::BadCall);
        }
        self.shared.state.set(WorldState::Updating);
        let result = self.process_events(timeout);
        self.shared.state.set(WorldState::Idle);
        result
    }

    fn process_events(&mut self, timeout: Option<Duration>) -> Result<PollStatus> {
        let timeout = if self.views.iter().any(|view| !view.pending.is_empty()) {
            Some(Duration::ZERO)
        } else {
            timeout
        };

        let mut events = Vec::new();
        let status = self
            .shared
            .platform
            .poll_events(timeout, &self.shared.clock, &mut events)?;

        let mut first_error = None;

        for NativeEvent { window, event } in events {
            let view = match self
                .views
                .iter_mut()
                .find(|view| view.window_id() == Some(window))
            {
                Some(view) => view,
                None => {
                    log::debug!("dropping {:?} for unknown {:?}", event.event_type(), window);
                    continue;
                }
            };
            let result = match event {
                Event::Configure(configure) => {
                    view.pending.replace_configure(configure);
                    Ok(())
                }
                Event::Expose(expose) => {
                    view.pending.merge_expose(expose);
                    Ok(())
                }
                event => view.dispatch_event(&event),
            };
            if let Err(error) = result {
                first_error.get_or_insert(error);
            }
        }

        for view in &mut self.views {
            if view.is_visible() {
                if let Err(error) = view.dispatch_simple_event(SimpleEvent::Update) {
                    first_error.get_or_insert(error);
                }
            }
            if let Err(error) = view.flush_pending() {
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(status),
        }
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("state", &self.state())
            .field("views", &self.views)
            .finish()
    }
}
