use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::os::unix::io::AsRawFd;
use std::rc::Rc;
use std::time::{Duration, Instant};

use mado_core::event::{
    ButtonEvent, ClientEvent, ConfigureEvent, CrossingEvent, Event, EventFlags, ExposeEvent,
    FocusEvent, KeyEvent, MotionEvent, ScrollEvent, TextEvent, TimerEvent, ViewStyle,
};
use mado_core::geometrics::Rectangle;
use mado_core::platform::{Capabilities, NativeEvent, NativeWindow, Platform, PollStatus, WindowId};
use mado_core::timer::TimerQueue;
use mado_core::{Clock, Error, Result, View};
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use x11rb::connection::Connection;
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol;
use x11rb::protocol::xproto::{self, ConnectionExt as _};
use x11rb::xcb_ffi::XCBConnection;

use crate::clipboard::{self, ClipboardState};
use crate::event::{
    pointer_state, to_crossing_mode, to_mouse_button, to_scroll_direction, Keyboard,
};
use crate::window::X11Window;

x11rb::atom_manager! {
    pub(crate) Atoms: AtomsCookie {
        CLIPBOARD,
        INCR,
        TARGETS,
        UTF8_STRING,
        WM_DELETE_WINDOW,
        WM_PROTOCOLS,
        _MADO_CLIENT,
        _MADO_SELECTION,
        _NET_ACTIVE_WINDOW,
        _NET_WM_NAME,
        _NET_WM_STATE,
        _NET_WM_STATE_ABOVE,
        _NET_WM_STATE_BELOW,
        _NET_WM_STATE_DEMANDS_ATTENTION,
        _NET_WM_STATE_FULLSCREEN,
        _NET_WM_STATE_HIDDEN,
        _NET_WM_STATE_MAXIMIZED_HORZ,
        _NET_WM_STATE_MAXIMIZED_VERT,
        _NET_WM_STATE_MODAL,
        TEXT_PLAIN: b"text/plain",
        TEXT_PLAIN_UTF8: b"text/plain;charset=utf-8",
    }
}

const CONNECTION_TOKEN: Token = Token(0);

/// A connection to an X server.
pub struct X11Platform {
    shared: Rc<X11Shared>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct WindowGeometry {
    pub(crate) frame: Rectangle,
    pub(crate) style: ViewStyle,
}

pub(crate) struct X11Shared {
    pub(crate) connection: XCBConnection,
    pub(crate) screen_num: usize,
    pub(crate) atoms: Atoms,
    pub(crate) timers: RefCell<TimerQueue>,
    pub(crate) clipboard: RefCell<ClipboardState>,
    pub(crate) windows: RefCell<HashMap<xproto::Window, WindowGeometry>>,
    /// Events read while waiting for a specific reply, to be processed by the
    /// next poll.
    pub(crate) deferred: RefCell<VecDeque<protocol::Event>>,
    pub(crate) synthesized: RefCell<Vec<NativeEvent>>,
    keyboard: RefCell<Keyboard>,
    poll: RefCell<Poll>,
}

impl X11Platform {
    pub fn new() -> Result<Self> {
        let (connection, screen_num) = XCBConnection::connect(None).map_err(Error::platform)?;
        Self::with_connection(connection, screen_num)
    }

    pub fn with_connection(connection: XCBConnection, screen_num: usize) -> Result<Self> {
        let atoms = Atoms::new(&connection)
            .map_err(Error::platform)?
            .reply()
            .map_err(Error::platform)?;
        let keyboard = Keyboard::load(&connection).map_err(Error::platform)?;

        let poll = Poll::new().map_err(Error::platform)?;
        poll.registry()
            .register(
                &mut SourceFd(&connection.as_raw_fd()),
                CONNECTION_TOKEN,
                Interest::READABLE,
            )
            .map_err(Error::platform)?;

        Ok(Self {
            shared: Rc::new(X11Shared {
                connection,
                screen_num,
                atoms,
                timers: RefCell::new(TimerQueue::new()),
                clipboard: RefCell::new(ClipboardState::default()),
                windows: RefCell::new(HashMap::new()),
                deferred: RefCell::new(VecDeque::new()),
                synthesized: RefCell::new(Vec::new()),
                keyboard: RefCell::new(keyboard),
                poll: RefCell::new(poll),
            }),
        })
    }

    #[inline]
    pub fn connection(&self) -> &XCBConnection {
        &self.shared.connection
    }

    #[inline]
    pub fn screen_num(&self) -> usize {
        self.shared.screen_num
    }

    pub(crate) fn shared(&self) -> &Rc<X11Shared> {
        &self.shared
    }

    fn process_event(
        &self,
        event: protocol::Event,
        clock: &Clock,
        events: &mut Vec<NativeEvent>,
    ) -> Result<()> {
        let shared = &*self.shared;
        let atoms = &shared.atoms;
        let mut push = |window: xproto::Window, event: Event| {
            events.push(NativeEvent::new(WindowId(window as u64), event));
        };

        match event {
            protocol::Event::Expose(event) => {
                let flags = if event.count > 0 {
                    EventFlags::IS_HINT
                } else {
                    EventFlags::empty()
                };
                let area = Rectangle::new(
                    event.x as i32,
                    event.y as i32,
                    event.width as u32,
                    event.height as u32,
                );
                push(event.window, Event::Expose(ExposeEvent { flags, area }));
            }
            protocol::Event::ConfigureNotify(event) => {
                let frame = Rectangle::new(
                    event.x as i32,
                    event.y as i32,
                    event.width as u32,
                    event.height as u32,
                );
                if let Some(configure) = shared.update_geometry(event.window, |geometry| {
                    geometry.frame = frame;
                }) {
                    push(event.window, Event::Configure(configure));
                }
            }
            protocol::Event::MapNotify(event) => {
                if let Some(configure) = shared.update_geometry(event.window, |geometry| {
                    geometry.style.insert(ViewStyle::MAPPED);
                }) {
                    push(event.window, Event::Configure(configure));
                }
            }
            protocol::Event::UnmapNotify(event) => {
                if let Some(configure) = shared.update_geometry(event.window, |geometry| {
                    geometry.style.remove(ViewStyle::MAPPED);
                }) {
                    push(event.window, Event::Configure(configure));
                }
            }
            protocol::Event::PropertyNotify(event) if event.atom == atoms._NET_WM_STATE => {
                let style = match skip_protocol_error(shared.read_wm_state(event.window))? {
                    Some(style) => style,
                    None => return Ok(()),
                };
                if let Some(configure) = shared.update_geometry(event.window, |geometry| {
                    geometry.style = style | (geometry.style & ViewStyle::MAPPED);
                }) {
                    push(event.window, Event::Configure(configure));
                }
            }
            protocol::Event::ClientMessage(event) => {
                let data = event.data.as_data32();
                if event.type_ == atoms.WM_PROTOCOLS && data[0] == atoms.WM_DELETE_WINDOW {
                    push(event.window, Event::Close);
                } else if event.type_ == atoms._MADO_CLIENT {
                    let client = ClientEvent {
                        flags: EventFlags::IS_SEND_EVENT,
                        data1: join_words(data[0], data[1]),
                        data2: join_words(data[2], data[3]),
                    };
                    push(event.window, Event::Client(client));
                }
            }
            protocol::Event::KeyPress(event) => {
                let key_event = KeyEvent {
                    flags: EventFlags::empty(),
                    pointer: pointer_state(
                        clock.now(),
                        (event.event_x, event.event_y),
                        (event.root_x, event.root_y),
                        u16::from(event.state),
                    ),
                    keycode: event.detail as u32,
                    key: shared
                        .keyboard
                        .borrow()
                        .key(event.detail, u16::from(event.state)),
                };
                let text = TextEvent::from_key_press(&key_event);
                push(event.event, Event::KeyPress(key_event));
                if let Some(text) = text {
                    push(event.event, Event::Text(text));
                }
            }
            protocol::Event::KeyRelease(event) => {
                let key_event = KeyEvent {
                    flags: EventFlags::empty(),
                    pointer: pointer_state(
                        clock.now(),
                        (event.event_x, event.event_y),
                        (event.root_x, event.root_y),
                        u16::from(event.state),
                    ),
                    keycode: event.detail as u32,
                    key: shared
                        .keyboard
                        .borrow()
                        .key(event.detail, u16::from(event.state)),
                };
                push(event.event, Event::KeyRelease(key_event));
            }
            protocol::Event::ButtonPress(event) => {
                let pointer = pointer_state(
                    clock.now(),
                    (event.event_x, event.event_y),
                    (event.root_x, event.root_y),
                    u16::from(event.state),
                );
                let event_type = match to_scroll_direction(event.detail) {
                    Some(direction) => Event::Scroll(ScrollEvent::step(
                        EventFlags::empty(),
                        pointer,
                        direction,
                    )),
                    None => Event::ButtonPress(ButtonEvent {
                        flags: EventFlags::empty(),
                        pointer,
                        button: to_mouse_button(event.detail),
                    }),
                };
                push(event.event, event_type);
            }
            protocol::Event::ButtonRelease(event) => {
                // Wheel buttons report the release right after the press.
                if to_scroll_direction(event.detail).is_none() {
                    let pointer = pointer_state(
                        clock.now(),
                        (event.event_x, event.event_y),
                        (event.root_x, event.root_y),
                        u16::from(event.state),
                    );
                    push(
                        event.event,
                        Event::ButtonRelease(ButtonEvent {
                            flags: EventFlags::empty(),
                            pointer,
                            button: to_mouse_button(event.detail),
                        }),
                    );
                }
            }
            protocol::Event::MotionNotify(event) => {
                let pointer = pointer_state(
                    clock.now(),
                    (event.event_x, event.event_y),
                    (event.root_x, event.root_y),
                    u16::from(event.state),
                );
                push(
                    event.event,
                    Event::Motion(MotionEvent {
                        flags: EventFlags::empty(),
                        pointer,
                    }),
                );
            }
            protocol::Event::EnterNotify(event) | protocol::Event::LeaveNotify(event) => {
                let crossing = CrossingEvent {
                    flags: EventFlags::empty(),
                    pointer: pointer_state(
                        clock.now(),
                        (event.event_x, event.event_y),
                        (event.root_x, event.root_y),
                        u16::from(event.state),
                    ),
                    mode: to_crossing_mode(event.mode),
                };
                if event.response_type & 0x7f == xproto::ENTER_NOTIFY_EVENT {
                    push(event.event, Event::PointerIn(crossing));
                } else {
                    push(event.event, Event::PointerOut(crossing));
                }
            }
            protocol::Event::FocusIn(event) => {
                let focus = FocusEvent {
                    flags: EventFlags::empty(),
                    mode: to_crossing_mode(event.mode),
                };
                push(event.event, Event::FocusIn(focus));
            }
            protocol::Event::FocusOut(event) => {
                let focus = FocusEvent {
                    flags: EventFlags::empty(),
                    mode: to_crossing_mode(event.mode),
                };
                push(event.event, Event::FocusOut(focus));
            }
            protocol::Event::SelectionRequest(event) => {
                clipboard::handle_selection_request(shared, &event)?;
            }
            protocol::Event::SelectionClear(event) => {
                clipboard::handle_selection_clear(shared, &event);
            }
            protocol::Event::MappingNotify(_) => {
                match Keyboard::load(&shared.connection) {
                    Ok(keyboard) => *shared.keyboard.borrow_mut() = keyboard,
                    Err(error) => log::warn!("failed to reload the keyboard mapping: {}", error),
                }
            }
            protocol::Event::Error(error) => {
                log::warn!("X11 error: {:?}", error);
            }
            _ => {}
        }

        Ok(())
    }
}

impl Platform for X11Platform {
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn create_window(&self, view: &View) -> Result<Box<dyn NativeWindow>> {
        let window = X11Window::create(self.shared.clone(), view)?;
        Ok(Box::new(window))
    }

    fn poll_events(
        &self,
        timeout: Option<Duration>,
        clock: &Clock,
        events: &mut Vec<NativeEvent>,
    ) -> Result<PollStatus> {
        let shared = &*self.shared;
        shared.connection.flush().map_err(Error::platform)?;

        let mut raw_events = shared.read_events()?;
        let synthesized = shared.synthesized.take();

        if raw_events.is_empty() && synthesized.is_empty() {
            let wait = shared
                .timers
                .borrow()
                .wait_timeout(timeout, Instant::now());
            if wait.map_or(true, |wait| !wait.is_zero()) {
                shared.wait_readable(wait)?;
                raw_events = shared.read_events()?;
            }
        }

        let start = events.len();
        events.extend(synthesized);
        // Translation only fails when the connection is broken.
        for event in raw_events {
            self.process_event(event, clock, events)?;
        }
        for (window, id) in shared.timers.borrow_mut().expire(Instant::now()) {
            let event = Event::Timer(TimerEvent {
                flags: EventFlags::empty(),
                id,
            });
            events.push(NativeEvent::new(window, event));
        }

        if events.len() > start {
            Ok(PollStatus::Events)
        } else {
            Ok(PollStatus::Empty)
        }
    }
}

impl X11Shared {
    #[inline]
    pub(crate) fn screen(&self) -> &xproto::Screen {
        &self.connection.setup().roots[self.screen_num]
    }

    pub(crate) fn read_events(&self) -> Result<Vec<protocol::Event>> {
        let mut events = self.deferred.borrow_mut().drain(..).collect::<Vec<_>>();
        while let Some(event) = self.connection.poll_for_event().map_err(Error::platform)? {
            events.push(event);
        }
        Ok(events)
    }

    pub(crate) fn wait_readable(&self, timeout: Option<Duration>) -> Result<()> {
        let mut events = Events::with_capacity(1);
        match self.poll.borrow_mut().poll(&mut events, timeout) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => Ok(()),
            Err(error) => Err(Error::platform(error)),
        }
    }

    fn update_geometry<F>(&self, window: xproto::Window, f: F) -> Option<ConfigureEvent>
    where
        F: FnOnce(&mut WindowGeometry),
    {
        let mut windows = self.windows.borrow_mut();
        let geometry = windows.get_mut(&window)?;
        f(geometry);
        Some(ConfigureEvent::new(geometry.frame, geometry.style))
    }

    fn read_wm_state(&self, window: xproto::Window) -> std::result::Result<ViewStyle, ReplyError> {
        let atoms = &self.atoms;
        let reply = self
            .connection
            .get_property(false, window, atoms._NET_WM_STATE, xproto::AtomEnum::ATOM, 0, 64)?
            .reply()?;

        let mut style = ViewStyle::empty();
        if let Some(states) = reply.value32() {
            for state in states {
                style |= match state {
                    s if s == atoms._NET_WM_STATE_MODAL => ViewStyle::MODAL,
                    s if s == atoms._NET_WM_STATE_ABOVE => ViewStyle::ABOVE,
                    s if s == atoms._NET_WM_STATE_BELOW => ViewStyle::BELOW,
                    s if s == atoms._NET_WM_STATE_HIDDEN => ViewStyle::HIDDEN,
                    s if s == atoms._NET_WM_STATE_MAXIMIZED_VERT => ViewStyle::TALL,
                    s if s == atoms._NET_WM_STATE_MAXIMIZED_HORZ => ViewStyle::WIDE,
                    s if s == atoms._NET_WM_STATE_FULLSCREEN => ViewStyle::FULLSCREEN,
                    s if s == atoms._NET_WM_STATE_DEMANDS_ATTENTION => ViewStyle::DEMANDING,
                    _ => ViewStyle::empty(),
                };
            }
        }
        Ok(style)
    }
}

/// Discards a request that the server rejected, which happens when a window
/// is destroyed while its events are still queued.
fn skip_protocol_error<T>(result: std::result::Result<T, ReplyError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ReplyError::X11Error(error)) => {
            log::warn!("X11 request failed: {:?}", error);
            Ok(None)
        }
        Err(error @ ReplyError::ConnectionError(_)) => Err(Error::platform(error)),
    }
}

pub(crate) fn split_word(value: usize) -> (u32, u32) {
    let value = value as u64;
    (value as u32, (value >> 32) as u32)
}

pub(crate) fn join_words(low: u32, high: u32) -> usize {
    ((high as u64) << 32 | low as u64) as usize
}
