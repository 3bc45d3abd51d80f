use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use mado_core::clipboard::ClipboardData;
use mado_core::event::{ClientEvent, ConfigureEvent, Event, ViewStyle};
use mado_core::geometrics::{Point, Rectangle, Size};
use mado_core::hints::{PositionHint, SizeHint, ViewHint};
use mado_core::platform::{NativeEvent, NativeWindow, ShowCommand, WindowId};
use mado_core::{Error, Result, View};
use raw_window_handle::unix::XcbHandle;
use raw_window_handle::RawWindowHandle;
use x11rb::connection::Connection;
use x11rb::properties::{AspectRatio, WmSizeHints};
use x11rb::protocol::xproto::{self, ConnectionExt as _};
use x11rb::wrapper::ConnectionExt as _;
use x11rb::CURRENT_TIME;

use crate::clipboard;
use crate::event_loop::{split_word, WindowGeometry, X11Shared};

pub(crate) struct X11Window {
    shared: Rc<X11Shared>,
    window: xproto::Window,
    fixed_size: Cell<bool>,
}

impl X11Window {
    pub(crate) fn create(shared: Rc<X11Shared>, view: &View) -> Result<Self> {
        let connection = &shared.connection;
        let screen = shared.screen();
        let frame = initial_frame(view, screen);

        let window = connection.generate_id().map_err(Error::platform)?;

        let event_mask = xproto::EventMask::EXPOSURE
            | xproto::EventMask::STRUCTURE_NOTIFY
            | xproto::EventMask::PROPERTY_CHANGE
            | xproto::EventMask::FOCUS_CHANGE
            | xproto::EventMask::ENTER_WINDOW
            | xproto::EventMask::LEAVE_WINDOW
            | xproto::EventMask::KEY_PRESS
            | xproto::EventMask::KEY_RELEASE
            | xproto::EventMask::BUTTON_PRESS
            | xproto::EventMask::BUTTON_RELEASE
            | xproto::EventMask::POINTER_MOTION;

        let window_aux = xproto::CreateWindowAux::new()
            .event_mask(event_mask)
            .background_pixel(screen.black_pixel);

        connection
            .create_window(
                screen.root_depth,
                window,
                screen.root,
                frame.x as _,
                frame.y as _,
                frame.width as _,
                frame.height as _,
                0,
                xproto::WindowClass::INPUT_OUTPUT,
                0,
                &window_aux,
            )
            .map_err(Error::platform)?;

        let native = Self {
            shared: shared.clone(),
            window,
            fixed_size: Cell::new(false),
        };

        connection
            .change_property32(
                xproto::PropMode::REPLACE,
                window,
                shared.atoms.WM_PROTOCOLS,
                xproto::AtomEnum::ATOM,
                &[shared.atoms.WM_DELETE_WINDOW],
            )
            .map_err(Error::platform)?;

        if let Some(class_name) = view.class_name() {
            let class = format!("{}\0{}\0", class_name, class_name);
            connection
                .change_property8(
                    xproto::PropMode::REPLACE,
                    window,
                    xproto::AtomEnum::WM_CLASS,
                    xproto::AtomEnum::STRING,
                    class.as_bytes(),
                )
                .map_err(Error::platform)?;
        }

        if let Some(title) = view.title() {
            native.set_title(title)?;
        }

        native.apply_size_hints(view, frame)?;

        shared.windows.borrow_mut().insert(
            window,
            WindowGeometry {
                frame,
                style: ViewStyle::empty(),
            },
        );

        // The server reports nothing until the window is mapped, so the
        // requested geometry is delivered as the first configuration.
        shared.synthesized.borrow_mut().push(NativeEvent::new(
            WindowId(window as u64),
            Event::Configure(ConfigureEvent::new(frame, ViewStyle::empty())),
        ));

        connection.flush().map_err(Error::platform)?;
        log::debug!("created window {:#x} at {:?}", window, frame);

        Ok(native)
    }

    fn apply_size_hints(&self, view: &View, frame: Rectangle) -> Result<()> {
        let mut size_hints = WmSizeHints::new();
        let resizable = view.hint(ViewHint::Resizable).is_true();

        if resizable {
            size_hints.min_size = view
                .size_hint(SizeHint::Min)
                .map(|size| (size.width as i32, size.height as i32));
            size_hints.max_size = view
                .size_hint(SizeHint::Max)
                .map(|size| (size.width as i32, size.height as i32));
            size_hints.aspect = match (
                view.size_hint(SizeHint::FixedAspect),
                view.size_hint(SizeHint::MinAspect),
                view.size_hint(SizeHint::MaxAspect),
            ) {
                (Some(fixed), _, _) => Some((to_aspect(fixed), to_aspect(fixed))),
                (None, Some(min), Some(max)) => Some((to_aspect(min), to_aspect(max))),
                _ => None,
            };
        } else {
            let size = (frame.width as i32, frame.height as i32);
            size_hints.min_size = Some(size);
            size_hints.max_size = Some(size);
        }

        if let Some(size) = view.size_hint(SizeHint::Default) {
            size_hints.base_size = Some((size.width as i32, size.height as i32));
        }

        size_hints
            .set_normal_hints(&self.shared.connection, self.window)
            .map_err(Error::platform)?;
        self.fixed_size.set(!resizable);
        Ok(())
    }

    /// Moves the limits of a window that cannot be resized by the user.
    fn set_fixed_size(&self, size: Size) -> Result<()> {
        let mut size_hints = WmSizeHints::new();
        let size = (size.width as i32, size.height as i32);
        size_hints.min_size = Some(size);
        size_hints.max_size = Some(size);
        size_hints
            .set_normal_hints(&self.shared.connection, self.window)
            .map_err(Error::platform)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.shared.connection.flush().map_err(Error::platform)
    }
}

impl NativeWindow for X11Window {
    #[inline]
    fn id(&self) -> WindowId {
        WindowId(self.window as u64)
    }

    fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        Some(RawWindowHandle::Xcb(XcbHandle {
            window: self.window,
            connection: self.shared.connection.get_raw_xcb_connection(),
            ..XcbHandle::empty()
        }))
    }

    fn show(&self, command: ShowCommand) -> Result<()> {
        let connection = &self.shared.connection;
        connection
            .map_window(self.window)
            .map_err(Error::platform)?;

        match command {
            ShowCommand::Passive => {}
            ShowCommand::Raise => {
                connection
                    .configure_window(
                        self.window,
                        &xproto::ConfigureWindowAux::new().stack_mode(xproto::StackMode::ABOVE),
                    )
                    .map_err(Error::platform)?;
            }
            ShowCommand::ForceRaise => {
                let root = self.shared.screen().root;
                let event = xproto::ClientMessageEvent::new(
                    32,
                    self.window,
                    self.shared.atoms._NET_ACTIVE_WINDOW,
                    [1, CURRENT_TIME, 0, 0, 0],
                );
                connection
                    .send_event(
                        false,
                        root,
                        xproto::EventMask::SUBSTRUCTURE_REDIRECT
                            | xproto::EventMask::SUBSTRUCTURE_NOTIFY,
                        event,
                    )
                    .map_err(Error::platform)?;
            }
        }

        self.flush()
    }

    fn hide(&self) -> Result<()> {
        self.shared
            .connection
            .unmap_window(self.window)
            .map_err(Error::platform)?;
        self.flush()
    }

    fn set_title(&self, title: &str) -> Result<()> {
        let connection = &self.shared.connection;
        connection
            .change_property8(
                xproto::PropMode::REPLACE,
                self.window,
                xproto::AtomEnum::WM_NAME,
                xproto::AtomEnum::STRING,
                title.as_bytes(),
            )
            .map_err(Error::platform)?;
        connection
            .change_property8(
                xproto::PropMode::REPLACE,
                self.window,
                self.shared.atoms._NET_WM_NAME,
                self.shared.atoms.UTF8_STRING,
                title.as_bytes(),
            )
            .map_err(Error::platform)?;
        self.flush()
    }

    fn set_position(&self, position: Point) -> Result<()> {
        self.shared
            .connection
            .configure_window(
                self.window,
                &xproto::ConfigureWindowAux::new()
                    .x(position.x)
                    .y(position.y),
            )
            .map_err(Error::platform)?;
        self.flush()
    }

    fn set_size(&self, size: Size) -> Result<()> {
        if self.fixed_size.get() {
            self.set_fixed_size(size)?;
        }
        self.shared
            .connection
            .configure_window(
                self.window,
                &xproto::ConfigureWindowAux::new()
                    .width(size.width)
                    .height(size.height),
            )
            .map_err(Error::platform)?;
        self.flush()
    }

    fn set_size_constraints(&self, view: &View) -> Result<()> {
        self.apply_size_hints(view, view.frame())?;
        self.flush()
    }

    fn send_client_event(&self, event: ClientEvent) -> Result<()> {
        let (data1_low, data1_high) = split_word(event.data1);
        let (data2_low, data2_high) = split_word(event.data2);
        let message = xproto::ClientMessageEvent::new(
            32,
            self.window,
            self.shared.atoms._MADO_CLIENT,
            [data1_low, data1_high, data2_low, data2_high, 0],
        );
        self.shared
            .connection
            .send_event(false, self.window, xproto::EventMask::NO_EVENT, message)
            .map_err(Error::platform)?;
        self.flush()
    }

    fn start_timer(&self, id: usize, period: Duration) -> Result<()> {
        self.shared
            .timers
            .borrow_mut()
            .start(self.id(), id, period, Instant::now())
    }

    fn stop_timer(&self, id: usize) -> Result<()> {
        self.shared.timers.borrow_mut().stop(self.id(), id)
    }

    fn set_clipboard(&self, data: ClipboardData) -> Result<()> {
        clipboard::set_clipboard(&self.shared, self.window, data)
    }

    fn clipboard(&self) -> Result<ClipboardData> {
        clipboard::get_clipboard(&self.shared, self.window)
    }
}

impl Drop for X11Window {
    fn drop(&mut self) {
        self.shared.windows.borrow_mut().remove(&self.window);
        self.shared.timers.borrow_mut().remove_window(self.id());
        clipboard::release_window(&self.shared, self.window);

        let result = self
            .shared
            .connection
            .destroy_window(self.window)
            .and_then(|_| self.shared.connection.flush());
        if let Err(error) = result {
            log::warn!("failed to destroy window {:#x}: {}", self.window, error);
        }
    }
}

/// Places the window at the requested position, or centered on the screen.
fn initial_frame(view: &View, screen: &xproto::Screen) -> Rectangle {
    let frame = view.initial_frame();
    let positioned = view.position_hint(PositionHint::Current).is_some()
        || view.position_hint(PositionHint::Default).is_some();
    if positioned {
        return frame;
    }
    let x = (screen.width_in_pixels as i32 - frame.width as i32) / 2;
    let y = (screen.height_in_pixels as i32 - frame.height as i32) / 2;
    Rectangle::new(x.max(0), y.max(0), frame.width, frame.height)
}

fn to_aspect(size: Size) -> AspectRatio {
    AspectRatio::new(size.width as i32, size.height as i32)
}
