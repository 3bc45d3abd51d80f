use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use raw_window_handle::RawWindowHandle;

use crate::backend::Backend;
use crate::clipboard::ClipboardData;
use crate::error::{Error, Result};
use crate::event::{
    ClientEvent, ConfigureEvent, Event, EventFlags, ExposeEvent, SimpleEvent, ViewStyle,
};
use crate::geometrics::{Point, Rectangle, Size};
use crate::hints::{
    is_valid_area, is_valid_position, HintValue, Hints, PositionHint, PositionHints, SizeHint,
    SizeHints, StringHint, Strings, ViewHint,
};
use crate::pending::PendingEvents;
use crate::platform::{Capabilities, NativeWindow, ShowCommand, WindowId};
use crate::stage::ViewStage;
use crate::world::{ViewId, WorldShared, WorldState};

pub type EventHandler = Box<dyn FnMut(&mut View, &Event) -> Result<()>>;

/// A drawable region of the screen together with its configuration.
pub struct View {
    pub(crate) id: ViewId,
    pub(crate) world: Weak<WorldShared>,
    pub(crate) backend: Option<Rc<dyn Backend>>,
    pub(crate) handler: Option<EventHandler>,
    pub(crate) in_handler: bool,
    pub(crate) native: Option<Box<dyn NativeWindow>>,
    pub(crate) stage: ViewStage,
    pub(crate) last_configure: ConfigureEvent,
    pub(crate) pending: PendingEvents,
    hints: Hints,
    size_hints: SizeHints,
    position_hints: PositionHints,
    strings: Strings,
}

impl View {
    pub(crate) fn new(id: ViewId, world: Weak<WorldShared>) -> Self {
        Self {
            id,
            world,
            backend: None,
            handler: None,
            in_handler: false,
            native: None,
            stage: ViewStage::Allocated,
            last_configure: ConfigureEvent::default(),
            pending: PendingEvents::default(),
            hints: Hints::default(),
            size_hints: SizeHints::default(),
            position_hints: PositionHints::default(),
            strings: Strings::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> ViewId {
        self.id
    }

    #[inline]
    pub fn stage(&self) -> ViewStage {
        self.stage
    }

    #[inline]
    pub fn is_realized(&self) -> bool {
        self.stage >= ViewStage::Realized
    }

    pub fn world_state(&self) -> WorldState {
        self.world
            .upgrade()
            .map_or(WorldState::Idle, |shared| shared.state.get())
    }

    pub fn time(&self) -> f64 {
        self.world
            .upgrade()
            .map_or(0.0, |shared| shared.clock.now())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.world
            .upgrade()
            .map_or(Capabilities::empty(), |shared| shared.platform.capabilities())
    }

    pub fn set_backend(&mut self, backend: Rc<dyn Backend>) -> Result<()> {
        if self.stage != ViewStage::Allocated {
            return Err(Error::BadCall);
        }
        self.backend = Some(backend);
        Ok(())
    }

    #[inline]
    pub fn backend(&self) -> Option<&Rc<dyn Backend>> {
        self.backend.as_ref()
    }

    /// Installs the function that receives every event of this view.
    pub fn set_event_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut View, &Event) -> Result<()> + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    #[inline]
    pub fn hint(&self, hint: ViewHint) -> HintValue {
        self.hints.get(hint)
    }

    pub fn set_hint(&mut self, hint: ViewHint, value: impl Into<HintValue>) -> Result<()> {
        self.hints.set(hint, value)?;
        if hint == ViewHint::Resizable {
            if let Some(native) = &self.native {
                native.set_size_constraints(self)?;
            }
        }
        Ok(())
    }

    #[inline]
    pub fn hints(&self) -> &Hints {
        &self.hints
    }

    #[inline]
    pub fn size_hint(&self, hint: SizeHint) -> Option<Size> {
        self.size_hints.get(hint)
    }

    /// Records a size hint, applying it to the native window when realized.
    pub fn set_size_hint(&mut self, hint: SizeHint, size: Size) -> Result<()> {
        match hint {
            SizeHint::Current => {
                self.check_not_exposing()?;
                if !is_valid_area(size) {
                    return Err(Error::BadParameter);
                }
                if let Some(native) = &self.native {
                    native.set_size(size)?;
                }
                self.size_hints.set(hint, size)
            }
            SizeHint::Default => self.size_hints.set(hint, size),
            _ => {
                self.size_hints.set(hint, size)?;
                match &self.native {
                    Some(native) => native.set_size_constraints(self),
                    None => Ok(()),
                }
            }
        }
    }

    #[inline]
    pub fn position_hint(&self, hint: PositionHint) -> Option<Point> {
        self.position_hints.get(hint)
    }

    pub fn set_position_hint(&mut self, hint: PositionHint, position: Point) -> Result<()> {
        if hint == PositionHint::Current {
            self.check_not_exposing()?;
            if !is_valid_position(position) {
                return Err(Error::BadParameter);
            }
            if let Some(native) = &self.native {
                native.set_position(position)?;
            }
        }
        self.position_hints.set(hint, position)
    }

    #[inline]
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.set_size_hint(SizeHint::Current, Size::new(width, height))
    }

    #[inline]
    pub fn set_position(&mut self, x: i32, y: i32) -> Result<()> {
        self.set_position_hint(PositionHint::Current, Point::new(x, y))
    }

    pub fn set_frame(&mut self, frame: Rectangle) -> Result<()> {
        self.check_not_exposing()?;
        if !is_valid_position(frame.point()) || !is_valid_area(frame.size()) {
            return Err(Error::BadParameter);
        }
        self.set_position_hint(PositionHint::Current, frame.point())?;
        self.set_size_hint(SizeHint::Current, frame.size())
    }

    pub fn initial_frame(&self) -> Rectangle {
        let size = self
            .size_hint(SizeHint::Current)
            .or_else(|| self.size_hint(SizeHint::Default))
            .unwrap_or(Size::ZERO);
        let position = self
            .position_hint(PositionHint::Current)
            .or_else(|| self.position_hint(PositionHint::Default))
            .unwrap_or(Point::ZERO);
        Rectangle::from_parts(position, size)
    }

    /// The last frame reported by the platform, or the requested one before
    /// the first configuration.
    pub fn frame(&self) -> Rectangle {
        if self.stage == ViewStage::Configured {
            self.last_configure.frame
        } else {
            self.initial_frame()
        }
    }

    #[inline]
    pub fn last_configure(&self) -> &ConfigureEvent {
        &self.last_configure
    }

    #[inline]
    pub fn pending(&self) -> &PendingEvents {
        &self.pending
    }

    #[inline]
    pub fn string(&self, hint: StringHint) -> Option<&str> {
        self.strings.get(hint)
    }

    pub fn set_string(&mut self, hint: StringHint, value: impl Into<Cow<'static, str>>) -> Result<()> {
        let value = value.into();
        if hint == StringHint::WindowTitle {
            if let Some(native) = &self.native {
                native.set_title(&value)?;
            }
        }
        self.strings.set(hint, value);
        Ok(())
    }

    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.string(StringHint::WindowTitle)
    }

    #[inline]
    pub fn set_title(&mut self, title: impl Into<Cow<'static, str>>) -> Result<()> {
        self.set_string(StringHint::WindowTitle, title)
    }

    pub fn class_name(&self) -> Option<String> {
        match self.string(StringHint::ClassName) {
            Some(class_name) => Some(class_name.to_owned()),
            None => self
                .world
                .upgrade()
                .map(|shared| shared.class_name.borrow().to_string()),
        }
    }

    #[inline]
    pub fn native_window(&self) -> Option<&dyn NativeWindow> {
        self.native.as_deref()
    }

    #[inline]
    pub fn window_id(&self) -> Option<WindowId> {
        self.native.as_ref().map(|native| native.id())
    }

    pub fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        self.native
            .as_ref()
            .and_then(|native| native.raw_window_handle())
    }

    pub fn context(&self) -> Option<Rc<dyn Any>> {
        self.backend
            .as_ref()
            .and_then(|backend| backend.context(self))
    }

    /// Creates the native window and drawing surface, then delivers a
    /// realize event.
    pub fn realize(&mut self) -> Result<()> {
        self.check_not_exposing()?;
        if self.in_handler {
            return Err(Error::BadCall);
        }
        if self.stage != ViewStage::Allocated {
            return Err(Error::Failure);
        }
        let backend = self.backend.clone().ok_or(Error::BadBackend)?;
        if self.handler.is_none() {
            return Err(Error::BadConfiguration);
        }
        match self.size_hint(SizeHint::Default) {
            Some(size) if is_valid_area(size) => {}
            _ => return Err(Error::BadConfiguration),
        }
        let shared = self.world.upgrade().ok_or(Error::Failure)?;

        if let Err(error) = backend.configure(self) {
            self.release_surface(&backend);
            return Err(error);
        }

        match shared.platform.create_window(self) {
            Ok(native) => self.native = Some(native),
            Err(error) => {
                self.release_surface(&backend);
                return Err(error);
            }
        }

        if let Err(error) = backend.create(self) {
            self.release_surface(&backend);
            return Err(error);
        }

        let result = self.dispatch_simple_event(SimpleEvent::Realize);
        if self.stage == ViewStage::Allocated {
            self.release_surface(&backend);
        }
        result
    }

    /// Delivers an unrealize event, then destroys the drawing surface and
    /// the native window.
    pub fn unrealize(&mut self) -> Result<()> {
        self.check_not_exposing()?;
        if self.stage < ViewStage::Realized {
            return Err(Error::Failure);
        }
        if self.in_handler {
            return Err(Error::BadCall);
        }

        let result = self.dispatch_simple_event(SimpleEvent::Unrealize);
        if self.stage != ViewStage::Allocated {
            return result;
        }
        if let Some(backend) = self.backend.clone() {
            self.release_surface(&backend);
        }
        result
    }

    pub fn show(&mut self, command: ShowCommand) -> Result<()> {
        self.check_not_exposing()?;
        if self.stage == ViewStage::Allocated {
            self.realize()?;
        }
        self.native()?.show(command)
    }

    pub fn hide(&mut self) -> Result<()> {
        self.check_not_exposing()?;
        self.native()?.hide()
    }

    pub fn is_visible(&self) -> bool {
        self.stage == ViewStage::Configured
            && self.last_configure.style.contains(ViewStyle::MAPPED)
    }

    pub fn post_redisplay(&mut self) -> Result<()> {
        let area = Rectangle::from_size(self.frame().size());
        self.post_redisplay_rect(area)
    }

    /// Requests a redraw of `area` during the next update.
    pub fn post_redisplay_rect(&mut self, area: Rectangle) -> Result<()> {
        if self.stage < ViewStage::Realized {
            return Err(Error::Failure);
        }
        if area.is_empty() {
            return Ok(());
        }
        self.pending.merge_expose(ExposeEvent {
            flags: EventFlags::IS_SEND_EVENT,
            area,
        });
        Ok(())
    }

    pub fn send_event(&self, event: ClientEvent) -> Result<()> {
        self.native()?.send_client_event(event)
    }

    pub fn start_timer(&self, id: usize, period: Duration) -> Result<()> {
        self.check_capability(Capabilities::TIMERS)?;
        self.native()?.start_timer(id, period)
    }

    pub fn stop_timer(&self, id: usize) -> Result<()> {
        self.check_capability(Capabilities::TIMERS)?;
        self.native()?.stop_timer(id)
    }

    pub fn set_clipboard(
        &self,
        mime_type: impl Into<Cow<'static, str>>,
        data: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let data = ClipboardData::new(mime_type, data)?;
        self.check_capability(Capabilities::CLIPBOARD)?;
        self.native()?.set_clipboard(data)
    }

    pub fn clipboard(&self) -> Result<ClipboardData> {
        self.check_capability(Capabilities::CLIPBOARD)?;
        self.native()?.clipboard()
    }

    fn native(&self) -> Result<&dyn NativeWindow> {
        self.native.as_deref().ok_or(Error::Failure)
    }

    fn check_capability(&self, capability: Capabilities) -> Result<()> {
        if self.capabilities().contains(capability) {
            Ok(())
        } else {
            Err(Error::Failure)
        }
    }

    fn check_not_exposing(&self) -> Result<()> {
        if self.world_state() == WorldState::Exposing {
            Err(Error::BadCall)
        } else {
            Ok(())
        }
    }

    fn release_surface(&mut self, backend: &Rc<dyn Backend>) {
        if let Err(error) = backend.destroy(self) {
            log::warn!("failed to destroy the surface of {:?}: {}", self.id, error);
        }
        self.native = None;
        self.pending.clear();
    }
}

impl Drop for View {
    fn drop(&mut self) {
        if self.stage >= ViewStage::Realized {
            log::warn!("{:?} dropped while realized, unrealizing it", self.id);
            if let Err(error) = self.unrealize() {
                log::error!("failed to unrealize {:?}: {}", self.id, error);
            }
        }
        if let (Some(_), Some(backend)) = (&self.native, self.backend.clone()) {
            self.release_surface(&backend);
        }
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("window", &self.window_id())
            .field("last_configure", &self.last_configure)
            .field("pending", &self.pending)
            .finish()
    }
}
