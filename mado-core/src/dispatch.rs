use std::rc::Rc;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::event::{ConfigureEvent, Event, ExposeEvent, SimpleEvent};
use crate::stage::ViewStage;
use crate::view::View;
use crate::world::WorldState;

impl View {
    /// Delivers an event to the view, driving its lifecycle.
    pub fn dispatch_event(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Realize => {
                assert_eq!(
                    self.stage,
                    ViewStage::Allocated,
                    "{:?} is already realized",
                    self.id
                );
                let backend = self.require_backend()?;
                backend.enter(self, None)?;
                let handled = self.call_handler(event);
                let left = backend.leave(self, None);
                self.stage = ViewStage::Realized;
                handled.and(left)
            }
            Event::Unrealize => {
                assert!(
                    self.stage >= ViewStage::Realized,
                    "{:?} is not realized",
                    self.id
                );
                let backend = self.require_backend()?;
                backend.enter(self, None)?;
                let handled = self.call_handler(event);
                let left = backend.leave(self, None);
                self.stage = ViewStage::Allocated;
                self.last_configure = ConfigureEvent::default();
                self.pending.clear();
                handled.and(left)
            }
            Event::Configure(configure) => {
                assert!(
                    self.stage >= ViewStage::Realized,
                    "{:?} is configured before being realized",
                    self.id
                );
                self.configure_in_context(configure)
            }
            Event::Expose(expose) => {
                assert_eq!(
                    self.stage,
                    ViewStage::Configured,
                    "{:?} is exposed before being configured",
                    self.id
                );
                let backend = self.require_backend()?;
                backend.enter(self, Some(expose))?;
                let exposed = self.expose_in_context(expose);
                let left = backend.leave(self, Some(expose));
                exposed.and(left)
            }
            _ => self.call_handler(event),
        }
    }

    #[inline]
    pub fn dispatch_simple_event(&mut self, event: SimpleEvent) -> Result<()> {
        self.dispatch_event(&event.into())
    }

    /// Delivers the coalesced configure and expose inside one drawing
    /// bracket.
    pub(crate) fn flush_pending(&mut self) -> Result<()> {
        if self.stage == ViewStage::Allocated {
            self.pending.clear();
            return Ok(());
        }

        let (configure, expose) = self.pending.take();
        let configure = configure.filter(|configure| {
            self.stage != ViewStage::Configured || !configure.same_geometry(&self.last_configure)
        });
        if configure.is_none() && expose.is_none() {
            return Ok(());
        }

        let backend = self.require_backend()?;
        if let Err(error) = backend.enter(self, expose.as_ref()) {
            self.pending.restore(configure, expose);
            return Err(error);
        }

        let configured = match &configure {
            Some(configure) => self.configure_in_context(configure),
            None => Ok(()),
        };
        let exposed = match &expose {
            Some(expose) if self.stage == ViewStage::Configured => self.expose_in_context(expose),
            Some(expose) => {
                log::debug!(
                    "dropping {:?} of {:?}, which is not configured yet",
                    expose.area,
                    self.id
                );
                Ok(())
            }
            None => Ok(()),
        };
        let left = backend.leave(self, expose.as_ref());

        configured.and(exposed).and(left)
    }

    fn configure_in_context(&mut self, configure: &ConfigureEvent) -> Result<()> {
        let handled = self.call_handler(&Event::Configure(*configure));
        self.last_configure = *configure;
        if self.stage == ViewStage::Realized {
            self.stage = ViewStage::Configured;
        }
        handled
    }

    fn expose_in_context(&mut self, expose: &ExposeEvent) -> Result<()> {
        let shared = self.world.upgrade();
        let previous = shared
            .as_ref()
            .map(|shared| shared.state.replace(WorldState::Exposing));
        let handled = self.call_handler(&Event::Expose(*expose));
        if let (Some(shared), Some(previous)) = (shared, previous) {
            shared.state.set(previous);
        }
        handled
    }

    fn call_handler(&mut self, event: &Event) -> Result<()> {
        if self.in_handler {
            return Err(Error::BadCall);
        }
        let mut handler = self.handler.take().ok_or(Error::BadConfiguration)?;
        self.in_handler = true;
        let result = handler(self, event);
        self.in_handler = false;
        if self.handler.is_none() {
            self.handler = Some(handler);
        }
        result
    }

    fn require_backend(&self) -> Result<Rc<dyn Backend>> {
        self.backend.clone().ok_or(Error::BadBackend)
    }
}
