use std::mem;

use crate::event::{ConfigureEvent, ExposeEvent};

/// Configure and expose notifications held back until the end of an update
/// pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PendingEvents {
    configure: Option<ConfigureEvent>,
    expose: Option<ExposeEvent>,
}

impl PendingEvents {
    #[inline]
    pub fn configure(&self) -> Option<&ConfigureEvent> {
        self.configure.as_ref()
    }

    #[inline]
    pub fn expose(&self) -> Option<&ExposeEvent> {
        self.expose.as_ref()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.configure.is_none() && self.expose.is_none()
    }

    pub fn replace_configure(&mut self, event: ConfigureEvent) {
        self.configure = Some(event);
    }

    pub fn merge_expose(&mut self, event: ExposeEvent) {
        if event.area.is_empty() {
            return;
        }
        self.expose = Some(match self.expose.take() {
            None => event,
            Some(pending) => ExposeEvent {
                flags: pending.flags & event.flags,
                area: pending.area.union(event.area),
            },
        });
    }

    /// Folds events that could not be delivered back in front of anything
    /// that arrived since they were taken.
    pub fn restore(&mut self, configure: Option<ConfigureEvent>, expose: Option<ExposeEvent>) {
        if self.configure.is_none() {
            self.configure = configure;
        }
        if let Some(expose) = expose {
            self.merge_expose(expose);
        }
    }

    #[inline]
    pub fn take(&mut self) -> (Option<ConfigureEvent>, Option<ExposeEvent>) {
        let pending = mem::take(self);
        (pending.configure, pending.expose)
    }

    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
