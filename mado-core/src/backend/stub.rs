use std::any::Any;
use std::rc::Rc;

use super::Backend;
use crate::error::Result;
use crate::event::ExposeEvent;
use crate::view::View;

/// A backend that never draws, for views that only need events.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubBackend;

impl StubBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self)
    }
}

impl Backend for StubBackend {
    fn configure(&self, _view: &mut View) -> Result<()> {
        Ok(())
    }

    fn create(&self, _view: &View) -> Result<()> {
        Ok(())
    }

    fn destroy(&self, _view: &View) -> Result<()> {
        Ok(())
    }

    fn enter(&self, _view: &View, _expose: Option<&ExposeEvent>) -> Result<()> {
        Ok(())
    }

    fn leave(&self, _view: &View, _expose: Option<&ExposeEvent>) -> Result<()> {
        Ok(())
    }

    fn context(&self, _view: &View) -> Option<Rc<dyn Any>> {
        None
    }
}
