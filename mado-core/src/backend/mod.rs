mod stub;

pub use stub::StubBackend;

use std::any::Any;
use std::rc::Rc;

use crate::error::Result;
use crate::event::ExposeEvent;
use crate::view::View;

/// A drawing backend, possibly shared by several views.
pub trait Backend {
    /// Negotiates the surface format before the native window exists.
    fn configure(&self, view: &mut View) -> Result<()>;

    fn create(&self, view: &View) -> Result<()>;

    /// Releases the drawing surface. Must be idempotent.
    fn destroy(&self, view: &View) -> Result<()>;

    /// Makes the drawing context current. `expose` is `Some` when the bracket
    /// is for drawing, `None` when a context is needed without drawing.
    fn enter(&self, view: &View, expose: Option<&ExposeEvent>) -> Result<()>;

    fn leave(&self, view: &View, expose: Option<&ExposeEvent>) -> Result<()>;

    fn context(&self, view: &View) -> Option<Rc<dyn Any>>;
}
