pub mod backend;
pub mod clipboard;
pub mod event;
pub mod geometrics;
pub mod hints;
pub mod platform;
pub mod timer;

mod dispatch;
mod error;
mod pending;
mod stage;
mod view;
mod world;

pub use error::{Error, Result};
pub use pending::PendingEvents;
pub use stage::ViewStage;
pub use view::{EventHandler, View};
pub use world::{Clock, ViewId, World, WorldState, DEFAULT_CLASS_NAME};
