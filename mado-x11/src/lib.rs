mod clipboard;
mod event;
mod event_loop;
mod pixmap;
mod utils;
mod window;

pub use event_loop::X11Platform;
pub use pixmap::{PixmapBackend, PixmapContext};
pub use utils::refresh_rate;
