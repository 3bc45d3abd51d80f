use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mado_core::backend::Backend;
use mado_core::event::ExposeEvent;
use mado_core::geometrics::{Rectangle, Size};
use mado_core::hints::{HintValue, ViewHint};
use mado_core::platform::WindowId;
use mado_core::{Error, Result, View};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, ConnectionExt as _};

use crate::event_loop::{X11Platform, X11Shared};
use crate::utils::{refresh_rate, DEFAULT_REFRESH_RATE};

/// Draws into off-screen pixmaps that are copied to their windows when an
/// expose is finished, so a window never shows a partial frame.
///
/// One backend may serve several views; each window gets its own surface.
pub struct PixmapBackend {
    shared: Rc<X11Shared>,
    surfaces: RefCell<HashMap<WindowId, Surface>>,
}

/// The drawing handle of a [`PixmapBackend`], valid while exposing.
pub struct PixmapContext {
    shared: Rc<X11Shared>,
    pixmap: xproto::Pixmap,
    gc: xproto::Gcontext,
    size: Size,
}

#[derive(Debug, PartialEq)]
struct Surface {
    window: xproto::Window,
    pixmap: xproto::Pixmap,
    gc: xproto::Gcontext,
    size: Size,
}

impl PixmapBackend {
    pub fn new(platform: &X11Platform) -> Rc<Self> {
        Rc::new(Self {
            shared: platform.shared().clone(),
            surfaces: RefCell::new(HashMap::new()),
        })
    }

    fn create_surface(&self, window: xproto::Window, size: Size) -> Result<Surface> {
        let connection = &self.shared.connection;
        let screen = self.shared.screen();
        let size = surface_size(size);

        let pixmap = connection.generate_id().map_err(Error::platform)?;
        connection
            .create_pixmap(
                screen.root_depth,
                pixmap,
                window,
                size.width as _,
                size.height as _,
            )
            .map_err(|_| Error::CreateContextFailed)?;

        let gc = connection.generate_id().map_err(Error::platform)?;
        connection
            .create_gc(
                gc,
                pixmap,
                &xproto::CreateGCAux::new()
                    .foreground(screen.black_pixel)
                    .graphics_exposures(0),
            )
            .map_err(|_| Error::CreateContextFailed)?;

        Ok(Surface {
            window,
            pixmap,
            gc,
            size,
        })
    }

    fn free_surface(&self, surface: Surface) {
        let connection = &self.shared.connection;
        let result = connection
            .free_gc(surface.gc)
            .and_then(|_| connection.free_pixmap(surface.pixmap));
        if let Err(error) = result {
            log::warn!("failed to free pixmap {:#x}: {}", surface.pixmap, error);
        }
    }
}

impl Backend for PixmapBackend {
    fn configure(&self, view: &mut View) -> Result<()> {
        let screen = self.shared.screen();
        let channel_bits = (screen.root_depth as i32 / 3).min(8);

        for hint in [ViewHint::RedBits, ViewHint::GreenBits, ViewHint::BlueBits] {
            if view.hint(hint) == HintValue::DontCare {
                view.set_hint(hint, channel_bits)?;
            }
        }
        let alpha_bits = if screen.root_depth >= 32 { 8 } else { 0 };
        for (hint, granted) in [
            (ViewHint::AlphaBits, alpha_bits),
            (ViewHint::DepthBits, 0),
            (ViewHint::StencilBits, 0),
            (ViewHint::SampleBuffers, 0),
            (ViewHint::Samples, 0),
            (ViewHint::DoubleBuffer, 1),
            (ViewHint::SwapInterval, 0),
        ] {
            if view.hint(hint) == HintValue::DontCare {
                view.set_hint(hint, granted)?;
            }
        }

        if view.hint(ViewHint::RefreshRate) == HintValue::DontCare {
            let rate = match refresh_rate(&self.shared.connection, screen.root) {
                Ok(rate) => rate.unwrap_or(DEFAULT_REFRESH_RATE),
                Err(error) => {
                    log::warn!("failed to query the refresh rate: {}", error);
                    DEFAULT_REFRESH_RATE
                }
            };
            view.set_hint(ViewHint::RefreshRate, rate.round() as i32)?;
        }

        Ok(())
    }

    fn create(&self, view: &View) -> Result<()> {
        let id = view.window_id().ok_or(Error::BackendFailed)?;
        let surface = self.create_surface(id.0 as xproto::Window, view.frame().size())?;
        let replaced = replace_surface(&mut self.surfaces.borrow_mut(), id, surface);
        if let Some(replaced) = replaced {
            self.free_surface(replaced);
        }
        Ok(())
    }

    fn destroy(&self, view: &View) -> Result<()> {
        let removed = view
            .window_id()
            .and_then(|id| self.surfaces.borrow_mut().remove(&id));
        if let Some(surface) = removed {
            self.free_surface(surface);
            self.shared.connection.flush().map_err(Error::platform)?;
        }
        Ok(())
    }

    fn enter(&self, view: &View, _expose: Option<&ExposeEvent>) -> Result<()> {
        let id = view.window_id().ok_or(Error::BackendFailed)?;
        let size = surface_size(view.frame().size());
        let window = match self.surfaces.borrow().get(&id) {
            Some(surface) if surface.size == size => return Ok(()),
            Some(surface) => surface.window,
            None => return Err(Error::BackendFailed),
        };
        let resized = self.create_surface(window, size)?;
        let replaced = replace_surface(&mut self.surfaces.borrow_mut(), id, resized);
        if let Some(replaced) = replaced {
            self.free_surface(replaced);
        }
        Ok(())
    }

    fn leave(&self, view: &View, expose: Option<&ExposeEvent>) -> Result<()> {
        let expose = match expose {
            Some(expose) => expose,
            None => return Ok(()),
        };
        let id = view.window_id().ok_or(Error::BackendFailed)?;
        let surfaces = self.surfaces.borrow();
        let surface = surfaces.get(&id).ok_or(Error::BackendFailed)?;
        copy_area(&self.shared.connection, surface, expose.area)?;
        self.shared.connection.flush().map_err(Error::platform)
    }

    fn context(&self, view: &View) -> Option<Rc<dyn Any>> {
        let id = view.window_id()?;
        let surfaces = self.surfaces.borrow();
        surfaces.get(&id).map(|surface| {
            Rc::new(PixmapContext {
                shared: self.shared.clone(),
                pixmap: surface.pixmap,
                gc: surface.gc,
                size: surface.size,
            }) as Rc<dyn Any>
        })
    }
}

impl Drop for PixmapBackend {
    fn drop(&mut self) {
        let surfaces = self.surfaces.take();
        for (_, surface) in surfaces {
            self.free_surface(surface);
        }
    }
}

impl PixmapContext {
    #[inline]
    pub fn pixmap(&self) -> xproto::Pixmap {
        self.pixmap
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn fill_rectangle(&self, bounds: Rectangle, pixel: u32) -> Result<()> {
        let connection = &self.shared.connection;
        connection
            .change_gc(self.gc, &xproto::ChangeGCAux::new().foreground(pixel))
            .map_err(Error::platform)?;
        connection
            .poly_fill_rectangle(
                self.pixmap,
                self.gc,
                &[xproto::Rectangle {
                    x: bounds.x as _,
                    y: bounds.y as _,
                    width: bounds.width as _,
                    height: bounds.height as _,
                }],
            )
            .map_err(Error::platform)?;
        Ok(())
    }

    pub fn clear(&self, pixel: u32) -> Result<()> {
        self.fill_rectangle(Rectangle::from_size(self.size), pixel)
    }
}

fn copy_area(connection: &impl Connection, surface: &Surface, area: Rectangle) -> Result<()> {
    connection
        .copy_area(
            surface.pixmap,
            surface.window,
            surface.gc,
            area.x as _,
            area.y as _,
            area.x as _,
            area.y as _,
            area.width as _,
            area.height as _,
        )
        .map_err(Error::platform)?;
    Ok(())
}

// A pixmap cannot be empty.
fn surface_size(size: Size) -> Size {
    Size::new(size.width.max(1), size.height.max(1))
}

fn replace_surface(
    surfaces: &mut HashMap<WindowId, Surface>,
    id: WindowId,
    surface: Surface,
) -> Option<Surface> {
    surfaces.insert(id, surface)
}
