extern crate env_logger;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use mado_core::event::{Event, Key};
use mado_core::geometrics::{Rectangle, Size};
use mado_core::hints::{SizeHint, ViewHint};
use mado_core::platform::ShowCommand;
use mado_core::World;
use mado_x11::{PixmapBackend, PixmapContext, X11Platform};

const ANIMATION_TIMER: usize = 1;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let platform = X11Platform::new()?;
    let backend = PixmapBackend::new(&platform);
    let mut world = World::new(platform);
    world.set_class_name("MadoDemo");

    let quit = Rc::new(Cell::new(false));
    let id = world.create_view();
    let view = world
        .view_mut(id)
        .ok_or_else(|| anyhow::anyhow!("view disappeared"))?;

    view.set_backend(backend)?;
    view.set_title("mado")?;
    view.set_hint(ViewHint::Resizable, true)?;
    view.set_size_hint(SizeHint::Default, Size::new(640, 240))?;
    view.set_size_hint(SizeHint::Min, Size::new(160, 120))?;
    view.set_event_handler({
        let quit = quit.clone();
        let mut frame_count = 0u32;
        move |view, event| {
            match event {
                Event::Realize => {
                    view.start_timer(ANIMATION_TIMER, Duration::from_millis(16))?;
                }
                Event::Timer(timer) if timer.id == ANIMATION_TIMER => {
                    frame_count = frame_count.wrapping_add(1);
                    view.post_redisplay()?;
                }
                Event::Expose(_) => {
                    if let Some(context) = view.context() {
                        if let Some(context) = context.downcast_ref::<PixmapContext>() {
                            draw(context, frame_count)?;
                        }
                    }
                }
                Event::KeyPress(key_event) if key_event.key == Key::Escape => quit.set(true),
                Event::Close => quit.set(true),
                _ => {}
            }
            Ok(())
        }
    });
    view.show(ShowCommand::Raise)?;

    while !quit.get() {
        if let Err(error) = world.update(None) {
            log::error!("update failed: {}", error);
        }
    }

    world.destroy_view(id)?;

    Ok(())
}

fn draw(context: &PixmapContext, frame_count: u32) -> mado_core::Result<()> {
    let size = context.size();
    context.clear(0x202020)?;

    let block = 32;
    let span = size.width.saturating_sub(block).max(1);
    let x = (frame_count * 4) % span;
    let y = size.height.saturating_sub(block) / 2;
    context.fill_rectangle(Rectangle::new(x as i32, y as i32, block, block), 0xe0a030)
}
