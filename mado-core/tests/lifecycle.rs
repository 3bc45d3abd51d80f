mod common;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use mado_core::backend::StubBackend;
use mado_core::event::Event;
use mado_core::geometrics::{Point, Rectangle, Size};
use mado_core::hints::{PositionHint, SizeHint, StringHint};
use mado_core::platform::ShowCommand;
use mado_core::{Error, ViewStage, WorldState};

use common::{events, new_journal, new_world, prepare_view, recording_handler, Entry};

#[test]
fn test_realize_without_backend() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let id = world.create_view();
    let view = world.view_mut(id).unwrap();
    view.set_event_handler(recording_handler(&journal));
    view.set_size_hint(SizeHint::Default, Size::new(512, 512))
        .unwrap();

    assert!(matches!(view.realize(), Err(Error::BadBackend)));
    assert_eq!(view.stage(), ViewStage::Allocated);
    assert_eq!(proxy.window_count(), 0);
}

#[test]
fn test_realize_without_handler() {
    let (mut world, _proxy) = new_world();
    let id = world.create_view();
    let view = world.view_mut(id).unwrap();
    view.set_backend(StubBackend::new()).unwrap();
    view.set_size_hint(SizeHint::Default, Size::new(512, 512))
        .unwrap();

    assert!(matches!(view.realize(), Err(Error::BadConfiguration)));
    assert_eq!(view.stage(), ViewStage::Allocated);
}

#[test]
fn test_realize_without_default_size() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let id = world.create_view();
    let view = world.view_mut(id).unwrap();
    view.set_backend(StubBackend::new()).unwrap();
    view.set_event_handler(recording_handler(&journal));

    assert!(matches!(
        view.set_size_hint(SizeHint::Default, Size::new(0, 512)),
        Err(Error::BadParameter)
    ));
    assert!(matches!(view.realize(), Err(Error::BadConfiguration)));
    assert_eq!(view.stage(), ViewStage::Allocated);
    assert!(journal.borrow().is_empty());
}

#[test]
fn test_realize_and_configure() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);

    world.view_mut(id).unwrap().realize().unwrap();
    assert_eq!(world.view(id).unwrap().stage(), ViewStage::Realized);
    assert_eq!(proxy.window_count(), 1);
    assert_eq!(
        *journal.borrow(),
        vec![
            Entry::Configure,
            Entry::Create,
            Entry::Enter(None),
            Entry::Event(Event::Realize),
            Entry::Leave(None),
        ]
    );

    journal.borrow_mut().clear();
    world.update(Some(Duration::ZERO)).unwrap();

    let view = world.view(id).unwrap();
    assert_eq!(view.stage(), ViewStage::Configured);
    assert_eq!(view.frame().width, 512);
    assert_eq!(view.frame().height, 512);
    assert!(!view.is_visible());
    assert_eq!(journal.borrow().len(), 3);
    assert_eq!(journal.borrow()[0], Entry::Enter(None));
    assert!(matches!(journal.borrow()[1], Entry::Event(Event::Configure(_))));
    assert_eq!(journal.borrow()[2], Entry::Leave(None));
}

#[test]
fn test_realize_twice() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let view = world.view_mut(id).unwrap();

    view.realize().unwrap();
    assert!(matches!(view.realize(), Err(Error::Failure)));
    assert_eq!(view.stage(), ViewStage::Realized);
    assert_eq!(proxy.window_count(), 1);
}

#[test]
fn test_realize_enter_failure() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, backend) = prepare_view(&mut world, &journal);
    backend.fail_enter.set(true);

    let view = world.view_mut(id).unwrap();
    assert!(matches!(view.realize(), Err(Error::BackendFailed)));
    assert_eq!(view.stage(), ViewStage::Allocated);
    assert!(view.native_window().is_none());
    assert_eq!(proxy.window_count(), 0);
    assert!(events(&journal).is_empty());
    assert_eq!(journal.borrow().last(), Some(&Entry::Destroy));
}

#[test]
fn test_unrealize_twice() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    world.view_mut(id).unwrap().realize().unwrap();
    world.update(Some(Duration::ZERO)).unwrap();
    journal.borrow_mut().clear();

    let view = world.view_mut(id).unwrap();
    view.unrealize().unwrap();
    assert_eq!(view.stage(), ViewStage::Allocated);
    assert_eq!(*view.last_configure(), Default::default());
    assert_eq!(proxy.window_count(), 0);
    assert_eq!(
        *journal.borrow(),
        vec![
            Entry::Enter(None),
            Entry::Event(Event::Unrealize),
            Entry::Leave(None),
            Entry::Destroy,
        ]
    );

    assert!(matches!(view.unrealize(), Err(Error::Failure)));
}

#[test]
fn test_unrealize_enter_failure_keeps_view() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, backend) = prepare_view(&mut world, &journal);
    world.view_mut(id).unwrap().realize().unwrap();

    backend.fail_enter.set(true);
    let view = world.view_mut(id).unwrap();
    assert!(matches!(view.unrealize(), Err(Error::BackendFailed)));
    assert_eq!(view.stage(), ViewStage::Realized);
    assert_eq!(proxy.window_count(), 1);

    backend.fail_enter.set(false);
    view.unrealize().unwrap();
    assert_eq!(proxy.window_count(), 0);
}

#[test]
fn test_realize_again_after_unrealize() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let view = world.view_mut(id).unwrap();

    view.realize().unwrap();
    view.unrealize().unwrap();
    view.realize().unwrap();
    assert_eq!(view.stage(), ViewStage::Realized);
    assert_eq!(proxy.window_count(), 1);
}

#[test]
fn test_unrealize_from_handler() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let rejected = Rc::new(Cell::new(false));

    let view = world.view_mut(id).unwrap();
    view.set_event_handler({
        let rejected = rejected.clone();
        move |view, event| {
            if *event == Event::Close {
                rejected.set(matches!(view.unrealize(), Err(Error::BadCall)));
            }
            Ok(())
        }
    });
    view.realize().unwrap();
    view.dispatch_event(&Event::Close).unwrap();

    assert!(rejected.get());
    assert_eq!(view.stage(), ViewStage::Realized);
}

#[test]
fn test_realize_from_handler() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let rejected = Rc::new(Cell::new(false));

    let view = world.view_mut(id).unwrap();
    view.set_event_handler({
        let rejected = rejected.clone();
        move |view, event| {
            if *event == Event::Close {
                rejected.set(matches!(view.realize(), Err(Error::BadCall)));
            }
            Ok(())
        }
    });
    view.dispatch_event(&Event::Close).unwrap();

    assert!(rejected.get());
    assert_eq!(view.stage(), ViewStage::Allocated);
    assert_eq!(proxy.window_count(), 0);
}

#[test]
fn test_destroy_view() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    world.view_mut(id).unwrap().realize().unwrap();
    journal.borrow_mut().clear();

    world.destroy_view(id).unwrap();
    assert!(world.view(id).is_none());
    assert_eq!(proxy.window_count(), 0);
    assert_eq!(events(&journal), vec![Event::Unrealize]);
    assert_eq!(journal.borrow().last(), Some(&Entry::Destroy));

    assert!(matches!(world.destroy_view(id), Err(Error::Failure)));
}

#[test]
fn test_drop_world_unrealizes_views() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    world.view_mut(id).unwrap().realize().unwrap();
    journal.borrow_mut().clear();

    drop(world);
    assert_eq!(events(&journal), vec![Event::Unrealize]);
    assert_eq!(proxy.window_count(), 0);
}

#[test]
fn test_show_realizes_and_maps() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);

    world.view_mut(id).unwrap().show(ShowCommand::Raise).unwrap();
    let window = world.view(id).unwrap().window_id().unwrap();
    assert!(proxy.is_mapped(window));

    world.update(Some(Duration::ZERO)).unwrap();
    let view = world.view(id).unwrap();
    assert!(view.is_visible());
    assert_eq!(world.state(), WorldState::Idle);

    let exposes = events(&journal)
        .into_iter()
        .filter(|event| matches!(event, Event::Expose(_)))
        .count();
    assert_eq!(exposes, 1);

    world.view_mut(id).unwrap().hide().unwrap();
    world.update(Some(Duration::ZERO)).unwrap();
    assert!(!proxy.is_mapped(window));
    assert!(!world.view(id).unwrap().is_visible());
}

#[test]
fn test_frame_before_configure() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let view = world.view_mut(id).unwrap();

    assert_eq!(view.frame(), Rectangle::new(0, 0, 512, 512));
    view.set_position(20, 30).unwrap();
    view.set_size(640, 480).unwrap();
    assert_eq!(view.frame(), Rectangle::new(20, 30, 640, 480));
}

#[test]
fn test_geometry_requests_are_reported_back() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    world.view_mut(id).unwrap().realize().unwrap();
    world.update(Some(Duration::ZERO)).unwrap();

    let view = world.view_mut(id).unwrap();
    view.set_frame(Rectangle::new(10, 20, 300, 200)).unwrap();
    let window = view.window_id().unwrap();
    assert_eq!(proxy.frame(window), Some(Rectangle::new(10, 20, 300, 200)));
    assert_eq!(view.frame(), Rectangle::new(0, 0, 512, 512));

    world.update(Some(Duration::ZERO)).unwrap();
    assert_eq!(
        world.view(id).unwrap().frame(),
        Rectangle::new(10, 20, 300, 200)
    );
}

#[test]
fn test_rejected_frame_changes_nothing() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    world.view_mut(id).unwrap().realize().unwrap();
    world.update(Some(Duration::ZERO)).unwrap();

    let view = world.view_mut(id).unwrap();
    let window = view.window_id().unwrap();
    assert!(matches!(
        view.set_frame(Rectangle::new(5, 5, 0, 0)),
        Err(Error::BadParameter)
    ));
    assert!(matches!(
        view.set_frame(Rectangle::new(70_000, 5, 100, 100)),
        Err(Error::BadParameter)
    ));
    assert_eq!(view.position_hint(PositionHint::Current), None);
    assert_eq!(view.size_hint(SizeHint::Current), None);
    assert_eq!(proxy.frame(window), Some(Rectangle::new(0, 0, 512, 512)));

    view.set_frame(Rectangle::new(5, 5, 100, 100)).unwrap();
    assert_eq!(view.position_hint(PositionHint::Current), Some(Point::new(5, 5)));
    assert_eq!(proxy.frame(window), Some(Rectangle::new(5, 5, 100, 100)));
}

#[test]
fn test_title() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let view = world.view_mut(id).unwrap();

    view.set_title("Before").unwrap();
    view.realize().unwrap();
    let window = view.window_id().unwrap();
    assert_eq!(proxy.title(window).as_deref(), Some("Before"));

    view.set_title("After").unwrap();
    assert_eq!(proxy.title(window).as_deref(), Some("After"));
    assert_eq!(view.string(StringHint::WindowTitle), Some("After"));
}

#[test]
fn test_class_name() {
    let (mut world, _proxy) = new_world();
    world.set_class_name("Demo");
    let id = world.create_view();

    assert_eq!(world.view(id).unwrap().class_name().as_deref(), Some("Demo"));

    let view = world.view_mut(id).unwrap();
    view.set_string(StringHint::ClassName, "Custom").unwrap();
    assert_eq!(view.class_name().as_deref(), Some("Custom"));
    assert_eq!(world.class_name(), "Demo");
}

#[test]
fn test_world_time_is_monotonic() {
    let (mut world, _proxy) = new_world();
    let id = world.create_view();

    let first = world.time();
    world.update(Some(Duration::from_millis(5))).unwrap();
    let second = world.view(id).unwrap().time();

    assert!(first >= 0.0);
    assert!(second >= first + 0.004);
}
