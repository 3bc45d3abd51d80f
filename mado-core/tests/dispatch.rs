mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use mado_core::event::{ClientEvent, Event, EventFlags, EventType, SimpleEvent, TimerEvent};
use mado_core::geometrics::{Rectangle, Size};
use mado_core::platform::{Capabilities, HeadlessPlatform, PollStatus, WindowId};
use mado_core::{Error, World, WorldState};

use common::{
    count, events, init_logger, new_journal, new_world, prepare_view, shown_view, window_of,
    Entry,
};

#[test]
fn test_expose_is_bracketed() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = shown_view(&mut world, &journal);
    let area = Rectangle::new(0, 0, 64, 64);

    proxy.damage(window_of(&world, id), area);
    world.update(Some(Duration::ZERO)).unwrap();

    let entries = journal.borrow();
    let start = entries
        .iter()
        .position(|entry| *entry == Entry::Enter(Some(area)))
        .unwrap();
    assert!(matches!(
        &entries[start + 1],
        Entry::Event(Event::Expose(expose)) if expose.area == area
    ));
    assert_eq!(entries[start + 2], Entry::Leave(Some(area)));
}

#[test]
fn test_leave_runs_when_handler_fails() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = shown_view(&mut world, &journal);
    world
        .view_mut(id)
        .unwrap()
        .set_event_handler(|_view, event| match event {
            Event::Expose(_) => Err(Error::Failure),
            _ => Ok(()),
        });

    proxy.damage(window_of(&world, id), Rectangle::new(0, 0, 8, 8));
    assert!(matches!(
        world.update(Some(Duration::ZERO)),
        Err(Error::Failure)
    ));
    assert_eq!(
        journal.borrow().last(),
        Some(&Entry::Leave(Some(Rectangle::new(0, 0, 8, 8))))
    );
    assert_eq!(world.state(), WorldState::Idle);
}

#[test]
fn test_enter_failure_keeps_damage() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, backend) = shown_view(&mut world, &journal);

    backend.fail_enter.set(true);
    world.view_mut(id).unwrap().post_redisplay().unwrap();
    assert!(matches!(
        world.update(Some(Duration::ZERO)),
        Err(Error::BackendFailed)
    ));
    assert!(!events(&journal)
        .iter()
        .any(|event| matches!(event, Event::Expose(_))));
    assert!(world.view(id).unwrap().pending().expose().is_some());

    backend.fail_enter.set(false);
    world.update(Some(Duration::ZERO)).unwrap();
    assert!(world.view(id).unwrap().pending().is_empty());
    assert!(events(&journal).iter().any(|event| matches!(
        event,
        Event::Expose(expose) if expose.flags.contains(EventFlags::IS_SEND_EVENT)
    )));
}

#[test]
fn test_world_state_during_dispatch() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = shown_view(&mut world, &journal);
    let states = Rc::new(RefCell::new(Vec::new()));

    world.view_mut(id).unwrap().set_event_handler({
        let states = states.clone();
        move |view, event| {
            states
                .borrow_mut()
                .push((event.event_type(), view.world_state()));
            Ok(())
        }
    });
    proxy.resize(window_of(&world, id), Size::new(256, 256));
    world.update(Some(Duration::ZERO)).unwrap();

    let states = states.borrow();
    assert!(states.contains(&(EventType::Update, WorldState::Updating)));
    assert!(states.contains(&(EventType::Configure, WorldState::Updating)));
    assert!(states.contains(&(EventType::Expose, WorldState::Exposing)));
    assert_eq!(world.state(), WorldState::Idle);
}

#[test]
fn test_geometry_changes_during_expose() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = shown_view(&mut world, &journal);
    let rejected = Rc::new(Cell::new(0));

    world.view_mut(id).unwrap().set_event_handler({
        let rejected = rejected.clone();
        move |view, event| {
            if let Event::Expose(_) = event {
                if matches!(view.set_size(100, 100), Err(Error::BadCall)) {
                    rejected.set(rejected.get() + 1);
                }
                if matches!(view.set_position(5, 5), Err(Error::BadCall)) {
                    rejected.set(rejected.get() + 1);
                }
                if matches!(view.hide(), Err(Error::BadCall)) {
                    rejected.set(rejected.get() + 1);
                }
            }
            Ok(())
        }
    });
    let window = window_of(&world, id);
    proxy.damage(window, Rectangle::new(0, 0, 16, 16));
    world.update(Some(Duration::ZERO)).unwrap();
    world.update(Some(Duration::ZERO)).unwrap();

    assert_eq!(rejected.get(), 3);
    assert_eq!(proxy.frame(window), Some(Rectangle::new(0, 0, 512, 512)));
    assert_eq!(world.view(id).unwrap().frame(), Rectangle::new(0, 0, 512, 512));
    assert!(proxy.is_mapped(window));
}

#[test]
fn test_update_is_sent_to_visible_views() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (hidden, _backend) = prepare_view(&mut world, &journal);
    world.view_mut(hidden).unwrap().realize().unwrap();
    world.update(Some(Duration::ZERO)).unwrap();
    world.update(Some(Duration::ZERO)).unwrap();
    assert!(!events(&journal).contains(&Event::Update));

    let (_shown, _backend) = shown_view(&mut world, &journal);
    world.update(Some(Duration::ZERO)).unwrap();
    assert_eq!(events(&journal), vec![Event::Update]);
}

#[test]
fn test_dispatch_simple_event() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let view = world.view_mut(id).unwrap();
    view.realize().unwrap();
    journal.borrow_mut().clear();

    view.dispatch_simple_event(SimpleEvent::Close).unwrap();
    view.dispatch_simple_event(SimpleEvent::LoopEnter).unwrap();
    view.dispatch_simple_event(SimpleEvent::LoopLeave).unwrap();
    assert_eq!(
        events(&journal),
        vec![Event::Close, Event::LoopEnter, Event::LoopLeave]
    );
    assert_eq!(count(&journal, |entry| matches!(entry, Entry::Enter(_))), 0);
}

#[test]
#[should_panic]
fn test_expose_before_configure_panics() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let view = world.view_mut(id).unwrap();
    view.realize().unwrap();
    let _ = view.dispatch_event(&Event::Expose(Default::default()));
}

#[test]
fn test_close_request() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = shown_view(&mut world, &journal);

    proxy.request_close(window_of(&world, id));
    assert_eq!(
        world.update(Some(Duration::ZERO)).unwrap(),
        PollStatus::Events
    );
    assert_eq!(events(&journal), vec![Event::Close, Event::Update]);
}

#[test]
fn test_unknown_window() {
    let (mut world, proxy) = new_world();
    proxy.request_close(WindowId(u64::MAX));
    assert_eq!(
        world.update(Some(Duration::ZERO)).unwrap(),
        PollStatus::Events
    );
    assert_eq!(
        world.update(Some(Duration::ZERO)).unwrap(),
        PollStatus::Empty
    );
}

#[test]
fn test_client_event() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = shown_view(&mut world, &journal);

    world
        .view(id)
        .unwrap()
        .send_event(ClientEvent::new(1, 2))
        .unwrap();
    world.update(Some(Duration::ZERO)).unwrap();

    let received = events(&journal)
        .into_iter()
        .find_map(|event| match event {
            Event::Client(client) => Some(client),
            _ => None,
        })
        .unwrap();
    assert_eq!((received.data1, received.data2), (1, 2));
    assert!(received.flags.contains(EventFlags::IS_SEND_EVENT));
}

#[test]
fn test_timer() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = shown_view(&mut world, &journal);

    world
        .view(id)
        .unwrap()
        .start_timer(7, Duration::from_millis(10))
        .unwrap();
    world.update(Some(Duration::from_secs(1))).unwrap();
    assert!(events(&journal).iter().any(|event| matches!(
        event,
        Event::Timer(TimerEvent { id: 7, .. })
    )));

    let view = world.view(id).unwrap();
    view.stop_timer(7).unwrap();
    assert!(matches!(view.stop_timer(7), Err(Error::Failure)));
}

#[test]
fn test_timer_period_out_of_range() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = shown_view(&mut world, &journal);
    let view = world.view(id).unwrap();

    assert!(matches!(
        view.start_timer(1, Duration::MAX),
        Err(Error::BadParameter)
    ));
    assert!(matches!(view.stop_timer(1), Err(Error::Failure)));
    world.update(Some(Duration::ZERO)).unwrap();
}

#[test]
fn test_timer_without_capability() {
    init_logger();
    let platform = HeadlessPlatform::with_capabilities(Capabilities::CLIPBOARD);
    let mut world = World::new(platform);
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let view = world.view_mut(id).unwrap();
    view.realize().unwrap();

    assert!(!world.capabilities().contains(Capabilities::TIMERS));
    let view = world.view(id).unwrap();
    assert!(matches!(
        view.start_timer(1, Duration::from_millis(10)),
        Err(Error::Failure)
    ));
}

#[test]
fn test_timer_before_realize() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    assert!(matches!(
        world
            .view(id)
            .unwrap()
            .start_timer(1, Duration::from_millis(10)),
        Err(Error::Failure)
    ));
}

#[test]
fn test_clipboard() {
    let (mut world, proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = shown_view(&mut world, &journal);
    let view = world.view(id).unwrap();

    assert!(matches!(view.clipboard(), Err(Error::Failure)));
    view.set_clipboard("text/plain", "hello").unwrap();
    let data = view.clipboard().unwrap();
    assert_eq!(data.mime_type(), "text/plain");
    assert_eq!(data.data(), b"hello");
    assert_eq!(proxy.clipboard(), Some(data));

    assert!(matches!(
        view.set_clipboard("image/png", vec![0u8; 4]),
        Err(Error::UnsupportedType)
    ));
}

#[test]
fn test_handler_replaces_itself() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let replaced = Rc::new(Cell::new(0));

    let view = world.view_mut(id).unwrap();
    view.set_event_handler({
        let replaced = replaced.clone();
        move |view, _event| {
            let replaced = replaced.clone();
            view.set_event_handler(move |_view, _event| {
                replaced.set(replaced.get() + 1);
                Ok(())
            });
            Ok(())
        }
    });
    view.realize().unwrap();
    view.dispatch_simple_event(SimpleEvent::Close).unwrap();
    view.dispatch_simple_event(SimpleEvent::Close).unwrap();
    assert_eq!(replaced.get(), 2);
}

#[test]
fn test_reentrant_dispatch() {
    let (mut world, _proxy) = new_world();
    let journal = new_journal();
    let (id, _backend) = prepare_view(&mut world, &journal);
    let rejected = Rc::new(Cell::new(false));

    let view = world.view_mut(id).unwrap();
    view.set_event_handler({
        let rejected = rejected.clone();
        move |view, event| {
            if *event == Event::Close {
                rejected.set(matches!(
                    view.dispatch_simple_event(SimpleEvent::Close),
                    Err(Error::BadCall)
                ));
            }
            Ok(())
        }
    });
    view.realize().unwrap();
    view.dispatch_simple_event(SimpleEvent::Close).unwrap();
    assert!(rejected.get());
}
