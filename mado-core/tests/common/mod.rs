#![allow(dead_code)]

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use mado_core::backend::Backend;
use mado_core::event::{Event, ExposeEvent};
use mado_core::geometrics::{Rectangle, Size};
use mado_core::hints::SizeHint;
use mado_core::platform::{HeadlessPlatform, HeadlessProxy, ShowCommand, WindowId};
use mado_core::{Error, Result, View, ViewId, World};

#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Configure,
    Create,
    Destroy,
    Enter(Option<Rectangle>),
    Leave(Option<Rectangle>),
    Event(Event),
}

pub type Journal = Rc<RefCell<Vec<Entry>>>;

/// Records every call in the shared journal and can be told to fail `enter`.
pub struct RecordingBackend {
    journal: Journal,
    pub fail_enter: Cell<bool>,
}

impl RecordingBackend {
    pub fn new(journal: Journal) -> Rc<Self> {
        Rc::new(Self {
            journal,
            fail_enter: Cell::new(false),
        })
    }

    fn record(&self, entry: Entry) {
        self.journal.borrow_mut().push(entry);
    }
}

impl Backend for RecordingBackend {
    fn configure(&self, _view: &mut View) -> Result<()> {
        self.record(Entry::Configure);
        Ok(())
    }

    fn create(&self, _view: &View) -> Result<()> {
        self.record(Entry::Create);
        Ok(())
    }

    fn destroy(&self, _view: &View) -> Result<()> {
        self.record(Entry::Destroy);
        Ok(())
    }

    fn enter(&self, _view: &View, expose: Option<&ExposeEvent>) -> Result<()> {
        if self.fail_enter.get() {
            return Err(Error::BackendFailed);
        }
        self.record(Entry::Enter(expose.map(|expose| expose.area)));
        Ok(())
    }

    fn leave(&self, _view: &View, expose: Option<&ExposeEvent>) -> Result<()> {
        self.record(Entry::Leave(expose.map(|expose| expose.area)));
        Ok(())
    }

    fn context(&self, _view: &View) -> Option<Rc<dyn Any>> {
        None
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn new_world() -> (World, HeadlessProxy) {
    init_logger();
    let platform = HeadlessPlatform::new();
    let proxy = platform.proxy();
    (World::new(platform), proxy)
}

pub fn new_journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn recording_handler(journal: &Journal) -> impl FnMut(&mut View, &Event) -> Result<()> {
    let journal = journal.clone();
    move |_view, event| {
        journal.borrow_mut().push(Entry::Event(event.clone()));
        Ok(())
    }
}

/// Creates a 512x512 view with a recording backend and handler.
pub fn prepare_view(world: &mut World, journal: &Journal) -> (ViewId, Rc<RecordingBackend>) {
    let id = world.create_view();
    let backend = RecordingBackend::new(journal.clone());
    let view = world.view_mut(id).unwrap();
    view.set_backend(backend.clone()).unwrap();
    view.set_event_handler(recording_handler(journal));
    view.set_size_hint(SizeHint::Default, Size::new(512, 512))
        .unwrap();
    (id, backend)
}

/// Shows a prepared view and runs updates until it is visible, then clears
/// the journal.
pub fn shown_view(world: &mut World, journal: &Journal) -> (ViewId, Rc<RecordingBackend>) {
    let (id, backend) = prepare_view(world, journal);
    world.view_mut(id).unwrap().show(ShowCommand::Raise).unwrap();
    world.update(Some(Duration::ZERO)).unwrap();
    assert!(world.view(id).unwrap().is_visible());
    journal.borrow_mut().clear();
    (id, backend)
}

pub fn window_of(world: &World, id: ViewId) -> WindowId {
    world.view(id).unwrap().window_id().unwrap()
}

pub fn events(journal: &Journal) -> Vec<Event> {
    journal
        .borrow()
        .iter()
        .filter_map(|entry| match entry {
            Entry::Event(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}

pub fn count(journal: &Journal, predicate: impl Fn(&Entry) -> bool) -> usize {
    journal.borrow().iter().filter(|entry| predicate(entry)).count()
}
