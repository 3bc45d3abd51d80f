use std::time::{Duration, Instant};

use mado_core::clipboard::{ClipboardData, TEXT_PLAIN};
use mado_core::{Error, Result};
use x11rb::connection::Connection;
use x11rb::protocol;
use x11rb::protocol::xproto::{self, ConnectionExt as _};
use x11rb::wrapper::ConnectionExt as _;
use x11rb::{CURRENT_TIME, NONE};

use crate::event_loop::X11Shared;

const CONVERSION_TIMEOUT: Duration = Duration::from_secs(1);

/// The CLIPBOARD selection while one of our windows owns it.
#[derive(Debug, Default)]
pub(crate) struct ClipboardState {
    owned: Option<(xproto::Window, ClipboardData)>,
}

pub(crate) fn set_clipboard(
    shared: &X11Shared,
    window: xproto::Window,
    data: ClipboardData,
) -> Result<()> {
    let connection = &shared.connection;
    let selection = shared.atoms.CLIPBOARD;

    connection
        .set_selection_owner(window, selection, CURRENT_TIME)
        .map_err(Error::platform)?;
    let owner = connection
        .get_selection_owner(selection)
        .map_err(Error::platform)?
        .reply()
        .map_err(Error::platform)?
        .owner;
    if owner != window {
        log::warn!("window {:#x} could not take the clipboard", window);
        return Err(Error::Failure);
    }

    shared.clipboard.borrow_mut().owned = Some((window, data));
    Ok(())
}

/// Reads the clipboard, waiting for its owner to convert it to text.
pub(crate) fn get_clipboard(shared: &X11Shared, window: xproto::Window) -> Result<ClipboardData> {
    let connection = &shared.connection;
    let atoms = &shared.atoms;

    if let Some((_, data)) = &shared.clipboard.borrow().owned {
        return Ok(data.clone());
    }

    connection
        .convert_selection(
            window,
            atoms.CLIPBOARD,
            atoms.UTF8_STRING,
            atoms._MADO_SELECTION,
            CURRENT_TIME,
        )
        .map_err(Error::platform)?;
    connection.flush().map_err(Error::platform)?;

    let deadline = Instant::now() + CONVERSION_TIMEOUT;
    loop {
        while let Some(event) = connection.poll_for_event().map_err(Error::platform)? {
            match event {
                protocol::Event::SelectionNotify(notify)
                    if notify.requestor == window && notify.selection == atoms.CLIPBOARD =>
                {
                    return read_selection(shared, window, notify.property);
                }
                event => shared.deferred.borrow_mut().push_back(event),
            }
        }

        let now = Instant::now();
        if now >= deadline {
            log::warn!("clipboard owner did not answer within {:?}", CONVERSION_TIMEOUT);
            return Err(Error::Failure);
        }
        shared.wait_readable(Some(deadline - now))?;
    }
}

fn read_selection(
    shared: &X11Shared,
    window: xproto::Window,
    property: xproto::Atom,
) -> Result<ClipboardData> {
    if property == NONE {
        return Err(Error::Failure);
    }

    let reply = shared
        .connection
        .get_property(true, window, property, xproto::AtomEnum::ANY, 0, u32::MAX / 4)
        .map_err(Error::platform)?
        .reply()
        .map_err(Error::platform)?;

    if reply.type_ == shared.atoms.INCR {
        log::warn!("incremental clipboard transfers are not supported");
        return Err(Error::Unsupported);
    }

    ClipboardData::new(TEXT_PLAIN, reply.value)
}

/// Answers another client asking for the selection we own.
pub(crate) fn handle_selection_request(
    shared: &X11Shared,
    request: &xproto::SelectionRequestEvent,
) -> Result<()> {
    let connection = &shared.connection;
    let atoms = &shared.atoms;
    let property = if request.property == NONE {
        request.target
    } else {
        request.property
    };

    let answered = match &shared.clipboard.borrow().owned {
        Some((owner, data)) if *owner == request.owner && request.selection == atoms.CLIPBOARD => {
            if request.target == atoms.TARGETS {
                let targets = [
                    atoms.TARGETS,
                    atoms.UTF8_STRING,
                    atoms.TEXT_PLAIN,
                    atoms.TEXT_PLAIN_UTF8,
                    xproto::AtomEnum::STRING.into(),
                ];
                connection
                    .change_property32(
                        xproto::PropMode::REPLACE,
                        request.requestor,
                        property,
                        xproto::AtomEnum::ATOM,
                        &targets,
                    )
                    .map_err(Error::platform)?;
                true
            } else if is_text_target(shared, request.target) {
                connection
                    .change_property8(
                        xproto::PropMode::REPLACE,
                        request.requestor,
                        property,
                        request.target,
                        data.data(),
                    )
                    .map_err(Error::platform)?;
                true
            } else {
                false
            }
        }
        _ => false,
    };

    let notify = xproto::SelectionNotifyEvent {
        response_type: xproto::SELECTION_NOTIFY_EVENT,
        sequence: 0,
        time: request.time,
        requestor: request.requestor,
        selection: request.selection,
        target: request.target,
        property: if answered { property } else { NONE },
    };
    connection
        .send_event(false, request.requestor, xproto::EventMask::NO_EVENT, notify)
        .map_err(Error::platform)?;
    connection.flush().map_err(Error::platform)?;
    Ok(())
}

pub(crate) fn handle_selection_clear(shared: &X11Shared, event: &xproto::SelectionClearEvent) {
    let mut clipboard = shared.clipboard.borrow_mut();
    if matches!(&clipboard.owned, Some((owner, _)) if *owner == event.owner) {
        clipboard.owned = None;
    }
}

/// Forgets the clipboard contents owned by a window that is going away.
pub(crate) fn release_window(shared: &X11Shared, window: xproto::Window) {
    let mut clipboard = shared.clipboard.borrow_mut();
    if matches!(&clipboard.owned, Some((owner, _)) if *owner == window) {
        clipboard.owned = None;
    }
}

fn is_text_target(shared: &X11Shared, target: xproto::Atom) -> bool {
    let atoms = &shared.atoms;
    target == atoms.UTF8_STRING
        || target == atoms.TEXT_PLAIN
        || target == atoms.TEXT_PLAIN_UTF8
        || target == u32::from(xproto::AtomEnum::STRING)
}
