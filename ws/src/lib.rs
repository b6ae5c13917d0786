use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;

use tsync_sdk::model::event::RelationshipEvent;
use tsync_sdk::session::Session;

pub use manager::*;

mod manager;

/// Open the session's socket. Events go to the session's store and every
/// (re)connect triggers a resync, since events may have been missed offline.
pub fn connect_session(
    session: Rc<Session>,
    on_state: Callback<ConnectState>,
    on_knockoff: Callback<()>,
    on_logout: Callback<()>,
) -> Rc<RefCell<WebSocketManager>> {
    let receive_session = session.clone();
    let receive: Callback<RelationshipEvent> = Rc::new(move |event| {
        let session = receive_session.clone();
        spawn_local(async move {
            session.handle_event(event).await;
        });
    });

    let state_session = session.clone();
    let state: Callback<ConnectState> = Rc::new(move |state| {
        if state == ConnectState::Connected {
            let session = state_session.clone();
            spawn_local(async move { session.on_connected().await });
        }
        on_state(state);
    });

    let manager = Rc::new(RefCell::new(WebSocketManager::new(
        session.config().socket_url(),
        Callbacks {
            receive,
            state,
            knockoff: on_knockoff,
            logout: on_logout,
        },
    )));
    WebSocketManager::connect(manager.clone());
    manager
}

/// Logout: close the socket for good, then end the session. Once the
/// manager is cleaned up it no longer holds the session.
pub fn close_session(manager: &Rc<RefCell<WebSocketManager>>, session: &Session) {
    WebSocketManager::cleanup(manager);
    session.logout();
}
