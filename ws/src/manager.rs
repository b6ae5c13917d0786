use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use tsync_sdk::model::event::{decode_frame, RelationshipEvent, WireError};

const KNOCKOFF_CODE: u16 = 4001;
pub const UNAUTHORIZED_CODE: u16 = 4002;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectState {
    #[default]
    DisConnect,
    Connecting,
    Connected,
}

pub type Callback<T> = Rc<dyn Fn(T)>;

/// What the manager reports back to its owner.
#[derive(Clone)]
pub struct Callbacks {
    pub receive: Callback<RelationshipEvent>,
    pub state: Callback<ConnectState>,
    pub knockoff: Callback<()>,
    pub logout: Callback<()>,
}

pub struct WebSocketManager {
    url: String,
    ws: Option<WebSocket>,
    reconnect_attempts: u32,
    max_reconnect_attempts: u32,
    reconnect_interval: i32,
    // set by cleanup, a closed manager never opens a socket again
    closed: bool,
    callbacks: Option<Callbacks>,
    // keep the closures alive as long as the socket
    on_open: Option<Closure<dyn FnMut()>>,
    on_close: Option<Closure<dyn FnMut(CloseEvent)>>,
    on_error: Option<Closure<dyn FnMut(ErrorEvent)>>,
    on_message: Option<Closure<dyn FnMut(MessageEvent)>>,
}

impl WebSocketManager {
    /// `url` already carries the token, see `SessionConfig::socket_url`.
    pub fn new(url: String, callbacks: Callbacks) -> Self {
        Self {
            url,
            ws: None,
            reconnect_attempts: 0,
            max_reconnect_attempts: 5,
            reconnect_interval: 1000,
            closed: false,
            callbacks: Some(callbacks),
            on_open: None,
            on_close: None,
            on_error: None,
            on_message: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Callbacks run with no borrow of the manager held, they may use it.
    fn set_state(ws_manager: &Rc<RefCell<Self>>, state: ConnectState) {
        let callback = ws_manager
            .borrow()
            .callbacks
            .as_ref()
            .map(|callbacks| callbacks.state.clone());
        if let Some(callback) = callback {
            callback(state);
        }
    }

    pub fn connect(ws_manager: Rc<RefCell<Self>>) {
        {
            let manager = ws_manager.borrow();
            if manager.closed {
                log::debug!("WebSocket manager closed, not connecting");
                return;
            }
            if let Some(ws) = manager.ws.as_ref() {
                if ws.ready_state() == WebSocket::OPEN {
                    return;
                }
            }
        }

        let created = WebSocket::new(&ws_manager.borrow().url);
        let ws = match created {
            Ok(ws) => ws,
            Err(err) => {
                log::error!("create WebSocket error: {:?}", err);
                Self::set_state(&ws_manager, ConnectState::DisConnect);
                return;
            }
        };

        Self::set_state(&ws_manager, ConnectState::Connecting);

        let cloned_ws = ws_manager.clone();
        let on_open = Closure::wrap(Box::new(move || {
            log::info!("WebSocket connection opened");
            cloned_ws.borrow_mut().reconnect_attempts = 0;
            Self::set_state(&cloned_ws, ConnectState::Connected);
        }) as Box<dyn FnMut()>);

        let cloned_ws = ws_manager.clone();
        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            let Some(text) = e.data().as_string() else {
                log::error!("Unexpected message format!");
                return;
            };
            let receive = cloned_ws
                .borrow()
                .callbacks
                .as_ref()
                .map(|callbacks| callbacks.receive.clone());
            let Some(receive) = receive else {
                return;
            };
            match decode_frame(&text) {
                Ok(event) => receive(event),
                Err(WireError::UnknownEvent(name)) => log::debug!("skip event {name}"),
                Err(err) => log::error!("decode frame error: {err}"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);

        let ws_manager_clone = ws_manager.clone();
        let on_error = Closure::wrap(Box::new(move |e: ErrorEvent| {
            log::error!("WebSocket error: {:?}", e.message());
            Self::set_state(&ws_manager_clone, ConnectState::DisConnect);
        }) as Box<dyn FnMut(ErrorEvent)>);

        let ws_manager_clone = ws_manager.clone();
        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            let callbacks = ws_manager_clone.borrow().callbacks.clone();
            let Some(callbacks) = callbacks else {
                return;
            };
            match e.code() {
                KNOCKOFF_CODE => {
                    log::info!("Knocked off by another client");
                    (callbacks.knockoff)(());
                    return;
                }
                UNAUTHORIZED_CODE => {
                    log::warn!("Unauthorized access");
                    (callbacks.logout)(());
                    return;
                }
                code => {
                    log::warn!("WebSocket closed: {} {}", code, e.reason());
                }
            }
            Self::reconnect(ws_manager_clone.clone());
        }) as Box<dyn FnMut(CloseEvent)>);

        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        let mut manager = ws_manager.borrow_mut();
        manager.ws = Some(ws);
        manager.on_open = Some(on_open);
        manager.on_close = Some(on_close);
        manager.on_message = Some(on_message);
        manager.on_error = Some(on_error);
    }

    /// Linear backoff: the n-th attempt waits `n * reconnect_interval` ms.
    fn reconnect(ws_manager: Rc<RefCell<Self>>) {
        let interval = {
            let mut manager = ws_manager.borrow_mut();
            if manager.closed {
                return;
            }
            if manager.reconnect_attempts >= manager.max_reconnect_attempts {
                None
            } else {
                manager.reconnect_attempts += 1;
                log::debug!("reconnect attempt {}", manager.reconnect_attempts);
                Some(manager.reconnect_interval * manager.reconnect_attempts as i32)
            }
        };
        let Some(interval) = interval else {
            log::error!("Reached maximum reconnect attempts");
            Self::set_state(&ws_manager, ConnectState::DisConnect);
            return;
        };

        let Some(window) = web_sys::window() else {
            log::error!("no window to schedule the reconnect");
            return;
        };
        let manager = ws_manager.clone();
        // connect checks `closed` again when the timer fires
        let closure = Closure::once(move || WebSocketManager::connect(manager));
        if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            interval,
        ) {
            log::error!("schedule reconnect error: {:?}", err);
            return;
        }
        closure.forget();
    }

    /// Close the socket for good and release the callbacks, along with
    /// whatever they captured.
    pub fn cleanup(ws_manager: &Rc<RefCell<Self>>) {
        let callbacks = {
            let mut manager = ws_manager.borrow_mut();
            manager.closed = true;
            if let Some(ws) = manager.ws.take() {
                log::debug!("WebSocket connection closing...");
                ws.set_onopen(None);
                ws.set_onmessage(None);
                ws.set_onerror(None);
                ws.set_onclose(None);
                let _ = ws
                    .close()
                    .map_err(|err| log::error!("close WebSocket error: {:?}", err));
            }

            drop(manager.on_open.take());
            drop(manager.on_close.take());
            drop(manager.on_message.take());
            drop(manager.on_error.take());
            manager.callbacks.take()
        };

        if let Some(callbacks) = callbacks {
            (callbacks.state)(ConnectState::DisConnect);
        }
    }
}
