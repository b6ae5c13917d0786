//! Session root: built at login, owned by the application root, dropped at
//! logout. Everything that needs the relationship store gets it from here.

use std::cell::RefCell;

use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{self, FriendApi};
use crate::config::SessionConfig;
use crate::error::Result;
use crate::model::event::{decode_frame, RelationshipEvent, WireError};
use crate::model::friend::{FriendRequest, RequestId, UserId};
use crate::model::notification::Notification;
use crate::state::{EventOutcome, RelationshipStore};

pub struct Session {
    conf: SessionConfig,
    store: RelationshipStore,
    notices: RefCell<Option<UnboundedSender<Notification>>>,
}

impl Session {
    pub fn login(conf: SessionConfig, api: Box<dyn FriendApi>) -> Self {
        log::info!("session started for {}", conf.user_id);
        let store = RelationshipStore::new(conf.user_id.clone(), api);
        Self {
            conf,
            store,
            notices: RefCell::new(None),
        }
    }

    /// Session backed by the REST api described by `conf`.
    pub fn with_http(conf: SessionConfig) -> Self {
        let api = api::friends(&conf);
        Self::login(conf, api)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.conf
    }

    pub fn store(&self) -> &RelationshipStore {
        &self.store
    }

    /// Outcome messages for the ui. A new call replaces the previous receiver.
    pub fn notifications(&self) -> UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded();
        *self.notices.borrow_mut() = Some(tx);
        rx
    }

    fn notify(&self, notification: Notification) {
        let mut notices = self.notices.borrow_mut();
        if let Some(tx) = notices.as_ref() {
            if tx.unbounded_send(notification).is_err() {
                notices.take();
            }
        }
    }

    fn report<T>(&self, result: Result<T>, success: impl FnOnce() -> String) -> Result<T> {
        match &result {
            Ok(_) => self.notify(Notification::info(success())),
            Err(err) => self.notify(Notification::error(err.clone())),
        }
        result
    }

    /// First load after login.
    pub async fn mount(&self) -> Result<()> {
        let result = self.store.refresh().await;
        if let Err(err) = &result {
            self.notify(Notification::error(err.clone()));
        }
        result
    }

    /// Called by the transport after every (re)connect: events may have been
    /// missed while offline.
    pub async fn on_connected(&self) {
        if let Err(err) = self.store.refresh().await {
            self.notify(Notification::error(err));
        }
    }

    pub async fn handle_event(&self, event: RelationshipEvent) -> EventOutcome {
        let outcome = self.store.apply_event(event);
        if outcome == EventOutcome::Stale {
            if let Err(err) = self.store.refresh().await {
                self.notify(Notification::error(err));
            }
        }
        outcome
    }

    /// Decode and apply one text frame. Frames that are not relationship
    /// events are skipped.
    pub async fn handle_frame(&self, text: &str) -> Option<EventOutcome> {
        match decode_frame(text) {
            Ok(event) => Some(self.handle_event(event).await),
            Err(WireError::UnknownEvent(name)) => {
                log::debug!("skip event {name}");
                None
            }
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }

    fn name_for_received(&self, request_id: &RequestId) -> String {
        let sender = self
            .store
            .lists()
            .find_received(request_id)
            .map(|r| r.sender_id.clone());
        sender
            .map(|id| self.store.display_name(&id))
            .unwrap_or_else(|| "this user".to_string())
    }

    pub async fn send_request(&self, user_id: &UserId) -> Result<FriendRequest> {
        let name = self.store.display_name(user_id);
        let result = self.store.send_request(user_id).await;
        self.report(result, || format!("Friend request sent to {name}"))
    }

    pub async fn accept_request(&self, request_id: &RequestId) -> Result<()> {
        let name = self.name_for_received(request_id);
        let result = self.store.accept_request(request_id).await;
        self.report(result, || format!("You are now friends with {name}"))
    }

    pub async fn reject_request(&self, request_id: &RequestId) -> Result<()> {
        let name = self.name_for_received(request_id);
        let result = self.store.reject_request(request_id).await;
        self.report(result, || format!("Declined the friend request from {name}"))
    }

    pub async fn cancel_request(&self, request_id: &RequestId) -> Result<()> {
        let receiver = self
            .store
            .lists()
            .find_sent(request_id)
            .map(|r| r.receiver_id.clone());
        let name = receiver
            .map(|id| self.store.display_name(&id))
            .unwrap_or_else(|| "this user".to_string());
        let result = self.store.cancel_request(request_id).await;
        self.report(result, || format!("Canceled the friend request to {name}"))
    }

    pub async fn remove_friend(&self, user_id: &UserId) -> Result<()> {
        let name = self.store.display_name(user_id);
        let result = self.store.remove_friend(user_id).await;
        self.report(result, || format!("Removed {name} from your friends"))
    }

    /// Ends the session. Close the socket first, its callbacks hold the
    /// session.
    pub fn logout(&self) {
        log::info!("session ended for {}", self.conf.user_id);
        self.store.clear();
        self.notices.borrow_mut().take();
    }
}
