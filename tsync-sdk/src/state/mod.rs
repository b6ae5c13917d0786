//! Client side view of the friend relationships of the logged in user.
//!
//! [`RelationshipStore`] owns the three lists the server is authoritative for
//! (friends, received requests, sent requests). Local actions mutate them only
//! after the backend confirmed, real-time events mutate them directly, and a
//! full [`RelationshipStore::refresh`] replaces them whenever the two paths
//! may have drifted.

use std::cell::{Ref, RefCell};

use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use indexmap::IndexMap;

use crate::api::FriendApi;
use crate::error::{Error, Result};
use crate::model::event::RelationshipEvent;
use crate::model::friend::{Friend, FriendRequest, RequestId, UserId};
use crate::model::relationship::{RelationshipState, RelationshipStatus};

pub use self::lists::{EventOutcome, RelationshipLists};

mod lists;

/// Published to subscribers after every change to the lists.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipChange {
    /// lists replaced by a server snapshot
    Refreshed,
    /// one counterpart moved to `state`
    Updated {
        user_id: UserId,
        state: RelationshipState,
    },
    /// session ended
    Cleared,
}

pub struct RelationshipStore {
    api: Box<dyn FriendApi>,
    lists: RefCell<RelationshipLists>,
    last_error: RefCell<Option<Error>>,
    subscribers: RefCell<Vec<UnboundedSender<RelationshipChange>>>,
}

impl RelationshipStore {
    pub fn new(owner: impl Into<UserId>, api: Box<dyn FriendApi>) -> Self {
        Self {
            api,
            lists: RefCell::new(RelationshipLists::new(owner)),
            last_error: RefCell::new(None),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn owner(&self) -> UserId {
        self.lists.borrow().owner().to_string()
    }

    pub fn get_status(&self, user_id: &str) -> RelationshipState {
        self.lists.borrow().status_of(user_id)
    }

    pub fn lists(&self) -> Ref<'_, RelationshipLists> {
        self.lists.borrow()
    }

    pub fn friends(&self) -> IndexMap<UserId, Friend> {
        self.lists.borrow().friends().clone()
    }

    pub fn received(&self) -> Vec<FriendRequest> {
        self.lists.borrow().received().to_vec()
    }

    pub fn sent(&self) -> Vec<FriendRequest> {
        self.lists.borrow().sent().to_vec()
    }

    /// incoming requests waiting for an answer, the contacts badge
    pub fn pending_count(&self) -> usize {
        self.lists.borrow().received().len()
    }

    /// error of the last failed refresh, cleared by the next good one
    pub fn last_error(&self) -> Option<Error> {
        self.last_error.borrow().clone()
    }

    /// Best display name for a counterpart, falling back to its id.
    pub fn display_name(&self, user_id: &str) -> String {
        self.lists
            .borrow()
            .friend(user_id)
            .map(|f| f.display_name().to_string())
            .unwrap_or_else(|| user_id.to_string())
    }

    pub fn subscribe(&self) -> UnboundedReceiver<RelationshipChange> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    fn publish(&self, change: RelationshipChange) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(change.clone()).is_ok());
    }

    fn publish_status(&self, user_id: &str) {
        let state = self.get_status(user_id);
        self.publish(RelationshipChange::Updated {
            user_id: user_id.to_string(),
            state,
        });
    }

    /// Reload all three lists. Either all of them are replaced or none.
    pub async fn refresh(&self) -> Result<()> {
        let fetched = futures::try_join!(
            self.api.get_friends(),
            self.api.get_received_requests(),
            self.api.get_sent_requests(),
        );

        match fetched {
            Ok((friends, received, sent)) => {
                log::debug!(
                    "refreshed relationships: {} friends, {} received, {} sent",
                    friends.len(),
                    received.len(),
                    sent.len()
                );
                self.lists.borrow_mut().replace(friends, received, sent);
                self.last_error.borrow_mut().take();
                self.publish(RelationshipChange::Refreshed);
                Ok(())
            }
            Err(err) => {
                let err = err.into_fetch();
                log::error!("{err}");
                *self.last_error.borrow_mut() = Some(err.clone());
                Err(err)
            }
        }
    }

    /// The local lists no longer know `request_id`; ask the server.
    async fn resync(&self, request_id: &RequestId) -> Result<()> {
        log::info!("{}, refreshing", Error::NotFoundLocally(request_id.clone()));
        self.refresh().await
    }

    pub async fn send_request(&self, user_id: &UserId) -> Result<FriendRequest> {
        if *user_id == self.owner() {
            return Err(Error::request("You cannot send a friend request to yourself"));
        }
        let from = self.get_status(user_id).status;
        if from != RelationshipStatus::None {
            return Err(Error::InvalidTransition {
                from,
                to: RelationshipStatus::Pending,
            });
        }

        let request = self.api.send_request(user_id).await?;

        // the other side may have acted while the call was in flight
        let now = self.get_status(user_id).status;
        if now == RelationshipStatus::None {
            self.lists.borrow_mut().add_sent(request.clone());
            self.publish_status(user_id);
        } else if self.lists.borrow().find_sent(&request.id).is_none() {
            log::warn!("relationship with {user_id} moved to {now} during send, refreshing");
            self.refresh().await?;
        }
        Ok(request)
    }

    pub async fn accept_request(&self, request_id: &RequestId) -> Result<()> {
        self.api.accept_request(request_id).await?;

        let removed = self.lists.borrow_mut().remove_received(request_id);
        match removed {
            Some(request) => {
                let friend = Friend::with_id(request.sender_id.clone());
                self.lists.borrow_mut().add_friend(friend);
                self.publish_status(&request.sender_id);
                Ok(())
            }
            None => self.resync(request_id).await,
        }
    }

    pub async fn reject_request(&self, request_id: &RequestId) -> Result<()> {
        self.api.reject_request(request_id).await?;

        let removed = self.lists.borrow_mut().remove_received(request_id);
        match removed {
            Some(request) => {
                self.publish_status(&request.sender_id);
                Ok(())
            }
            None => self.resync(request_id).await,
        }
    }

    pub async fn cancel_request(&self, request_id: &RequestId) -> Result<()> {
        self.api.cancel_request(request_id).await?;

        let removed = self.lists.borrow_mut().remove_sent(request_id);
        match removed {
            Some(request) => {
                self.publish_status(&request.receiver_id);
                Ok(())
            }
            None => self.resync(request_id).await,
        }
    }

    pub async fn remove_friend(&self, user_id: &UserId) -> Result<()> {
        self.api.remove_friend(user_id).await?;

        let removed = self.lists.borrow_mut().remove_friend(user_id);
        if removed.is_some() {
            self.publish_status(user_id);
        }
        Ok(())
    }

    /// Apply a change made by the other side. Never talks to the backend.
    pub fn apply_event(&self, event: RelationshipEvent) -> EventOutcome {
        let name = event.name();
        let counterpart = self.counterpart_of(&event);
        let outcome = self.lists.borrow_mut().apply_event(event);

        match outcome {
            EventOutcome::Applied => {
                log::debug!("applied {name}");
                if let Some(user_id) = counterpart {
                    self.publish_status(&user_id);
                } else {
                    self.publish(RelationshipChange::Refreshed);
                }
            }
            EventOutcome::Duplicate => log::debug!("{name} already applied"),
            EventOutcome::Stale => log::warn!("ignored stale {name}"),
        }
        outcome
    }

    fn counterpart_of(&self, event: &RelationshipEvent) -> Option<UserId> {
        let lists = self.lists.borrow();
        match event {
            RelationshipEvent::RequestReceived(request) => Some(request.sender_id.clone()),
            RelationshipEvent::RequestCanceled { request_id } => lists
                .find_received(request_id)
                .map(|r| r.sender_id.clone())
                .or_else(|| lists.find_sent(request_id).map(|r| r.receiver_id.clone())),
            RelationshipEvent::RequestRejected { request_id } => {
                lists.find_sent(request_id).map(|r| r.receiver_id.clone())
            }
            RelationshipEvent::RequestAccepted { request_id, friend } => lists
                .find_sent(request_id)
                .map(|r| r.receiver_id.clone())
                .or_else(|| friend.as_ref().map(|f| f.id.clone())),
            RelationshipEvent::FriendRemoved { user_id } => Some(user_id.clone()),
        }
    }

    /// Drop everything held for the session.
    pub fn clear(&self) {
        self.lists.borrow_mut().clear();
        self.last_error.borrow_mut().take();
        self.publish(RelationshipChange::Cleared);
        self.subscribers.borrow_mut().clear();
    }
}
