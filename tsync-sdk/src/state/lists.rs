use indexmap::IndexMap;

use crate::model::event::RelationshipEvent;
use crate::model::friend::{Friend, FriendRequest, UserId};
use crate::model::relationship::{RelationshipState, RelationshipStatus};

/// What applying one event did to the lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    /// already reflected, e.g. redelivery or our own action seen twice
    Duplicate,
    /// would skip a relationship state, lists left alone
    Stale,
}

/// The three authoritative lists, seen from `owner`.
///
/// Every mutation is an add-if-absent or a remove-if-present, so repeating one
/// leaves the lists unchanged.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RelationshipLists {
    owner: UserId,
    friends: IndexMap<UserId, Friend>,
    received: Vec<FriendRequest>,
    sent: Vec<FriendRequest>,
}

impl RelationshipLists {
    pub fn new(owner: impl Into<UserId>) -> Self {
        Self {
            owner: owner.into(),
            ..Default::default()
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn friends(&self) -> &IndexMap<UserId, Friend> {
        &self.friends
    }

    pub fn received(&self) -> &[FriendRequest] {
        &self.received
    }

    pub fn sent(&self) -> &[FriendRequest] {
        &self.sent
    }

    /// Swap in a full server snapshot.
    pub fn replace(
        &mut self,
        friends: Vec<Friend>,
        received: Vec<FriendRequest>,
        sent: Vec<FriendRequest>,
    ) {
        self.friends = friends.into_iter().map(|f| (f.id.clone(), f)).collect();
        self.received = received;
        self.sent = sent;
    }

    pub fn clear(&mut self) {
        self.friends.clear();
        self.received.clear();
        self.sent.clear();
    }

    /// Friends first, then incoming, then outgoing. The order only matters
    /// if the lists ever overlap.
    pub fn status_of(&self, user_id: &str) -> RelationshipState {
        if self.friends.contains_key(user_id) {
            return RelationshipState::friends();
        }
        if let Some(req) = self.received.iter().find(|r| r.sender_id == user_id) {
            return RelationshipState::incoming(req.id.clone());
        }
        if let Some(req) = self.sent.iter().find(|r| r.receiver_id == user_id) {
            return RelationshipState::pending(req.id.clone());
        }
        RelationshipState::none()
    }

    pub fn find_received(&self, request_id: &str) -> Option<&FriendRequest> {
        self.received.iter().find(|r| r.id == request_id)
    }

    pub fn find_sent(&self, request_id: &str) -> Option<&FriendRequest> {
        self.sent.iter().find(|r| r.id == request_id)
    }

    pub fn friend(&self, user_id: &str) -> Option<&Friend> {
        self.friends.get(user_id)
    }

    /// Outgoing request confirmed by the server. Returns false if it was
    /// already known.
    pub fn add_sent(&mut self, request: FriendRequest) -> bool {
        if self.sent.iter().any(|r| r.id == request.id) {
            return false;
        }
        self.sent.push(request);
        true
    }

    /// Newest first.
    pub fn add_received(&mut self, request: FriendRequest) -> bool {
        if self.received.iter().any(|r| r.id == request.id) {
            return false;
        }
        self.received.insert(0, request);
        true
    }

    pub fn remove_received(&mut self, request_id: &str) -> Option<FriendRequest> {
        let pos = self.received.iter().position(|r| r.id == request_id)?;
        Some(self.received.remove(pos))
    }

    pub fn remove_sent(&mut self, request_id: &str) -> Option<FriendRequest> {
        let pos = self.sent.iter().position(|r| r.id == request_id)?;
        Some(self.sent.remove(pos))
    }

    /// Entering `FRIENDS` drops every request involving the counterpart.
    pub fn add_friend(&mut self, friend: Friend) -> bool {
        let id = friend.id.clone();
        self.received.retain(|r| r.sender_id != id);
        self.sent.retain(|r| r.receiver_id != id);
        if self.friends.contains_key(&id) {
            return false;
        }
        self.friends.insert(id, friend);
        true
    }

    pub fn remove_friend(&mut self, user_id: &str) -> Option<Friend> {
        self.friends.shift_remove(user_id)
    }

    /// Mirror of the local operations for a change made by the other side.
    pub fn apply_event(&mut self, event: RelationshipEvent) -> EventOutcome {
        match event {
            RelationshipEvent::RequestReceived(request) => {
                if request.receiver_id != self.owner || request.sender_id == self.owner {
                    return EventOutcome::Stale;
                }
                let current = self.status_of(&request.sender_id);
                match (current.status, current.request_id.as_deref()) {
                    (RelationshipStatus::IncomingRequest, Some(id)) if id == request.id => {
                        EventOutcome::Duplicate
                    }
                    (RelationshipStatus::None, _) => {
                        if self.add_received(request) {
                            EventOutcome::Applied
                        } else {
                            EventOutcome::Duplicate
                        }
                    }
                    _ => EventOutcome::Stale,
                }
            }
            // the sender's other sessions see their own cancel as well
            RelationshipEvent::RequestCanceled { request_id } => {
                let removed = self
                    .remove_received(&request_id)
                    .or_else(|| self.remove_sent(&request_id));
                match removed {
                    Some(_) => EventOutcome::Applied,
                    None => EventOutcome::Duplicate,
                }
            }
            RelationshipEvent::RequestRejected { request_id } => {
                match self.remove_sent(&request_id) {
                    Some(_) => EventOutcome::Applied,
                    None => EventOutcome::Duplicate,
                }
            }
            RelationshipEvent::RequestAccepted { request_id, friend } => {
                let counterpart = self
                    .find_sent(&request_id)
                    .map(|r| r.receiver_id.clone())
                    .or_else(|| friend.as_ref().map(|f| f.id.clone()));
                let Some(counterpart) = counterpart else {
                    return EventOutcome::Stale;
                };
                let friend = match friend {
                    Some(friend) if friend.id == counterpart => friend,
                    _ => Friend::with_id(counterpart.clone()),
                };

                match self.status_of(&counterpart).status {
                    RelationshipStatus::Friends => {
                        self.remove_sent(&request_id);
                        EventOutcome::Duplicate
                    }
                    RelationshipStatus::Pending => {
                        self.remove_sent(&request_id);
                        self.add_friend(friend);
                        EventOutcome::Applied
                    }
                    _ => EventOutcome::Stale,
                }
            }
            RelationshipEvent::FriendRemoved { user_id } => match self.remove_friend(&user_id) {
                Some(_) => EventOutcome::Applied,
                None => EventOutcome::Duplicate,
            },
        }
    }

    /// True when no counterpart sits in more than one list.
    pub fn is_disjoint(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.friends
            .keys()
            .map(String::as_str)
            .chain(self.received.iter().map(|r| r.sender_id.as_str()))
            .chain(self.sent.iter().map(|r| r.receiver_id.as_str()))
            .all(|id| seen.insert(id))
    }
}
