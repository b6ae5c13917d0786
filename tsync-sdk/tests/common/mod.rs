#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use tsync_sdk::api::FriendApi;
use tsync_sdk::error::api_err::{ApiError, ErrorKind};
use tsync_sdk::error::{Error, Result};
use tsync_sdk::model::friend::{Friend, FriendRequest, RequestId, RequestStatus, UserId};

pub const ME: &str = "me";

pub fn request(id: &str, sender: &str, receiver: &str) -> FriendRequest {
    FriendRequest {
        id: id.to_string(),
        sender_id: sender.to_string(),
        receiver_id: receiver.to_string(),
        status: RequestStatus::Pending,
        created_at: chrono::Utc::now(),
    }
}

pub fn named(id: &str, name: &str) -> Friend {
    Friend {
        id: id.to_string(),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

/// Backend state as the in-memory api sees it.
#[derive(Debug, Default)]
pub struct Backend {
    pub friends: Vec<Friend>,
    pub received: Vec<FriendRequest>,
    pub sent: Vec<FriendRequest>,
    /// ids handed out by `send_request`, in order
    pub next_ids: Vec<RequestId>,
    /// name of the read that fails, `"*"` for all of them
    pub fail_read: Option<&'static str>,
    /// message of the next rejected mutation
    pub reject_next: Option<String>,
    pub calls: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MockApi {
    pub backend: Rc<RefCell<Backend>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed(&self) -> Box<dyn FriendApi> {
        Box::new(self.clone())
    }

    pub fn calls(&self) -> Vec<String> {
        self.backend.borrow().calls.clone()
    }

    pub fn reads(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("get_")).count()
    }

    fn read<T: Clone>(&self, name: &'static str, pick: impl Fn(&Backend) -> Vec<T>) -> Result<Vec<T>> {
        let mut backend = self.backend.borrow_mut();
        backend.calls.push(name.to_string());
        match backend.fail_read {
            Some(failing) if failing == "*" || failing == name => {
                Err(Error::Network(format!("{name}: connection refused")))
            }
            _ => Ok(pick(&backend)),
        }
    }

    fn mutate(&self, call: String) -> Result<()> {
        let mut backend = self.backend.borrow_mut();
        backend.calls.push(call);
        match backend.reject_next.take() {
            Some(message) => Err(Error::Request(ApiError {
                status: 409,
                kind: ErrorKind::Conflict,
                message: Some(message),
            })),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl FriendApi for MockApi {
    async fn get_friends(&self) -> Result<Vec<Friend>> {
        self.read("get_friends", |b| b.friends.clone())
    }

    async fn get_received_requests(&self) -> Result<Vec<FriendRequest>> {
        self.read("get_received_requests", |b| b.received.clone())
    }

    async fn get_sent_requests(&self) -> Result<Vec<FriendRequest>> {
        self.read("get_sent_requests", |b| b.sent.clone())
    }

    async fn send_request(&self, user_id: &UserId) -> Result<FriendRequest> {
        self.mutate(format!("send_request {user_id}"))?;
        let mut backend = self.backend.borrow_mut();
        let id = if backend.next_ids.is_empty() {
            format!("r{}", backend.calls.len())
        } else {
            backend.next_ids.remove(0)
        };
        let created = request(&id, ME, user_id);
        backend.sent.push(created.clone());
        Ok(created)
    }

    async fn accept_request(&self, request_id: &RequestId) -> Result<()> {
        self.mutate(format!("accept_request {request_id}"))?;
        let mut backend = self.backend.borrow_mut();
        if let Some(pos) = backend.received.iter().position(|r| &r.id == request_id) {
            let req = backend.received.remove(pos);
            backend.friends.push(Friend::with_id(req.sender_id));
        }
        Ok(())
    }

    async fn reject_request(&self, request_id: &RequestId) -> Result<()> {
        self.mutate(format!("reject_request {request_id}"))?;
        self.backend
            .borrow_mut()
            .received
            .retain(|r| &r.id != request_id);
        Ok(())
    }

    async fn cancel_request(&self, request_id: &RequestId) -> Result<()> {
        self.mutate(format!("cancel_request {request_id}"))?;
        self.backend.borrow_mut().sent.retain(|r| &r.id != request_id);
        Ok(())
    }

    async fn remove_friend(&self, user_id: &UserId) -> Result<()> {
        self.mutate(format!("remove_friend {user_id}"))?;
        self.backend.borrow_mut().friends.retain(|f| &f.id != user_id);
        Ok(())
    }
}
