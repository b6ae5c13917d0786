//! Relationship change events pushed over the real-time channel.
//!
//! The server has used two frame shapes over time: the flat socket.io style
//! `["friend_request", {...}]` and the wrapped `{"event": "FRIEND_REQUEST_RECEIVED",
//! "data": {...}}`. Both are decoded into [`RelationshipEvent`] here, before
//! anything reaches the store.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::friend::{Friend, FriendRequest, RequestId, UserId};

#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipEvent {
    /// someone sent me a request
    RequestReceived(FriendRequest),
    /// the sender withdrew a request I received
    RequestCanceled { request_id: RequestId },
    /// the receiver accepted a request I sent
    RequestAccepted {
        request_id: RequestId,
        friend: Option<Friend>,
    },
    /// the receiver rejected a request I sent
    RequestRejected { request_id: RequestId },
    /// the counterpart ended the friendship
    FriendRemoved { user_id: UserId },
}

impl RelationshipEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RelationshipEvent::RequestReceived(_) => "friend_request",
            RelationshipEvent::RequestCanceled { .. } => "friend_request_canceled",
            RelationshipEvent::RequestAccepted { .. } => "friend_accepted",
            RelationshipEvent::RequestRejected { .. } => "friend_rejected",
            RelationshipEvent::FriendRemoved { .. } => "friend_removed",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WireError {
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    #[error("malformed frame: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        WireError::Malformed(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Received,
    Canceled,
    Accepted,
    Rejected,
    Removed,
}

impl EventKind {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "friend_request" | "FRIEND_REQUEST_RECEIVED" => Some(EventKind::Received),
            "friend_request_canceled" | "FRIEND_REQUEST_CANCELED" => Some(EventKind::Canceled),
            "friend_accepted" | "FRIEND_ACCEPTED" => Some(EventKind::Accepted),
            "friend_rejected" | "FRIEND_REJECTED" => Some(EventKind::Rejected),
            "friend_removed" | "FRIEND_REMOVED" => Some(EventKind::Removed),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReceivedPayload {
    Wrapped { request: FriendRequest },
    Bare(FriendRequest),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestRef {
    #[serde(alias = "id", alias = "_id")]
    request_id: RequestId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcceptedPayload {
    #[serde(alias = "id", alias = "_id")]
    request_id: RequestId,
    #[serde(default, alias = "userId", alias = "receiverId")]
    friend_id: Option<UserId>,
    #[serde(default)]
    friend: Option<Friend>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemovedPayload {
    #[serde(alias = "friendId", alias = "id")]
    user_id: UserId,
}

/// Build an event from its name and payload, whichever naming scheme is used.
pub fn from_wire(name: &str, data: Value) -> Result<RelationshipEvent, WireError> {
    let kind = EventKind::parse(name).ok_or_else(|| WireError::UnknownEvent(name.to_string()))?;
    let event = match kind {
        EventKind::Received => match serde_json::from_value::<ReceivedPayload>(data)? {
            ReceivedPayload::Wrapped { request } | ReceivedPayload::Bare(request) => {
                RelationshipEvent::RequestReceived(request)
            }
        },
        EventKind::Canceled => {
            let RequestRef { request_id } = serde_json::from_value(data)?;
            RelationshipEvent::RequestCanceled { request_id }
        }
        EventKind::Accepted => {
            let payload: AcceptedPayload = serde_json::from_value(data)?;
            let friend = payload.friend.or_else(|| payload.friend_id.map(Friend::with_id));
            RelationshipEvent::RequestAccepted {
                request_id: payload.request_id,
                friend,
            }
        }
        EventKind::Rejected => {
            let RequestRef { request_id } = serde_json::from_value(data)?;
            RelationshipEvent::RequestRejected { request_id }
        }
        EventKind::Removed => {
            let RemovedPayload { user_id } = serde_json::from_value(data)?;
            RelationshipEvent::FriendRemoved { user_id }
        }
    };
    Ok(event)
}

/// Decode one text frame from the socket.
///
/// A socket.io packet type prefix (`42["friend_request", ...]`) is skipped.
pub fn decode_frame(text: &str) -> Result<RelationshipEvent, WireError> {
    let text = text.trim();
    let body = match text.trim_start_matches(|c: char| c.is_ascii_digit()) {
        rest if rest.starts_with('[') => rest,
        _ => text,
    };

    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => {
            let mut items = items.into_iter();
            let name = match items.next() {
                Some(Value::String(name)) => name,
                _ => return Err(WireError::Malformed("missing event name".to_string())),
            };
            from_wire(&name, items.next().unwrap_or(Value::Null))
        }
        Value::Object(mut map) => {
            let name = match map.remove("event") {
                Some(Value::String(name)) => name,
                _ => return Err(WireError::Malformed("missing `event` field".to_string())),
            };
            from_wire(&name, map.remove("data").unwrap_or(Value::Null))
        }
        _ => Err(WireError::Malformed("expected an array or an object".to_string())),
    }
}
