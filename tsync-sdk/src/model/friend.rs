use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;
pub type RequestId = String;

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// directed proposal from `sender_id` to `receiver_id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    #[serde(alias = "_id")]
    pub id: RequestId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Friend {
    /// friend record known only by id, used when an event carries no profile
    pub fn with_id(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// `GET /friends`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FriendList {
    #[serde(default)]
    pub friends: Vec<Friend>,
}

/// `GET /friends/requests/received` and `/sent`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FriendRequestList {
    #[serde(default)]
    pub requests: Vec<FriendRequest>,
}

/// `POST /friends/requests/{userId}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedFriendRequest {
    pub request: FriendRequest,
}
