use crate::{
    error::Result,
    model::friend::{Friend, FriendRequest, RequestId, UserId},
};

/// REST surface of the friend relationship endpoints.
#[async_trait::async_trait(?Send)]
pub trait FriendApi {
    async fn get_friends(&self) -> Result<Vec<Friend>>;

    async fn get_received_requests(&self) -> Result<Vec<FriendRequest>>;

    async fn get_sent_requests(&self) -> Result<Vec<FriendRequest>>;

    async fn send_request(&self, user_id: &UserId) -> Result<FriendRequest>;

    async fn accept_request(&self, request_id: &RequestId) -> Result<()>;

    async fn reject_request(&self, request_id: &RequestId) -> Result<()>;

    async fn cancel_request(&self, request_id: &RequestId) -> Result<()>;

    async fn remove_friend(&self, user_id: &UserId) -> Result<()>;
}
