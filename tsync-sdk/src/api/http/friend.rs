use gloo_net::http::Request;

use crate::api::friend::FriendApi;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::model::friend::{
    CreatedFriendRequest, Friend, FriendList, FriendRequest, FriendRequestList, RequestId, UserId,
};

use super::RespStatus;

pub struct FriendHttp {
    conf: SessionConfig,
}

impl FriendHttp {
    pub fn new(conf: SessionConfig) -> Self {
        Self { conf }
    }

    fn get(&self, path: &str) -> gloo_net::http::RequestBuilder {
        Request::get(&self.conf.url(path)).header(&self.conf.auth_header, &self.conf.bearer())
    }

    async fn request_list(&self, path: &str) -> Result<Vec<FriendRequest>> {
        let list: FriendRequestList = self.get(path).send().await?.success().await?.json().await?;
        Ok(list.requests)
    }
}

#[async_trait::async_trait(?Send)]
impl FriendApi for FriendHttp {
    async fn get_friends(&self) -> Result<Vec<Friend>> {
        let list: FriendList = self
            .get("/friends")
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        Ok(list.friends)
    }

    async fn get_received_requests(&self) -> Result<Vec<FriendRequest>> {
        self.request_list("/friends/requests/received").await
    }

    async fn get_sent_requests(&self) -> Result<Vec<FriendRequest>> {
        self.request_list("/friends/requests/sent").await
    }

    async fn send_request(&self, user_id: &UserId) -> Result<FriendRequest> {
        log::debug!("send friend request to {user_id}");
        let created: CreatedFriendRequest =
            Request::post(&self.conf.url(&format!("/friends/requests/{user_id}")))
                .header(&self.conf.auth_header, &self.conf.bearer())
                .send()
                .await?
                .success()
                .await?
                .json()
                .await?;
        Ok(created.request)
    }

    async fn accept_request(&self, request_id: &RequestId) -> Result<()> {
        Request::put(&self.conf.url(&format!("/friends/requests/{request_id}/accept")))
            .header(&self.conf.auth_header, &self.conf.bearer())
            .send()
            .await?
            .success()
            .await?;
        Ok(())
    }

    async fn reject_request(&self, request_id: &RequestId) -> Result<()> {
        Request::put(&self.conf.url(&format!("/friends/requests/{request_id}/reject")))
            .header(&self.conf.auth_header, &self.conf.bearer())
            .send()
            .await?
            .success()
            .await?;
        Ok(())
    }

    async fn cancel_request(&self, request_id: &RequestId) -> Result<()> {
        Request::delete(&self.conf.url(&format!("/friends/requests/{request_id}")))
            .header(&self.conf.auth_header, &self.conf.bearer())
            .send()
            .await?
            .success()
            .await?;
        Ok(())
    }

    async fn remove_friend(&self, user_id: &UserId) -> Result<()> {
        Request::delete(&self.conf.url(&format!("/friends/{user_id}")))
            .header(&self.conf.auth_header, &self.conf.bearer())
            .send()
            .await?
            .success()
            .await?;
        Ok(())
    }
}
