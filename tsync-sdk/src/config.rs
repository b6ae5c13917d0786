use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::friend::UserId;

pub const AUTHORIZE_HEADER: &str = "Authorization";

fn default_auth_header() -> String {
    AUTHORIZE_HEADER.to_string()
}

/// Everything an authenticated session needs to reach the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// e.g. `https://api.tsync.app/api`, no trailing slash needed
    pub api_base: String,
    pub ws_url: String,
    pub token: String,
    /// the logged in user
    pub user_id: UserId,
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
}

impl SessionConfig {
    pub fn new(
        api_base: impl Into<String>,
        ws_url: impl Into<String>,
        token: impl Into<String>,
        user_id: impl Into<UserId>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            ws_url: ws_url.into(),
            token: token.into(),
            user_id: user_id.into(),
            auth_header: default_auth_header(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// the socket authenticates through the last path segment
    pub fn socket_url(&self) -> String {
        format!("{}/{}", self.ws_url.trim_end_matches('/'), self.token)
    }
}
