use async_trait::async_trait;
use gloo_net::http::Response;

pub use friend::*;

use crate::error::{api_err::ApiError, Error, Result};

mod friend;

#[async_trait(?Send)]
pub trait RespStatus: Sized {
    async fn success(self) -> Result<Self>;
}

#[async_trait(?Send)]
impl RespStatus for Response {
    async fn success(self) -> Result<Self> {
        let status = self.status();
        if (200..=299).contains(&status) {
            Ok(self)
        } else {
            // deserialize error
            let err = self
                .json::<ApiError>()
                .await
                .map(|err| err.with_status(status))
                .unwrap_or_else(|_| ApiError::unknown_error(status));
            log::warn!("server rejected {}: {}", self.url(), err);
            Err(Error::Request(err))
        }
    }
}
