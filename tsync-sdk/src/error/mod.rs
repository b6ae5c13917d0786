pub mod api_err;

use thiserror::Error as ThisError;

use crate::model::friend::RequestId;
use crate::model::relationship::RelationshipStatus;

pub use self::api_err::ApiError;

pub type Reason = String;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum Error {
    /// one of the refresh reads failed, lists are left untouched
    #[error("fetch relationship lists failed: {0}")]
    Fetch(Reason),
    /// the server rejected a mutating call
    #[error("request rejected: {0}")]
    Request(ApiError),
    /// request id is absent from the in-memory lists
    #[error("friend request {0} not found locally")]
    NotFoundLocally(RequestId),
    /// local action would skip a relationship state
    #[error("cannot go from {from} to {to}")]
    InvalidTransition {
        from: RelationshipStatus,
        to: RelationshipStatus,
    },
    /// request server error
    #[error("network error: {0}")]
    Network(Reason),
    /// convert server message to local type
    #[error("convert error: {0}")]
    Convert(Reason),
}

impl Error {
    pub fn request(message: impl Into<String>) -> Self {
        Error::Request(ApiError {
            status: 0,
            kind: api_err::ErrorKind::BadRequest,
            message: Some(message.into()),
        })
    }

    /// Text shown to the user in the confirmation dialog.
    pub fn user_message(&self) -> String {
        match self {
            Error::Request(err) => err.user_message(),
            Error::Fetch(_) => "Could not load your friends, please try again".to_string(),
            Error::Network(_) => "Network error, please try again".to_string(),
            other => other.to_string(),
        }
    }

    /// Refresh failures keep their cause but change category.
    pub fn into_fetch(self) -> Self {
        match self {
            Error::Fetch(reason) => Error::Fetch(reason),
            other => Error::Fetch(other.to_string()),
        }
    }
}

impl From<gloo_net::Error> for Error {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(e) => Error::Convert(e.to_string()),
            other => Error::Network(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Convert(err.to_string())
    }
}
