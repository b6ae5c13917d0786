use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorKind {
    #[default]
    UnknownError,
    BadRequest,
    UnAuthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalServer,
}

impl From<u16> for ErrorKind {
    fn from(status: u16) -> Self {
        match status {
            400 | 422 => ErrorKind::BadRequest,
            401 => ErrorKind::UnAuthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            500..=599 => ErrorKind::InternalServer,
            _ => ErrorKind::UnknownError,
        }
    }
}

/// Error body returned by the api server, `{ "message": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub kind: ErrorKind,
    #[serde(alias = "error")]
    pub message: Option<String>,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.message {
            Some(message) => write!(f, "{:?}({}): {}", self.kind, self.status, message),
            None => write!(f, "{:?}({})", self.kind, self.status),
        }
    }
}

impl ApiError {
    pub fn unknown_error(status: u16) -> Self {
        ApiError {
            status,
            kind: ErrorKind::from(status),
            message: None,
        }
    }

    /// Fill in the transport details the body does not carry.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self.kind = ErrorKind::from(status);
        self
    }

    /// Server supplied message, falling back to the status description.
    pub fn user_message(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("request failed with status {}", self.status))
    }
}
