use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::friend::RequestId;

/// Relationship to a counterpart, seen from the session user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    #[default]
    None,
    /// I sent a request, waiting for their answer
    Pending,
    /// they sent me a request, waiting for mine
    IncomingRequest,
    Friends,
}

impl RelationshipStatus {
    /// Edges of the per relationship state machine. Staying put is allowed,
    /// skipping a state is not.
    pub fn can_advance_to(self, next: RelationshipStatus) -> bool {
        use RelationshipStatus::*;
        matches!(
            (self, next),
            (None, None)
                | (Pending, Pending)
                | (IncomingRequest, IncomingRequest)
                | (Friends, Friends)
                | (None, Pending)
                | (None, IncomingRequest)
                | (Pending, Friends)
                | (IncomingRequest, Friends)
                | (Pending, None)
                | (IncomingRequest, None)
                | (Friends, None)
        )
    }

    pub fn has_request(self) -> bool {
        matches!(
            self,
            RelationshipStatus::Pending | RelationshipStatus::IncomingRequest
        )
    }
}

impl Display for RelationshipStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipStatus::None => write!(f, "none"),
            RelationshipStatus::Pending => write!(f, "pending"),
            RelationshipStatus::IncomingRequest => write!(f, "incoming_request"),
            RelationshipStatus::Friends => write!(f, "friends"),
        }
    }
}

/// `request_id` is set iff the status carries an outstanding request.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipState {
    pub status: RelationshipStatus,
    pub request_id: Option<RequestId>,
}

impl RelationshipState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn friends() -> Self {
        Self {
            status: RelationshipStatus::Friends,
            request_id: None,
        }
    }

    pub fn pending(request_id: impl Into<RequestId>) -> Self {
        Self {
            status: RelationshipStatus::Pending,
            request_id: Some(request_id.into()),
        }
    }

    pub fn incoming(request_id: impl Into<RequestId>) -> Self {
        Self {
            status: RelationshipStatus::IncomingRequest,
            request_id: Some(request_id.into()),
        }
    }
}
