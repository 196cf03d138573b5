use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::utils::error::RelayError;

/// A caught link, published on the topic named by its `action`.
///
/// Serialized with the same camelCase keys the feed consumers already read.
/// Optional fields are omitted from the JSON when absent.
///
/// # Example
///
/// ```rust
/// use linkrelay::broker::message::LinkEvent;
///
/// let event = LinkEvent::new("42", "initialSetup");
/// assert!(event.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEvent {
    #[serde(rename = "orgID", skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(serialize_with = "serialize_millis")]
    pub received_at: DateTime<Utc>,
}

impl LinkEvent {
    /// Creates an event stamped with the current time and no optional fields.
    pub fn new(project_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            org_id: None,
            project_id: project_id.into(),
            action: action.into(),
            from_ip: None,
            user_agent: None,
            received_at: Utc::now(),
        }
    }

    /// Rejects records that could never have come from an accepted link.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.project_id.is_empty() {
            return Err(RelayError::InvalidEvent("projectID is empty"));
        }
        if self.action.is_empty() {
            return Err(RelayError::InvalidEvent("action is empty"));
        }
        Ok(())
    }
}

fn serialize_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Unit of data pushed down a subscriber's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// JSON text of a published event, shared by every recipient of one publish.
    Event(Arc<str>),
    /// Inert keep-alive.
    Heartbeat,
}

impl Frame {
    pub fn event(event: &LinkEvent) -> Result<Self, RelayError> {
        let json = serde_json::to_string(event)?;
        Ok(Frame::Event(Arc::from(json)))
    }
}
