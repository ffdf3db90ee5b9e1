//! Conversation message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a message within one conversation log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Bot,
}

/// One entry of the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: Author,
    /// Plain text, or an HTML fragment when `is_markup` is set
    pub content: String,
    pub is_markup: bool,
    /// Set only on the transient typing indicator
    #[serde(default)]
    pub pending: bool,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    #[must_use]
    pub fn is_from_bot(&self) -> bool {
        self.author == Author::Bot
    }
}
