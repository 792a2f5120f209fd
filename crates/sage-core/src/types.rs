use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Who authored a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The human user of the widget.
    User,
    /// The assistant (remote model reply, canned fallback, or error notice).
    Bot,
}

/// Fixed navigation destinations the widget can request from the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTarget {
    /// The interactive monastery map view.
    MonasteryMap,
}

impl NavigationTarget {
    /// Returns the host route identifier for this destination.
    pub fn route(&self) -> &'static str {
        match self {
            NavigationTarget::MonasteryMap => "/map",
        }
    }
}

// =============================================================================
// Message
// =============================================================================

/// One entry in the conversation log.
///
/// Messages form an append-only, strictly ordered sequence owned by the
/// message store. A message is never mutated after creation; the transient
/// loading indicator is view state, not a stored message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier, used for view-state keying (expand/collapse).
    pub id: Uuid,
    /// Raw message text (markdown-flavoured for bot replies).
    pub text: String,
    /// Message author.
    pub sender: Sender,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Whether this bot reply answers an itinerary request.
    #[serde(default)]
    pub is_itinerary: bool,
}

impl Message {
    /// Create a user-authored message.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            is_itinerary: false,
        }
    }

    /// Create a bot-authored message.
    pub fn from_bot(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
            is_itinerary: false,
        }
    }

    /// Mark this message as an itinerary reply.
    pub fn with_itinerary(mut self, is_itinerary: bool) -> Self {
        self.is_itinerary = is_itinerary;
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
