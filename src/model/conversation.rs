use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Option<Uuid>,
    pub display_unmoderated: bool,
    pub is_archived: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewConversation {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub display_unmoderated: bool,
    #[serde(default)]
    pub is_archived: bool,
}

impl NewConversation {
    pub fn new(title: impl Into<String>, author_id: Uuid) -> Self {
        Self {
            title: title.into(),
            description: None,
            author_id: Some(author_id),
            display_unmoderated: false,
            is_archived: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author_id: Option<Uuid>,
    pub display_unmoderated: Option<bool>,
    pub is_archived: Option<bool>,
}
