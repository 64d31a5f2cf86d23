use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub user_id: Option<Uuid>,
    pub conversation_id: Option<Uuid>,
    pub parent_comment_id: Option<Uuid>,
    pub approved: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    #[serde(default)]
    pub parent_comment_id: Option<Uuid>,
    #[serde(default)]
    pub approved: bool,
}

impl NewComment {
    pub fn new(content: impl Into<String>, user_id: Uuid, conversation_id: Uuid) -> Self {
        Self {
            content: content.into(),
            user_id: Some(user_id),
            conversation_id: Some(conversation_id),
            parent_comment_id: None,
            approved: false,
        }
    }

    pub fn approved(mut self, approved: bool) -> Self {
        self.approved = approved;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentUpdate {
    pub content: Option<String>,
    pub approved: Option<bool>,
    /// Moves the comment to another conversation.
    pub conversation_id: Option<Uuid>,
    pub parent_comment_id: Option<Uuid>,
}
