use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserCluster {
    pub id: Uuid,
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub cluster: i64,
    pub created: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewUserCluster {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub cluster: i64,
}

/// A user's position in the 2-D projection of a conversation's vote matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserPca {
    pub id: Uuid,
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub x: f64,
    pub y: f64,
    pub created: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewUserPca {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub x: f64,
    pub y: f64,
}
