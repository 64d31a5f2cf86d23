use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    model::{
        Comment, CommentUpdate, Conversation, ConversationUpdate, NewComment, NewConversation,
        NewUser, NewUserCluster, NewUserPca, NewVote, User, UserCluster, UserPca, UserUpdate,
        Vote, VoteUpdate,
    },
    query::{CommentSortField, ConversationSortField, Page, Sort},
    Result,
};

pub trait UserManager {
    /// `None` when the username is already taken.
    fn create_user(&self, new: NewUser) -> Result<Option<User>>;
    fn read_user(&self, id: Uuid) -> Result<Option<User>>;
    fn read_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self, page: Page) -> Result<Vec<User>>;
    /// `None` when the user does not exist or the new username is taken.
    fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>>;
    fn delete_user(&self, id: Uuid) -> Result<bool>;
    fn list_users_created_in_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<User>>;
    fn count_users(&self) -> Result<u64>;
}

pub trait ConversationManager {
    fn create_conversation(&self, new: NewConversation) -> Result<Conversation>;
    fn read_conversation(&self, id: Uuid) -> Result<Option<Conversation>>;
    fn list_conversations(
        &self,
        page: Page,
        sort: Sort<ConversationSortField>,
    ) -> Result<Vec<Conversation>>;
    fn list_conversations_by_author(&self, author_id: Uuid, page: Page)
        -> Result<Vec<Conversation>>;
    fn list_conversations_created_in_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Conversation>>;
    /// Fails with `ConversationNotFound` or `UnauthorizedConversationUpdate`.
    fn update_conversation(
        &self,
        id: Uuid,
        current_user_id: Uuid,
        update: ConversationUpdate,
    ) -> Result<Conversation>;
    fn delete_conversation(&self, id: Uuid) -> Result<bool>;
    fn count_conversations(&self) -> Result<u64>;
}

pub trait CommentManager {
    fn create_comment(&self, new: NewComment) -> Result<Comment>;
    fn read_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    /// Oldest approved comment of the conversation that the user neither
    /// wrote nor already voted on.
    fn read_next_unvoted_approved_comment(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        voted_comment_ids: &[Uuid],
    ) -> Result<Option<Comment>>;
    fn list_comments_by_conversation_id(
        &self,
        conversation_id: Uuid,
        page: Page,
        sort: Sort<CommentSortField>,
    ) -> Result<Vec<Comment>>;
    fn list_comments_by_user_id(&self, user_id: Uuid, page: Page) -> Result<Vec<Comment>>;
    fn list_comments_created_in_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Comment>>;
    fn search_comments(&self, query: &str) -> Result<Vec<Comment>>;
    fn update_comment(&self, id: Uuid, update: CommentUpdate) -> Result<Option<Comment>>;
    fn delete_comment(&self, id: Uuid) -> Result<bool>;
    fn count_comments_in_conversation(&self, conversation_id: Uuid) -> Result<u64>;
}

pub trait VoteManager {
    fn create_vote(&self, new: NewVote) -> Result<Vote>;
    fn read_vote(&self, id: Uuid) -> Result<Option<Vote>>;
    fn read_vote_by_user_comment(&self, user_id: Uuid, comment_id: Uuid) -> Result<Option<Vote>>;
    fn list_votes_by_comment_id(&self, comment_id: Uuid, page: Page) -> Result<Vec<Vote>>;
    fn list_votes_by_user_id(&self, user_id: Uuid, page: Page) -> Result<Vec<Vote>>;
    fn update_vote(&self, id: Uuid, update: VoteUpdate) -> Result<Option<Vote>>;
    fn delete_vote(&self, id: Uuid) -> Result<bool>;
    fn count_votes_for_comment(&self, comment_id: Uuid) -> Result<u64>;
    /// Vote value → number of votes with that value.
    fn vote_value_distribution(&self, comment_id: Uuid) -> Result<BTreeMap<i64, u64>>;
}

pub trait UserClusterManager {
    fn create_user_cluster(&self, new: NewUserCluster) -> Result<UserCluster>;
    fn read_user_cluster(&self, id: Uuid) -> Result<Option<UserCluster>>;
    fn read_user_cluster_by_user_and_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<UserCluster>>;
    fn list_user_clusters_by_conversation(&self, conversation_id: Uuid)
        -> Result<Vec<UserCluster>>;
    fn delete_user_cluster(&self, id: Uuid) -> Result<bool>;
}

pub trait UserPcaManager {
    fn create_user_pca(&self, new: NewUserPca) -> Result<UserPca>;
    fn read_user_pca(&self, id: Uuid) -> Result<Option<UserPca>>;
    fn read_user_pca_by_user_and_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<UserPca>>;
    fn list_user_pcas_by_conversation(&self, conversation_id: Uuid) -> Result<Vec<UserPca>>;
    fn delete_user_pca(&self, id: Uuid) -> Result<bool>;
}

/// Every manager behind one interface.
pub trait Database:
    UserManager + ConversationManager + CommentManager + VoteManager + UserClusterManager + UserPcaManager
{
}

impl<T> Database for T where
    T: UserManager
        + ConversationManager
        + CommentManager
        + VoteManager
        + UserClusterManager
        + UserPcaManager
{
}
