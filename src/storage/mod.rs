mod analytics;
mod codec;
mod comments;
mod conversations;
mod dialect;
mod rows;
pub mod sqlite;
pub mod traits;
mod users;
mod votes;

pub use dialect::{Dialect, UnknownDialect};
pub use sqlite::SqliteStorage;
pub use traits::{
    CommentManager, ConversationManager, Database, UserClusterManager, UserManager,
    UserPcaManager, VoteManager,
};

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;
    use uuid::Uuid;

    use super::{ConversationManager, Dialect, SqliteStorage, UserManager};
    use crate::model::{Conversation, NewConversation, NewUser, User};

    /// Storage backed by a database file inside a fresh temp dir. Keep the
    /// dir alive for the duration of the test.
    pub fn temp_storage(dialect: Dialect) -> (TempDir, SqliteStorage) {
        let dir = TempDir::new().expect("temp dir");
        let storage = SqliteStorage::new(dir.path().join("litepolis.db"), dialect);
        (dir, storage)
    }

    pub fn unique_username() -> String {
        format!("user_{}", &Uuid::new_v4().simple().to_string()[..12])
    }

    pub fn seed_user(storage: &SqliteStorage) -> User {
        storage
            .create_user(NewUser::new(unique_username(), "8dd10c7e99d90a2d66b532fb921e40fb"))
            .expect("create user")
            .expect("fresh username")
    }

    pub fn seed_conversation(storage: &SqliteStorage, author: &User) -> Conversation {
        storage
            .create_conversation(
                NewConversation::new("Test Conversation", author.id)
                    .with_description("This is a test conversation"),
            )
            .expect("create conversation")
    }
}
