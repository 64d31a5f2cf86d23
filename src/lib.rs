//! Storage layer for a deliberation platform: users, conversations,
//! comments, votes and the per-user analytics derived from them, kept in
//! an embedded SQLite database.

pub mod actor;
pub mod app;
pub mod cli;
pub mod commands;
pub mod configuration;
pub mod context;
pub mod error;
pub mod model;
pub mod query;
pub mod storage;
pub mod tracing;

pub use actor::DatabaseActor;
pub use error::{Error, Result};

pub mod prelude {
    pub use crate::actor::DatabaseActor;
    pub use crate::configuration::{Configuration, DatabaseUrl};
    pub use crate::model::{
        CommentUpdate, ConversationUpdate, NewComment, NewConversation, NewUser, NewUserCluster,
        NewUserPca, NewVote, UserUpdate, VoteUpdate,
    };
    pub use crate::query::{CommentSortField, ConversationSortField, Page, Sort, SortDirection};
    pub use crate::storage::{
        CommentManager, ConversationManager, Database, UserClusterManager, UserManager,
        UserPcaManager, VoteManager,
    };
}
