mod analytics;
mod comment;
mod conversation;
mod user;
mod vote;

pub use analytics::{NewUserCluster, NewUserPca, UserCluster, UserPca};
pub use comment::{Comment, CommentUpdate, NewComment};
pub use conversation::{Conversation, ConversationUpdate, NewConversation};
pub use user::{NewUser, User, UserUpdate, MAX_USERNAME_LEN};
pub use vote::{NewVote, Vote, VoteUpdate};
