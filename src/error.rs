use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("database schema version mismatch: found {found}, expected {expected}; please run with --reset option")]
    SchemaMismatch { found: i64, expected: i64 },
    #[error("database was created for dialect '{stored}' but opened as '{requested}'; open it with ?dialect={stored} or run with --reset option")]
    DialectMismatch { stored: String, requested: String },
    #[error("conversation with id {0} not found")]
    ConversationNotFound(Uuid),
    #[error("user {user_id} is not the author of conversation {conversation_id}")]
    UnauthorizedConversationUpdate { conversation_id: Uuid, user_id: Uuid },
}

impl Error {
    /// True when the underlying engine rejected a write because of a
    /// `UNIQUE` constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Error::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            Error::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_mentions_reset() {
        let err = Error::SchemaMismatch {
            found: 999,
            expected: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("schema version mismatch"));
        assert!(msg.contains("--reset"));
    }

    #[test]
    fn unauthorized_update_names_both_ids() {
        let conversation_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let msg = Error::UnauthorizedConversationUpdate {
            conversation_id,
            user_id,
        }
        .to_string();
        assert!(msg.contains(&conversation_id.to_string()));
        assert!(msg.contains(&user_id.to_string()));
    }

    #[test]
    fn config_error_is_not_a_constraint_violation() {
        let err = Error::Config("bad".into());
        assert!(!err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
    }
}
