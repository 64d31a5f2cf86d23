use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};

use super::Dialect;
use crate::{configuration::DatabaseUrl, Error, Result};

pub const DB_SCHEMA_VERSION: i64 = 1;

/// Connection factory for one SQLite database file.
///
/// Holds no connection: every operation opens its own, runs inside a single
/// transaction and drops it again.
#[derive(Clone, Debug)]
pub struct SqliteStorage {
    pub path: String,
    pub dialect: Dialect,
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P, dialect: Dialect) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
            dialect,
        }
    }

    pub fn from_url(url: &DatabaseUrl) -> Self {
        Self::new(&url.path, url.dialect)
    }

    /// Deletes the database file and its WAL side files.
    pub fn reset_all(&self) -> Result<()> {
        for suffix in ["", "-wal", "-shm"] {
            let path = PathBuf::from(format!("{}{}", self.path, suffix));
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Creates the schema if the database is new.
    pub fn init(&self) -> Result<()> {
        self.with_conn(|_conn| Ok(()))
    }

    fn open(&self) -> Result<Connection> {
        tracing::debug!(path = %self.path, dialect = %self.dialect, "opening sqlite connection");
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;

        Self::migrate(&conn, self.dialect)?;
        Ok(conn)
    }

    /// Runs `f` on a fresh connection in autocommit mode.
    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.open()?;
        f(&conn)
    }

    /// Runs `f` on a fresh connection inside one immediate transaction. The
    /// transaction rolls back when `f` fails.
    pub(crate) fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    fn migrate(conn: &Connection, dialect: Dialect) -> Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Self::check_dialect(conn, dialect);
        }

        if version == 0 {
            log::info!(
                "SQLite schema migration: {} -> {} ({})",
                version,
                DB_SCHEMA_VERSION,
                dialect
            );
            conn.execute_batch(&schema_sql(dialect))?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(Error::SchemaMismatch {
            found: version,
            expected: DB_SCHEMA_VERSION,
        })
    }

    /// The schema encodes the profile it was created with (e.g. whether
    /// `users.username` is `UNIQUE`), so a file must be reopened with the
    /// same one.
    fn check_dialect(conn: &Connection, dialect: Dialect) -> Result<()> {
        let stored: Option<String> = conn
            .query_row(
                "SELECT value FROM schema_meta WHERE key = 'dialect'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match stored {
            Some(stored) if stored == dialect.name => Ok(()),
            stored => Err(Error::DialectMismatch {
                stored: stored.unwrap_or_else(|| "unknown".into()),
                requested: dialect.name.to_string(),
            }),
        }
    }
}

fn schema_sql(dialect: Dialect) -> String {
    let unique = if dialect.enforces_unique { "UNIQUE" } else { "" };
    let name = dialect.name;
    format!(
        r#"
        BEGIN;
        CREATE TABLE IF NOT EXISTS schema_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        INSERT OR REPLACE INTO schema_meta (key, value) VALUES ('dialect', '{name}');

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL {unique} CHECK (length(username) <= 50),
            hashed_password TEXT NOT NULL,
            created TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS ix_user_username ON users(username);

        CREATE TABLE IF NOT EXISTS conversations (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            author_id TEXT REFERENCES users(id) ON DELETE SET NULL,
            display_unmoderated INTEGER NOT NULL DEFAULT 0,
            is_archived INTEGER NOT NULL DEFAULT 0,
            created TEXT NOT NULL,
            modified TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS ix_conversation_created ON conversations(created);
        CREATE INDEX IF NOT EXISTS ix_conversation_is_archived ON conversations(is_archived);
        CREATE INDEX IF NOT EXISTS ix_conversation_author_id ON conversations(author_id);

        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            content TEXT NOT NULL,
            user_id TEXT REFERENCES users(id) ON DELETE SET NULL,
            conversation_id TEXT REFERENCES conversations(id) ON DELETE SET NULL,
            parent_comment_id TEXT REFERENCES comments(id) ON DELETE SET NULL,
            approved INTEGER NOT NULL DEFAULT 0,
            created TEXT NOT NULL,
            modified TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS ix_comment_created ON comments(created);
        CREATE INDEX IF NOT EXISTS ix_comment_conversation_id ON comments(conversation_id);
        CREATE INDEX IF NOT EXISTS ix_comment_user_id ON comments(user_id);

        CREATE TABLE IF NOT EXISTS votes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            comment_id TEXT NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
            value INTEGER NOT NULL,
            created TEXT NOT NULL,
            modified TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS ix_vote_comment_id ON votes(comment_id);
        CREATE INDEX IF NOT EXISTS ix_vote_user_id ON votes(user_id);

        CREATE TABLE IF NOT EXISTS user_cluster (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            cluster INTEGER NOT NULL,
            created TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS ix_user_cluster_user_conversation
            ON user_cluster(user_id, conversation_id);

        CREATE TABLE IF NOT EXISTS user_pca (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            x REAL NOT NULL,
            y REAL NOT NULL,
            created TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS ix_user_pca_user_conversation
            ON user_pca(user_id, conversation_id);
        COMMIT;
        "#
    )
}
