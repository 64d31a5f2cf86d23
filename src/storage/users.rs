use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{
    codec::{encode_id, encode_lower_bound, encode_ts, id_at, now, ts_at},
    rows::{db_count, db_delete_by_id, db_load_by_id, db_query_all, db_update_by_id},
    Dialect, SqliteStorage, UserManager,
};
use crate::{
    model::{NewUser, User, UserUpdate},
    query::{Assignments, Page},
    Result,
};

const USER_COLUMNS: &str = "id, username, hashed_password, created";

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: id_at(row, 0)?,
        username: row.get(1)?,
        hashed_password: row.get(2)?,
        created: ts_at(row, 3)?,
    })
}

fn db_load_user_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1 ORDER BY created LIMIT 1"),
        [username],
        map_user_row,
    )
    .optional()
}

/// Application-side uniqueness check for engines that do not enforce
/// `UNIQUE`. `except` skips the row being renamed.
fn db_username_taken(
    conn: &Connection,
    username: &str,
    except: Option<&Uuid>,
) -> rusqlite::Result<bool> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE username = ?1 AND id IS NOT ?2 LIMIT 1",
            params![username, except.map(encode_id)],
            |row| row.get(0),
        )
        .optional()?;
    Ok(existing.is_some())
}

fn db_insert_user(conn: &Connection, dialect: Dialect, new: &NewUser) -> rusqlite::Result<User> {
    let id = Uuid::new_v4();
    let created = now();
    let insert = "INSERT INTO users (id, username, hashed_password, created) VALUES (?1, ?2, ?3, ?4)";
    let id_text = encode_id(&id);
    let created_text = encode_ts(&created);
    let values = params![id_text, new.username, new.hashed_password, created_text];

    if dialect.supports_returning {
        return conn.query_row(
            &format!("{insert} RETURNING {USER_COLUMNS}"),
            values,
            map_user_row,
        );
    }

    conn.execute(insert, values)?;
    conn.query_row(
        &format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1 ORDER BY created DESC LIMIT 1"
        ),
        [&new.username],
        map_user_row,
    )
}

impl UserManager for SqliteStorage {
    fn create_user(&self, new: NewUser) -> Result<Option<User>> {
        let dialect = self.dialect;
        let result = self.with_tx(|tx| {
            if !dialect.enforces_unique && db_username_taken(tx, &new.username, None)? {
                log::warn!("User {} already exists", new.username);
                return Ok(None);
            }
            Ok(Some(db_insert_user(tx, dialect, &new)?))
        });

        match result {
            Err(err) if err.is_unique_violation() => {
                log::warn!("User {} already exists", new.username);
                Ok(None)
            }
            other => other,
        }
    }

    fn read_user(&self, id: Uuid) -> Result<Option<User>> {
        let user =
            self.with_conn(|conn| Ok(db_load_by_id(conn, "users", USER_COLUMNS, &id, map_user_row)?))?;
        Ok(user)
    }

    fn read_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self.with_conn(|conn| Ok(db_load_user_by_username(conn, username)?))?;
        Ok(user)
    }

    fn list_users(&self, page: Page) -> Result<Vec<User>> {
        let users = self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY created, id LIMIT ?1 OFFSET ?2"
                ),
                params![page.limit(), page.offset()],
                map_user_row,
            )?)
        })?;
        Ok(users)
    }

    fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>> {
        let dialect = self.dialect;
        let result = self.with_tx(|tx| {
            if db_load_by_id(tx, "users", "id", &id, |row| row.get::<_, String>(0))?.is_none() {
                return Ok(None);
            }
            if let Some(username) = &update.username {
                if !dialect.enforces_unique && db_username_taken(tx, username, Some(&id))? {
                    log::warn!("User {} already exists", username);
                    return Ok(None);
                }
            }

            let mut set = Assignments::new();
            set.set("username", update.username.clone())
                .set("hashed_password", update.hashed_password.clone());
            Ok(db_update_by_id(
                tx,
                dialect,
                "users",
                USER_COLUMNS,
                set,
                &id,
                map_user_row,
            )?)
        });

        match result {
            Err(err) if err.is_unique_violation() => {
                log::warn!(
                    "User {} already exists",
                    update.username.as_deref().unwrap_or_default()
                );
                Ok(None)
            }
            other => other,
        }
    }

    fn delete_user(&self, id: Uuid) -> Result<bool> {
        self.with_tx(|tx| Ok(db_delete_by_id(tx, "users", &id)?))
    }

    fn list_users_created_in_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<User>> {
        let users = self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE created >= ?1 AND created <= ?2 ORDER BY created, id"
                ),
                params![encode_lower_bound(&start), encode_ts(&end)],
                map_user_row,
            )?)
        })?;
        Ok(users)
    }

    fn count_users(&self) -> Result<u64> {
        self.with_conn(|conn| Ok(db_count(conn, "SELECT COUNT(*) FROM users", [])?))
    }
}
