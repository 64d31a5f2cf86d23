use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{
    codec::{
        encode_id, encode_lower_bound, encode_opt_id, encode_ts, id_at, now, opt_id_at, ts_at,
    },
    rows::{db_count, db_delete_by_id, db_load_by_id, db_query_all, db_update_by_id},
    ConversationManager, Dialect, SqliteStorage,
};
use crate::{
    model::{Conversation, ConversationUpdate, NewConversation},
    query::{Assignments, ConversationSortField, Page, Sort},
    Error, Result,
};

const CONVERSATION_COLUMNS: &str =
    "id, title, description, author_id, display_unmoderated, is_archived, created, modified";

fn map_conversation_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: id_at(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        author_id: opt_id_at(row, 3)?,
        display_unmoderated: row.get(4)?,
        is_archived: row.get(5)?,
        created: ts_at(row, 6)?,
        modified: ts_at(row, 7)?,
    })
}

fn db_insert_conversation(
    conn: &Connection,
    dialect: Dialect,
    new: &NewConversation,
) -> rusqlite::Result<Conversation> {
    let id_text = encode_id(&Uuid::new_v4());
    let created_text = encode_ts(&now());
    let author_text = encode_opt_id(new.author_id.as_ref());
    let insert = "INSERT INTO conversations \
        (id, title, description, author_id, display_unmoderated, is_archived, created, modified) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)";
    let values = params![
        id_text,
        new.title,
        new.description,
        author_text,
        new.display_unmoderated,
        new.is_archived,
        created_text
    ];

    if dialect.supports_returning {
        return conn.query_row(
            &format!("{insert} RETURNING {CONVERSATION_COLUMNS}"),
            values,
            map_conversation_row,
        );
    }

    conn.execute(insert, values)?;
    conn.query_row(
        &format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE title = ?1 AND description IS ?2 AND author_id IS ?3 \
             ORDER BY created DESC LIMIT 1"
        ),
        params![new.title, new.description, author_text],
        map_conversation_row,
    )
}

impl ConversationManager for SqliteStorage {
    fn create_conversation(&self, new: NewConversation) -> Result<Conversation> {
        let dialect = self.dialect;
        let conversation = self.with_tx(|tx| Ok(db_insert_conversation(tx, dialect, &new)?))?;
        tracing::debug!(id = %conversation.id, "conversation created");
        Ok(conversation)
    }

    fn read_conversation(&self, id: Uuid) -> Result<Option<Conversation>> {
        self.with_conn(|conn| {
            Ok(db_load_by_id(
                conn,
                "conversations",
                CONVERSATION_COLUMNS,
                &id,
                map_conversation_row,
            )?)
        })
    }

    fn list_conversations(
        &self,
        page: Page,
        sort: Sort<ConversationSortField>,
    ) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations ORDER BY {} LIMIT ?1 OFFSET ?2",
                    sort.order_clause()
                ),
                params![page.limit(), page.offset()],
                map_conversation_row,
            )?)
        })
    }

    fn list_conversations_by_author(
        &self,
        author_id: Uuid,
        page: Page,
    ) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE author_id = ?1 \
                     ORDER BY created DESC, id DESC LIMIT ?2 OFFSET ?3"
                ),
                params![encode_id(&author_id), page.limit(), page.offset()],
                map_conversation_row,
            )?)
        })
    }

    fn list_conversations_created_in_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations \
                     WHERE created >= ?1 AND created <= ?2 ORDER BY created, id"
                ),
                params![encode_lower_bound(&start), encode_ts(&end)],
                map_conversation_row,
            )?)
        })
    }

    fn update_conversation(
        &self,
        id: Uuid,
        current_user_id: Uuid,
        update: ConversationUpdate,
    ) -> Result<Conversation> {
        let dialect = self.dialect;
        self.with_tx(|tx| {
            let author = db_load_by_id(tx, "conversations", "author_id", &id, |row| {
                opt_id_at(row, 0)
            })?
            .ok_or(Error::ConversationNotFound(id))?;

            if author != Some(current_user_id) {
                log::warn!(
                    "User {} attempted to update conversation {} they do not own",
                    current_user_id,
                    id
                );
                return Err(Error::UnauthorizedConversationUpdate {
                    conversation_id: id,
                    user_id: current_user_id,
                });
            }

            let mut set = Assignments::new();
            set.set("title", update.title)
                .set("description", update.description)
                .set("author_id", update.author_id.as_ref().map(encode_id))
                .set("display_unmoderated", update.display_unmoderated)
                .set("is_archived", update.is_archived)
                .set("modified", Some(encode_ts(&now())));

            db_update_by_id(
                tx,
                dialect,
                "conversations",
                CONVERSATION_COLUMNS,
                set,
                &id,
                map_conversation_row,
            )?
            .ok_or(Error::ConversationNotFound(id))
        })
    }

    fn delete_conversation(&self, id: Uuid) -> Result<bool> {
        self.with_tx(|tx| Ok(db_delete_by_id(tx, "conversations", &id)?))
    }

    fn count_conversations(&self) -> Result<u64> {
        self.with_conn(|conn| Ok(db_count(conn, "SELECT COUNT(*) FROM conversations", [])?))
    }
}
