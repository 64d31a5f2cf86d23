use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};
use uuid::Uuid;

use super::{
    codec::{
        encode_id, encode_lower_bound, encode_opt_id, encode_ts, id_at, now, opt_id_at,
        placeholders, ts_at,
    },
    rows::{db_count, db_delete_by_id, db_load_by_id, db_query_all, db_update_by_id},
    CommentManager, Dialect, SqliteStorage,
};
use crate::{
    model::{Comment, CommentUpdate, NewComment},
    query::{like_pattern, Assignments, CommentSortField, Page, Sort},
    Result,
};

const COMMENT_COLUMNS: &str =
    "id, content, user_id, conversation_id, parent_comment_id, approved, created, modified";

fn map_comment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: id_at(row, 0)?,
        content: row.get(1)?,
        user_id: opt_id_at(row, 2)?,
        conversation_id: opt_id_at(row, 3)?,
        parent_comment_id: opt_id_at(row, 4)?,
        approved: row.get(5)?,
        created: ts_at(row, 6)?,
        modified: ts_at(row, 7)?,
    })
}

fn db_insert_comment(
    conn: &Connection,
    dialect: Dialect,
    new: &NewComment,
) -> rusqlite::Result<Comment> {
    let id_text = encode_id(&Uuid::new_v4());
    let created_text = encode_ts(&now());
    let user_text = encode_opt_id(new.user_id.as_ref());
    let conversation_text = encode_opt_id(new.conversation_id.as_ref());
    let parent_text = encode_opt_id(new.parent_comment_id.as_ref());
    let insert = "INSERT INTO comments \
        (id, content, user_id, conversation_id, parent_comment_id, approved, created, modified) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)";
    let values = params![
        id_text,
        new.content,
        user_text,
        conversation_text,
        parent_text,
        new.approved,
        created_text
    ];

    if dialect.supports_returning {
        return conn.query_row(
            &format!("{insert} RETURNING {COMMENT_COLUMNS}"),
            values,
            map_comment_row,
        );
    }

    conn.execute(insert, values)?;
    conn.query_row(
        &format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE content = ?1 AND user_id IS ?2 AND conversation_id IS ?3 \
             ORDER BY created DESC LIMIT 1"
        ),
        params![new.content, user_text, conversation_text],
        map_comment_row,
    )
}

impl CommentManager for SqliteStorage {
    fn create_comment(&self, new: NewComment) -> Result<Comment> {
        let dialect = self.dialect;
        self.with_tx(|tx| Ok(db_insert_comment(tx, dialect, &new)?))
    }

    fn read_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        self.with_conn(|conn| {
            Ok(db_load_by_id(
                conn,
                "comments",
                COMMENT_COLUMNS,
                &id,
                map_comment_row,
            )?)
        })
    }

    fn read_next_unvoted_approved_comment(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        voted_comment_ids: &[Uuid],
    ) -> Result<Option<Comment>> {
        let mut sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE conversation_id = ?1 AND approved = 1 \
             AND user_id IS NOT NULL AND user_id <> ?2"
        );
        if !voted_comment_ids.is_empty() {
            sql.push_str(&format!(
                " AND id NOT IN ({})",
                placeholders(3, voted_comment_ids.len())
            ));
        }
        sql.push_str(" ORDER BY created, id LIMIT 1");

        let mut values = vec![
            Value::Text(encode_id(&conversation_id)),
            Value::Text(encode_id(&user_id)),
        ];
        values.extend(voted_comment_ids.iter().map(|id| Value::Text(encode_id(id))));

        self.with_conn(|conn| {
            Ok(conn
                .query_row(&sql, params_from_iter(values.iter()), map_comment_row)
                .optional()?)
        })
    }

    fn list_comments_by_conversation_id(
        &self,
        conversation_id: Uuid,
        page: Page,
        sort: Sort<CommentSortField>,
    ) -> Result<Vec<Comment>> {
        self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {COMMENT_COLUMNS} FROM comments WHERE conversation_id = ?1 \
                     ORDER BY {} LIMIT ?2 OFFSET ?3",
                    sort.order_clause()
                ),
                params![encode_id(&conversation_id), page.limit(), page.offset()],
                map_comment_row,
            )?)
        })
    }

    fn list_comments_by_user_id(&self, user_id: Uuid, page: Page) -> Result<Vec<Comment>> {
        self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {COMMENT_COLUMNS} FROM comments WHERE user_id = ?1 \
                     ORDER BY created, id LIMIT ?2 OFFSET ?3"
                ),
                params![encode_id(&user_id), page.limit(), page.offset()],
                map_comment_row,
            )?)
        })
    }

    fn list_comments_created_in_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Comment>> {
        self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {COMMENT_COLUMNS} FROM comments \
                     WHERE created >= ?1 AND created <= ?2 ORDER BY created, id"
                ),
                params![encode_lower_bound(&start), encode_ts(&end)],
                map_comment_row,
            )?)
        })
    }

    fn search_comments(&self, query: &str) -> Result<Vec<Comment>> {
        self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {COMMENT_COLUMNS} FROM comments \
                     WHERE content LIKE ?1 ESCAPE '\\' ORDER BY created, id"
                ),
                [like_pattern(query)],
                map_comment_row,
            )?)
        })
    }

    fn update_comment(&self, id: Uuid, update: CommentUpdate) -> Result<Option<Comment>> {
        let dialect = self.dialect;
        self.with_tx(|tx| {
            let mut set = Assignments::new();
            set.set("content", update.content)
                .set("approved", update.approved)
                .set("conversation_id", update.conversation_id.as_ref().map(encode_id))
                .set("parent_comment_id", update.parent_comment_id.as_ref().map(encode_id))
                .set("modified", Some(encode_ts(&now())));
            Ok(db_update_by_id(
                tx,
                dialect,
                "comments",
                COMMENT_COLUMNS,
                set,
                &id,
                map_comment_row,
            )?)
        })
    }

    fn delete_comment(&self, id: Uuid) -> Result<bool> {
        self.with_tx(|tx| Ok(db_delete_by_id(tx, "comments", &id)?))
    }

    fn count_comments_in_conversation(&self, conversation_id: Uuid) -> Result<u64> {
        self.with_conn(|conn| {
            Ok(db_count(
                conn,
                "SELECT COUNT(*) FROM comments WHERE conversation_id = ?1",
                [encode_id(&conversation_id)],
            )?)
        })
    }
}
