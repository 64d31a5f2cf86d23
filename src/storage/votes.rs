use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{
    codec::{encode_id, encode_ts, id_at, now, ts_at},
    rows::{db_count, db_delete_by_id, db_load_by_id, db_query_all, db_update_by_id},
    Dialect, SqliteStorage, VoteManager,
};
use crate::{
    model::{NewVote, Vote, VoteUpdate},
    query::{Assignments, Page},
    Result,
};

const VOTE_COLUMNS: &str = "id, user_id, comment_id, value, created, modified";

fn map_vote_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vote> {
    Ok(Vote {
        id: id_at(row, 0)?,
        user_id: id_at(row, 1)?,
        comment_id: id_at(row, 2)?,
        value: row.get(3)?,
        created: ts_at(row, 4)?,
        modified: ts_at(row, 5)?,
    })
}

fn db_load_vote_by_user_comment(
    conn: &Connection,
    user_id: &str,
    comment_id: &str,
) -> rusqlite::Result<Option<Vote>> {
    conn.query_row(
        &format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE user_id = ?1 AND comment_id = ?2 \
             ORDER BY created DESC, id DESC LIMIT 1"
        ),
        [user_id, comment_id],
        map_vote_row,
    )
    .optional()
}

fn db_insert_vote(conn: &Connection, dialect: Dialect, new: &NewVote) -> rusqlite::Result<Vote> {
    let id_text = encode_id(&Uuid::new_v4());
    let created_text = encode_ts(&now());
    let user_text = encode_id(&new.user_id);
    let comment_text = encode_id(&new.comment_id);
    let insert = "INSERT INTO votes (id, user_id, comment_id, value, created, modified) \
                  VALUES (?1, ?2, ?3, ?4, ?5, ?5)";
    let values = params![id_text, user_text, comment_text, new.value, created_text];

    if dialect.supports_returning {
        return conn.query_row(
            &format!("{insert} RETURNING {VOTE_COLUMNS}"),
            values,
            map_vote_row,
        );
    }

    conn.execute(insert, values)?;
    db_load_vote_by_user_comment(conn, &user_text, &comment_text)?
        .ok_or(rusqlite::Error::QueryReturnedNoRows)
}

impl VoteManager for SqliteStorage {
    fn create_vote(&self, new: NewVote) -> Result<Vote> {
        let dialect = self.dialect;
        self.with_tx(|tx| Ok(db_insert_vote(tx, dialect, &new)?))
    }

    fn read_vote(&self, id: Uuid) -> Result<Option<Vote>> {
        self.with_conn(|conn| Ok(db_load_by_id(conn, "votes", VOTE_COLUMNS, &id, map_vote_row)?))
    }

    fn read_vote_by_user_comment(&self, user_id: Uuid, comment_id: Uuid) -> Result<Option<Vote>> {
        self.with_conn(|conn| {
            Ok(db_load_vote_by_user_comment(
                conn,
                &encode_id(&user_id),
                &encode_id(&comment_id),
            )?)
        })
    }

    fn list_votes_by_comment_id(&self, comment_id: Uuid, page: Page) -> Result<Vec<Vote>> {
        self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {VOTE_COLUMNS} FROM votes WHERE comment_id = ?1 \
                     ORDER BY created, id LIMIT ?2 OFFSET ?3"
                ),
                params![encode_id(&comment_id), page.limit(), page.offset()],
                map_vote_row,
            )?)
        })
    }

    fn list_votes_by_user_id(&self, user_id: Uuid, page: Page) -> Result<Vec<Vote>> {
        self.with_conn(|conn| {
            Ok(db_query_all(
                conn,
                &format!(
                    "SELECT {VOTE_COLUMNS} FROM votes WHERE user_id = ?1 \
                     ORDER BY created, id LIMIT ?2 OFFSET ?3"
                ),
                params![encode_id(&user_id), page.limit(), page.offset()],
                map_vote_row,
            )?)
        })
    }

    fn update_vote(&self, id: Uuid, update: VoteUpdate) -> Result<Option<Vote>> {
        let dialect = self.dialect;
        self.with_tx(|tx| {
            let mut set = Assignments::new();
            set.set("value", update.value)
                .set("modified", Some(encode_ts(&now())));
            Ok(db_update_by_id(
                tx,
                dialect,
                "votes",
                VOTE_COLUMNS,
                set,
                &id,
                map_vote_row,
            )?)
        })
    }

    fn delete_vote(&self, id: Uuid) -> Result<bool> {
        self.with_tx(|tx| Ok(db_delete_by_id(tx, "votes", &id)?))
    }

    fn count_votes_for_comment(&self, comment_id: Uuid) -> Result<u64> {
        self.with_conn(|conn| {
            Ok(db_count(
                conn,
                "SELECT COUNT(*) FROM votes WHERE comment_id = ?1",
                [encode_id(&comment_id)],
            )?)
        })
    }

    fn vote_value_distribution(&self, comment_id: Uuid) -> Result<BTreeMap<i64, u64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT value, COUNT(*) FROM votes WHERE comment_id = ?1 GROUP BY value",
            )?;
            let rows = stmt.query_map([encode_id(&comment_id)], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })?;

            let mut distribution = BTreeMap::new();
            for row in rows {
                let (value, count) = row?;
                distribution.insert(value, count.max(0) as u64);
            }
            Ok(distribution)
        })
    }
}
