//! Statement shapes shared by every table: fetch by id, partial update with
//! or without `RETURNING`, delete by id, count.

use rusqlite::{params_from_iter, types::Value, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{codec::encode_id, Dialect};
use crate::query::Assignments;

pub(super) type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

pub(super) fn db_load_by_id<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    id: &Uuid,
    map: RowMapper<T>,
) -> rusqlite::Result<Option<T>> {
    conn.query_row(
        &format!("SELECT {columns} FROM {table} WHERE id = ?1"),
        [encode_id(id)],
        map,
    )
    .optional()
}

/// Applies `set` to the row and returns it as stored. Engines without
/// `RETURNING` get the row re-read by id after the write.
pub(super) fn db_update_by_id<T>(
    conn: &Connection,
    dialect: Dialect,
    table: &str,
    columns: &str,
    set: Assignments,
    id: &Uuid,
    map: RowMapper<T>,
) -> rusqlite::Result<Option<T>> {
    if set.is_empty() {
        return db_load_by_id(conn, table, columns, id, map);
    }

    let sql = set.update_sql(table);
    let params = set.into_params(Value::Text(encode_id(id)));

    if dialect.supports_returning {
        return conn
            .query_row(
                &format!("{sql} RETURNING {columns}"),
                params_from_iter(params.iter()),
                map,
            )
            .optional();
    }

    let updated = conn.execute(&sql, params_from_iter(params.iter()))?;
    if updated == 0 {
        return Ok(None);
    }
    db_load_by_id(conn, table, columns, id, map)
}

pub(super) fn db_delete_by_id(conn: &Connection, table: &str, id: &Uuid) -> rusqlite::Result<bool> {
    let deleted = conn.execute(
        &format!("DELETE FROM {table} WHERE id = ?1"),
        [encode_id(id)],
    )?;
    Ok(deleted > 0)
}

pub(super) fn db_count<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> rusqlite::Result<u64> {
    let n: i64 = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(n.max(0) as u64)
}

pub(super) fn db_query_all<T, P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: RowMapper<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
