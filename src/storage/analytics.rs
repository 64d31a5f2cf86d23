//! Per-user results of the conversation analysis: cluster assignment and
//! 2-D projection. Rows are append-only; the latest row for a
//! (user, conversation) pair is the current one.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{
    codec::{encode_id, encode_ts, id_at, now, ts_at},
    rows::{db_delete_by_id, db_load_by_id, db_query_all, RowMapper},
    Dialect, SqliteStorage, UserClusterManager, UserPcaManager,
};
use crate::{
    model::{NewUserCluster, NewUserPca, UserCluster, UserPca},
    Result,
};

const CLUSTER_COLUMNS: &str = "id, user_id, conversation_id, cluster, created";
const PCA_COLUMNS: &str = "id, user_id, conversation_id, x, y, created";

fn map_cluster_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserCluster> {
    Ok(UserCluster {
        id: id_at(row, 0)?,
        user_id: id_at(row, 1)?,
        conversation_id: id_at(row, 2)?,
        cluster: row.get(3)?,
        created: ts_at(row, 4)?,
    })
}

fn map_pca_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserPca> {
    Ok(UserPca {
        id: id_at(row, 0)?,
        user_id: id_at(row, 1)?,
        conversation_id: id_at(row, 2)?,
        x: row.get(3)?,
        y: row.get(4)?,
        created: ts_at(row, 5)?,
    })
}

fn db_load_latest<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    user_id: &str,
    conversation_id: &str,
    map: RowMapper<T>,
) -> rusqlite::Result<Option<T>> {
    conn.query_row(
        &format!(
            "SELECT {columns} FROM {table} WHERE user_id = ?1 AND conversation_id = ?2 \
             ORDER BY created DESC, id DESC LIMIT 1"
        ),
        [user_id, conversation_id],
        map,
    )
    .optional()
}

fn db_list_by_conversation<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    conversation_id: &Uuid,
    map: RowMapper<T>,
) -> rusqlite::Result<Vec<T>> {
    db_query_all(
        conn,
        &format!(
            "SELECT {columns} FROM {table} WHERE conversation_id = ?1 ORDER BY created, id"
        ),
        [encode_id(conversation_id)],
        map,
    )
}

fn db_insert_cluster(
    conn: &Connection,
    dialect: Dialect,
    new: &NewUserCluster,
) -> rusqlite::Result<UserCluster> {
    let id_text = encode_id(&Uuid::new_v4());
    let created_text = encode_ts(&now());
    let user_text = encode_id(&new.user_id);
    let conversation_text = encode_id(&new.conversation_id);
    let insert = "INSERT INTO user_cluster (id, user_id, conversation_id, cluster, created) \
                  VALUES (?1, ?2, ?3, ?4, ?5)";
    let values = params![id_text, user_text, conversation_text, new.cluster, created_text];

    if dialect.supports_returning {
        return conn.query_row(
            &format!("{insert} RETURNING {CLUSTER_COLUMNS}"),
            values,
            map_cluster_row,
        );
    }

    conn.execute(insert, values)?;
    db_load_latest(
        conn,
        "user_cluster",
        CLUSTER_COLUMNS,
        &user_text,
        &conversation_text,
        map_cluster_row,
    )?
    .ok_or(rusqlite::Error::QueryReturnedNoRows)
}

fn db_insert_pca(conn: &Connection, dialect: Dialect, new: &NewUserPca) -> rusqlite::Result<UserPca> {
    let id_text = encode_id(&Uuid::new_v4());
    let created_text = encode_ts(&now());
    let user_text = encode_id(&new.user_id);
    let conversation_text = encode_id(&new.conversation_id);
    let insert = "INSERT INTO user_pca (id, user_id, conversation_id, x, y, created) \
                  VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
    let values = params![id_text, user_text, conversation_text, new.x, new.y, created_text];

    if dialect.supports_returning {
        return conn.query_row(
            &format!("{insert} RETURNING {PCA_COLUMNS}"),
            values,
            map_pca_row,
        );
    }

    conn.execute(insert, values)?;
    db_load_latest(
        conn,
        "user_pca",
        PCA_COLUMNS,
        &user_text,
        &conversation_text,
        map_pca_row,
    )?
    .ok_or(rusqlite::Error::QueryReturnedNoRows)
}

impl UserClusterManager for SqliteStorage {
    fn create_user_cluster(&self, new: NewUserCluster) -> Result<UserCluster> {
        let dialect = self.dialect;
        self.with_tx(|tx| Ok(db_insert_cluster(tx, dialect, &new)?))
    }

    fn read_user_cluster(&self, id: Uuid) -> Result<Option<UserCluster>> {
        self.with_conn(|conn| {
            Ok(db_load_by_id(
                conn,
                "user_cluster",
                CLUSTER_COLUMNS,
                &id,
                map_cluster_row,
            )?)
        })
    }

    fn read_user_cluster_by_user_and_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<UserCluster>> {
        self.with_conn(|conn| {
            Ok(db_load_latest(
                conn,
                "user_cluster",
                CLUSTER_COLUMNS,
                &encode_id(&user_id),
                &encode_id(&conversation_id),
                map_cluster_row,
            )?)
        })
    }

    fn list_user_clusters_by_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<UserCluster>> {
        self.with_conn(|conn| {
            Ok(db_list_by_conversation(
                conn,
                "user_cluster",
                CLUSTER_COLUMNS,
                &conversation_id,
                map_cluster_row,
            )?)
        })
    }

    fn delete_user_cluster(&self, id: Uuid) -> Result<bool> {
        self.with_tx(|tx| Ok(db_delete_by_id(tx, "user_cluster", &id)?))
    }
}

impl UserPcaManager for SqliteStorage {
    fn create_user_pca(&self, new: NewUserPca) -> Result<UserPca> {
        let dialect = self.dialect;
        self.with_tx(|tx| Ok(db_insert_pca(tx, dialect, &new)?))
    }

    fn read_user_pca(&self, id: Uuid) -> Result<Option<UserPca>> {
        self.with_conn(|conn| Ok(db_load_by_id(conn, "user_pca", PCA_COLUMNS, &id, map_pca_row)?))
    }

    fn read_user_pca_by_user_and_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<UserPca>> {
        self.with_conn(|conn| {
            Ok(db_load_latest(
                conn,
                "user_pca",
                PCA_COLUMNS,
                &encode_id(&user_id),
                &encode_id(&conversation_id),
                map_pca_row,
            )?)
        })
    }

    fn list_user_pcas_by_conversation(&self, conversation_id: Uuid) -> Result<Vec<UserPca>> {
        self.with_conn(|conn| {
            Ok(db_list_by_conversation(
                conn,
                "user_pca",
                PCA_COLUMNS,
                &conversation_id,
                map_pca_row,
            )?)
        })
    }

    fn delete_user_pca(&self, id: Uuid) -> Result<bool> {
        self.with_tx(|tx| Ok(db_delete_by_id(tx, "user_pca", &id)?))
    }
}
