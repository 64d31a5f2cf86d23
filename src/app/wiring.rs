use anyhow::{Context, Result};

use crate::{actor::DatabaseActor, context, storage};

pub fn init_storage(ctx: &context::Context) -> Result<DatabaseActor> {
    let url = &ctx.config.database_url;
    if ctx.reset {
        log::info!("🧨 Resetting {}", url.path.display());
        storage::SqliteStorage::from_url(url)
            .reset_all()
            .context("resetting storage")?;
    }
    DatabaseActor::connect(&ctx.config).context("initializing storage")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{Configuration, DatabaseUrl};
    use crate::model::NewUser;
    use crate::storage::{Dialect, UserManager};

    fn ctx(path: std::path::PathBuf, reset: bool) -> context::Context {
        context::Context {
            config: Configuration::new(DatabaseUrl {
                path,
                dialect: Dialect::SQLITE,
            }),
            log_file: None,
            reset,
        }
    }

    #[test]
    fn reset_starts_from_an_empty_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("wiring.db");

        let db = init_storage(&ctx(path.clone(), false)).unwrap();
        db.create_user(NewUser::new("keep_me", "hash")).unwrap();

        let db = init_storage(&ctx(path.clone(), false)).unwrap();
        assert_eq!(db.count_users().unwrap(), 1);

        let db = init_storage(&ctx(path, true)).unwrap();
        assert_eq!(db.count_users().unwrap(), 0);
    }
}
