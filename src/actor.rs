use std::ops::Deref;
use std::sync::Arc;

use crate::{
    configuration::Configuration,
    storage::{Database, SqliteStorage},
    Result,
};

/// Shared handle to every manager. Cheap to clone; each call opens and
/// releases its own connection, so clones can be used from any thread.
#[derive(Clone)]
pub struct DatabaseActor {
    inner: Arc<dyn Database + Send + Sync>,
}

impl DatabaseActor {
    /// Opens the configured database, creating the tables if absent.
    pub fn connect(config: &Configuration) -> Result<Self> {
        let storage = SqliteStorage::from_url(&config.database_url);
        storage.init()?;
        log::info!(
            "📂 Database: {} ({})",
            config.database_url.path.display(),
            storage.dialect
        );
        Ok(Self::new(storage))
    }

    pub fn new<D>(storage: D) -> Self
    where
        D: Database + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(storage),
        }
    }
}

impl Deref for DatabaseActor {
    type Target = dyn Database + Send + Sync;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for DatabaseActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseActor").finish_non_exhaustive()
    }
}
