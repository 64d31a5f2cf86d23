use std::{env, fmt, path::PathBuf, str::FromStr};

use url::Url;

use crate::{storage::Dialect, Error};

/// Configuration section this crate reads from the host.
pub const CONFIG_SECTION: &str = "litepolis";

pub const DEFAULT_DATABASE_URL: &str = "sqlite:///database.db";

/// Parsed `sqlite:///path.db[?dialect=...]` connection string.
///
/// Follows the SQLAlchemy slash convention: three slashes introduce a
/// relative path, four an absolute one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseUrl {
    pub path: PathBuf,
    pub dialect: Dialect,
}

impl FromStr for DatabaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|e| Error::Config(format!("invalid database url {s}: {e}")))?;
        if url.scheme() != "sqlite" {
            return Err(Error::Config(format!(
                "unsupported database scheme '{}' (expected sqlite)",
                url.scheme()
            )));
        }
        if url.host_str().is_some_and(|h| !h.is_empty()) {
            return Err(Error::Config(format!(
                "database url {s} has a host; use sqlite:///relative.db or sqlite:////absolute.db"
            )));
        }

        let path = url.path().strip_prefix('/').unwrap_or(url.path());
        if path.is_empty() {
            return Err(Error::Config(format!("database url {s} has no path")));
        }
        if path == ":memory:" {
            return Err(Error::Config(
                "in-memory databases are not supported: every call opens a new connection".into(),
            ));
        }

        let mut dialect = Dialect::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "dialect" => {
                    dialect = value
                        .parse()
                        .map_err(|e: crate::storage::UnknownDialect| Error::Config(e.to_string()))?
                }
                other => log::warn!("ignoring unknown database url parameter '{}'", other),
            }
        }

        Ok(DatabaseUrl {
            path: PathBuf::from(path),
            dialect,
        })
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sqlite:///{}", self.path.display())?;
        if self.dialect != Dialect::default() {
            write!(f, "?dialect={}", self.dialect)?;
        }
        Ok(())
    }
}

/// Where the host application keeps plugin configuration.
pub trait ConfigSource {
    fn get(&self, section: &str, key: &str) -> Option<String>;
}

/// Reads `<SECTION>_<KEY>` from the process environment, after loading the
/// `.env` file named by `DOTENV_PATH` (default `.env`).
#[derive(Clone, Debug, Default)]
pub struct EnvSource;

impl EnvSource {
    pub fn load() -> Self {
        let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
        if dotenvy::from_filename(&dotenv_path).is_ok() {
            log::debug!("Loaded env from {}", dotenv_path);
        }
        EnvSource
    }

    pub fn var_name(section: &str, key: &str) -> String {
        format!("{section}_{key}").to_ascii_uppercase()
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        env::var(Self::var_name(section, key))
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

#[derive(Clone, Debug)]
pub struct Configuration {
    pub database_url: DatabaseUrl,
}

impl Configuration {
    pub fn new(database_url: DatabaseUrl) -> Self {
        Self { database_url }
    }

    /// Reads `database_url` from `source`, falling back to the local
    /// embedded database.
    pub fn from_source<S: ConfigSource + ?Sized>(source: &S) -> Result<Self, Error> {
        let raw = source
            .get(CONFIG_SECTION, "database_url")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        Ok(Self::new(raw.parse()?))
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::from_source(&EnvSource::load())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            database_url: DatabaseUrl {
                path: PathBuf::from("database.db"),
                dialect: Dialect::default(),
            },
        }
    }
}
