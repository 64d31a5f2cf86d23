use std::{fmt, str::FromStr};

/// Capabilities of the SQL engine behind a connection string.
///
/// Managers branch on these flags instead of on engine names: an engine
/// without `RETURNING` gets its freshly written rows re-queried, an engine
/// without atomic `UNIQUE` enforcement gets its usernames checked in
/// application code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    pub supports_returning: bool,
    pub enforces_unique: bool,
}

impl Dialect {
    pub const SQLITE: Dialect = Dialect {
        name: "sqlite",
        supports_returning: true,
        enforces_unique: true,
    };

    pub const STARROCKS: Dialect = Dialect {
        name: "starrocks",
        supports_returning: false,
        enforces_unique: false,
    };
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::SQLITE
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDialect(pub String);

impl fmt::Display for UnknownDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown dialect '{}' (expected sqlite or starrocks)", self.0)
    }
}

impl std::error::Error for UnknownDialect {}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Dialect::SQLITE),
            "starrocks" => Ok(Dialect::STARROCKS),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}
