use std::path::PathBuf;

use crate::configuration::{Configuration, DatabaseUrl};

/// Everything a run needs, resolved from the command line.
#[derive(Clone, Debug)]
pub struct Context {
    pub config: Configuration,
    pub log_file: Option<PathBuf>,
    pub reset: bool,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> crate::Result<Self> {
        let database_url: DatabaseUrl = cli.database_url.parse()?;
        Ok(Self {
            config: Configuration::new(database_url),
            log_file: cli.log_file.as_ref().map(PathBuf::from),
            reset: cli.reset,
        })
    }
}
