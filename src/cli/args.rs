use clap::Parser;
use std::env;

use crate::cli::command::Command;
use crate::configuration::DEFAULT_DATABASE_URL;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Inspect and administer the LitePolis database",
    long_about = "Creates the LitePolis schema in an embedded SQLite database and runs one-shot administrative queries against it. Output is JSON on stdout; logs go to stderr.",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(
        long = "database-url",
        env = "LITEPOLIS_DATABASE_URL",
        default_value = DEFAULT_DATABASE_URL,
        value_name = "URL",
        help = "Database connection string, e.g. sqlite:///database.db or sqlite:////abs/path.db?dialect=starrocks"
    )]
    pub database_url: String,

    #[arg(
        long = "log-file",
        env = "LITEPOLIS_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Reset all persisted state (delete the SQLite database) before running"
    )]
    pub reset: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}
