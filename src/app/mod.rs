mod wiring;

use crate::{actor::DatabaseActor, cli, context};
use anyhow::{Context as AnyhowContext, Result};

pub struct App {
    pub ctx: context::Context,
    pub db: DatabaseActor,
}

impl App {
    pub fn from_cli() -> Result<(Self, cli::Cli)> {
        let cli = crate::cli::parse();
        let ctx = context::Context::from_cli(&cli).context("parsing --database-url")?;

        crate::tracing::init(ctx.log_file.as_deref());
        log::info!("🚀 Starting litepolis-db");
        log::info!("🗄️ Dialect: {}", ctx.config.database_url.dialect);
        if let Some(path) = ctx.log_file.as_deref() {
            log::info!("📝 Log file: {}", path.display());
        }

        let db = wiring::init_storage(&ctx)?;
        Ok((Self { ctx, db }, cli))
    }
}

pub fn run() -> Result<()> {
    let (app, cli) = App::from_cli()?;
    cli.cmd.run(&app.db)
}
