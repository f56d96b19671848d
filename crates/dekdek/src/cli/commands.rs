//! # CLI Layer
//!
//! The only place that knows about the terminal, the process and the async runtime.
//!
//! 1. **Argument Parsing**: clap, in `setup.rs`
//! 2. **Configuration**: [`AppConfig::load`], then command-line overrides
//! 3. **Dispatch**: `serve` (also the default), `init`, `config`
//! 4. **Errors**: everything is collected into `anyhow` and reported by `main`

use super::setup::{Cli, Commands, ConfigCommands};
use anyhow::{Context, Result};
use clap::Parser;
use dekdek::http::{self, AppContext};
use dekdek::logging;
use dekdekapp::config::{default_config_path, AppConfig};
use dekdekapp::init::initialize;
use dekdekapp::model::{Book, Quote};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve { bind: None });

    match command {
        Commands::Config { action } => handle_config(action),
        Commands::Init => handle_init(cli.config.as_deref()),
        Commands::Serve { bind } => handle_serve(cli.config.as_deref(), bind),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = AppConfig::load(path).context("could not load configuration")?;
    logging::init(&config.log_filter);
    Ok(config)
}

fn handle_config(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Gen => print!("{}", AppConfig::template()),
        ConfigCommands::Path => match default_config_path() {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("no configuration directory on this platform"),
        },
    }
    Ok(())
}

fn handle_init(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let api = initialize(&config).context("initialization failed")?;

    let (users, admins) = api.db().count_users()?;
    println!("data:     {}", config.data_dir.display());
    println!("database: {}", config.database_path.display());
    println!("uploads:  {}", config.upload_dir.display());
    println!(
        "{} books, {} quotes, {} users ({} admin)",
        api.list::<Book>().len(),
        api.list::<Quote>().len(),
        users,
        admins
    );
    Ok(())
}

fn handle_serve(config_path: Option<&Path>, bind: Option<String>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = bind {
        config.bind = bind;
    }

    let api = initialize(&config).context("initialization failed")?;
    let bind = config.bind.clone();
    let ctx = Arc::new(AppContext::new(api, config));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("could not start the async runtime")?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind)
            .await
            .with_context(|| format!("could not bind {}", bind))?;
        http::serve(ctx, listener).await?;
        info!("server stopped");
        Ok::<(), anyhow::Error>(())
    })
}
