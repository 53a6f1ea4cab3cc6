//! rTimeclock library root.
//! Exposes the CLI parser, the high-level run() function, and internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli, cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::User { action } => cli::commands::user::handle(action, cfg),
        Commands::Company { action } => cli::commands::company::handle(action, cfg),
        Commands::Dept { action } => cli::commands::dept::handle(action, cfg),
        Commands::Clock { .. } => cli::commands::clock::handle(&cli.command, cfg),
        Commands::Status { .. } => cli::commands::status::handle(&cli.command, cfg),
        Commands::Report { .. } => cli::commands::report::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;

    // command-line overrides win over the configuration file
    if let Some(custom_db) = &cli.db {
        cfg.database = Config::resolve_db_path(custom_db);
    }
    if let Some(user) = &cli.user {
        cfg.user = Some(user.clone());
    }

    dispatch(&cli, &cfg)
}
