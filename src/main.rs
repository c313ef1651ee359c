mod cli;
mod config;
mod db;
mod models;
mod trend;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;
use db::repository::{MetaRepo, SETUP_DONE_KEY};
use db::SessionToken;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    run_migrations(&conn)?;

    match cli.command {
        // Account commands work without a session
        Some(Commands::Register { username, password }) => {
            handlers::handle_register(&conn, &username, password.as_deref())?;
        }
        Some(Commands::Login { username, password }) => {
            handlers::handle_login(&conn, &username, password.as_deref())?;
        }
        Some(Commands::Logout) => {
            handlers::handle_logout(&conn)?;
        }

        Some(Commands::Setup { reset }) => {
            let token = handlers::require_session(&conn)?;
            handlers::handle_setup(&conn, &config, &token, reset)?;
        }

        Some(cmd) => {
            let token = handlers::require_session(&conn)?;
            match cmd {
                Commands::Record { weight, date, unit } => {
                    handlers::handle_record(&conn, &token, weight, date.as_deref(), &unit)?;
                }
                Commands::Target { weight } => {
                    handlers::handle_target(&conn, &config, &token, weight)?;
                }
                Commands::Profile { action } => {
                    handlers::handle_profile(&conn, &token, &action)?;
                }
                Commands::Week { back } => {
                    handlers::handle_week(&conn, &config, &token, back)?;
                }
                Commands::Progress => {
                    handlers::handle_progress(&conn, &config, &token)?;
                }
                Commands::Export => {
                    handlers::handle_export(&conn, &config, &token)?;
                }
                Commands::Register { .. }
                | Commands::Login { .. }
                | Commands::Logout
                | Commands::Setup { .. } => unreachable!(),
            }
        }

        // No subcommand → launch TUI
        None => {
            let token = handlers::require_session(&conn)?;
            ensure_setup(&conn, &config, &token)?;
            tui::app::run(&conn, config, token)?;
        }
    }

    Ok(())
}

/// Run the profile wizard first if it has never been completed.
fn ensure_setup(conn: &Connection, config: &AppConfig, token: &SessionToken) -> Result<()> {
    let done = MetaRepo::get(conn, SETUP_DONE_KEY)?;
    if done.as_deref() != Some("1") {
        eprintln!("Profile not set up yet. Running setup...");
        eprintln!();
        handlers::handle_setup(conn, config, token, false)?;
    }
    Ok(())
}
