//! Backlog command-line front end
//!
//! ```bash
//! backlog login --username alice --password pw
//! backlog search "zelda"
//! backlog add 1942 playing
//! backlog logout
//! ```
//!
//! The session persists between invocations. When the backend rejects it and
//! it cannot be refreshed, the CLI asks the user to log in again.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use backlog_core::{Backlog, Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend URL, overrides the config file and BACKLOG_BACKEND_URL
    #[arg(long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "BACKLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and store the session
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
    },
    /// Close the session
    Logout,
    /// Show whether a session is stored
    Status,
    /// Show the current profile and backlog lists
    Whoami,
    /// Search the catalog
    Search { query: String },
    /// Show one game
    Game { id: i64 },
    /// List popular games
    Popular,
    /// List recently released games
    Latest,
    /// Put a game on one of your lists (wantToPlay, playing, played, completed, completed100)
    Add { game_id: i64, list: String },
    /// Take a game off all your lists
    Remove { game_id: i64 },
    /// Rate a game
    Review {
        game_id: i64,
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Change your email address
    Email { new_email: String },
    /// Change your password
    Password {
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    backlog_core::init_logging();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Config::default_path())?,
    }
    .with_env_overrides()
    .with_backend_override(args.backend.clone());

    let backlog = Backlog::new(config)?;
    let mut events = backlog.subscribe();

    let result = commands::run(&backlog, args.command).await;

    commands::report_session_events(&mut events);

    result
}
