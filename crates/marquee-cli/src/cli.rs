//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::{admin, catalog};

/// Browse and manage a movie catalog.
#[derive(Parser, Debug)]
#[command(name = "marquee")]
#[command(author, version = env!("MARQUEE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub gateway: GatewayArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which backend to talk to. Falls back to the one of the saved session.
#[derive(Args, Debug, Clone, Default)]
pub struct GatewayArgs {
    /// Gateway base URL (https://..., or file:///path for a local catalog)
    #[arg(long, env = "MARQUEE_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Public API key of a hosted gateway
    #[arg(long, env = "MARQUEE_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in as an administrator
    Login(admin::login::LoginArgs),

    /// Sign out
    Logout,

    /// Show the signed-in administrator
    Whoami,

    /// Create an administrator account (local gateway only)
    CreateUser(admin::create_user::CreateUserArgs),

    /// List catalog entries, newest first
    List(catalog::list::ListArgs),

    /// Show one entry (records a view)
    Show(catalog::show::ShowArgs),

    /// Print an entry's video URL (records a download)
    Download(catalog::download::DownloadArgs),

    /// Add an entry
    Add(admin::add::AddArgs),

    /// Edit an entry
    Edit(admin::edit::EditArgs),

    /// Delete an entry
    Delete(admin::delete::DeleteArgs),

    /// Show catalog totals
    Stats,

    /// List the available genres
    Genres,
}
