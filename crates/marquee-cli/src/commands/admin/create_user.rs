//! Create-user command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::App;
use crate::output;

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    /// Email address to sign in with
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long, env = "MARQUEE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub fn run(app: &App, args: CreateUserArgs) -> Result<()> {
    let gateway = app
        .gateway()
        .as_file()
        .context("create-user only works with a local file:// gateway")?;

    let user = gateway
        .create_user(&args.email, &args.password)
        .context("Failed to create user")?;

    output::success("User created");
    println!();
    output::field("User", &user.id);
    output::field("Email", &args.email);
    Ok(())
}
