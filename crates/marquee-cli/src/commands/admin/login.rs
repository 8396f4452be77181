//! Login command implementation.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use marquee_core::Credentials;
use marquee_core::auth::ADMIN_LOGIN;

use super::SESSION_EVENT_TIMEOUT;
use crate::commands::App;
use crate::output;
use crate::session::CliNavigator;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Administrator email address
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long, env = "MARQUEE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(app: &App, args: LoginArgs) -> Result<()> {
    let navigator = Arc::new(CliNavigator::at(ADMIN_LOGIN));
    let mut location = navigator.watch();
    let _subscription = app.session().subscribe(navigator.clone())?;

    eprintln!("{}", "Logging in...".dimmed());

    if !app
        .session()
        .login(Credentials::new(args.email, args.password))
        .await
    {
        bail!("Login failed");
    }

    tokio::time::timeout(
        SESSION_EVENT_TIMEOUT,
        location.wait_for(|path| path != ADMIN_LOGIN),
    )
    .await
    .context("Timed out waiting for the session to start")?
    .context("Session events stopped")?;

    app.persist().await?;

    output::success("Logged in successfully");
    println!();
    if let Some(user) = app.session().state().user() {
        output::field("User", &user.id);
        if let Some(email) = &user.email {
            output::field("Email", email);
        }
    }
    output::field("Gateway", app.gateway().url().as_str());
    Ok(())
}
