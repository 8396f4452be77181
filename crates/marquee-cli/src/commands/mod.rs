//! Subcommand implementations.

pub mod admin;
pub mod catalog;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::debug;

use marquee_core::{
    ApiKey, CatalogContext, CatalogStore, GatewayUrl, RouteGate, SessionManager,
};

use crate::cli::{Commands, GatewayArgs};
use crate::gateway::CliGateway;
use crate::output::ConsoleNotifier;
use crate::session::storage::{self, StoredSession};

pub async fn handle(gateway: GatewayArgs, command: Commands) -> Result<()> {
    if let Commands::Genres = command {
        catalog::genres::run();
        return Ok(());
    }

    let app = App::open(&gateway).await?;
    match command {
        Commands::Login(args) => admin::login::run(&app, args).await,
        Commands::Logout => admin::logout::run(&app).await,
        Commands::Whoami => admin::whoami::run(&app).await,
        Commands::CreateUser(args) => admin::create_user::run(&app, args),
        Commands::List(args) => catalog::list::run(&app, args),
        Commands::Show(args) => catalog::show::run(&app, args).await,
        Commands::Download(args) => catalog::download::run(&app, args).await,
        Commands::Add(args) => admin::add::run(&app, args).await,
        Commands::Edit(args) => admin::edit::run(&app, args).await,
        Commands::Delete(args) => admin::delete::run(&app, args).await,
        Commands::Stats => admin::stats::run(&app),
        Commands::Genres => Ok(()),
    }
}

/// A connected gateway with its session restored and the catalog loaded.
pub struct App {
    ctx: CatalogContext<CliGateway>,
    api_key: Option<ApiKey>,
    restored: bool,
}

impl App {
    pub async fn open(args: &GatewayArgs) -> Result<Self> {
        let stored = storage::load()?;

        let url = match (&args.gateway, &stored) {
            (Some(url), _) => GatewayUrl::new(url).context("Invalid gateway URL")?,
            (None, Some(stored)) => stored.gateway_url()?,
            (None, None) => {
                bail!("No gateway configured. Pass --gateway or set MARQUEE_GATEWAY.")
            }
        };
        let stored = stored.filter(|s| s.gateway == url.to_string());
        let api_key = args
            .api_key
            .clone()
            .map(ApiKey::new)
            .or_else(|| stored.as_ref().and_then(StoredSession::api_key));

        let gateway = CliGateway::connect(url, api_key.clone())?;
        let restored = stored.is_some();
        if let Some(stored) = stored {
            debug!(user = %stored.user_id, "Restoring saved session");
            gateway.restore_session(stored.to_session()).await;
        }

        let ctx = CatalogContext::new(Arc::new(gateway), Arc::new(ConsoleNotifier));
        ctx.bootstrap().await;

        Ok(Self {
            ctx,
            api_key,
            restored,
        })
    }

    pub fn gateway(&self) -> &CliGateway {
        self.ctx.gateway()
    }

    pub fn session(&self) -> &Arc<SessionManager<CliGateway>> {
        self.ctx.session()
    }

    pub fn store(&self) -> &CatalogStore<CliGateway> {
        self.ctx.store()
    }

    /// Refuse to continue unless the admin screen at `path` may be shown.
    pub fn require_admin(&self, path: &str) -> Result<()> {
        match self.session().state().gate(path) {
            RouteGate::Render => Ok(()),
            RouteGate::Loading => bail!("Session state is still unknown"),
            RouteGate::Login => bail!("Sign in required. Run 'marquee login' first."),
        }
    }

    /// Write the gateway's current session to disk, or forget the saved one
    /// once it has ended.
    pub async fn persist(&self) -> Result<()> {
        match self.gateway().session().await {
            Some(session) => {
                let stored = StoredSession::new(self.gateway().url(), self.api_key.as_ref(), &session);
                storage::save(&stored).context("Failed to save session")
            }
            None if self.restored => storage::clear(),
            None => Ok(()),
        }
    }
}
