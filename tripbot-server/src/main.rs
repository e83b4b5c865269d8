use std::net::SocketAddr;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use tripbot_core::AppConfig;

mod context;
mod server;

#[derive(Parser, Debug, Clone)]
#[command(name = "tripbot")]
#[command(author, version, about = "Tripbot - northern Thailand travel assistant for LINE")]
struct Args {
    /// Address the webhook server binds to (overrides BIND_ADDR)
    #[arg(long)]
    bind_addr: Option<SocketAddr>,

    /// Postgres connection URL for chat history (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Tracing filter, e.g. "tripbot=debug,tower_http=info"
    #[arg(long)]
    log_level: Option<String>,

    /// Don't apply migrations on startup.
    #[arg(long, default_value = "false")]
    skip_migrations: bool,
}

fn init_tracing(log_level: Option<&str>) -> anyhow::Result<()> {
    let filter = match log_level {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::from_default_env().add_directive("tripbot=info".parse()?),
    };
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;

    let mut config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Startup aborted: {}", e);
            return Err(e.into());
        }
    };
    if let Some(addr) = args.bind_addr {
        config.bind_addr = addr;
    }
    if let Some(url) = args.database_url.clone() {
        config.database_url = Some(url);
    }

    info!(
        "Tripbot starting. bind={}, history={}",
        config.bind_addr,
        if config.database_url.is_some() { "postgres" } else { "memory" }
    );

    if let Err(e) = server::run_server(config, !args.skip_migrations).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
