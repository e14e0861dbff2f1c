//! tagsnip API server.

use clap::Parser;
use std::net::SocketAddr;
use tagsnip_server::{
    config::{env_flag_enabled, Config},
    db::Database,
    enforce_loopback, resolve_bind_address, serve_router, AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ENV_HELP: &str = "\
Environment variables:
  DB_PATH                   Database directory (default: ~/.cache/tagsnip/db)
  PORT                      Server port (default: 38412)
  MAX_SNIPPET_SIZE          Maximum snippet code size in bytes (default: 10MB)
  AUTO_SAVE_DELAY_MS        Client auto-save debounce (default: 1500)
  JWT_SECRET                Token signing secret (default: random per process)
  ACCESS_TOKEN_TTL_MINUTES  Access token lifetime (default: 1440)
  REFRESH_TOKEN_TTL_DAYS    Refresh token lifetime (default: 30)
  ALLOW_PUBLIC_ACCESS       Allow CORS from any origin and non-loopback binds
  BIND                      Listen address, e.g. 0.0.0.0:38412";

/// Command-line overrides; anything unset comes from the environment.
#[derive(Parser, Debug)]
#[command(name = "tagsnip", version, about = "Self-hosted code snippet server", after_help = ENV_HELP)]
struct Args {
    /// Database directory
    #[arg(long)]
    db_path: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Full listen address; takes precedence over BIND and --port
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Accept cross-origin requests from any origin and non-loopback binds
    #[arg(long)]
    allow_public: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagsnip=info,tagsnip_server=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    args.apply(&mut config);

    let database = Database::new(&config.db_path)?;
    tracing::info!("Database opened at {}", config.db_path);

    let allow_public = args.allow_public || env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled; any origin may call the API");
    }
    let bind_addr = match args.bind {
        Some(requested) => enforce_loopback(requested, allow_public),
        None => resolve_bind_address(&config, allow_public),
    };
    if !bind_addr.ip().is_loopback() {
        tracing::warn!("Listening on non-loopback address {}", bind_addr);
    }

    let state = AppState::new(config, database);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("tagsnip listening on http://{}", actual_addr);

    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("tagsnip stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_environment_config() {
        let args = Args::try_parse_from(["tagsnip", "--db-path", "/tmp/snips", "-p", "4000"])
            .expect("parse");
        let mut config = Config::for_db_path("/elsewhere");
        args.apply(&mut config);
        assert_eq!(config.db_path, "/tmp/snips");
        assert_eq!(config.port, 4000);
        assert!(!args.allow_public);
    }

    #[test]
    fn bind_must_be_a_socket_address() {
        assert!(Args::try_parse_from(["tagsnip", "--bind", "0.0.0.0"]).is_err());
        let args = Args::try_parse_from(["tagsnip", "--bind", "0.0.0.0:9000", "--allow-public"])
            .expect("parse");
        assert_eq!(args.bind, Some("0.0.0.0:9000".parse().expect("addr")));
        assert!(args.allow_public);
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(Args::try_parse_from(["tagsnip", "--verbose"]).is_err());
        assert!(Args::try_parse_from(["tagsnip", "serve"]).is_err());
    }
}
