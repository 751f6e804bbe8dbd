use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shared::config::load_config;
use taskd::AppState;
use taskd::auth::TokenCodec;
use taskd::database;
use taskd::handlers::http::build_api_router;
use taskd::services::users::seed_admin;

#[derive(Parser, Debug)]
#[command(name = "taskd", about = "Multi-user task tracking server")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    let secret = config
        .auth
        .resolved_jwt_secret()
        .ok_or_else(|| anyhow!("No JWT secret configured"))?;
    let tokens = TokenCodec::new(secret.as_bytes(), config.auth.token_expiry_secs());

    let db = database::open(&config.database.path)
        .await
        .context("Failed to open database")?;
    database::create_tables(&db)
        .await
        .context("Failed to create tables")?;

    if let Some(seed) = &config.admin {
        seed_admin(&db, seed)
            .await
            .map_err(|e| anyhow!("Failed to seed administrator: {}", e))?;
    }

    let addr: SocketAddr = config
        .server
        .addr()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.addr()))?;

    let state = AppState::new(db, config, tokens);
    let router = Arc::new(build_api_router());

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        };

        let io = TokioIo::new(stream);
        let router = Arc::clone(&router);
        let state = state.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let router = Arc::clone(&router);
                let state = state.clone();
                async move { router.serve(req, state).await }
            });

            if let Err(err) = http1::Builder::new()
                .timer(TokioTimer::new())
                .serve_connection(io, service)
                .await
            {
                error!("Error serving connection from {}: {:?}", peer, err);
            }
        });
    }

    info!("Server stopped");
    Ok(())
}
