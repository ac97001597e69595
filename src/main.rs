use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::instrument::WithSubscriber;

use webhook::cli::{self, ApprovalCommands};
use webhook::models::approval::Decision;
use webhook::telemetry::Logger;
use webhook::{api, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let mut cfg = config::load()?;
    if let Some(cli::Commands::Serve { port: Some(port) }) = &args.command {
        cfg.port = *port;
    }

    let logger = Logger::new(&cfg.log_filter, cfg.logfile.as_deref())?;
    let dispatch = logger.dispatch().clone();
    let state = Arc::new(AppState::new(cfg, logger));

    let result = match args.command {
        Some(cli::Commands::Approval { command }) => {
            handle_approval_command(&state, command)
                .with_subscriber(dispatch.clone())
                .await
        }
        Some(cli::Commands::Serve { .. }) | None => {
            run_server(state.clone())
                .with_subscriber(dispatch.clone())
                .await
        }
    };

    if let Err(ref e) = result {
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::error!("Webhook server error: {:#}", e);
        });
    }
    result
}

async fn run_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = SocketAddr::new(state.config.host, state.config.port);
    tracing::info!("Starting Duplexer webhook server on port {}", addr.port());

    state.store.ensure_dir().await.with_context(|| {
        format!(
            "failed to create pending directory {}",
            state.store.dir().display()
        )
    })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Webhook server listening on {}", addr);
    tracing::info!("Available endpoints:");
    for (method, path) in api::ENDPOINTS {
        tracing::info!("  {:<4} {}", method, path);
    }

    let app = api::router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server failed")?;

    tracing::info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Webhook server shutting down...");
}

async fn handle_approval_command(state: &AppState, cmd: ApprovalCommands) -> anyhow::Result<()> {
    match cmd {
        ApprovalCommands::List => {
            let entries = state.store.list_pending().await.with_context(|| {
                format!(
                    "failed to read pending directory {}",
                    state.store.dir().display()
                )
            })?;

            if entries.is_empty() {
                println!("No pending approvals.");
                return Ok(());
            }

            println!("{:<40} STATUS", "TOKEN");
            for entry in entries {
                println!("{:<40} {}", entry.token, entry.status);
            }
        }
        ApprovalCommands::Status { token } => {
            let status = state.store.status(&token).await;
            println!("{}: {}", token, status);
        }
        ApprovalCommands::Approve { token } => {
            record_decision(state, &token, Decision::Approved).await?;
        }
        ApprovalCommands::Reject { token } => {
            record_decision(state, &token, Decision::Rejected).await?;
        }
    }
    Ok(())
}

async fn record_decision(state: &AppState, token: &str, decision: Decision) -> anyhow::Result<()> {
    if token.is_empty() {
        anyhow::bail!("token must not be empty");
    }

    tracing::info!("Received {} request for token: {} (cli)", decision, token);
    let path = state
        .store
        .record(token, decision)
        .await
        .with_context(|| format!("failed to create {} file for {}", decision, token))?;
    tracing::info!("Created {} file: {}", decision, path.display());

    println!("Token {} {}.", token, decision);
    Ok(())
}
