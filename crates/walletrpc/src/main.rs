mod cli;
mod server;

use std::sync::Arc;

use clap::Parser;
use eyre::{eyre, WrapErr};
use tokio_util::sync::CancellationToken;

use walletrpc_core::{DispatchMode, Dispatcher, MemoryLedger, SendPolicy};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let ledger = Arc::new(open_ledger(&args)?);
    let mode = if args.api_xmr {
        DispatchMode::Compatibility
    } else {
        DispatchMode::Native
    };

    let shutdown = CancellationToken::new();
    let dispatcher = Dispatcher::new(mode, ledger.clone(), ledger, shutdown.clone());
    tracing::info!(?mode, methods = ?dispatcher.methods(), "wallet RPC dispatcher ready");

    let state = server::AppState {
        dispatcher: Arc::new(dispatcher),
    };
    let router = server::build_router(state, args.max_body_bytes);

    let bind_addr = format!("{}:{}", args.rpc_bind_ip, args.rpc_bind_port);
    if args.rpc_bind_ip == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0, the wallet is accessible from the network");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("bind TCP listener")?;

    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("run HTTP server")?;

    Ok(())
}

fn open_ledger(args: &cli::Cli) -> eyre::Result<MemoryLedger> {
    match (&args.wallet_file, &args.address) {
        (Some(path), address) => {
            let ledger = MemoryLedger::open(path, address.as_deref(), SendPolicy::Commit)
                .wrap_err_with(|| format!("open wallet file {}", path.display()))?;
            tracing::info!(path = %path.display(), "wallet opened");
            Ok(ledger)
        }
        (None, Some(address)) => {
            tracing::warn!("no --wallet-file given, `store` will fail and `reset` clears the wallet");
            Ok(MemoryLedger::builder().address(address.clone()).build())
        }
        (None, None) => Err(eyre!("either --wallet-file or --address is required")),
    }
}

/// Resolves on Ctrl-C and cancels `token` so pending transfer waits are
/// released before the server drains.
async fn shutdown_signal(token: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
    token.cancel();
}
