use std::path::PathBuf;

use clap::Parser;

/// walletrpc: JSON-RPC control plane for a local wallet ledger.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Address to bind the RPC server to.
    #[arg(long, default_value = "127.0.0.1", env = "WALLETRPC_BIND_IP")]
    pub rpc_bind_ip: String,

    /// Port to listen on.
    #[arg(long, default_value = "8070", env = "WALLETRPC_BIND_PORT")]
    pub rpc_bind_port: u16,

    /// Speak the Monero-wallet compatible dialect: `getbalance` and
    /// `transfer` use compatibility shapes, and `transfer_split` and
    /// `get_bulk_payments` become available.
    #[arg(long, env = "WALLETRPC_API_XMR")]
    pub api_xmr: bool,

    /// Wallet snapshot file. Loaded at startup when present, written by
    /// `store`, reloaded by `reset`. If omitted, the wallet is in-memory only.
    #[arg(long, env = "WALLETRPC_WALLET_FILE")]
    pub wallet_file: Option<PathBuf>,

    /// Wallet address, used when the wallet file does not exist yet.
    #[arg(long, env = "WALLETRPC_ADDRESS")]
    pub address: Option<String>,

    /// Maximum accepted request body size in bytes.
    #[arg(long, default_value = "1048576", env = "WALLETRPC_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,
}
