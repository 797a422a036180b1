//! Mode-dependent method table.

use std::collections::HashMap;

use futures::future::BoxFuture;
use serde_json::Value;

use super::dispatcher::WalletContext;
use super::error::RpcError;
use super::handlers;

/// An async method handler borrowing the wallet context for the duration of
/// one call.
pub type Handler =
    for<'a> fn(&'a WalletContext, Value) -> BoxFuture<'a, Result<Value, RpcError>>;

/// Which wire dialect the server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    #[default]
    Native,
    /// Monero-wallet compatible shapes plus `transfer_split` and
    /// `get_bulk_payments`.
    Compatibility,
}

// ==============================================================================
// Method Names
// ==============================================================================

pub const GET_ADDRESS: &str = "getaddress";
pub const GET_BALANCE: &str = "getbalance";
pub const TRANSFER: &str = "transfer";
pub const TRANSFER_SPLIT: &str = "transfer_split";
pub const STORE: &str = "store";
pub const GET_PAYMENTS: &str = "get_payments";
pub const GET_BULK_PAYMENTS: &str = "get_bulk_payments";
pub const GET_TRANSFERS: &str = "get_transfers";
pub const GET_HEIGHT: &str = "get_height";
pub const RESET: &str = "reset";

// ==============================================================================
// Registry
// ==============================================================================

/// Immutable name-to-handler table, built once per mode.
pub struct MethodRegistry {
    mode: DispatchMode,
    methods: HashMap<&'static str, Handler>,
}

impl MethodRegistry {
    pub fn new(mode: DispatchMode) -> Self {
        let mut methods: HashMap<&'static str, Handler> = HashMap::new();
        methods.insert(GET_ADDRESS, handlers::get_address);
        methods.insert(STORE, handlers::store);
        methods.insert(GET_PAYMENTS, handlers::get_payments);
        methods.insert(GET_TRANSFERS, handlers::get_transfers);
        methods.insert(GET_HEIGHT, handlers::get_height);
        methods.insert(RESET, handlers::reset);

        match mode {
            DispatchMode::Native => {
                methods.insert(GET_BALANCE, handlers::get_balance);
                methods.insert(TRANSFER, handlers::transfer);
            }
            DispatchMode::Compatibility => {
                methods.insert(GET_BALANCE, handlers::get_balance_xmr);
                methods.insert(TRANSFER, handlers::transfer_xmr);
                methods.insert(TRANSFER_SPLIT, handlers::transfer_split);
                methods.insert(GET_BULK_PAYMENTS, handlers::get_bulk_payments);
            }
        }

        Self { mode, methods }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn get(&self, method: &str) -> Option<Handler> {
        self.methods.get(method).copied()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
