//! Request and response shapes for every wallet RPC method.
//!
//! Native and compatibility variants of `getbalance` and `transfer` share a
//! method name but not a wire shape.

use serde::{Deserialize, Serialize};

use crate::history::TransferRecord;
use crate::payments::{BulkPaymentRecord, PaymentRecord};
use crate::types::TransferDestination;

/// Fee applied by compatibility-mode `transfer` when the caller omits one.
pub const DEFAULT_XMR_FEE: u64 = 1_000_000;

/// Parameterless request or response; serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

// ==============================================================================
// Address / Balance / Height
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetAddressResponse {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetBalanceResponse {
    pub locked_amount: u64,
    pub available_balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetBalanceXmrResponse {
    pub balance: u64,
    pub unlocked_balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetHeightResponse {
    pub height: u64,
}

// ==============================================================================
// Transfer
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub destinations: Vec<TransferDestination>,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub mixin: u64,
    #[serde(default)]
    pub unlock_time: u64,
    #[serde(default)]
    pub payment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferResponse {
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferXmrRequest {
    #[serde(default)]
    pub destinations: Vec<TransferDestination>,
    #[serde(default = "default_xmr_fee")]
    pub fee: u64,
    #[serde(default)]
    pub mixin: u64,
    #[serde(default)]
    pub unlock_time: u64,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub get_tx_key: bool,
    /// Accepted for compatibility; fee priority is not modeled.
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub do_not_relay: bool,
    #[serde(default)]
    pub get_tx_hex: bool,
}

fn default_xmr_fee() -> u64 {
    DEFAULT_XMR_FEE
}

/// `tx_key` and `tx_blob` are empty strings when not requested and `null`
/// when requested, since neither can be exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferXmrResponse {
    pub fee: u64,
    pub tx_hash: String,
    pub tx_key: Option<String>,
    pub tx_blob: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferSplitResponse {
    pub tx_hash_list: Vec<String>,
    pub tx_key_list: Vec<String>,
    pub amount_list: Vec<u64>,
    pub fee_list: Vec<u64>,
    pub tx_blob_list: Vec<String>,
}

// ==============================================================================
// Payments / Transfers
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetPaymentsRequest {
    pub payment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetPaymentsResponse {
    pub payments: Vec<PaymentRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetBulkPaymentsRequest {
    #[serde(default)]
    pub payment_ids: Vec<String>,
    #[serde(default)]
    pub min_block_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetBulkPaymentsResponse {
    pub payments: Vec<BulkPaymentRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetTransfersResponse {
    pub transfers: Vec<TransferRecord>,
}
