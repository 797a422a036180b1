//! Domain types for the wallet ledger as seen by the RPC layer.
//!
//! Contains the ledger records (`LedgerTransaction`, `LedgerTransfer`), the
//! caller-supplied `TransferDestination`, and shared newtypes such as
//! `TransactionId`, `BlockHeight` and `TransactionHash`.

use serde::{Deserialize, Serialize};

// ==============================================================================
// Identifiers
// ==============================================================================

/// Sequence number of a transaction inside the ledger. Sequence ids are
/// dense and ascending, starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub usize);

/// Index of a transfer (one destination of one transaction) in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(pub usize);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ==============================================================================
// Block Height
// ==============================================================================

/// A block height, wrapped for type safety.
///
/// Unconfirmed transactions carry `Option::<BlockHeight>::None` rather than a
/// sentinel height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl From<u64> for BlockHeight {
    fn from(h: u64) -> Self {
        Self(h)
    }
}

impl From<BlockHeight> for u64 {
    fn from(h: BlockHeight) -> Self {
        h.0
    }
}

impl std::ops::Deref for BlockHeight {
    type Target = u64;
    fn deref(&self) -> &u64 {
        &self.0
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ==============================================================================
// Transaction Hash
// ==============================================================================

/// 32-byte transaction hash. Serialized as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(#[serde(with = "hex::serde")] pub [u8; 32]);

impl TransactionHash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ==============================================================================
// Transaction State and Direction
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    /// Committed, either on chain or accepted for relay.
    Active,
    Deleted,
    /// Submitted by this wallet, completion not yet signalled.
    Sending,
    Cancelled,
    Failed,
}

/// Which way value moved relative to this wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn is_outgoing(self) -> bool {
        matches!(self, Self::Outgoing)
    }
}

// ==============================================================================
// Ledger Records
// ==============================================================================

/// A transaction as recorded by the wallet ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: TransactionId,
    pub hash: TransactionHash,
    pub state: TransactionState,
    /// `None` while the transaction is not yet in a block.
    pub block_height: Option<BlockHeight>,
    pub timestamp: u64,
    pub direction: Direction,
    /// Magnitude of the value moved. For outgoing transactions this
    /// includes the fee.
    pub amount: u64,
    pub fee: u64,
    pub unlock_time: u64,
    /// Opaque tx-extra bytes; see [`crate::extra`].
    #[serde(with = "hex::serde")]
    pub extra: Vec<u8>,
    pub first_transfer_id: TransferId,
    pub transfer_count: usize,
}

impl LedgerTransaction {
    /// Active and included in a block. Reconciliation and history only ever
    /// look at settled transactions.
    pub fn is_settled(&self) -> bool {
        self.state == TransactionState::Active && self.block_height.is_some()
    }
}

/// One destination of a ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransfer {
    pub address: String,
    pub amount: u64,
}

/// A destination supplied by an RPC caller when sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDestination {
    pub address: String,
    pub amount: u64,
}
