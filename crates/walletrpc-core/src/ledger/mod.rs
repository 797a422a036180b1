//! Wallet ledger and node abstraction layer.
//!
//! Defines the [`Ledger`] and [`Node`] traits the RPC handlers run against,
//! plus an in-memory implementation ([`MemoryLedger`]) used by tests and by
//! the development server.

mod memory;

pub use memory::{MemoryLedger, MemoryLedgerBuilder, SendPolicy};

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{LedgerTransaction, LedgerTransfer, TransactionId, TransferDestination, TransferId};

/// The wallet's local, chain-synchronized record of transactions.
///
/// Implementations own all mutable wallet state and must stay consistent
/// under concurrent reads interleaved with submissions; callers never lock
/// around these methods.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Primary address of the wallet.
    async fn address(&self) -> Result<String, CoreError>;

    /// Unlocked, spendable balance.
    async fn actual_balance(&self) -> Result<u64, CoreError>;

    /// Balance that is known but not yet spendable.
    async fn pending_balance(&self) -> Result<u64, CoreError>;

    async fn transaction_count(&self) -> Result<usize, CoreError>;

    /// Fetch a transaction by sequence id.
    async fn transaction(&self, id: TransactionId) -> Result<LedgerTransaction, CoreError>;

    async fn transfer(&self, id: TransferId) -> Result<LedgerTransfer, CoreError>;

    /// Hand a new transaction to the wallet for signing and relay.
    ///
    /// Returns `Ok(None)` when the wallet refuses the submission outright.
    /// `mixin` is passed through to the wallet untouched.
    async fn submit(
        &self,
        destinations: &[TransferDestination],
        fee: u64,
        extra: Vec<u8>,
        mixin: u64,
        unlock_time: u64,
    ) -> Result<Option<TransactionId>, CoreError>;

    /// Wait until the submission `id` reaches a terminal state. An `Err`
    /// carries the wallet's reason for the failure.
    async fn await_completion(&self, id: TransactionId) -> Result<(), CoreError>;

    /// Persist the wallet.
    async fn store(&self) -> Result<(), CoreError>;

    /// Drop cached state and resynchronize.
    async fn reset(&self) -> Result<(), CoreError>;

    /// Fetch every transaction in ascending sequence order.
    async fn transactions(&self) -> Result<Vec<LedgerTransaction>, CoreError> {
        let count = self.transaction_count().await?;
        let mut results = Vec::with_capacity(count);
        for seq in 0..count {
            results.push(self.transaction(TransactionId(seq)).await?);
        }
        Ok(results)
    }
}

/// The daemon the wallet synchronizes against.
#[async_trait]
pub trait Node: Send + Sync {
    async fn last_local_block_height(&self) -> Result<u64, CoreError>;
}
