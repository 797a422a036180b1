//! `MemoryLedger`: an in-memory wallet ledger.
//!
//! Holds transactions and transfers in a `tokio::sync::RwLock`, tracks each
//! submission's completion on a `watch` channel, and optionally persists a
//! JSON snapshot to a wallet file. Submissions are settled according to a
//! [`SendPolicy`], which lets tests drive every completion path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::types::{
    BlockHeight, Direction, LedgerTransaction, LedgerTransfer, TransactionHash, TransactionId,
    TransactionState, TransferDestination, TransferId,
};

use super::{Ledger, Node};

// ==============================================================================
// Send Policy
// ==============================================================================

/// How the ledger settles a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SendPolicy {
    /// Accept and immediately commit (Active, unconfirmed).
    #[default]
    Commit,
    /// Refuse the submission outright.
    Reject,
    /// Accept, then fail completion with the given reason.
    Fail(String),
    /// Accept and leave the transaction in `Sending` until
    /// [`MemoryLedger::complete_send`] is called.
    Hold,
}

type Completion = Option<Result<(), String>>;

// ==============================================================================
// State
// ==============================================================================

/// On-disk form of the wallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    address: String,
    transactions: Vec<LedgerTransaction>,
    transfers: Vec<LedgerTransfer>,
}

struct State {
    wallet: Snapshot,
    completions: HashMap<TransactionId, watch::Sender<Completion>>,
}

impl State {
    fn active_incoming(&self) -> impl Iterator<Item = &LedgerTransaction> {
        self.wallet
            .transactions
            .iter()
            .filter(|tx| tx.state == TransactionState::Active && tx.direction == Direction::Incoming)
    }

    fn actual_balance(&self) -> u64 {
        let received: u64 = self
            .active_incoming()
            .filter(|tx| tx.block_height.is_some())
            .fold(0, |acc, tx| acc.saturating_add(tx.amount));
        let spent: u64 = self
            .wallet
            .transactions
            .iter()
            .filter(|tx| {
                tx.direction.is_outgoing()
                    && matches!(tx.state, TransactionState::Active | TransactionState::Sending)
            })
            .fold(0, |acc, tx| acc.saturating_add(tx.amount));
        received.saturating_sub(spent)
    }

    fn pending_balance(&self) -> u64 {
        self.active_incoming()
            .filter(|tx| tx.block_height.is_none())
            .fold(0, |acc, tx| acc.saturating_add(tx.amount))
    }

    fn settle(&mut self, id: TransactionId, outcome: Result<(), String>) -> Result<(), CoreError> {
        let tx = self
            .wallet
            .transactions
            .get_mut(id.0)
            .ok_or(CoreError::TransactionNotFound(id))?;
        if tx.state != TransactionState::Sending {
            return Err(CoreError::Ledger(format!("transaction {id} is not pending")));
        }
        tx.state = if outcome.is_ok() {
            TransactionState::Active
        } else {
            TransactionState::Failed
        };
        if let Some(sender) = self.completions.get(&id) {
            sender.send_replace(Some(outcome));
        }
        Ok(())
    }
}

// ==============================================================================
// MemoryLedger
// ==============================================================================

pub struct MemoryLedger {
    state: RwLock<State>,
    policy: SendPolicy,
    wallet_file: Option<PathBuf>,
}

impl MemoryLedger {
    pub fn builder() -> MemoryLedgerBuilder {
        MemoryLedgerBuilder {
            wallet: Snapshot::default(),
            policy: SendPolicy::default(),
            wallet_file: None,
        }
    }

    /// Open the wallet stored at `path`, or start an empty wallet for
    /// `address` when the file does not exist yet.
    pub fn open(
        path: &Path,
        address: Option<&str>,
        policy: SendPolicy,
    ) -> Result<Self, CoreError> {
        let wallet = if path.exists() {
            read_snapshot(path)?
        } else {
            let address = address.ok_or_else(|| {
                CoreError::Storage(format!(
                    "wallet file {} does not exist and no address was given",
                    path.display()
                ))
            })?;
            Snapshot {
                address: address.to_owned(),
                ..Snapshot::default()
            }
        };

        Ok(Self {
            state: RwLock::new(State {
                wallet,
                completions: HashMap::new(),
            }),
            policy,
            wallet_file: Some(path.to_owned()),
        })
    }

    /// Record a transaction found on chain. `tx.id`, `tx.first_transfer_id`
    /// and `tx.transfer_count` are assigned by the ledger.
    pub async fn insert_transaction(
        &self,
        tx: LedgerTransaction,
        transfers: Vec<LedgerTransfer>,
    ) -> TransactionId {
        let mut state = self.state.write().await;
        push_transaction(&mut state.wallet, tx, transfers)
    }

    /// Settle a submission held by [`SendPolicy::Hold`].
    pub async fn complete_send(
        &self,
        id: TransactionId,
        outcome: Result<(), String>,
    ) -> Result<(), CoreError> {
        self.state.write().await.settle(id, outcome)
    }

    /// Mark a transaction as included in a block.
    pub async fn confirm(&self, id: TransactionId, height: BlockHeight) -> Result<(), CoreError> {
        let mut state = self.state.write().await;
        let tx = state
            .wallet
            .transactions
            .get_mut(id.0)
            .ok_or(CoreError::TransactionNotFound(id))?;
        tx.block_height = Some(height);
        Ok(())
    }

    /// Number of submissions accepted so far, including failed ones.
    pub async fn submission_count(&self) -> usize {
        self.state.read().await.completions.len()
    }
}

pub struct MemoryLedgerBuilder {
    wallet: Snapshot,
    policy: SendPolicy,
    wallet_file: Option<PathBuf>,
}

impl MemoryLedgerBuilder {
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.wallet.address = address.into();
        self
    }

    pub fn with_transaction(mut self, tx: LedgerTransaction, transfers: Vec<LedgerTransfer>) -> Self {
        push_transaction(&mut self.wallet, tx, transfers);
        self
    }

    pub fn send_policy(mut self, policy: SendPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn wallet_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.wallet_file = Some(path.into());
        self
    }

    pub fn build(self) -> MemoryLedger {
        MemoryLedger {
            state: RwLock::new(State {
                wallet: self.wallet,
                completions: HashMap::new(),
            }),
            policy: self.policy,
            wallet_file: self.wallet_file,
        }
    }
}

fn push_transaction(
    wallet: &mut Snapshot,
    mut tx: LedgerTransaction,
    transfers: Vec<LedgerTransfer>,
) -> TransactionId {
    let id = TransactionId(wallet.transactions.len());
    tx.id = id;
    tx.first_transfer_id = TransferId(wallet.transfers.len());
    tx.transfer_count = transfers.len();
    wallet.transactions.push(tx);
    wallet.transfers.extend(transfers);
    id
}

fn read_snapshot(path: &Path) -> Result<Snapshot, CoreError> {
    let content = std::fs::read(path).map_err(|e| read_error(path, e))?;
    decode_snapshot(path, &content)
}

/// Async counterpart of [`read_snapshot`]. `Ok(None)` when the file does not
/// exist.
async fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, CoreError> {
    match tokio::fs::read(path).await {
        Ok(content) => decode_snapshot(path, &content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(read_error(path, e)),
    }
}

fn decode_snapshot(path: &Path, content: &[u8]) -> Result<Snapshot, CoreError> {
    serde_json::from_slice(content).map_err(|e| {
        CoreError::Storage(format!("invalid wallet file {}: {e}", path.display()))
    })
}

fn read_error(path: &Path, err: std::io::Error) -> CoreError {
    CoreError::Storage(format!("failed to read wallet file {}: {err}", path.display()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ==============================================================================
// Ledger / Node implementations
// ==============================================================================

#[async_trait]
impl Ledger for MemoryLedger {
    async fn address(&self) -> Result<String, CoreError> {
        Ok(self.state.read().await.wallet.address.clone())
    }

    async fn actual_balance(&self) -> Result<u64, CoreError> {
        Ok(self.state.read().await.actual_balance())
    }

    async fn pending_balance(&self) -> Result<u64, CoreError> {
        Ok(self.state.read().await.pending_balance())
    }

    async fn transaction_count(&self) -> Result<usize, CoreError> {
        Ok(self.state.read().await.wallet.transactions.len())
    }

    async fn transaction(&self, id: TransactionId) -> Result<LedgerTransaction, CoreError> {
        self.state
            .read()
            .await
            .wallet
            .transactions
            .get(id.0)
            .cloned()
            .ok_or(CoreError::TransactionNotFound(id))
    }

    /// The whole list under one read lock; never torn by a concurrent
    /// `reset` or submission.
    async fn transactions(&self) -> Result<Vec<LedgerTransaction>, CoreError> {
        Ok(self.state.read().await.wallet.transactions.clone())
    }

    async fn transfer(&self, id: TransferId) -> Result<LedgerTransfer, CoreError> {
        self.state
            .read()
            .await
            .wallet
            .transfers
            .get(id.0)
            .cloned()
            .ok_or(CoreError::TransferNotFound(id))
    }

    async fn submit(
        &self,
        destinations: &[TransferDestination],
        fee: u64,
        extra: Vec<u8>,
        mixin: u64,
        unlock_time: u64,
    ) -> Result<Option<TransactionId>, CoreError> {
        if self.policy == SendPolicy::Reject {
            debug!(destinations = destinations.len(), "submission refused by policy");
            return Ok(None);
        }

        let mut state = self.state.write().await;

        let total = destinations
            .iter()
            .try_fold(fee, |acc, d| acc.checked_add(d.amount))
            .ok_or_else(|| CoreError::Ledger("transfer amount overflows".to_owned()))?;
        let spendable = state.actual_balance();
        if total > spendable {
            return Err(CoreError::Ledger(format!(
                "not enough money: need {total}, spendable {spendable}"
            )));
        }

        let tx = LedgerTransaction {
            id: TransactionId(0),
            hash: TransactionHash(rand::thread_rng().r#gen()),
            state: TransactionState::Sending,
            block_height: None,
            timestamp: unix_now(),
            direction: Direction::Outgoing,
            amount: total,
            fee,
            unlock_time,
            extra,
            first_transfer_id: TransferId(0),
            transfer_count: 0,
        };
        let transfers = destinations
            .iter()
            .map(|d| LedgerTransfer {
                address: d.address.clone(),
                amount: d.amount,
            })
            .collect();
        let id = push_transaction(&mut state.wallet, tx, transfers);
        let (sender, _) = watch::channel(None);
        state.completions.insert(id, sender);
        debug!(tx.id = %id, total, fee, mixin, "submission accepted");

        match &self.policy {
            SendPolicy::Commit => state.settle(id, Ok(()))?,
            SendPolicy::Fail(reason) => state.settle(id, Err(reason.clone()))?,
            SendPolicy::Hold | SendPolicy::Reject => {}
        }

        Ok(Some(id))
    }

    async fn await_completion(&self, id: TransactionId) -> Result<(), CoreError> {
        let mut receiver = {
            let state = self.state.read().await;
            state
                .completions
                .get(&id)
                .map(watch::Sender::subscribe)
                .ok_or(CoreError::TransactionNotFound(id))?
        };

        let outcome = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| CoreError::Ledger(format!("completion signal for {id} was dropped")))?
            .clone();

        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(reason)) => Err(CoreError::Ledger(reason)),
            None => Err(CoreError::Ledger(format!("transaction {id} has no outcome"))),
        }
    }

    async fn store(&self) -> Result<(), CoreError> {
        let Some(path) = &self.wallet_file else {
            return Err(CoreError::Storage("no wallet file configured".to_owned()));
        };

        let content = {
            let state = self.state.read().await;
            serde_json::to_vec_pretty(&state.wallet)?
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        info!(path = %path.display(), "wallet stored");
        Ok(())
    }

    async fn reset(&self) -> Result<(), CoreError> {
        // Disk I/O happens before the write lock is taken.
        let stored = match &self.wallet_file {
            Some(path) => load_snapshot(path).await?,
            None => None,
        };

        let mut state = self.state.write().await;
        let wallet = stored.unwrap_or_else(|| Snapshot {
            address: state.wallet.address.clone(),
            ..Snapshot::default()
        });
        // Outstanding waiters see the dropped sender and fail.
        state.completions.clear();
        state.wallet = wallet;
        info!(
            transactions = state.wallet.transactions.len(),
            "wallet state reset"
        );
        Ok(())
    }
}

#[async_trait]
impl Node for MemoryLedger {
    async fn last_local_block_height(&self) -> Result<u64, CoreError> {
        Ok(self
            .state
            .read()
            .await
            .wallet
            .transactions
            .iter()
            .filter_map(|tx| tx.block_height)
            .max()
            .map(u64::from)
            .unwrap_or(0))
    }
}
