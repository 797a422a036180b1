use crate::types::{TransactionId, TransferId};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("ledger failure: {0}")]
    Ledger(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("transfer not found: {0}")]
    TransferNotFound(TransferId),

    #[error("wallet storage failure: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
