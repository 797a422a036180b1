//! Payment reconciliation: match settled incoming ledger transactions to the
//! payment ids embedded in their extra blobs.
//!
//! Only transactions that are Active, included in a block, and incoming are
//! ever candidates. Results follow ledger sequence order.

use serde::Serialize;
use tracing::debug;

use crate::extra::payment_id_from_extra;
use crate::ledger::Ledger;
use crate::payment_id::{PaymentId, PaymentIdError};
use crate::rpc::RpcError;
use crate::types::LedgerTransaction;

// ==============================================================================
// Records
// ==============================================================================

/// One matched payment, as returned by `get_payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRecord {
    pub tx_hash: String,
    pub amount: u64,
    pub block_height: u64,
    pub unlock_time: u64,
}

/// One matched payment tagged with its id, as returned by `get_bulk_payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkPaymentRecord {
    pub payment_id: String,
    pub tx_hash: String,
    pub amount: u64,
    pub block_height: u64,
    pub unlock_time: u64,
}

impl BulkPaymentRecord {
    fn new(payment_id: String, record: PaymentRecord) -> Self {
        Self {
            payment_id,
            tx_hash: record.tx_hash,
            amount: record.amount,
            block_height: record.block_height,
            unlock_time: record.unlock_time,
        }
    }
}

// ==============================================================================
// Queries
// ==============================================================================

/// All settled incoming payments carrying `payment_id_hex`.
pub async fn get_payments(
    ledger: &dyn Ledger,
    payment_id_hex: &str,
) -> Result<Vec<PaymentRecord>, RpcError> {
    let expected = PaymentId::from_hex(payment_id_hex).map_err(|e| match e {
        PaymentIdError::InvalidHex => {
            RpcError::WrongPaymentId("Payment ID has invalid format".to_owned())
        }
        PaymentIdError::InvalidLength(_) => {
            RpcError::WrongPaymentId("Payment ID has invalid size".to_owned())
        }
    })?;

    let transactions = ledger.transactions().await?;
    let payments: Vec<PaymentRecord> = transactions
        .iter()
        .filter_map(|tx| candidate(tx, 0).filter(|(id, _)| *id == expected))
        .map(|(_, record)| record)
        .collect();

    debug!(
        payment_id = %expected,
        scanned = transactions.len(),
        matched = payments.len(),
        "payment lookup"
    );
    Ok(payments)
}

/// Payments for several ids at once, restricted to `min_block_height` and
/// above.
///
/// An empty `payment_ids` list returns every settled incoming payment that
/// carries any payment id. Otherwise every id is validated before scanning
/// and one malformed id fails the whole call. Matches are concatenated in
/// requested-id order without deduplication, and each record echoes the id
/// string exactly as the caller sent it.
pub async fn get_bulk_payments(
    ledger: &dyn Ledger,
    payment_ids: &[String],
    min_block_height: u64,
) -> Result<Vec<BulkPaymentRecord>, RpcError> {
    if payment_ids.is_empty() {
        let transactions = ledger.transactions().await?;
        return Ok(transactions
            .iter()
            .filter_map(|tx| candidate(tx, min_block_height))
            .map(|(id, record)| BulkPaymentRecord::new(id.to_hex(), record))
            .collect());
    }

    let expected = payment_ids
        .iter()
        .map(|raw| decode_bulk_id(raw).map(|id| (raw, id)))
        .collect::<Result<Vec<_>, _>>()?;

    let transactions = ledger.transactions().await?;
    let mut payments = Vec::new();
    for (raw, wanted) in expected {
        payments.extend(
            transactions
                .iter()
                .filter_map(|tx| candidate(tx, min_block_height))
                .filter(|(id, _)| *id == wanted)
                .map(|(_, record)| BulkPaymentRecord::new(raw.clone(), record)),
        );
    }

    debug!(
        requested = payment_ids.len(),
        min_block_height,
        matched = payments.len(),
        "bulk payment lookup"
    );
    Ok(payments)
}

fn decode_bulk_id(raw: &str) -> Result<PaymentId, RpcError> {
    PaymentId::from_hex(raw).map_err(|e| match e {
        PaymentIdError::InvalidHex => {
            RpcError::WrongPaymentId(format!("Payment ID has invalid format: {raw}"))
        }
        PaymentIdError::InvalidLength(_) => {
            RpcError::WrongPaymentId(format!("Payment ID has invalid size: {raw}"))
        }
    })
}

/// The payment id and record for `tx` if it is a settled incoming payment at
/// or above `min_block_height` that carries a payment id.
fn candidate(tx: &LedgerTransaction, min_block_height: u64) -> Option<(PaymentId, PaymentRecord)> {
    if !tx.is_settled() || tx.direction.is_outgoing() {
        return None;
    }
    let height = tx.block_height?;
    if *height < min_block_height {
        return None;
    }
    let id = payment_id_from_extra(&tx.extra)?;
    Some((
        id,
        PaymentRecord {
            tx_hash: tx.hash.to_hex(),
            amount: tx.amount,
            block_height: height.into(),
            unlock_time: tx.unlock_time,
        },
    ))
}
