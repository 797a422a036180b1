//! Transfer submission with blocking completion.
//!
//! A transfer is reported as sent only after the ledger signals that the
//! submission reached a terminal state and the committed transaction has
//! been re-read. The wait is raced against the process shutdown token.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::extra::extra_with_payment_id;
use crate::ledger::Ledger;
use crate::payment_id::PaymentId;
use crate::rpc::RpcError;
use crate::types::{LedgerTransaction, TransferDestination};

/// Everything needed to build and submit one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOrder {
    pub destinations: Vec<TransferDestination>,
    pub fee: u64,
    /// Forwarded to the ledger untouched.
    pub mixin: u64,
    pub unlock_time: u64,
    /// Hex payment id; empty means none.
    pub payment_id: String,
}

/// Submit `order` and wait for the ledger to commit it.
///
/// Returns the committed transaction as re-read from the ledger.
pub async fn send_transfer(
    ledger: &dyn Ledger,
    shutdown: &CancellationToken,
    order: TransferOrder,
) -> Result<LedgerTransaction, RpcError> {
    let extra = extra_for_order(&order.payment_id)?;

    let id = ledger
        .submit(
            &order.destinations,
            order.fee,
            extra,
            order.mixin,
            order.unlock_time,
        )
        .await
        .map_err(transfer_error)?
        .ok_or_else(|| {
            warn!(destinations = order.destinations.len(), "ledger refused transfer");
            RpcError::GenericTransferError("Couldn't send transaction".to_owned())
        })?;

    info!(
        tx.id = %id,
        destinations = order.destinations.len(),
        fee = order.fee,
        "transfer submitted, waiting for completion"
    );

    match shutdown.run_until_cancelled(ledger.await_completion(id)).await {
        Some(outcome) => outcome.map_err(transfer_error)?,
        None => {
            warn!(tx.id = %id, "transfer wait abandoned on shutdown");
            return Err(RpcError::GenericTransferError(
                "wallet is shutting down".to_owned(),
            ));
        }
    }

    let tx = ledger.transaction(id).await.map_err(transfer_error)?;
    info!(tx.id = %id, tx.hash = %tx.hash, "transfer committed");
    Ok(tx)
}

fn extra_for_order(payment_id: &str) -> Result<Vec<u8>, RpcError> {
    if payment_id.is_empty() {
        return Ok(Vec::new());
    }
    let id = PaymentId::from_hex(payment_id).map_err(|_| {
        RpcError::WrongPaymentId(format!(
            "Payment id has invalid format: \"{payment_id}\", expected 64-character string"
        ))
    })?;
    Ok(extra_with_payment_id(&id))
}

fn transfer_error(err: CoreError) -> RpcError {
    warn!(error = %err, "transfer failed");
    let message = match err {
        CoreError::Ledger(reason) => reason,
        other => other.to_string(),
    };
    RpcError::GenericTransferError(message)
}
