//! Method handlers. Each decodes its params, runs against the wallet
//! context, and returns the serialized result.

use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::commands::{
    Empty, GetAddressResponse, GetBalanceResponse, GetBalanceXmrResponse,
    GetBulkPaymentsRequest, GetBulkPaymentsResponse, GetHeightResponse, GetPaymentsRequest,
    GetPaymentsResponse, GetTransfersResponse, TransferRequest, TransferResponse,
    TransferSplitResponse, TransferXmrRequest, TransferXmrResponse,
};
use super::dispatcher::WalletContext;
use super::error::RpcError;
use crate::error::CoreError;
use crate::transfer::{send_transfer, TransferOrder};
use crate::{history, payments};

type RpcResult = Result<Value, RpcError>;

fn decode<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError::InvalidParams(e.to_string()))
}

fn respond<T: Serialize>(response: T) -> RpcResult {
    serde_json::to_value(response)
        .map_err(|e| RpcError::UnknownError(format!("failed to serialize result: {e}")))
}

// ==============================================================================
// Wallet
// ==============================================================================

pub(super) fn get_address(ctx: &WalletContext, _params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        let address = ctx.ledger.address().await?;
        respond(GetAddressResponse { address })
    }
    .boxed()
}

pub(super) fn get_balance(ctx: &WalletContext, _params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        respond(GetBalanceResponse {
            locked_amount: ctx.ledger.pending_balance().await?,
            available_balance: ctx.ledger.actual_balance().await?,
        })
    }
    .boxed()
}

pub(super) fn get_balance_xmr(ctx: &WalletContext, _params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        let pending = ctx.ledger.pending_balance().await?;
        let actual = ctx.ledger.actual_balance().await?;
        respond(GetBalanceXmrResponse {
            balance: pending.saturating_add(actual),
            unlocked_balance: actual,
        })
    }
    .boxed()
}

pub(super) fn store(ctx: &WalletContext, _params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        ctx.ledger.store().await.map_err(|e| {
            let reason = match e {
                CoreError::Storage(reason) => reason,
                other => other.to_string(),
            };
            RpcError::UnknownError(format!("Couldn't save wallet: {reason}"))
        })?;
        respond(Empty {})
    }
    .boxed()
}

pub(super) fn reset(ctx: &WalletContext, _params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        ctx.ledger.reset().await?;
        respond(Empty {})
    }
    .boxed()
}

pub(super) fn get_height(ctx: &WalletContext, _params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        let height = ctx.node.last_local_block_height().await?;
        respond(GetHeightResponse { height })
    }
    .boxed()
}

// ==============================================================================
// Transfers
// ==============================================================================

pub(super) fn transfer(ctx: &WalletContext, params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        let request: TransferRequest = decode(params)?;
        let order = TransferOrder {
            destinations: request.destinations,
            fee: request.fee,
            mixin: request.mixin,
            unlock_time: request.unlock_time,
            payment_id: request.payment_id,
        };
        let tx = send_transfer(ctx.ledger.as_ref(), &ctx.shutdown, order).await?;
        respond(TransferResponse {
            tx_hash: tx.hash.to_hex(),
        })
    }
    .boxed()
}

pub(super) fn transfer_xmr(ctx: &WalletContext, params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        let request: TransferXmrRequest = decode(params)?;
        if request.do_not_relay {
            warn!("do_not_relay is not supported, transaction will be relayed");
        }
        let order = TransferOrder {
            destinations: request.destinations,
            fee: request.fee,
            mixin: request.mixin,
            unlock_time: request.unlock_time,
            payment_id: request.payment_id,
        };
        let tx = send_transfer(ctx.ledger.as_ref(), &ctx.shutdown, order).await?;

        respond(TransferXmrResponse {
            fee: tx.fee,
            tx_hash: tx.hash.to_hex(),
            tx_key: unsupported_export(request.get_tx_key, "tx key"),
            tx_blob: unsupported_export(request.get_tx_hex, "tx blob"),
        })
    }
    .boxed()
}

/// `""` when the caller did not ask for the export, `null` when it did.
fn unsupported_export(requested: bool, what: &str) -> Option<String> {
    if requested {
        warn!(export = what, "export requested but not supported");
        None
    } else {
        Some(String::new())
    }
}

pub(super) fn transfer_split(_ctx: &WalletContext, _params: Value) -> BoxFuture<'_, RpcResult> {
    async move { respond(TransferSplitResponse::default()) }.boxed()
}

// ==============================================================================
// Payments / History
// ==============================================================================

pub(super) fn get_payments(ctx: &WalletContext, params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        let request: GetPaymentsRequest = decode(params)?;
        let payments = payments::get_payments(ctx.ledger.as_ref(), &request.payment_id).await?;
        respond(GetPaymentsResponse { payments })
    }
    .boxed()
}

pub(super) fn get_bulk_payments(ctx: &WalletContext, params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        let request: GetBulkPaymentsRequest = decode(params)?;
        let payments = payments::get_bulk_payments(
            ctx.ledger.as_ref(),
            &request.payment_ids,
            request.min_block_height,
        )
        .await?;
        respond(GetBulkPaymentsResponse { payments })
    }
    .boxed()
}

pub(super) fn get_transfers(ctx: &WalletContext, _params: Value) -> BoxFuture<'_, RpcResult> {
    async move {
        let transfers = history::list_transfers(ctx.ledger.as_ref()).await?;
        respond(GetTransfersResponse { transfers })
    }
    .boxed()
}
