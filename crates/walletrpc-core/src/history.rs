//! Transfer history projection for `get_transfers`.

use serde::Serialize;

use crate::error::CoreError;
use crate::extra::payment_id_from_extra;
use crate::ledger::Ledger;
use crate::types::LedgerTransaction;

/// An externally visible transfer. Field names follow the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub time: u64,
    /// `true` for transactions sent by this wallet.
    pub output: bool,
    pub transaction_hash: String,
    pub amount: u64,
    pub fee: u64,
    pub payment_id: String,
    pub address: String,
    pub block_index: u64,
    pub unlock_time: u64,
}

/// One record per settled transaction, in ledger sequence order.
///
/// Outgoing transactions report the address of their first transfer only;
/// incoming transactions report an empty address.
pub async fn list_transfers(ledger: &dyn Ledger) -> Result<Vec<TransferRecord>, CoreError> {
    let transactions = ledger.transactions().await?;
    let mut transfers = Vec::with_capacity(transactions.len());

    for tx in transactions.iter().filter(|tx| tx.is_settled()) {
        let address = if tx.direction.is_outgoing() && tx.transfer_count > 0 {
            ledger.transfer(tx.first_transfer_id).await?.address
        } else {
            String::new()
        };
        transfers.push(project(tx, address));
    }

    Ok(transfers)
}

fn project(tx: &LedgerTransaction, address: String) -> TransferRecord {
    let payment_id = payment_id_from_extra(&tx.extra)
        .filter(|id| !id.is_zero())
        .map(|id| id.to_hex())
        .unwrap_or_default();

    TransferRecord {
        time: tx.timestamp,
        output: tx.direction.is_outgoing(),
        transaction_hash: tx.hash.to_hex(),
        amount: tx.amount,
        fee: tx.fee,
        payment_id,
        address,
        block_index: tx.block_height.map(u64::from).unwrap_or_default(),
        unlock_time: tx.unlock_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::test_util::*;
    use crate::types::{LedgerTransfer, TransactionState};

    fn transfer(address: &str, amount: u64) -> LedgerTransfer {
        LedgerTransfer {
            address: address.into(),
            amount,
        }
    }

    #[tokio::test]
    async fn projects_settled_transactions_in_order() {
        let ledger = MemoryLedger::builder()
            .with_transaction(with_hash(incoming_tx(500, Some(10), extra_for(7)), 1), Vec::new())
            .with_transaction(incoming_tx(1, None, Vec::new()), Vec::new())
            .with_transaction(
                with_hash(outgoing_tx(1_010, 10, Some(12), Vec::new()), 2),
                vec![transfer("FIRST", 600), transfer("SECOND", 400)],
            )
            .with_transaction(
                with_state(incoming_tx(3, Some(13), Vec::new()), TransactionState::Deleted),
                Vec::new(),
            )
            .build();

        let transfers = list_transfers(&ledger).await.unwrap();
        assert_eq!(transfers.len(), 2);

        assert_eq!(
            transfers[0],
            TransferRecord {
                time: 1_700_000_000,
                output: false,
                transaction_hash: hex::encode([1; 32]),
                amount: 500,
                fee: 0,
                payment_id: payment_id_from_byte(7).to_hex(),
                address: String::new(),
                block_index: 10,
                unlock_time: 0,
            }
        );

        let sent = &transfers[1];
        assert!(sent.output);
        assert_eq!(sent.amount, 1_010);
        assert_eq!(sent.fee, 10);
        assert_eq!(sent.address, "FIRST");
        assert_eq!(sent.payment_id, "");
        assert_eq!(sent.block_index, 12);
    }

    #[tokio::test]
    async fn zero_payment_id_projects_as_empty() {
        let ledger = MemoryLedger::builder()
            .with_transaction(incoming_tx(5, Some(1), extra_for(0)), Vec::new())
            .build();
        let transfers = list_transfers(&ledger).await.unwrap();
        assert_eq!(transfers[0].payment_id, "");
    }

    #[tokio::test]
    async fn outgoing_without_transfers_has_empty_address() {
        let ledger = MemoryLedger::builder()
            .with_transaction(outgoing_tx(5, 1, Some(1), Vec::new()), Vec::new())
            .build();
        let transfers = list_transfers(&ledger).await.unwrap();
        assert_eq!(transfers[0].address, "");
        assert!(transfers[0].output);
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let record = project(&incoming_tx(1, Some(2), Vec::new()), String::new());
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "time",
            "output",
            "transactionHash",
            "amount",
            "fee",
            "paymentId",
            "address",
            "blockIndex",
            "unlockTime",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
