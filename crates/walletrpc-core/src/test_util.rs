//! Shared test helpers for `walletrpc-core` unit tests.
//!
//! Builders for ledger transactions (`incoming_tx`, `outgoing_tx`) and
//! payment ids so tests across modules construct dummy data the same way.

use crate::extra::extra_with_payment_id;
use crate::payment_id::PaymentId;
use crate::types::{
    BlockHeight, Direction, LedgerTransaction, TransactionHash, TransactionId, TransactionState,
    TransferId,
};

// ==============================================================================
// Payment Id Helpers
// ==============================================================================

/// Create a deterministic `PaymentId` from a single distinguishing byte.
pub fn payment_id_from_byte(b: u8) -> PaymentId {
    PaymentId::from_bytes([b; 32])
}

/// Extra blob carrying the payment id built from `b`.
pub fn extra_for(b: u8) -> Vec<u8> {
    extra_with_payment_id(&payment_id_from_byte(b))
}

// ==============================================================================
// Transaction Builders
// ==============================================================================

/// A transaction with sane defaults. The ledger assigns `id` and the
/// transfer range on insertion.
pub fn make_tx(
    direction: Direction,
    amount: u64,
    height: Option<u64>,
    extra: Vec<u8>,
) -> LedgerTransaction {
    let seed = (amount as u8) ^ (height.unwrap_or(0) as u8) ^ 0x5a;
    LedgerTransaction {
        id: TransactionId(0),
        hash: TransactionHash([seed; 32]),
        state: TransactionState::Active,
        block_height: height.map(BlockHeight),
        timestamp: 1_700_000_000,
        direction,
        amount,
        fee: 0,
        unlock_time: 0,
        extra,
        first_transfer_id: TransferId(0),
        transfer_count: 0,
    }
}

/// An active incoming transaction.
pub fn incoming_tx(amount: u64, height: Option<u64>, extra: Vec<u8>) -> LedgerTransaction {
    make_tx(Direction::Incoming, amount, height, extra)
}

/// An active outgoing transaction; `amount` includes `fee`.
pub fn outgoing_tx(amount: u64, fee: u64, height: Option<u64>, extra: Vec<u8>) -> LedgerTransaction {
    LedgerTransaction {
        fee,
        ..make_tx(Direction::Outgoing, amount, height, extra)
    }
}

/// Override the hash so tests can tell records apart.
pub fn with_hash(mut tx: LedgerTransaction, b: u8) -> LedgerTransaction {
    tx.hash = TransactionHash([b; 32]);
    tx
}

pub fn with_state(mut tx: LedgerTransaction, state: TransactionState) -> LedgerTransaction {
    tx.state = state;
    tx
}
