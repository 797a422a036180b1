pub mod error;
pub mod extra;
pub mod history;
pub mod ledger;
pub mod payment_id;
pub mod payments;
pub mod rpc;
pub mod transfer;
pub mod types;

#[cfg(test)]
mod test_util;

pub use error::CoreError;
pub use ledger::{Ledger, MemoryLedger, Node, SendPolicy};
pub use payment_id::PaymentId;
pub use rpc::{DispatchMode, Dispatcher, RpcError};
