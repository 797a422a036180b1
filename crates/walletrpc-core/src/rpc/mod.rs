//! Wallet JSON-RPC control plane.
//!
//! [`Dispatcher`] owns a mode-dependent [`MethodRegistry`] and turns raw
//! JSON-RPC 2.0 request bodies into response bodies. Handlers return
//! [`RpcError`] for every failure; the envelope layer maps it to the wire
//! error object.

pub mod commands;
mod dispatcher;
pub mod envelope;
pub mod error;
mod handlers;
pub mod registry;

pub use dispatcher::{Dispatcher, WalletContext};
pub use envelope::{RpcRequest, RpcResponse};
pub use error::RpcError;
pub use registry::{DispatchMode, MethodRegistry};
