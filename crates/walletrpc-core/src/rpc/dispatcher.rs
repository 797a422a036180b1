//! Request routing: envelope in, envelope out.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::envelope::{parse_request, RejectedRequest, RpcRequest, RpcResponse};
use super::error::RpcError;
use super::registry::{DispatchMode, MethodRegistry};
use crate::ledger::{Ledger, Node};

/// Collaborators every handler runs against.
#[derive(Clone)]
pub struct WalletContext {
    pub ledger: Arc<dyn Ledger>,
    pub node: Arc<dyn Node>,
    /// Cancelled when the process shuts down; releases pending transfer waits.
    pub shutdown: CancellationToken,
}

/// Routes wallet RPC calls to their handlers. Safe to share across tasks;
/// the method table never changes after construction.
pub struct Dispatcher {
    registry: MethodRegistry,
    context: WalletContext,
}

impl Dispatcher {
    pub fn new(
        mode: DispatchMode,
        ledger: Arc<dyn Ledger>,
        node: Arc<dyn Node>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry: MethodRegistry::new(mode),
            context: WalletContext {
                ledger,
                node,
                shutdown,
            },
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.registry.mode()
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    /// Run one method call.
    pub async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let handler = self
            .registry
            .get(method)
            .ok_or_else(|| RpcError::MethodNotFound(method.to_owned()))?;
        handler(&self.context, params).await
    }

    pub async fn handle(&self, request: RpcRequest) -> RpcResponse {
        debug!(rpc.method = %request.method, rpc.id = %request.id, "dispatching call");
        let outcome = self.dispatch(&request.method, request.params).await;
        if let Err(err) = &outcome {
            debug!(
                rpc.method = %request.method,
                rpc.id = %request.id,
                code = err.code(),
                error = %err,
                "call failed"
            );
        }
        RpcResponse {
            id: request.id,
            outcome,
        }
    }

    /// Full round trip from a raw request body to a serialized response.
    pub async fn handle_body(&self, body: &str) -> String {
        let response = match parse_request(body) {
            Ok(request) => self.handle(request).await,
            Err(rejected) => {
                debug!(rpc.id = %rejected.id, error = %rejected.error, "rejected request");
                rejected.into()
            }
        };
        response.to_body()
    }

    /// Like [`Dispatcher::handle_body`] for a raw HTTP body. Bytes that are
    /// not valid UTF-8 are a parse error.
    pub async fn handle_bytes(&self, body: &[u8]) -> String {
        match std::str::from_utf8(body) {
            Ok(body) => self.handle_body(body).await,
            Err(err) => {
                debug!(error = %err, "rejected non UTF-8 request body");
                RpcResponse::from(RejectedRequest {
                    id: Value::Null,
                    error: RpcError::ParseError(err.to_string()),
                })
                .to_body()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::test_util::*;

    fn dispatcher(mode: DispatchMode, ledger: MemoryLedger) -> Dispatcher {
        let ledger = Arc::new(ledger);
        Dispatcher::new(mode, ledger.clone(), ledger, CancellationToken::new())
    }

    fn wallet() -> MemoryLedger {
        MemoryLedger::builder()
            .address("W")
            .with_transaction(incoming_tx(700, Some(10), extra_for(1)), Vec::new())
            .with_transaction(incoming_tx(300, None, Vec::new()), Vec::new())
            .build()
    }

    #[tokio::test]
    async fn getaddress_round_trip() {
        let dispatcher = dispatcher(DispatchMode::Native, wallet());
        let body = dispatcher
            .handle_body(r#"{"jsonrpc":"2.0","id":1,"method":"getaddress","params":{}}"#)
            .await;
        let response: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            response,
            json!({"jsonrpc": "2.0", "id": 1, "result": {"address": "W"}})
        );
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let dispatcher = dispatcher(DispatchMode::Native, wallet());
        let err = dispatcher
            .dispatch("transfer_split", json!({}))
            .await
            .expect_err("native mode has no transfer_split");
        assert_eq!(err, RpcError::MethodNotFound("transfer_split".into()));

        let err = dispatcher
            .dispatch("get_bulk_payments", json!({}))
            .await
            .expect_err("native mode has no get_bulk_payments");
        assert_eq!(err.code(), -32601);
    }

    #[tokio::test]
    async fn balance_shape_follows_mode() {
        let native = dispatcher(DispatchMode::Native, wallet());
        assert_eq!(
            native.dispatch("getbalance", json!({})).await.unwrap(),
            json!({"locked_amount": 300, "available_balance": 700})
        );

        let compat = dispatcher(DispatchMode::Compatibility, wallet());
        assert_eq!(
            compat.dispatch("getbalance", json!({})).await.unwrap(),
            json!({"balance": 1_000, "unlocked_balance": 700})
        );
    }

    #[tokio::test]
    async fn compatibility_only_methods_succeed() {
        let compat = dispatcher(DispatchMode::Compatibility, wallet());
        let split = compat
            .dispatch("transfer_split", json!({"anything": [1, 2, 3]}))
            .await
            .expect("transfer_split must succeed");
        assert_eq!(split["tx_hash_list"], json!([]));

        let bulk = compat
            .dispatch("get_bulk_payments", json!({"payment_ids": [], "min_block_height": 0}))
            .await
            .expect("get_bulk_payments must succeed");
        assert_eq!(bulk["payments"].as_array().map(Vec::len), Some(1));
        assert_eq!(bulk["payments"][0]["payment_id"], json!(payment_id_from_byte(1).to_hex()));
    }

    #[tokio::test]
    async fn bad_params_are_invalid_params() {
        let dispatcher = dispatcher(DispatchMode::Native, wallet());
        let err = dispatcher
            .dispatch("get_payments", json!({"payment_id": 12}))
            .await
            .expect_err("numeric payment id must not decode");
        assert!(matches!(err, RpcError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn store_without_wallet_file_is_unknown_error() {
        let dispatcher = dispatcher(DispatchMode::Native, wallet());
        let err = dispatcher.dispatch("store", json!({})).await.expect_err("must fail");
        assert_eq!(
            err,
            RpcError::UnknownError("Couldn't save wallet: no wallet file configured".into())
        );
    }

    #[tokio::test]
    async fn height_comes_from_node() {
        let dispatcher = dispatcher(DispatchMode::Native, wallet());
        assert_eq!(
            dispatcher.dispatch("get_height", Value::Null).await.unwrap(),
            json!({"height": 10})
        );
    }

    #[tokio::test]
    async fn invalid_utf8_inside_a_string_is_parse_error() {
        let dispatcher = dispatcher(DispatchMode::Native, wallet());
        let mut body = br#"{"id":3,"method":"get_payments","params":{"payment_id":""#.to_vec();
        body.extend_from_slice(&[0xff, 0xfe]);
        body.extend_from_slice(br#""}}"#);

        let response: Value = serde_json::from_str(&dispatcher.handle_bytes(&body).await).unwrap();
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], json!(-32700));
    }

    #[tokio::test]
    async fn valid_bytes_dispatch_normally() {
        let dispatcher = dispatcher(DispatchMode::Native, wallet());
        let body = br#"{"id":4,"method":"getaddress"}"#;
        let response: Value = serde_json::from_str(&dispatcher.handle_bytes(body).await).unwrap();
        assert_eq!(response["result"], json!({"address": "W"}));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let dispatcher = dispatcher(DispatchMode::Native, wallet());
        let body = dispatcher.handle_body("{").await;
        let response: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], json!(-32700));
    }
}
