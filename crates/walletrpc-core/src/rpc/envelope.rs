//! JSON-RPC 2.0 request/response envelopes.
//!
//! The request `id` is passed through untouched, whatever JSON it is.
//! Absent or `null` params are treated as an empty object.

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::RpcError;

pub const JSONRPC_VERSION: &str = "2.0";

// ==============================================================================
// Request
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub id: Value,
    pub method: String,
    pub params: Value,
}

/// A request body that could not be turned into an [`RpcRequest`]. `id` is
/// whatever could be recovered from the body, `null` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRequest {
    pub id: Value,
    pub error: RpcError,
}

pub fn parse_request(body: &str) -> Result<RpcRequest, RejectedRequest> {
    let value: Value = serde_json::from_str(body).map_err(|e| RejectedRequest {
        id: Value::Null,
        error: RpcError::ParseError(e.to_string()),
    })?;

    let Value::Object(mut object) = value else {
        return Err(RejectedRequest {
            id: Value::Null,
            error: RpcError::InvalidRequest("request must be a JSON object".to_owned()),
        });
    };

    let id = object.remove("id").unwrap_or(Value::Null);
    let method = match object.remove("method") {
        Some(Value::String(method)) => method,
        _ => {
            return Err(RejectedRequest {
                id,
                error: RpcError::InvalidRequest("missing method name".to_owned()),
            });
        }
    };
    let params = match object.remove("params") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(params) => params,
    };

    Ok(RpcRequest { id, method, params })
}

// ==============================================================================
// Response
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    pub id: Value,
    pub outcome: Result<Value, RpcError>,
}

#[derive(Serialize)]
struct WireResponse<'a> {
    jsonrpc: &'static str,
    id: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<WireError>,
}

#[derive(Serialize)]
struct WireError {
    code: i64,
    message: String,
}

impl RpcResponse {
    pub fn to_value(&self) -> Value {
        let wire = match &self.outcome {
            Ok(result) => WireResponse {
                jsonrpc: JSONRPC_VERSION,
                id: &self.id,
                result: Some(result),
                error: None,
            },
            Err(err) => WireResponse {
                jsonrpc: JSONRPC_VERSION,
                id: &self.id,
                result: None,
                error: Some(WireError {
                    code: err.code(),
                    message: err.to_string(),
                }),
            },
        };
        // A struct of strings, integers and `Value`s always serializes.
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    pub fn to_body(&self) -> String {
        self.to_value().to_string()
    }
}

impl From<RejectedRequest> for RpcResponse {
    fn from(rejected: RejectedRequest) -> Self {
        Self {
            id: rejected.id,
            outcome: Err(rejected.error),
        }
    }
}
