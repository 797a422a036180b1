use crate::error::CoreError;

// ==============================================================================
// Error Codes
// ==============================================================================

pub const CODE_UNKNOWN_ERROR: i64 = -1;
pub const CODE_GENERIC_TRANSFER_ERROR: i64 = -4;
pub const CODE_WRONG_PAYMENT_ID: i64 = -5;

pub const CODE_PARSE_ERROR: i64 = -32700;
pub const CODE_INVALID_REQUEST: i64 = -32600;
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;
pub const CODE_INVALID_PARAMS: i64 = -32602;

// ==============================================================================
// Error Type
// ==============================================================================

/// Every failure a wallet RPC call can report. Each variant maps to exactly
/// one wire error code; the display text is the wire message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Carries the requested method name for logging.
    #[error("Method not found")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("{0}")]
    WrongPaymentId(String),

    #[error("{0}")]
    GenericTransferError(String),

    #[error("{0}")]
    UnknownError(String),
}

impl RpcError {
    pub fn code(&self) -> i64 {
        match self {
            Self::ParseError(_) => CODE_PARSE_ERROR,
            Self::InvalidRequest(_) => CODE_INVALID_REQUEST,
            Self::MethodNotFound(_) => CODE_METHOD_NOT_FOUND,
            Self::InvalidParams(_) => CODE_INVALID_PARAMS,
            Self::WrongPaymentId(_) => CODE_WRONG_PAYMENT_ID,
            Self::GenericTransferError(_) => CODE_GENERIC_TRANSFER_ERROR,
            Self::UnknownError(_) => CODE_UNKNOWN_ERROR,
        }
    }
}

/// Collaborator failures that no handler anticipated surface as
/// `UnknownError` with the underlying message.
impl From<CoreError> for RpcError {
    fn from(err: CoreError) -> Self {
        Self::UnknownError(err.to_string())
    }
}
