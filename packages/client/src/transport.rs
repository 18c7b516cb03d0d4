use playhub::{
    error::{ContractError, NetworkError, PlayError, WalletError},
    types::{Address, TxHash, Value},
};
use thiserror::Error;

use crate::contracts::ContractCall;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-1193 "unauthorized": the account has not been exposed to the dapp yet.
pub const UNAUTHORIZED_CODE: i64 = 4100;

/// Failure reported by the wallet or RPC endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("request timed out")]
    Timeout,
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("block not found")]
    BlockNotFound,
    #[error("user rejected the request")]
    UserRejected,
    #[error("unauthorized")]
    Unauthorized,
    #[error("insufficient funds for gas")]
    InsufficientFunds,
    #[error("execution reverted")]
    Reverted(Option<String>),
    #[error("gas estimation failed: {0}")]
    GasEstimation(String),
    #[error("invalid call: {0}")]
    InvalidCall(String),
}

impl RpcError {
    /// Classify a raw JSON-RPC / EIP-1193 error.
    pub fn from_code(code: i64, message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        match code {
            USER_REJECTED_CODE => RpcError::UserRejected,
            UNAUTHORIZED_CODE => RpcError::Unauthorized,
            _ if lower.contains("block not found") || lower.contains("header not found") => {
                RpcError::BlockNotFound
            }
            _ if lower.contains("timeout") || lower.contains("timed out") => RpcError::Timeout,
            _ if lower.contains("insufficient funds") => RpcError::InsufficientFunds,
            _ if lower.contains("execution reverted") => {
                let reason = message
                    .split_once("execution reverted:")
                    .map(|(_, reason)| reason.trim().to_string())
                    .filter(|reason| !reason.is_empty());
                RpcError::Reverted(reason)
            }
            _ if lower.contains("gas") => RpcError::GasEstimation(message.to_string()),
            _ => RpcError::InvalidCall(message.to_string()),
        }
    }
}

impl From<RpcError> for PlayError {
    fn from(error: RpcError) -> Self {
        match error {
            RpcError::Timeout => NetworkError::Timeout.into(),
            RpcError::Unreachable(endpoint) => NetworkError::Unreachable(endpoint).into(),
            RpcError::BlockNotFound => NetworkError::BlockNotFound.into(),
            RpcError::UserRejected => WalletError::UserRejected.into(),
            RpcError::Unauthorized => WalletError::Unauthorized.into(),
            RpcError::InsufficientFunds => WalletError::InsufficientGasFunds.into(),
            RpcError::Reverted(reason) => revert_error(reason),
            RpcError::GasEstimation(message) => PlayError::Transaction(message),
            RpcError::InvalidCall(message) => ContractError::Call(message).into(),
        }
    }
}

/// Map a revert reason onto the contract error it describes.
pub fn revert_error(reason: Option<String>) -> PlayError {
    match reason.as_deref() {
        Some(r) if r.to_ascii_lowercase().contains("paused") => ContractError::Paused.into(),
        Some(r) if r.to_ascii_lowercase().contains("insufficient allowance") => {
            ContractError::InsufficientAllowance.into()
        }
        _ => ContractError::Reverted { reason }.into(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub hash: TxHash,
    pub block_number: u64,
    pub success: bool,
    pub revert_reason: Option<String>,
}

/// Read-only contract calls (`eth_call`).
pub trait ContractCaller {
    fn call(&self, call: &ContractCall) -> Result<Value, RpcError>;
}

/// Wallet-signed submissions and receipt lookups.
pub trait TransactionSender {
    fn send(&self, from: Address, call: &ContractCall) -> Result<TxHash, RpcError>;

    /// `Ok(None)` while the transaction is not yet mined.
    fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, RpcError>;
}
