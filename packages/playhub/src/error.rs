use thiserror::Error;

use crate::math::bn::U256;

pub type PlayResult<T = ()> = Result<T, PlayError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),
    /// Gas estimation or submission failed before the transaction reached a node.
    #[error("transaction failed: {0}")]
    Transaction(String),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("math error")]
    Math,
}

/// Bad user input. Resolved where it is raised, never reported globally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("amount must be greater than zero")]
    InvalidAmount,
    #[error("invalid decimal amount: {0}")]
    InvalidDecimal(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("amount {amount} exceeds balance {balance}")]
    AmountExceedsBalance { amount: U256, balance: U256 },
    #[error("invalid plan id: {0}")]
    InvalidPlan(u8),
    #[error("slippage {0} bps is out of range")]
    InvalidSlippage(u16),
    #[error("an identical operation is already in flight")]
    AlreadyInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("{}", revert_message(.reason))]
    Reverted { reason: Option<String> },
    #[error("contract is paused")]
    Paused,
    #[error("insufficient allowance")]
    InsufficientAllowance,
    #[error("unexpected return value from {function}")]
    UnexpectedReturn { function: String },
    #[error("call rejected by node: {0}")]
    Call(String),
}

fn revert_message(reason: &Option<String>) -> &str {
    reason.as_deref().unwrap_or("execution reverted")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("rpc endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("request timed out")]
    Timeout,
    #[error("block not found")]
    BlockNotFound,
    #[error("no receipt for {hash} before the confirmation deadline")]
    ConfirmationTimeout { hash: String },
    #[error("stopped waiting for {hash}: cancelled")]
    WaitCancelled { hash: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("wallet not connected")]
    NotConnected,
    #[error("user rejected the request")]
    UserRejected,
    #[error("wallet has not authorized this account")]
    Unauthorized,
    #[error("insufficient funds for gas")]
    InsufficientGasFunds,
    #[error("wrong network: expected chain {expected}, wallet is on {actual}")]
    WrongNetwork { expected: u64, actual: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(String),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
    #[error("{0} is set to the zero address")]
    ZeroAddress(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Validation,
    Contract,
    Network,
    UserRejected,
    Wallet,
    TransactionFailed,
    Config,
    Storage,
    Math,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Contract => "CONTRACT_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::UserRejected => "USER_REJECTED",
            ErrorKind::Wallet => "WALLET_ERROR",
            ErrorKind::TransactionFailed => "TRANSACTION_FAILED",
            ErrorKind::Config => "CONFIG_ERROR",
            ErrorKind::Storage => "STORAGE_ERROR",
            ErrorKind::Math => "MATH_ERROR",
        }
    }
}

impl PlayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlayError::Validation(_) => ErrorKind::Validation,
            PlayError::Contract(_) => ErrorKind::Contract,
            PlayError::Network(_) => ErrorKind::Network,
            PlayError::Wallet(WalletError::UserRejected) => ErrorKind::UserRejected,
            PlayError::Wallet(_) => ErrorKind::Wallet,
            PlayError::Transaction(_) => ErrorKind::TransactionFailed,
            PlayError::Config(_) => ErrorKind::Config,
            PlayError::Storage(_) => ErrorKind::Storage,
            PlayError::Math => ErrorKind::Math,
        }
    }

    /// Node-side hiccups that a later attempt may not see again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlayError::Network(
                NetworkError::Unreachable(_) | NetworkError::Timeout | NetworkError::BlockNotFound
            )
        )
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, PlayError::Wallet(WalletError::UserRejected))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            PlayError::Wallet(WalletError::UserRejected).kind().as_str(),
            "USER_REJECTED"
        );
        assert_eq!(
            PlayError::Transaction("gas required exceeds allowance".into())
                .kind()
                .as_str(),
            "TRANSACTION_FAILED"
        );
        assert_eq!(
            PlayError::Wallet(WalletError::NotConnected).kind(),
            ErrorKind::Wallet
        );
    }

    #[test]
    fn transient() {
        assert!(PlayError::Network(NetworkError::Timeout).is_transient());
        assert!(PlayError::Network(NetworkError::BlockNotFound).is_transient());
        assert!(!PlayError::Network(NetworkError::ConfirmationTimeout {
            hash: "0x01".into()
        })
        .is_transient());
        assert!(!PlayError::Network(NetworkError::WaitCancelled {
            hash: "0x01".into()
        })
        .is_transient());
        assert!(!PlayError::Contract(ContractError::Paused).is_transient());
    }

    #[test]
    fn revert_reason_display() {
        let with_reason = ContractError::Reverted {
            reason: Some("Plan locked".into()),
        };
        assert_eq!(with_reason.to_string(), "Plan locked");
        assert_eq!(
            ContractError::Reverted { reason: None }.to_string(),
            "execution reverted"
        );
    }
}
