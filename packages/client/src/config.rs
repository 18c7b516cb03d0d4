use std::str::FromStr;

use playhub::{
    error::{ConfigError, PlayError, PlayResult, WalletError},
    math::reward::RateTable,
    types::Address,
    validate,
};
use tracing::info;

use crate::contracts::Contract;

pub const RPC_URL_VAR: &str = "PLAYHUB_RPC_URL";
pub const CHAIN_ID_VAR: &str = "PLAYHUB_CHAIN_ID";
pub const WALLET_CONNECT_PROJECT_ID_VAR: &str = "PLAYHUB_WALLETCONNECT_PROJECT_ID";
pub const RATE_TABLE_VAR: &str = "PLAYHUB_RATE_TABLE";

pub const ACTIVE_POOL_VAR: &str = "PLAYHUB_ACTIVE_POOL_ADDRESS";
pub const USER_CONTRACT_VAR: &str = "PLAYHUB_USER_CONTRACT_ADDRESS";
pub const ORACLE_VAR: &str = "PLAYHUB_ORACLE_ADDRESS";
pub const PLAY_TOKEN_VAR: &str = "PLAYHUB_PLAY_TOKEN_ADDRESS";
pub const USDT_VAR: &str = "PLAYHUB_USDT_ADDRESS";
pub const PLAY_SWAP_VAR: &str = "PLAYHUB_PLAY_SWAP_ADDRESS";

/// Deployed addresses of the contract set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractAddresses {
    pub active_pool: Address,
    pub user_contract: Address,
    pub oracle: Address,
    pub play_token: Address,
    pub usdt: Address,
    pub play_swap: Address,
}

impl ContractAddresses {
    pub fn address_of(&self, contract: Contract) -> Address {
        match contract {
            Contract::ActivePool => self.active_pool,
            Contract::UserContract => self.user_contract,
            Contract::Oracle => self.oracle,
            Contract::PlayToken => self.play_token,
            Contract::Usdt => self.usdt,
            Contract::PlaySwap => self.play_swap,
        }
    }

    /// Inverse of [`ContractAddresses::address_of`].
    pub fn contract_at(&self, address: Address) -> Option<Contract> {
        [
            Contract::ActivePool,
            Contract::UserContract,
            Contract::Oracle,
            Contract::PlayToken,
            Contract::Usdt,
            Contract::PlaySwap,
        ]
        .into_iter()
        .find(|contract| self.address_of(*contract) == address)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    pub wallet_connect_project_id: String,
    pub contracts: ContractAddresses,
    pub rate_table: RateTable,
}

impl Config {
    pub fn from_env() -> PlayResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PlayResult<Self> {
        let required = |key: &str| -> PlayResult<String> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::Missing(key.to_string()).into())
        };
        let address = |key: &str| -> PlayResult<Address> {
            let raw = required(key)?;
            let address = Address::from_str(&raw).map_err(|_| invalid(key, &raw))?;
            validate!(!address.is_zero(), ConfigError::ZeroAddress(key.to_string()))?;
            Ok(address)
        };

        let rpc_url = required(RPC_URL_VAR)?;
        validate!(
            rpc_url.starts_with("http://")
                || rpc_url.starts_with("https://")
                || rpc_url.starts_with("ws://")
                || rpc_url.starts_with("wss://"),
            invalid(RPC_URL_VAR, &rpc_url)
        )?;

        let raw_chain_id = required(CHAIN_ID_VAR)?;
        let chain_id = raw_chain_id
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| invalid(CHAIN_ID_VAR, &raw_chain_id))?;

        let wallet_connect_project_id = required(WALLET_CONNECT_PROJECT_ID_VAR)?;

        let contracts = ContractAddresses {
            active_pool: address(ACTIVE_POOL_VAR)?,
            user_contract: address(USER_CONTRACT_VAR)?,
            oracle: address(ORACLE_VAR)?,
            play_token: address(PLAY_TOKEN_VAR)?,
            usdt: address(USDT_VAR)?,
            play_swap: address(PLAY_SWAP_VAR)?,
        };

        let rate_table = match lookup(RATE_TABLE_VAR).map(|v| v.trim().to_string()) {
            Some(raw) if !raw.is_empty() => {
                RateTable::from_str(&raw).map_err(|_| invalid(RATE_TABLE_VAR, &raw))?
            }
            _ => RateTable::default(),
        };

        info!(
            "loaded configuration for chain {} ({:?} rate table)",
            chain_id, rate_table
        );

        Ok(Config {
            rpc_url,
            chain_id,
            wallet_connect_project_id,
            contracts,
            rate_table,
        })
    }

    /// Fails when the wallet reports a chain other than the configured one.
    pub fn ensure_chain(&self, wallet_chain_id: u64) -> PlayResult {
        validate!(
            wallet_chain_id == self.chain_id,
            WalletError::WrongNetwork {
                expected: self.chain_id,
                actual: wallet_chain_id,
            }
        )
    }
}

fn invalid(key: &str, value: &str) -> PlayError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}
