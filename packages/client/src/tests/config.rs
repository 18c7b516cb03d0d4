use std::collections::HashMap;

use playhub::{
    error::{ConfigError, PlayError, WalletError},
    math::reward::RateTable,
    types::Address,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

use crate::{
    config::{
        Config, ACTIVE_POOL_VAR, CHAIN_ID_VAR, PLAY_SWAP_VAR, RATE_TABLE_VAR, RPC_URL_VAR,
        WALLET_CONNECT_PROJECT_ID_VAR,
    },
    contracts::Contract,
};

fn env() -> HashMap<&'static str, String> {
    HashMap::from([
        ("PLAYHUB_RPC_URL", "https://bsc-dataseed.example.org".to_string()),
        ("PLAYHUB_CHAIN_ID", "56".to_string()),
        ("PLAYHUB_WALLETCONNECT_PROJECT_ID", "c0ffee".to_string()),
        ("PLAYHUB_ACTIVE_POOL_ADDRESS", format!("0x{}", "a1".repeat(20))),
        ("PLAYHUB_USER_CONTRACT_ADDRESS", format!("0x{}", "a2".repeat(20))),
        ("PLAYHUB_ORACLE_ADDRESS", format!("0x{}", "a3".repeat(20))),
        ("PLAYHUB_PLAY_TOKEN_ADDRESS", format!("0x{}", "A4".repeat(20))),
        ("PLAYHUB_USDT_ADDRESS", format!("0x{}", "a5".repeat(20))),
        ("PLAYHUB_PLAY_SWAP_ADDRESS", format!("0x{}", "a6".repeat(20))),
    ])
}

fn load(vars: &HashMap<&'static str, String>) -> Result<Config, PlayError> {
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn loads_complete_environment() {
    let config = load(&env()).unwrap();

    assert_eq!(config.chain_id, 56);
    assert_eq!(config.rpc_url, "https://bsc-dataseed.example.org");
    assert_eq!(config.rate_table, RateTable::Standard);
    assert_eq!(
        config.contracts.address_of(Contract::PlayToken),
        Address::from_bytes([0xa4; 20])
    );
    assert_eq!(
        config.contracts.contract_at(Address::from_bytes([0xa6; 20])),
        Some(Contract::PlaySwap)
    );
}

#[test_case(RPC_URL_VAR ; "rpc url")]
#[test_case(CHAIN_ID_VAR ; "chain id")]
#[test_case(WALLET_CONNECT_PROJECT_ID_VAR ; "project id")]
#[test_case(PLAY_SWAP_VAR ; "play swap")]
fn missing_variable(key: &'static str) {
    let mut vars = env();
    vars.remove(key);

    assert_eq!(
        load(&vars),
        Err(PlayError::Config(ConfigError::Missing(key.to_string())))
    );
}

#[test]
fn blank_variable_counts_as_missing() {
    let mut vars = env();
    vars.insert(WALLET_CONNECT_PROJECT_ID_VAR, "  ".to_string());

    assert_eq!(
        load(&vars),
        Err(PlayError::Config(ConfigError::Missing(
            WALLET_CONNECT_PROJECT_ID_VAR.to_string()
        )))
    );
}

#[test]
fn zero_address_is_rejected() {
    let mut vars = env();
    vars.insert(ACTIVE_POOL_VAR, format!("0x{}", "0".repeat(40)));

    assert_eq!(
        load(&vars),
        Err(PlayError::Config(ConfigError::ZeroAddress(
            ACTIVE_POOL_VAR.to_string()
        )))
    );
}

#[test_case(ACTIVE_POOL_VAR, "0x1234" ; "short address")]
#[test_case(ACTIVE_POOL_VAR, "a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1" ; "unprefixed address")]
#[test_case(CHAIN_ID_VAR, "bsc" ; "non numeric chain")]
#[test_case(CHAIN_ID_VAR, "0" ; "zero chain")]
#[test_case(RPC_URL_VAR, "localhost:8545" ; "url without scheme")]
#[test_case(RATE_TABLE_VAR, "generous" ; "unknown rate table")]
fn malformed_variable(key: &'static str, value: &str) {
    let mut vars = env();
    vars.insert(key, value.to_string());

    assert_eq!(
        load(&vars),
        Err(PlayError::Config(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        }))
    );
}

#[test]
fn revised_rate_table_is_selectable() {
    let mut vars = env();
    vars.insert(RATE_TABLE_VAR, "Revised".to_string());

    assert_eq!(load(&vars).unwrap().rate_table, RateTable::Revised);
}

#[test]
fn wallet_on_other_chain_is_rejected() {
    let config = load(&env()).unwrap();

    assert_eq!(config.ensure_chain(56), Ok(()));
    assert_eq!(
        config.ensure_chain(1),
        Err(PlayError::Wallet(WalletError::WrongNetwork {
            expected: 56,
            actual: 1
        }))
    );
}
