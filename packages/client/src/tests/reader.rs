use std::time::Duration;

use playhub::{
    error::{ContractError, PlayError, WalletError},
    types::{OraclePrice, PlanId, UserPosition, Value},
    U256,
};
use pretty_assertions::assert_eq;

use super::setup::{setup, units, user};
use crate::{
    contracts::{Contract, Query},
    reader::{ReadState, SwapPreview},
    transport::RpcError,
};

#[test]
fn account_queries_wait_for_an_account() {
    let env = setup();

    assert_eq!(env.reader.balance_of(Contract::PlayToken, None), ReadState::Pending);
    assert_eq!(env.reader.is_registered(None), ReadState::Pending);
    assert!(env.chain.reads().is_empty());
}

#[test]
fn fresh_values_come_from_cache() {
    let env = setup();
    env.chain.set_balance(Contract::PlayToken, user(), units(5));

    assert_eq!(
        env.reader.balance_of(Contract::PlayToken, Some(user())),
        ReadState::Ready(units(5))
    );

    env.chain.set_balance(Contract::PlayToken, user(), units(9));
    env.clock.advance(Duration::from_secs(4));
    assert_eq!(
        env.reader.balance_of(Contract::PlayToken, Some(user())),
        ReadState::Ready(units(5))
    );
    assert_eq!(env.chain.read_count("balanceOf"), 1);

    env.clock.advance(Duration::from_secs(1));
    assert_eq!(
        env.reader.balance_of(Contract::PlayToken, Some(user())),
        ReadState::Ready(units(9))
    );
    assert_eq!(env.chain.read_count("balanceOf"), 2);
}

#[test]
fn cached_value_survives_failed_refetch() {
    let env = setup();
    env.chain.set_balance(Contract::Usdt, user(), units(70));
    assert_eq!(
        env.reader.balance_of(Contract::Usdt, Some(user())),
        ReadState::Ready(units(70))
    );

    env.clock.advance(Duration::from_secs(10));
    env.chain.fail_next_read(RpcError::InvalidCall("bad opcode".into()));

    assert_eq!(
        env.reader.balance_of(Contract::Usdt, Some(user())),
        ReadState::Ready(units(70))
    );
    assert_eq!(env.chain.read_count("balanceOf"), 2);
}

#[test]
fn failure_without_cached_value() {
    let env = setup();
    env.chain.fail_next_read(RpcError::InvalidCall("bad opcode".into()));

    assert_eq!(
        env.reader.total_active(),
        ReadState::Failed(PlayError::Contract(ContractError::Call("bad opcode".into())))
    );
    assert!(env.clock.sleeps().is_empty());
}

#[test]
fn transient_failures_are_retried_with_backoff() {
    let env = setup();
    env.chain.set_value(Contract::ActivePool, "totalActive", Value::uint(42_u64));
    env.chain.fail_next_read(RpcError::Timeout);
    env.chain.fail_next_read(RpcError::Unreachable("connection refused".into()));

    assert_eq!(env.reader.total_active(), ReadState::Ready(units(42)));
    assert_eq!(env.chain.read_count("totalActive"), 3);
    assert_eq!(
        env.clock.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[test]
fn focus_refetches_balances_but_not_registration() {
    let env = setup();
    env.chain.set_balance(Contract::PlayToken, user(), units(1));
    env.reader.balance_of(Contract::PlayToken, Some(user()));
    env.reader.is_registered(Some(user()));

    assert_eq!(env.reader.on_window_focus(), 1);

    env.reader.balance_of(Contract::PlayToken, Some(user()));
    env.reader.is_registered(Some(user()));
    assert_eq!(env.chain.read_count("balanceOf"), 2);
    assert_eq!(env.chain.read_count("isRegistered"), 1);

    assert_eq!(env.reader.on_reconnect(), 2);
}

#[test]
fn read_fresh_bypasses_cache() {
    let env = setup();
    let spender = env.addresses.active_pool;
    env.chain
        .set_allowance(Contract::PlayToken, user(), spender, units(3));
    env.reader.allowance(Contract::PlayToken, spender, Some(user()));

    env.chain
        .set_allowance(Contract::PlayToken, user(), spender, units(8));
    assert_eq!(
        env.reader.allowance_fresh(Contract::PlayToken, user(), spender),
        Ok(units(8))
    );
    // The fresh value replaced the cached one.
    assert_eq!(
        env.reader.allowance(Contract::PlayToken, spender, Some(user())),
        ReadState::Ready(units(8))
    );
    assert_eq!(env.chain.read_count("allowance"), 2);
}

#[test]
fn read_fresh_needs_an_account() {
    let env = setup();

    assert_eq!(
        env.reader.read_fresh(&Query::user_info(), None),
        Err(PlayError::Wallet(WalletError::NotConnected))
    );
}

#[test]
fn decodes_user_position() {
    let env = setup();
    env.chain.set_value(
        Contract::ActivePool,
        "userInfo",
        Value::Tuple(vec![
            Value::uint(100_u64),
            Value::uint(50_u64),
            Value::uint(0_u64),
            Value::uint(300_u64),
            Value::uint(1_u64),
            Value::uint(12_u64),
            Value::uint(7_u64),
            Value::uint(100_u64),
        ]),
    );

    assert_eq!(
        env.reader.user_position(Some(user())),
        ReadState::Ready(UserPosition {
            active_amount: units(100),
            principal: units(50),
            voucher_amount: U256::zero(),
            referral_cap: units(300),
            plan: PlanId::Plan1,
            last_processed_epoch: 12,
            pending_reward: units(7),
            logic_amount: units(100),
        })
    );
}

#[test]
fn malformed_return_is_a_contract_error() {
    let env = setup();
    env.chain
        .set_value(Contract::ActivePool, "userInfo", Value::uint(1_u64));

    assert_eq!(
        env.reader.user_position(Some(user())),
        ReadState::Failed(PlayError::Contract(ContractError::UnexpectedReturn {
            function: "userInfo".into()
        }))
    );
}

#[test]
fn combines_oracle_price_and_decimals() {
    let env = setup();
    env.chain
        .set_value(Contract::Oracle, "getPrice", Value::uint(U256::exp10(17)));
    env.chain.set_value(Contract::Oracle, "decimals0", Value::uint(18_u64));
    env.chain.set_value(Contract::Oracle, "decimals1", Value::uint(6_u64));

    assert_eq!(
        env.reader.oracle_price(),
        ReadState::Ready(OraclePrice {
            price: U256::exp10(17),
            decimals0: 18,
            decimals1: 6,
        })
    );
}

#[test]
fn oracle_decimals_beyond_u256_range_are_rejected() {
    let env = setup();
    env.chain
        .set_value(Contract::Oracle, "getPrice", Value::uint(U256::exp10(18)));
    env.chain.set_value(Contract::Oracle, "decimals0", Value::uint(18_u64));
    env.chain.set_value(Contract::Oracle, "decimals1", Value::uint(80_u64));

    assert_eq!(
        env.reader.oracle_price(),
        ReadState::Failed(PlayError::Contract(ContractError::UnexpectedReturn {
            function: "decimals1".into()
        }))
    );
}

#[test]
fn swap_preview() {
    let env = setup();
    env.chain.set_value(
        Contract::PlaySwap,
        "previewBuyWithDonation",
        Value::Tuple(vec![Value::uint(1_990_u64), Value::uint(10_u64)]),
    );

    assert_eq!(
        env.reader.preview_buy_with_donation(units(1_000)),
        ReadState::Ready(SwapPreview {
            play_out: units(1_990),
            donation: units(10),
        })
    );
}
