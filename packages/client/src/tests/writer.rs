use std::time::Duration;

use playhub::{
    error::{ContractError, ErrorKind, NetworkError, PlayError, WalletError},
    types::{PlanId, Value},
};
use pretty_assertions::assert_eq;

use super::setup::{setup, units, user};
use crate::{
    cancel::CancellationToken,
    clock::Clock,
    contracts::{Call, Contract, Query, TxKind},
    store::NotificationLevel,
    testutils::{test_addresses, ReceiptOutcome},
    transport::RpcError,
    writer::{TxHandle, TxStatus},
};

fn approve_call(amount: u64) -> Call {
    Call::approve(
        Contract::PlayToken,
        test_addresses().active_pool,
        units(amount),
    )
}

#[test]
fn confirmation_invalidates_dependent_reads() {
    let env = setup();
    let balance = Query::balance_of(Contract::PlayToken)
        .resolve(Some(user()))
        .unwrap();
    env.chain
        .set_value(Contract::ActivePool, "totalActive", Value::uint(5_u64));
    env.reader.balance_of(Contract::PlayToken, Some(user()));
    env.reader.total_active();
    assert!(!env.cache.borrow().get(&balance).unwrap().stale);

    let handle = env
        .writer
        .execute(user(), approve_call(10), &CancellationToken::new());

    assert!(handle.status.is_confirmed());
    assert!(env.cache.borrow().get(&balance).unwrap().stale);
    let total_active = Query::total_active().resolve(None).unwrap();
    assert!(!env.cache.borrow().get(&total_active).unwrap().stale);
}

#[test]
fn confirmed_write_clears_record_and_notifies_once() {
    let env = setup();

    let handle = env.writer.execute(
        user(),
        Call::upgrade_plan(PlanId::Plan2),
        &CancellationToken::new(),
    );

    assert!(handle.status.is_confirmed());
    assert!(env.store.state().pending_transactions.is_empty());
    let notifications = env.store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Success);
    assert_eq!(notifications[0].title, "Plan upgrade confirmed");
    assert_eq!(notifications[0].tx_hash, handle.hash);
}

#[test]
fn submit_records_pending_transaction() {
    let env = setup();
    env.clock.advance(Duration::from_secs(42));

    let handle = env.writer.submit(user(), Call::deposit(units(100), PlanId::Plan1));

    assert_eq!(handle.status, TxStatus::Mining);
    let pending = env.store.pending(handle.id).unwrap();
    assert_eq!(pending.kind, TxKind::Deposit);
    assert_eq!(pending.hash, handle.hash);
    assert_eq!(pending.timestamp, Duration::from_secs(42));
    assert_eq!(pending.amount, Some(units(100)));
    assert_eq!(pending.plan, Some(PlanId::Plan1));
}

#[test]
fn block_not_found_twice_then_confirmed() {
    let env = setup();
    env.chain.script_receipts([
        ReceiptOutcome::BlockNotFound,
        ReceiptOutcome::BlockNotFound,
        ReceiptOutcome::Success,
    ]);

    let handle = env
        .writer
        .execute(user(), Call::checkpoint(), &CancellationToken::new());

    assert!(handle.status.is_confirmed());
    assert_eq!(env.chain.receipt_polls(), 3);
    assert_eq!(
        env.clock.sleeps(),
        vec![Duration::from_secs(3), Duration::from_secs(3)]
    );
}

#[test]
fn block_not_found_beyond_retries_fails() {
    let env = setup();
    env.chain
        .script_receipts(std::iter::repeat(ReceiptOutcome::BlockNotFound).take(4));

    let handle = env
        .writer
        .execute(user(), Call::checkpoint(), &CancellationToken::new());

    assert_eq!(
        handle.status,
        TxStatus::Failed(PlayError::Network(NetworkError::BlockNotFound))
    );
    assert_eq!(env.chain.receipt_polls(), 4);
    assert!(env.store.state().pending_transactions.is_empty());
    assert_eq!(env.store.notifications()[0].level, NotificationLevel::Error);
}

#[test]
fn transient_receipt_errors_keep_polling() {
    let env = setup();
    env.chain.script_receipts([
        ReceiptOutcome::Timeout,
        ReceiptOutcome::Pending,
        ReceiptOutcome::Timeout,
        ReceiptOutcome::Success,
    ]);

    let handle = env
        .writer
        .execute(user(), Call::claim_rewards(), &CancellationToken::new());

    assert!(handle.status.is_confirmed());
    assert_eq!(env.chain.receipt_polls(), 4);
}

#[test]
fn revert_carries_reason() {
    let env = setup();
    env.chain
        .script_receipts([ReceiptOutcome::Revert(Some("Not registered".into()))]);

    let handle = env
        .writer
        .execute(user(), Call::claim_referral_rewards(), &CancellationToken::new());

    assert_eq!(
        handle.status,
        TxStatus::Failed(PlayError::Contract(ContractError::Reverted {
            reason: Some("Not registered".into())
        }))
    );
    let notifications = env.store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Referral claim failed");
    assert_eq!(notifications[0].message, "contract error: Not registered");
}

#[test]
fn user_rejection_is_not_retried() {
    let env = setup();
    env.chain.fail_next_send(RpcError::UserRejected);

    let handle = env.writer.submit(user(), approve_call(1));

    assert_eq!(
        handle.status,
        TxStatus::Failed(PlayError::Wallet(WalletError::UserRejected))
    );
    assert_eq!(handle.hash, None);
    assert_eq!(env.chain.sent().len(), 1);
    assert!(env.store.state().pending_transactions.is_empty());
    let notifications = env.store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Transaction rejected");
}

#[test]
fn unauthorized_is_retried_once() {
    let env = setup();
    env.chain.fail_next_send(RpcError::Unauthorized);

    let handle = env.writer.submit(user(), approve_call(1));

    assert_eq!(handle.status, TxStatus::Mining);
    assert_eq!(env.chain.sent().len(), 2);
    assert_eq!(env.clock.sleeps(), vec![Duration::from_secs(1)]);
}

#[test]
fn unauthorized_twice_fails() {
    let env = setup();
    env.chain.fail_next_send(RpcError::Unauthorized);
    env.chain.fail_next_send(RpcError::Unauthorized);

    let handle = env.writer.submit(user(), approve_call(1));

    assert_eq!(
        handle.status,
        TxStatus::Failed(PlayError::Wallet(WalletError::Unauthorized))
    );
    assert_eq!(env.chain.sent().len(), 2);
}

#[test]
fn gas_estimation_failure_is_transaction_failed() {
    let env = setup();
    env.chain
        .fail_next_send(RpcError::GasEstimation("gas required exceeds allowance".into()));

    let handle = env.writer.submit(user(), Call::move_warm_up_to_active_pool());

    let error = handle.status.error().unwrap();
    assert_eq!(error.kind(), ErrorKind::TransactionFailed);
    assert_eq!(error.kind().as_str(), "TRANSACTION_FAILED");
}

#[test]
fn deadline_is_inconclusive_and_resumable() {
    let env = setup();
    // Polls at 0s, 3s, ..., 120s.
    env.chain
        .script_receipts(std::iter::repeat(ReceiptOutcome::Pending).take(41));

    let mut handle = env.writer.submit(user(), Call::claim_rewards());
    let status = env.writer.wait(&mut handle, &CancellationToken::new());

    assert_eq!(status, TxStatus::Inconclusive);
    assert_eq!(env.chain.receipt_polls(), 41);
    assert_eq!(env.clock.now(), Duration::from_secs(120));
    // The record stays for a later resume.
    assert_eq!(env.store.pending(handle.id).unwrap().hash, handle.hash);
    let notifications = env.store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Info);

    let status = env.writer.wait(&mut handle, &CancellationToken::new());
    assert!(status.is_confirmed());
    assert!(env.store.pending(handle.id).is_none());
    assert_eq!(env.store.notifications().len(), 2);
}

#[test]
fn cancellation_leaves_record_untouched() {
    let env = setup();
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();

    let mut handle = env.writer.submit(user(), Call::claim_rewards());
    drop(guard);
    let status = env.writer.wait(&mut handle, &token);

    assert_eq!(status, TxStatus::Inconclusive);
    assert_eq!(env.chain.receipt_polls(), 0);
    assert!(env.store.pending(handle.id).is_some());
    assert!(env.store.notifications().is_empty());
}

#[test]
fn wait_on_failed_handle_is_a_no_op() {
    let env = setup();
    env.chain.fail_next_send(RpcError::UserRejected);
    let mut handle = env.writer.submit(user(), approve_call(1));

    let status = env.writer.wait(&mut handle, &CancellationToken::new());

    assert_eq!(
        status,
        TxStatus::Failed(PlayError::Wallet(WalletError::UserRejected))
    );
    assert_eq!(env.chain.receipt_polls(), 0);
    assert_eq!(env.store.notifications().len(), 1);
}

#[test]
fn idle_handle_is_left_alone() {
    let env = setup();
    let mut handle = TxHandle::idle(TxKind::ClaimRewards);

    assert_eq!(
        env.writer.wait(&mut handle, &CancellationToken::new()),
        TxStatus::Idle
    );
    assert_eq!(env.chain.network_calls(), 0);
    assert!(env.store.state().pending_transactions.is_empty());
}
