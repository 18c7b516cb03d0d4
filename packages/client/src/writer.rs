use std::rc::Rc;
use std::time::Duration;

use playhub::{
    error::{NetworkError, PlayError, PlayResult},
    types::{Address, TxHash},
};
use tracing::{debug, info, warn};

use crate::{
    cache::CacheHandle,
    cancel::CancellationToken,
    clock::Clock,
    contracts::{Call, Contract, ContractCall, TxKind},
    events::TxEvents,
    orchestrator::FlowSlots,
    store::{Action, PendingTransaction, Store},
    transport::{revert_error, Receipt, RpcError, TransactionSender},
};

/// Lifecycle of a write: `Idle -> Pending -> Mining -> Confirmed | Failed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    /// Not yet handed to the wallet.
    Idle,
    /// Waiting for the wallet to sign and broadcast.
    Pending,
    /// Broadcast; waiting for a receipt.
    Mining,
    Confirmed(Receipt),
    Failed(PlayError),
    /// No receipt before the deadline, or waiting was cancelled. The
    /// transaction may still be mined; `wait` can be called again.
    Inconclusive,
}

impl TxStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TxStatus::Confirmed(_))
    }

    pub fn error(&self) -> Option<&PlayError> {
        match self {
            TxStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxHandle {
    /// Id of the matching pending record in the store.
    pub id: u64,
    pub kind: TxKind,
    pub hash: Option<TxHash>,
    pub status: TxStatus,
    invalidates: Vec<Contract>,
}

impl TxHandle {
    /// A write of `kind` that has not been submitted. `ChainWriter::wait`
    /// returns its status unchanged.
    pub fn idle(kind: TxKind) -> Self {
        TxHandle {
            id: 0,
            kind,
            hash: None,
            status: TxStatus::Idle,
            invalidates: Vec::new(),
        }
    }

    /// Turns a failed handle into its error.
    pub fn into_result(self) -> PlayResult<TxHandle> {
        match self.status {
            TxStatus::Failed(e) => Err(e),
            _ => Ok(self),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
    /// "Block not found" answers tolerated while polling one transaction.
    pub block_not_found_retries: u32,
    pub unauthorized_retry_delay: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        ConfirmationPolicy {
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(120),
            block_not_found_retries: 3,
            unauthorized_retry_delay: Duration::from_secs(1),
        }
    }
}

/// Submits writes and follows them to a terminal state.
pub struct ChainWriter<S> {
    sender: Rc<S>,
    clock: Rc<dyn Clock>,
    cache: CacheHandle,
    store: Store,
    policy: ConfirmationPolicy,
    flows: FlowSlots,
}

impl<S: TransactionSender> ChainWriter<S> {
    pub fn new(sender: Rc<S>, clock: Rc<dyn Clock>, cache: CacheHandle, store: Store) -> Self {
        ChainWriter {
            sender,
            clock,
            cache,
            store,
            policy: ConfirmationPolicy::default(),
            flows: FlowSlots::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn flow_slots(&self) -> FlowSlots {
        Rc::clone(&self.flows)
    }

    /// Records the write as pending and hands it to the wallet.
    ///
    /// A handle that fails here has already been reported.
    pub fn submit(&self, from: Address, call: Call) -> TxHandle {
        let id = self.store.allocate_tx_id();
        let mut handle = TxHandle {
            id,
            invalidates: call.invalidates.clone(),
            ..TxHandle::idle(call.kind)
        };

        self.dispatch(Action::TxSubmitted(PendingTransaction {
            id,
            kind: call.kind,
            hash: None,
            timestamp: self.clock.now(),
            amount: call.amount,
            plan: call.plan,
        }));
        handle.status = TxStatus::Pending;
        info!("submitting {} as {} from {}", call.kind.label(), call.call, from);

        match self.send(from, &call.call) {
            Ok(hash) => {
                info!("{} broadcast as {}", call.kind.label(), hash);
                handle.hash = Some(hash);
                handle.status = TxStatus::Mining;
                self.dispatch(Action::TxHashAssigned { id, hash });
            }
            Err(e) => self.fail(&mut handle, e),
        }
        handle
    }

    fn send(&self, from: Address, call: &ContractCall) -> PlayResult<TxHash> {
        match self.sender.send(from, call) {
            Ok(hash) => Ok(hash),
            // The wallet may not have exposed the account yet; ask once more.
            Err(RpcError::Unauthorized) => {
                warn!(
                    "wallet refused {} as unauthorized; retrying in {:?}",
                    call, self.policy.unauthorized_retry_delay
                );
                self.clock.sleep(self.policy.unauthorized_retry_delay);
                self.sender.send(from, call).map_err(PlayError::from)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Polls for the receipt until the handle reaches a terminal state, the
    /// deadline passes or `cancel` fires.
    pub fn wait(&self, handle: &mut TxHandle, cancel: &CancellationToken) -> TxStatus {
        let hash = match (&handle.status, handle.hash) {
            (TxStatus::Mining | TxStatus::Inconclusive, Some(hash)) => hash,
            _ => return handle.status.clone(),
        };
        handle.status = TxStatus::Mining;

        let deadline = self.clock.now() + self.policy.timeout;
        let mut block_not_found = 0;
        loop {
            if cancel.is_cancelled() {
                debug!("stopped waiting for {}", hash);
                handle.status = TxStatus::Inconclusive;
                return handle.status.clone();
            }

            match self.sender.receipt(hash) {
                Ok(Some(receipt)) if receipt.success => {
                    self.confirm(handle, receipt);
                    return handle.status.clone();
                }
                Ok(Some(receipt)) => {
                    self.fail(handle, revert_error(receipt.revert_reason));
                    return handle.status.clone();
                }
                Ok(None) => debug!("{} not mined yet", hash),
                Err(RpcError::BlockNotFound) => {
                    block_not_found += 1;
                    if block_not_found > self.policy.block_not_found_retries {
                        self.fail(handle, NetworkError::BlockNotFound.into());
                        return handle.status.clone();
                    }
                    warn!(
                        "block not found while polling {} ({}/{})",
                        hash, block_not_found, self.policy.block_not_found_retries
                    );
                }
                Err(e) => {
                    let error = PlayError::from(e);
                    if !error.is_transient() {
                        self.fail(handle, error);
                        return handle.status.clone();
                    }
                    warn!("receipt lookup for {} failed: {}", hash, error);
                }
            }

            if self.clock.now() + self.policy.poll_interval > deadline {
                handle.status = TxStatus::Inconclusive;
                self.dispatch(Action::TxInconclusive { id: handle.id });
                TxEvents::inconclusive(&self.store, handle.kind, handle.hash);
                return handle.status.clone();
            }
            self.clock.sleep(self.policy.poll_interval);
        }
    }

    /// `submit` followed by `wait`.
    pub fn execute(&self, from: Address, call: Call, cancel: &CancellationToken) -> TxHandle {
        let mut handle = self.submit(from, call);
        self.wait(&mut handle, cancel);
        handle
    }

    fn confirm(&self, handle: &mut TxHandle, receipt: Receipt) {
        self.cache
            .borrow_mut()
            .invalidate_contracts(&handle.invalidates);
        self.dispatch(Action::TxConfirmed { id: handle.id });
        TxEvents::confirmed(&self.store, handle.kind, receipt.hash);
        handle.status = TxStatus::Confirmed(receipt);
    }

    fn fail(&self, handle: &mut TxHandle, error: PlayError) {
        self.dispatch(Action::TxFailed { id: handle.id });
        TxEvents::failed(&self.store, handle.kind, handle.hash, &error);
        handle.status = TxStatus::Failed(error);
    }

    fn dispatch(&self, action: Action) {
        if let Err(e) = self.store.dispatch(action) {
            warn!("store rejected transaction update: {}", e);
        }
    }
}
