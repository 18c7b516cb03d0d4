use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use playhub::{
    error::{NetworkError, PlayError, PlayResult, ValidationError},
    math::reward::{approval_amount, min_amount_out},
    types::{Address, PlanId},
    validate, U256,
};
use tracing::info;

use crate::{
    cancel::CancellationToken,
    config::ContractAddresses,
    contracts::{Call, Contract, TxKind},
    events::TxEvents,
    reader::ChainReader,
    transport::{ContractCaller, TransactionSender},
    writer::{ChainWriter, TxHandle, TxStatus},
};

/// A write that spends tokens on the caller's behalf and so needs an allowance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpendAction {
    /// PlayToken into the ActivePool.
    Deposit { plan: PlanId },
    /// USDT into PlaySwap.
    SwapAndDonate { min_play_out: U256 },
}

impl SpendAction {
    pub fn token(&self) -> Contract {
        match self {
            SpendAction::Deposit { .. } => Contract::PlayToken,
            SpendAction::SwapAndDonate { .. } => Contract::Usdt,
        }
    }

    pub fn spender(&self) -> Contract {
        match self {
            SpendAction::Deposit { .. } => Contract::ActivePool,
            SpendAction::SwapAndDonate { .. } => Contract::PlaySwap,
        }
    }

    pub fn kind(&self) -> TxKind {
        match self {
            SpendAction::Deposit { .. } => TxKind::Deposit,
            SpendAction::SwapAndDonate { .. } => TxKind::Swap,
        }
    }

    fn call(&self, amount: U256) -> Call {
        match *self {
            SpendAction::Deposit { plan } => Call::deposit(amount, plan),
            SpendAction::SwapAndDonate { min_play_out } => {
                Call::swap_and_donate(amount, min_play_out)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpendRequest {
    pub owner: Address,
    pub amount: U256,
    pub action: SpendAction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowOutcome {
    /// Present only when the allowance had to be raised first.
    pub approval: Option<TxHandle>,
    pub action: TxHandle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FlowKey {
    owner: Address,
    spender: Contract,
    kind: TxKind,
}

/// Flows currently running against one writer.
pub(crate) type FlowSlots = Rc<RefCell<HashSet<FlowKey>>>;

/// Holds a flow's slot until dropped.
pub struct FlowGuard {
    key: FlowKey,
    in_flight: FlowSlots,
}

impl Drop for FlowGuard {
    fn drop(&mut self) {
        self.in_flight.borrow_mut().remove(&self.key);
    }
}

/// Approve-if-needed, then spend.
///
/// In-flight slots live on the writer, so every orchestrator built over the
/// same writer sees the same flows.
pub struct AllowanceOrchestrator<C, S> {
    reader: ChainReader<C>,
    writer: Rc<ChainWriter<S>>,
    addresses: ContractAddresses,
    in_flight: FlowSlots,
}

impl<C: ContractCaller, S: TransactionSender> AllowanceOrchestrator<C, S> {
    pub fn new(
        reader: ChainReader<C>,
        writer: Rc<ChainWriter<S>>,
        addresses: ContractAddresses,
    ) -> Self {
        let in_flight = writer.flow_slots();
        AllowanceOrchestrator {
            reader,
            writer,
            addresses,
            in_flight,
        }
    }

    /// Claims the `(owner, spender, kind)` slot, failing if it is taken.
    pub fn try_begin(&self, owner: Address, action: &SpendAction) -> PlayResult<FlowGuard> {
        let key = FlowKey {
            owner,
            spender: action.spender(),
            kind: action.kind(),
        };
        let inserted = self.in_flight.borrow_mut().insert(key);
        validate!(
            inserted,
            ValidationError::AlreadyInFlight,
            "{} for {} is already in flight",
            action.kind().label(),
            owner
        )?;
        Ok(FlowGuard {
            key,
            in_flight: Rc::clone(&self.in_flight),
        })
    }

    /// Runs the whole flow for `request`. The dependent action is submitted
    /// for exactly `request.amount`; an approval, when one is needed, covers
    /// ten times that.
    ///
    /// An approval that does not confirm aborts the flow. An action that is
    /// still unconfirmed at the deadline is returned as `Inconclusive` for the
    /// caller to resume.
    ///
    /// Every returned error has already been reported through the store,
    /// except validation errors, which belong to the form that raised them,
    /// and a cancelled approval wait.
    pub fn execute(
        &self,
        request: SpendRequest,
        cancel: &CancellationToken,
    ) -> PlayResult<FlowOutcome> {
        validate!(!request.amount.is_zero(), ValidationError::InvalidAmount)?;
        let guard = self.try_begin(request.owner, &request.action)?;
        self.run(request, guard, cancel)
    }

    pub fn deposit(
        &self,
        owner: Address,
        amount: U256,
        plan: PlanId,
        cancel: &CancellationToken,
    ) -> PlayResult<FlowOutcome> {
        self.execute(
            SpendRequest {
                owner,
                amount,
                action: SpendAction::Deposit { plan },
            },
            cancel,
        )
    }

    /// Swaps `usdt_amount` for PLAY, accepting at most `slippage_bps` below
    /// the current preview. Errors are reported as for [`Self::execute`].
    pub fn swap_and_donate(
        &self,
        owner: Address,
        usdt_amount: U256,
        slippage_bps: u16,
        cancel: &CancellationToken,
    ) -> PlayResult<FlowOutcome> {
        validate!(!usdt_amount.is_zero(), ValidationError::InvalidAmount)?;
        let placeholder = SpendAction::SwapAndDonate {
            min_play_out: U256::zero(),
        };
        let guard = self.try_begin(owner, &placeholder)?;

        let kind = placeholder.kind();
        let preview = self.reported(
            kind,
            self.reader.preview_buy_with_donation_fresh(usdt_amount),
        )?;
        let min_play_out = self.reported(kind, min_amount_out(preview.play_out, slippage_bps))?;
        let request = SpendRequest {
            owner,
            amount: usdt_amount,
            action: SpendAction::SwapAndDonate { min_play_out },
        };
        self.run(request, guard, cancel)
    }

    fn run(
        &self,
        request: SpendRequest,
        _guard: FlowGuard,
        cancel: &CancellationToken,
    ) -> PlayResult<FlowOutcome> {
        let SpendRequest {
            owner,
            amount,
            action,
        } = request;
        let kind = action.kind();
        let token = action.token();
        let spender = self.addresses.address_of(action.spender());

        let balance = self.reported(kind, self.reader.balance_fresh(token, owner))?;
        validate!(
            amount <= balance,
            ValidationError::AmountExceedsBalance { amount, balance }
        )?;

        let allowance = self.reported(kind, self.reader.allowance_fresh(token, owner, spender))?;
        let approval = if allowance >= amount {
            info!("{} allowance {} covers {}; skipping approval", token, allowance, amount);
            None
        } else {
            let raised = self.reported(kind, approval_amount(amount))?;
            let approve = Call::approve(token, spender, raised);
            // A failed or timed-out approval is already reported by the writer.
            let handle = self.writer.execute(owner, approve, cancel);
            match &handle.status {
                TxStatus::Confirmed(_) => Some(handle),
                TxStatus::Failed(e) => return Err(e.clone()),
                _ if cancel.is_cancelled() => return Err(wait_cancelled(&handle)),
                _ => return Err(confirmation_timeout(&handle)),
            }
        };

        let handle = self.writer.execute(owner, action.call(amount), cancel);
        if let TxStatus::Failed(e) = &handle.status {
            return Err(e.clone());
        }
        Ok(FlowOutcome {
            approval,
            action: handle,
        })
    }

    /// Reports a failure that happened before anything reached the wallet.
    fn reported<T>(&self, kind: TxKind, result: PlayResult<T>) -> PlayResult<T> {
        result.map_err(|e| {
            TxEvents::failed(self.writer.store(), kind, None, &e);
            e
        })
    }
}

fn hash_of(handle: &TxHandle) -> String {
    handle.hash.map(|h| h.to_string()).unwrap_or_default()
}

fn confirmation_timeout(handle: &TxHandle) -> PlayError {
    NetworkError::ConfirmationTimeout {
        hash: hash_of(handle),
    }
    .into()
}

fn wait_cancelled(handle: &TxHandle) -> PlayError {
    NetworkError::WaitCancelled {
        hash: hash_of(handle),
    }
    .into()
}
