use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use playhub::{
    types::{Address, TxHash, Value},
    U256,
};

use crate::{
    clock::Clock,
    config::ContractAddresses,
    contracts::{Contract, ContractCall},
    transport::{ContractCaller, Receipt, RpcError, TransactionSender},
};

/// Clock that only moves when slept on or advanced by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }
}

pub fn test_addresses() -> ContractAddresses {
    ContractAddresses {
        active_pool: Address::from_bytes([0xa1; 20]),
        user_contract: Address::from_bytes([0xa2; 20]),
        oracle: Address::from_bytes([0xa3; 20]),
        play_token: Address::from_bytes([0xa4; 20]),
        usdt: Address::from_bytes([0xa5; 20]),
        play_swap: Address::from_bytes([0xa6; 20]),
    }
}

/// What the next receipt lookup reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// Not mined yet.
    Pending,
    BlockNotFound,
    Timeout,
    /// Mined; the call's effects are applied and may still revert.
    Success,
    Revert(Option<String>),
}

#[derive(Default)]
struct ChainState {
    balances: HashMap<(Contract, Address), U256>,
    allowances: HashMap<(Contract, Address, Address), U256>,
    registered: HashSet<Address>,
    values: HashMap<(Contract, &'static str), Value>,
    read_errors: VecDeque<RpcError>,
    send_errors: VecDeque<RpcError>,
    receipts: VecDeque<ReceiptOutcome>,
    reads: Vec<ContractCall>,
    sent: Vec<(Address, ContractCall)>,
    pending: HashMap<TxHash, (Address, ContractCall)>,
    mined: HashMap<TxHash, Receipt>,
    receipt_polls: usize,
    block_number: u64,
    next_hash: u64,
}

/// Scripted in-memory chain. Token balances, allowances and registrations
/// are modelled; every other read answers with a value set through
/// [`MockChain::set_value`].
pub struct MockChain {
    addresses: ContractAddresses,
    state: RefCell<ChainState>,
}

impl MockChain {
    pub fn new(addresses: ContractAddresses) -> Self {
        MockChain {
            addresses,
            state: RefCell::new(ChainState {
                block_number: 1,
                ..ChainState::default()
            }),
        }
    }

    pub fn addresses(&self) -> &ContractAddresses {
        &self.addresses
    }

    // ################################################################
    //                             SETUP
    // ################################################################

    pub fn set_balance(&self, token: Contract, owner: Address, amount: U256) {
        self.state.borrow_mut().balances.insert((token, owner), amount);
    }

    pub fn set_allowance(&self, token: Contract, owner: Address, spender: Address, amount: U256) {
        self.state
            .borrow_mut()
            .allowances
            .insert((token, owner, spender), amount);
    }

    pub fn register(&self, account: Address) {
        self.state.borrow_mut().registered.insert(account);
    }

    pub fn set_value(&self, contract: Contract, function: &'static str, value: Value) {
        self.state.borrow_mut().values.insert((contract, function), value);
    }

    pub fn fail_next_read(&self, error: RpcError) {
        self.state.borrow_mut().read_errors.push_back(error);
    }

    pub fn fail_next_send(&self, error: RpcError) {
        self.state.borrow_mut().send_errors.push_back(error);
    }

    /// Queue receipt lookups. Once the script runs out, lookups succeed.
    pub fn script_receipts(&self, outcomes: impl IntoIterator<Item = ReceiptOutcome>) {
        self.state.borrow_mut().receipts.extend(outcomes);
    }

    // ################################################################
    //                             INSPECTION
    // ################################################################

    pub fn balance(&self, token: Contract, owner: Address) -> U256 {
        self.state
            .borrow()
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn allowance(&self, token: Contract, owner: Address, spender: Address) -> U256 {
        self.state
            .borrow()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn reads(&self) -> Vec<ContractCall> {
        self.state.borrow().reads.clone()
    }

    pub fn read_count(&self, function: &str) -> usize {
        self.state
            .borrow()
            .reads
            .iter()
            .filter(|call| call.function == function)
            .count()
    }

    pub fn sent(&self) -> Vec<ContractCall> {
        self.state
            .borrow()
            .sent
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn sent_functions(&self) -> Vec<&'static str> {
        self.state
            .borrow()
            .sent
            .iter()
            .map(|(_, call)| call.function)
            .collect()
    }

    pub fn receipt_polls(&self) -> usize {
        self.state.borrow().receipt_polls
    }

    /// Total calls that reached the chain, reads and submissions.
    pub fn network_calls(&self) -> usize {
        let state = self.state.borrow();
        state.reads.len() + state.sent.len() + state.receipt_polls
    }
}

fn uint_arg(call: &ContractCall, index: usize) -> Result<U256, RpcError> {
    match call.args.get(index) {
        Some(Value::Uint(v)) => Ok(*v),
        _ => Err(RpcError::InvalidCall(format!("{} argument {}", call, index))),
    }
}

fn address_arg(call: &ContractCall, index: usize) -> Result<Address, RpcError> {
    match call.args.get(index) {
        Some(Value::Address(v)) => Ok(*v),
        _ => Err(RpcError::InvalidCall(format!("{} argument {}", call, index))),
    }
}

impl ChainState {
    fn balance(&self, token: Contract, owner: Address) -> U256 {
        self.balances.get(&(token, owner)).copied().unwrap_or_default()
    }

    fn allowance(&self, token: Contract, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn credit(&mut self, token: Contract, owner: Address, amount: U256) {
        let balance = self.balance(token, owner).saturating_add(amount);
        self.balances.insert((token, owner), balance);
    }

    /// `transferFrom` as an ERC-20 would run it for `spender`.
    fn pull(
        &mut self,
        token: Contract,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), String> {
        let allowance = self.allowance(token, owner, spender);
        if allowance < amount {
            return Err("ERC20: insufficient allowance".to_string());
        }
        let balance = self.balance(token, owner);
        if balance < amount {
            return Err("ERC20: transfer amount exceeds balance".to_string());
        }
        self.allowances
            .insert((token, owner, spender), allowance - amount);
        self.balances.insert((token, owner), balance - amount);
        self.credit(token, spender, amount);
        Ok(())
    }

    fn apply(
        &mut self,
        addresses: &ContractAddresses,
        from: Address,
        call: &ContractCall,
    ) -> Result<(), String> {
        let arg_error = |e: RpcError| e.to_string();
        match call.function {
            "approve" => {
                let spender = address_arg(call, 0).map_err(arg_error)?;
                let amount = uint_arg(call, 1).map_err(arg_error)?;
                self.allowances.insert((call.contract, from, spender), amount);
            }
            "transfer" => {
                let to = address_arg(call, 0).map_err(arg_error)?;
                let amount = uint_arg(call, 1).map_err(arg_error)?;
                let balance = self.balance(call.contract, from);
                if balance < amount {
                    return Err("ERC20: transfer amount exceeds balance".to_string());
                }
                self.balances.insert((call.contract, from), balance - amount);
                self.credit(call.contract, to, amount);
            }
            "deposit" => {
                let amount = uint_arg(call, 0).map_err(arg_error)?;
                self.pull(Contract::PlayToken, from, addresses.active_pool, amount)?;
            }
            "swapAndDonate" => {
                let amount = uint_arg(call, 0).map_err(arg_error)?;
                let min_out = uint_arg(call, 1).map_err(arg_error)?;
                self.pull(Contract::Usdt, from, addresses.play_swap, amount)?;
                self.credit(Contract::PlayToken, from, min_out);
            }
            "register" => {
                if !self.registered.insert(from) {
                    return Err("Already registered".to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl ContractCaller for MockChain {
    fn call(&self, call: &ContractCall) -> Result<Value, RpcError> {
        let mut state = self.state.borrow_mut();
        state.reads.push(call.clone());
        if let Some(error) = state.read_errors.pop_front() {
            return Err(error);
        }

        match call.function {
            "balanceOf" => {
                let owner = address_arg(call, 0)?;
                Ok(Value::Uint(state.balance(call.contract, owner)))
            }
            "allowance" => {
                let owner = address_arg(call, 0)?;
                let spender = address_arg(call, 1)?;
                Ok(Value::Uint(state.allowance(call.contract, owner, spender)))
            }
            "isRegistered" => {
                let account = address_arg(call, 0)?;
                Ok(Value::Bool(state.registered.contains(&account)))
            }
            function => state
                .values
                .get(&(call.contract, function))
                .cloned()
                .ok_or_else(|| RpcError::InvalidCall(format!("nothing scripted for {}", call))),
        }
    }
}

impl TransactionSender for MockChain {
    fn send(&self, from: Address, call: &ContractCall) -> Result<TxHash, RpcError> {
        let mut state = self.state.borrow_mut();
        state.sent.push((from, call.clone()));
        if let Some(error) = state.send_errors.pop_front() {
            return Err(error);
        }

        state.next_hash += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&state.next_hash.to_be_bytes());
        let hash = TxHash::from_bytes(bytes);
        state.pending.insert(hash, (from, call.clone()));
        Ok(hash)
    }

    fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, RpcError> {
        let mut state = self.state.borrow_mut();
        state.receipt_polls += 1;
        if let Some(receipt) = state.mined.get(&hash) {
            return Ok(Some(receipt.clone()));
        }

        let outcome = state
            .receipts
            .pop_front()
            .unwrap_or(ReceiptOutcome::Success);
        let revert_reason = match outcome {
            ReceiptOutcome::Pending => return Ok(None),
            ReceiptOutcome::BlockNotFound => return Err(RpcError::BlockNotFound),
            ReceiptOutcome::Timeout => return Err(RpcError::Timeout),
            ReceiptOutcome::Revert(reason) => Some(reason),
            ReceiptOutcome::Success => {
                let (from, call) = state
                    .pending
                    .get(&hash)
                    .cloned()
                    .ok_or_else(|| RpcError::InvalidCall(format!("unknown transaction {}", hash)))?;
                state.apply(&self.addresses, from, &call).err().map(Some)
            }
        };

        state.block_number += 1;
        let receipt = Receipt {
            hash,
            block_number: state.block_number,
            success: revert_reason.is_none(),
            revert_reason: revert_reason.flatten(),
        };
        state.pending.remove(&hash);
        state.mined.insert(hash, receipt.clone());
        Ok(Some(receipt))
    }
}
