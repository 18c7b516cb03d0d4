use std::rc::Rc;

use playhub::{
    constants::MAX_DECIMALS,
    error::{ContractError, PlayError, PlayResult, WalletError},
    types::{Address, OraclePrice, UserPosition, UserTotals, Value},
    U256,
};
use tracing::{debug, warn};

use crate::{
    cache::CacheHandle,
    clock::Clock,
    contracts::{Contract, ContractCall, Query},
    retry::{retry_transient, RetryPolicy},
    transport::ContractCaller,
};

/// Outcome of a cached read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadState<T = Value> {
    Ready(T),
    /// Not executed, usually because no account is connected yet.
    Pending,
    /// Failed with nothing cached to fall back on.
    Failed(PlayError),
}

impl<T> ReadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ReadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            ReadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ReadState::Pending)
    }

    /// Decodes a ready value. A decoding error turns the state into `Failed`.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> PlayResult<U>) -> ReadState<U> {
        match self {
            ReadState::Ready(value) => match f(value) {
                Ok(decoded) => ReadState::Ready(decoded),
                Err(e) => ReadState::Failed(e),
            },
            ReadState::Pending => ReadState::Pending,
            ReadState::Failed(e) => ReadState::Failed(e),
        }
    }
}

/// PlaySwap quote for a USDT amount, as returned by `previewBuyWithDonation`.
///
/// Tuple layout: `(playOut, donation)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapPreview {
    pub play_out: U256,
    pub donation: U256,
}

impl SwapPreview {
    pub const FUNCTION: &'static str = "previewBuyWithDonation";

    pub fn decode(value: &Value) -> PlayResult<Self> {
        let f = value.as_tuple(Self::FUNCTION, 2)?;
        Ok(SwapPreview {
            play_out: f[0].as_uint(Self::FUNCTION)?,
            donation: f[1].as_uint(Self::FUNCTION)?,
        })
    }
}

/// Cached, retrying reads against the contract set.
pub struct ChainReader<C> {
    caller: Rc<C>,
    clock: Rc<dyn Clock>,
    cache: CacheHandle,
    retry: RetryPolicy,
}

impl<C: ContractCaller> ChainReader<C> {
    pub fn new(caller: Rc<C>, clock: Rc<dyn Clock>, cache: CacheHandle) -> Self {
        ChainReader {
            caller,
            clock,
            cache,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    fn fetch(&self, call: &ContractCall) -> PlayResult<Value> {
        let label = call.to_string();
        retry_transient(self.clock.as_ref(), &self.retry, &label, || {
            debug!("eth_call {}", call);
            self.caller.call(call).map_err(PlayError::from)
        })
    }

    /// Serves the cached value while it is fresh and refetches otherwise.
    /// When the refetch fails, the last value is served instead of the error.
    pub fn read(&self, query: &Query, account: Option<Address>) -> ReadState {
        let Some(call) = query.resolve(account) else {
            return ReadState::Pending;
        };

        let cached = self.cache.borrow().get(&call).cloned();
        if let Some(entry) = &cached {
            if entry.is_fresh(self.clock.now()) {
                return ReadState::Ready(entry.value.clone());
            }
        }

        match self.fetch(&call) {
            Ok(value) => {
                self.cache
                    .borrow_mut()
                    .insert(call, value.clone(), self.clock.now(), query.policy);
                ReadState::Ready(value)
            }
            Err(e) => match cached {
                Some(entry) => {
                    warn!("refetch of {} failed ({}); serving cached value", call, e);
                    ReadState::Ready(entry.value)
                }
                None => ReadState::Failed(e),
            },
        }
    }

    /// Bypasses the cache and stores the fresh result.
    pub fn read_fresh(&self, query: &Query, account: Option<Address>) -> PlayResult<Value> {
        let call = query
            .resolve(account)
            .ok_or(PlayError::Wallet(WalletError::NotConnected))?;
        let value = self.fetch(&call)?;
        self.cache
            .borrow_mut()
            .insert(call, value.clone(), self.clock.now(), query.policy);
        Ok(value)
    }

    /// Marks every read that refetches on window focus as stale.
    pub fn on_window_focus(&self) -> usize {
        self.cache.borrow_mut().invalidate_on_focus()
    }

    pub fn on_reconnect(&self) -> usize {
        self.cache.borrow_mut().invalidate_on_reconnect()
    }

    pub fn invalidate(&self, contracts: &[Contract]) -> usize {
        self.cache.borrow_mut().invalidate_contracts(contracts)
    }

    /// Forgets everything, e.g. after an account switch.
    pub fn reset(&self) {
        self.cache.borrow_mut().clear();
    }

    // ################################################################
    //                             TOKENS
    // ################################################################

    pub fn balance_of(&self, token: Contract, account: Option<Address>) -> ReadState<U256> {
        self.read(&Query::balance_of(token), account)
            .and_then(|v| v.as_uint("balanceOf"))
    }

    pub fn allowance(
        &self,
        token: Contract,
        spender: Address,
        account: Option<Address>,
    ) -> ReadState<U256> {
        self.read(&Query::allowance(token, spender), account)
            .and_then(|v| v.as_uint("allowance"))
    }

    pub fn balance_fresh(&self, token: Contract, owner: Address) -> PlayResult<U256> {
        self.read_fresh(&Query::balance_of(token), Some(owner))?
            .as_uint("balanceOf")
    }

    pub fn allowance_fresh(
        &self,
        token: Contract,
        owner: Address,
        spender: Address,
    ) -> PlayResult<U256> {
        self.read_fresh(&Query::allowance(token, spender), Some(owner))?
            .as_uint("allowance")
    }

    // ################################################################
    //                             ACTIVE POOL
    // ################################################################

    pub fn user_position(&self, account: Option<Address>) -> ReadState<UserPosition> {
        self.read(&Query::user_info(), account)
            .and_then(|v| UserPosition::decode(&v))
    }

    pub fn user_totals(&self, account: Option<Address>) -> ReadState<UserTotals> {
        self.read(&Query::user_totals(), account)
            .and_then(|v| UserTotals::decode(&v))
    }

    pub fn total_active(&self) -> ReadState<U256> {
        self.read(&Query::total_active(), None)
            .and_then(|v| v.as_uint("totalActive"))
    }

    pub fn referral_pending_reward(&self, account: Option<Address>) -> ReadState<U256> {
        self.read(&Query::referral_pending_reward(), account)
            .and_then(|v| v.as_uint("referralPendingReward"))
    }

    pub fn total_referral_accrued(&self, account: Option<Address>) -> ReadState<U256> {
        self.read(&Query::total_referral_accrued(), account)
            .and_then(|v| v.as_uint("totalReferralAccrued"))
    }

    pub fn remaining_referral_cap_pct(&self, account: Option<Address>) -> ReadState<U256> {
        self.read(&Query::remaining_referral_cap_pct(), account)
            .and_then(|v| v.as_uint("viewRemainingReferralCapPct"))
    }

    // ################################################################
    //                             USER CONTRACT
    // ################################################################

    pub fn is_registered(&self, account: Option<Address>) -> ReadState<bool> {
        self.read(&Query::is_registered(), account)
            .and_then(|v| v.as_bool("isRegistered"))
    }

    pub fn is_registered_fresh(&self, account: Address) -> PlayResult<bool> {
        self.read_fresh(&Query::is_registered(), Some(account))?
            .as_bool("isRegistered")
    }

    pub fn is_active(&self, account: Option<Address>) -> ReadState<bool> {
        self.read(&Query::is_active(), account)
            .and_then(|v| v.as_bool("isActive"))
    }

    pub fn referrer_of(&self, account: Option<Address>) -> ReadState<Address> {
        self.read(&Query::referrer_of(), account)
            .and_then(|v| v.as_address("referrerOf"))
    }

    pub fn referrals(&self, account: Option<Address>) -> ReadState<Vec<Address>> {
        self.read(&Query::referrals(), account).and_then(|v| {
            v.as_array("getReferrals")?
                .iter()
                .map(|item| item.as_address("getReferrals"))
                .collect()
        })
    }

    // ################################################################
    //                             ORACLE & SWAP
    // ################################################################

    /// Price plus the token decimals needed to interpret it.
    pub fn oracle_price(&self) -> ReadState<OraclePrice> {
        let decimals = |query: Query, function: &'static str| {
            self.read(&query, None).and_then(|v| {
                let d = v.as_u64(function)?;
                match u8::try_from(d) {
                    Ok(d) if d <= MAX_DECIMALS => Ok(d),
                    _ => Err(PlayError::from(ContractError::UnexpectedReturn {
                        function: function.to_string(),
                    })),
                }
            })
        };

        let price = match self.read(&Query::price(), None).and_then(|v| v.as_uint("getPrice")) {
            ReadState::Ready(price) => price,
            ReadState::Pending => return ReadState::Pending,
            ReadState::Failed(e) => return ReadState::Failed(e),
        };
        let decimals0 = match decimals(Query::oracle_decimals0(), "decimals0") {
            ReadState::Ready(d) => d,
            ReadState::Pending => return ReadState::Pending,
            ReadState::Failed(e) => return ReadState::Failed(e),
        };
        decimals(Query::oracle_decimals1(), "decimals1").and_then(|decimals1| {
            Ok(OraclePrice {
                price,
                decimals0,
                decimals1,
            })
        })
    }

    pub fn preview_buy_with_donation(&self, usdt_amount: U256) -> ReadState<SwapPreview> {
        self.read(&Query::preview_buy_with_donation(usdt_amount), None)
            .and_then(|v| SwapPreview::decode(&v))
    }

    pub fn preview_buy_with_donation_fresh(&self, usdt_amount: U256) -> PlayResult<SwapPreview> {
        let value = self.read_fresh(&Query::preview_buy_with_donation(usdt_amount), None)?;
        SwapPreview::decode(&value)
    }
}

impl<C> Clone for ChainReader<C> {
    fn clone(&self) -> Self {
        ChainReader {
            caller: Rc::clone(&self.caller),
            clock: Rc::clone(&self.clock),
            cache: Rc::clone(&self.cache),
            retry: self.retry,
        }
    }
}
