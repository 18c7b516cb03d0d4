use std::fmt;
use std::time::Duration;

use playhub::{
    types::{Address, PlanId, Value},
    U256,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Contract {
    ActivePool,
    UserContract,
    Oracle,
    PlayToken,
    Usdt,
    PlaySwap,
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Contract::ActivePool => "ActivePool",
            Contract::UserContract => "UserContract",
            Contract::Oracle => "Oracle",
            Contract::PlayToken => "PlayToken",
            Contract::Usdt => "USDT",
            Contract::PlaySwap => "PlaySwap",
        };
        f.write_str(name)
    }
}

/// A fully resolved call: target contract, function and arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContractCall {
    pub contract: Contract,
    pub function: &'static str,
    pub args: Vec<Value>,
}

impl ContractCall {
    pub fn new(contract: Contract, function: &'static str, args: Vec<Value>) -> Self {
        ContractCall {
            contract,
            function,
            args,
        }
    }
}

impl fmt::Display for ContractCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.contract, self.function)
    }
}

/// How long a cached read stays fresh and which wallet events refetch it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub stale_after: Duration,
    pub refetch_on_focus: bool,
    pub refetch_on_reconnect: bool,
}

impl RefreshPolicy {
    pub const PRICE: RefreshPolicy = RefreshPolicy {
        stale_after: Duration::from_secs(30),
        refetch_on_focus: false,
        refetch_on_reconnect: true,
    };
    pub const BALANCE: RefreshPolicy = RefreshPolicy {
        stale_after: Duration::from_secs(5),
        refetch_on_focus: true,
        refetch_on_reconnect: true,
    };
    pub const POSITION: RefreshPolicy = RefreshPolicy {
        stale_after: Duration::from_secs(3),
        refetch_on_focus: true,
        refetch_on_reconnect: true,
    };
    pub const REGISTRATION: RefreshPolicy = RefreshPolicy {
        stale_after: Duration::from_secs(30),
        refetch_on_focus: false,
        refetch_on_reconnect: true,
    };
    /// Values fixed at deployment, such as token decimals.
    pub const STATIC: RefreshPolicy = RefreshPolicy {
        stale_after: Duration::from_secs(3_600),
        refetch_on_focus: false,
        refetch_on_reconnect: false,
    };
}

/// A read against the contract set. When `needs_account` is set, the
/// connected account is passed as the first argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub contract: Contract,
    pub function: &'static str,
    pub needs_account: bool,
    pub args: Vec<Value>,
    pub policy: RefreshPolicy,
}

impl Query {
    fn global(contract: Contract, function: &'static str, policy: RefreshPolicy) -> Self {
        Query {
            contract,
            function,
            needs_account: false,
            args: Vec::new(),
            policy,
        }
    }

    fn per_account(contract: Contract, function: &'static str, policy: RefreshPolicy) -> Self {
        Query {
            needs_account: true,
            ..Query::global(contract, function, policy)
        }
    }

    fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The concrete call for `account`, or `None` when the query is disabled.
    pub fn resolve(&self, account: Option<Address>) -> Option<ContractCall> {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        if self.needs_account {
            args.push(Value::Address(account?));
        }
        args.extend(self.args.iter().cloned());
        Some(ContractCall::new(self.contract, self.function, args))
    }

    // ################################################################
    //                             TOKENS
    // ################################################################

    pub fn balance_of(token: Contract) -> Self {
        Query::per_account(token, "balanceOf", RefreshPolicy::BALANCE)
    }

    pub fn allowance(token: Contract, spender: Address) -> Self {
        Query::per_account(token, "allowance", RefreshPolicy::BALANCE).with_arg(spender)
    }

    // ################################################################
    //                             ACTIVE POOL
    // ################################################################

    pub fn user_info() -> Self {
        Query::per_account(Contract::ActivePool, "userInfo", RefreshPolicy::POSITION)
    }

    pub fn user_totals() -> Self {
        Query::per_account(Contract::ActivePool, "viewUserTotals", RefreshPolicy::BALANCE)
    }

    pub fn total_active() -> Self {
        Query::global(Contract::ActivePool, "totalActive", RefreshPolicy::BALANCE)
    }

    pub fn referral_pending_reward() -> Self {
        Query::per_account(
            Contract::ActivePool,
            "referralPendingReward",
            RefreshPolicy::BALANCE,
        )
    }

    pub fn total_referral_accrued() -> Self {
        Query::per_account(
            Contract::ActivePool,
            "totalReferralAccrued",
            RefreshPolicy::BALANCE,
        )
    }

    pub fn remaining_referral_cap_pct() -> Self {
        Query::per_account(
            Contract::ActivePool,
            "viewRemainingReferralCapPct",
            RefreshPolicy::BALANCE,
        )
    }

    pub fn downline_active_count() -> Self {
        Query::per_account(
            Contract::ActivePool,
            "viewDownlineActiveCount",
            RefreshPolicy::REGISTRATION,
        )
    }

    pub fn downline_stake_by_plan_and_level() -> Self {
        Query::per_account(
            Contract::ActivePool,
            "viewDownlinesStakeByPlanAndLevel",
            RefreshPolicy::REGISTRATION,
        )
    }

    pub fn principal_lock() -> Self {
        Query::per_account(
            Contract::ActivePool,
            "viewMyPrincipalLock",
            RefreshPolicy::POSITION,
        )
    }

    pub fn unlockable_warm_up() -> Self {
        Query::per_account(
            Contract::ActivePool,
            "viewUnlockableWarmUp",
            RefreshPolicy::POSITION,
        )
    }

    // ################################################################
    //                             USER CONTRACT
    // ################################################################

    pub fn is_registered() -> Self {
        Query::per_account(Contract::UserContract, "isRegistered", RefreshPolicy::REGISTRATION)
    }

    pub fn is_active() -> Self {
        Query::per_account(Contract::UserContract, "isActive", RefreshPolicy::REGISTRATION)
    }

    pub fn referrer_of() -> Self {
        Query::per_account(Contract::UserContract, "referrerOf", RefreshPolicy::REGISTRATION)
    }

    pub fn referrals() -> Self {
        Query::per_account(Contract::UserContract, "getReferrals", RefreshPolicy::REGISTRATION)
    }

    pub fn upline() -> Self {
        Query::per_account(Contract::UserContract, "getUpline", RefreshPolicy::REGISTRATION)
    }

    pub fn downline_count() -> Self {
        Query::per_account(
            Contract::UserContract,
            "viewDownlineCount",
            RefreshPolicy::REGISTRATION,
        )
    }

    // ################################################################
    //                             ORACLE & SWAP
    // ################################################################

    pub fn price() -> Self {
        Query::global(Contract::Oracle, "getPrice", RefreshPolicy::PRICE)
    }

    pub fn oracle_decimals0() -> Self {
        Query::global(Contract::Oracle, "decimals0", RefreshPolicy::STATIC)
    }

    pub fn oracle_decimals1() -> Self {
        Query::global(Contract::Oracle, "decimals1", RefreshPolicy::STATIC)
    }

    pub fn swap_config() -> Self {
        Query::global(Contract::PlaySwap, "getSwapConfig", RefreshPolicy::PRICE)
    }

    pub fn preview_buy_with_donation(usdt_amount: U256) -> Self {
        Query::global(
            Contract::PlaySwap,
            "previewBuyWithDonation",
            RefreshPolicy::BALANCE,
        )
        .with_arg(usdt_amount)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxKind {
    Approve,
    Transfer,
    Deposit,
    Checkpoint,
    ClaimRewards,
    ClaimReferralRewards,
    UpgradePlan,
    MoveWarmUp,
    Register,
    Swap,
}

impl TxKind {
    pub fn label(&self) -> &'static str {
        match self {
            TxKind::Approve => "Approval",
            TxKind::Transfer => "Transfer",
            TxKind::Deposit => "Deposit",
            TxKind::Checkpoint => "Checkpoint",
            TxKind::ClaimRewards => "Reward claim",
            TxKind::ClaimReferralRewards => "Referral claim",
            TxKind::UpgradePlan => "Plan upgrade",
            TxKind::MoveWarmUp => "Warm-up activation",
            TxKind::Register => "Registration",
            TxKind::Swap => "Swap",
        }
    }
}

/// A state-changing call plus the bookkeeping the writer needs around it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub kind: TxKind,
    pub call: ContractCall,
    pub amount: Option<U256>,
    pub plan: Option<PlanId>,
    /// Contracts whose cached reads are stale once this call confirms.
    pub invalidates: Vec<Contract>,
}

impl Call {
    fn new(kind: TxKind, call: ContractCall, invalidates: Vec<Contract>) -> Self {
        Call {
            kind,
            call,
            amount: None,
            plan: None,
            invalidates,
        }
    }

    fn with_amount(mut self, amount: U256) -> Self {
        self.amount = Some(amount);
        self
    }

    fn with_plan(mut self, plan: PlanId) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn approve(token: Contract, spender: Address, amount: U256) -> Self {
        Call::new(
            TxKind::Approve,
            ContractCall::new(token, "approve", vec![spender.into(), amount.into()]),
            vec![token],
        )
        .with_amount(amount)
    }

    pub fn transfer(token: Contract, to: Address, amount: U256) -> Self {
        Call::new(
            TxKind::Transfer,
            ContractCall::new(token, "transfer", vec![to.into(), amount.into()]),
            vec![token],
        )
        .with_amount(amount)
    }

    pub fn deposit(amount: U256, plan: PlanId) -> Self {
        Call::new(
            TxKind::Deposit,
            ContractCall::new(
                Contract::ActivePool,
                "deposit",
                vec![amount.into(), Value::uint(u8::from(plan) as u64)],
            ),
            vec![Contract::ActivePool, Contract::PlayToken, Contract::UserContract],
        )
        .with_amount(amount)
        .with_plan(plan)
    }

    pub fn checkpoint() -> Self {
        Call::new(
            TxKind::Checkpoint,
            ContractCall::new(Contract::ActivePool, "checkpoint", vec![]),
            vec![Contract::ActivePool],
        )
    }

    pub fn claim_rewards() -> Self {
        Call::new(
            TxKind::ClaimRewards,
            ContractCall::new(Contract::ActivePool, "claimRewards", vec![]),
            vec![Contract::ActivePool, Contract::PlayToken],
        )
    }

    pub fn claim_referral_rewards() -> Self {
        Call::new(
            TxKind::ClaimReferralRewards,
            ContractCall::new(Contract::ActivePool, "claimReferralRewards", vec![]),
            vec![Contract::ActivePool, Contract::PlayToken],
        )
    }

    pub fn upgrade_plan(plan: PlanId) -> Self {
        Call::new(
            TxKind::UpgradePlan,
            ContractCall::new(
                Contract::ActivePool,
                "upgradePlan",
                vec![Value::uint(u8::from(plan) as u64)],
            ),
            vec![Contract::ActivePool],
        )
        .with_plan(plan)
    }

    pub fn move_warm_up_to_active_pool() -> Self {
        Call::new(
            TxKind::MoveWarmUp,
            ContractCall::new(Contract::ActivePool, "moveWarmUpToActivePool", vec![]),
            vec![Contract::ActivePool],
        )
    }

    pub fn register(referrer: Address) -> Self {
        Call::new(
            TxKind::Register,
            ContractCall::new(Contract::UserContract, "register", vec![referrer.into()]),
            vec![Contract::UserContract],
        )
    }

    pub fn swap_and_donate(usdt_amount: U256, min_play_out: U256) -> Self {
        Call::new(
            TxKind::Swap,
            ContractCall::new(
                Contract::PlaySwap,
                "swapAndDonate",
                vec![usdt_amount.into(), min_play_out.into()],
            ),
            vec![Contract::PlaySwap, Contract::Usdt, Contract::PlayToken],
        )
        .with_amount(usdt_amount)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn account() -> Address {
        Address::from_bytes([7; 20])
    }

    #[test]
    fn account_queries_are_disabled_without_account() {
        assert_eq!(Query::balance_of(Contract::PlayToken).resolve(None), None);
        assert!(Query::price().resolve(None).is_some());
    }

    #[test]
    fn account_is_the_leading_argument() {
        let spender = Address::from_bytes([9; 20]);
        let call = Query::allowance(Contract::PlayToken, spender)
            .resolve(Some(account()))
            .unwrap();
        assert_eq!(
            call,
            ContractCall::new(
                Contract::PlayToken,
                "allowance",
                vec![Value::Address(account()), Value::Address(spender)]
            )
        );
        assert_eq!(call.to_string(), "PlayToken.allowance");
    }

    #[test]
    fn deposit_call_carries_amount_plan_and_invalidations() {
        let call = Call::deposit(U256::from(100_u64), PlanId::Plan2);
        assert_eq!(call.kind, TxKind::Deposit);
        assert_eq!(call.amount, Some(U256::from(100_u64)));
        assert_eq!(call.plan, Some(PlanId::Plan2));
        assert_eq!(call.call.args[1], Value::uint(2_u64));
        assert!(call.invalidates.contains(&Contract::PlayToken));
    }
}
