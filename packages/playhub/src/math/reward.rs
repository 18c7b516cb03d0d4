use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        APPROVAL_MULTIPLIER, BPS_PRECISION, PERCENTAGE_PRECISION, PLAN_0_MAX_STAKE_BPS,
        PLAN_1_MAX_STAKE_BPS, PLAN_2_MAX_STAKE_BPS,
    },
    error::{ConfigError, PlayError, PlayResult, ValidationError},
    math::{
        bn::U256,
        helpers::{apply_bps, bps_of, get_proportion_u256},
        safe_math::SafeMath,
    },
    types::plan::PlanId,
    validate,
};

/// Yearly percentage yield per plan.
///
/// Two tables have shipped to users. `Standard` is the one the client
/// defaults to; `Revised` stays selectable until the pool owners confirm
/// which one the contracts pay out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateTable {
    #[default]
    Standard,
    Revised,
}

impl RateTable {
    pub fn rates(self) -> [u32; 3] {
        match self {
            RateTable::Standard => [300, 600, 1_200],
            RateTable::Revised => [400, 750, 1_400],
        }
    }
}

impl FromStr for RateTable {
    type Err = PlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(RateTable::Standard),
            "revised" => Ok(RateTable::Revised),
            _ => Err(ConfigError::Invalid {
                key: "rate table".to_string(),
                value: s.to_string(),
            }
            .into()),
        }
    }
}

/// APY percentage paid by `plan`.
pub fn epoch_rate(plan: PlanId, table: RateTable) -> u32 {
    table.rates()[plan.index()]
}

/// Reward accrued by `amount` over one year at the plan's rate.
pub fn annual_reward(amount: U256, plan: PlanId, table: RateTable) -> PlayResult<U256> {
    get_proportion_u256(
        amount,
        U256::from(epoch_rate(plan, table)),
        U256::from(PERCENTAGE_PRECISION),
    )
}

/// `max(0, cap_max - received)`
pub fn remaining_cap(cap_max: U256, received: U256) -> U256 {
    cap_max.saturating_sub(received)
}

/// Share of the referral cap already used, in bps, clamped to 100%.
pub fn cap_usage_bps(cap_max: U256, received: U256) -> PlayResult<u64> {
    if cap_max.is_zero() {
        return Ok(if received.is_zero() { 0 } else { BPS_PRECISION });
    }
    bps_of(received, cap_max)
}

pub fn max_stake_bps(plan: PlanId) -> u64 {
    match plan {
        PlanId::Plan0 => PLAN_0_MAX_STAKE_BPS,
        PlanId::Plan1 => PLAN_1_MAX_STAKE_BPS,
        PlanId::Plan2 => PLAN_2_MAX_STAKE_BPS,
    }
}

/// Largest stake the wallet `balance` can cover once the pool's own
/// deductions for `plan` are taken.
pub fn max_stake_for_plan(balance: U256, plan: PlanId) -> PlayResult<U256> {
    apply_bps(balance, max_stake_bps(plan))
}

/// Lowest acceptable output for a quoted swap under `slippage_bps`.
pub fn min_amount_out(quote: U256, slippage_bps: u16) -> PlayResult<U256> {
    validate!(
        (slippage_bps as u64) <= BPS_PRECISION,
        ValidationError::InvalidSlippage(slippage_bps)
    )?;
    apply_bps(quote, BPS_PRECISION - slippage_bps as u64)
}

/// Approval issued when the current allowance does not cover `amount`.
pub fn approval_amount(amount: U256) -> PlayResult<U256> {
    amount.safe_mul(U256::from(APPROVAL_MULTIPLIER))
}
