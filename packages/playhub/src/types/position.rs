use crate::{
    error::{ContractError, PlayResult},
    math::{bn::U256, reward::remaining_cap},
    types::{plan::PlanId, value::Value},
};

/// On-chain staking aggregate for one account, as returned by `userInfo`.
///
/// Tuple layout: `(active, burned, voucher, referralCap, plan, lastEpoch,
/// pendingReward, logicAmount)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPosition {
    pub active_amount: U256,
    /// Principal locked by the deposit ("burned" on chain).
    pub principal: U256,
    pub voucher_amount: U256,
    pub referral_cap: U256,
    pub plan: PlanId,
    pub last_processed_epoch: u64,
    pub pending_reward: U256,
    pub logic_amount: U256,
}

impl UserPosition {
    pub const FUNCTION: &'static str = "userInfo";

    pub fn decode(value: &Value) -> PlayResult<Self> {
        let f = value.as_tuple(Self::FUNCTION, 8)?;
        let plan = f[4].as_u64(Self::FUNCTION)?;
        let plan = u8::try_from(plan)
            .ok()
            .and_then(|p| PlanId::try_from(p).ok())
            .ok_or_else(|| ContractError::UnexpectedReturn {
                function: Self::FUNCTION.to_string(),
            })?;

        Ok(UserPosition {
            active_amount: f[0].as_uint(Self::FUNCTION)?,
            principal: f[1].as_uint(Self::FUNCTION)?,
            voucher_amount: f[2].as_uint(Self::FUNCTION)?,
            referral_cap: f[3].as_uint(Self::FUNCTION)?,
            plan,
            last_processed_epoch: f[5].as_u64(Self::FUNCTION)?,
            pending_reward: f[6].as_uint(Self::FUNCTION)?,
            logic_amount: f[7].as_uint(Self::FUNCTION)?,
        })
    }

    pub fn has_stake(&self) -> bool {
        !self.active_amount.is_zero() || !self.principal.is_zero()
    }
}

/// Referral and claim totals, as returned by `viewUserTotals`.
///
/// Tuple layout: `(referralReceived, referralCapMax, totalClaimed)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserTotals {
    pub referral_received: U256,
    pub referral_cap_max: U256,
    pub total_claimed: U256,
}

impl UserTotals {
    pub const FUNCTION: &'static str = "viewUserTotals";

    pub fn decode(value: &Value) -> PlayResult<Self> {
        let f = value.as_tuple(Self::FUNCTION, 3)?;
        Ok(UserTotals {
            referral_received: f[0].as_uint(Self::FUNCTION)?,
            referral_cap_max: f[1].as_uint(Self::FUNCTION)?,
            total_claimed: f[2].as_uint(Self::FUNCTION)?,
        })
    }

    pub fn remaining_referral_cap(&self) -> U256 {
        remaining_cap(self.referral_cap_max, self.referral_received)
    }
}
