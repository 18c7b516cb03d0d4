use crate::{
    constants::BPS_PRECISION,
    error::PlayResult,
    math::{bn::U256, safe_math::SafeMath},
};

/// `value * numerator / denominator`, rounded down.
pub fn get_proportion_u256(value: U256, numerator: U256, denominator: U256) -> PlayResult<U256> {
    if numerator == denominator {
        return Ok(value);
    }

    value.safe_mul(numerator)?.safe_div(denominator)
}

/// Scale `value` by a basis-point share, rounded down.
pub fn apply_bps(value: U256, bps: u64) -> PlayResult<U256> {
    get_proportion_u256(value, U256::from(bps), U256::from(BPS_PRECISION))
}

/// Share of `part` in `whole` in basis points, clamped to 100%.
pub fn bps_of(part: U256, whole: U256) -> PlayResult<u64> {
    if whole.is_zero() {
        return Ok(0);
    }

    let bps = get_proportion_u256(part, U256::from(BPS_PRECISION), whole)?;
    Ok(bps.min(U256::from(BPS_PRECISION)).low_u64())
}
