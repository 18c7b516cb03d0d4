// TOKENS
pub const PLAY_DECIMALS: u8 = 18;
pub const USDT_DECIMALS: u8 = 18;
pub const ORACLE_PRICE_DECIMALS: u8 = 18;
pub const MAX_DECIMALS: u8 = 77;

// PRECISION
pub const PERCENTAGE_PRECISION: u64 = 100;
pub const BPS_PRECISION: u64 = 10_000;

// ALLOWANCE
/// Approvals are issued for this multiple of the requested spend.
pub const APPROVAL_MULTIPLIER: u64 = 10;

// SLIPPAGE
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;
pub const MAX_SLIPPAGE_BPS: u16 = 5_000;

// PLAN SAFETY MARGINS (bps of wallet balance usable for a stake)
pub const PLAN_0_MAX_STAKE_BPS: u64 = 9_750;
pub const PLAN_1_MAX_STAKE_BPS: u64 = 9_520;
pub const PLAN_2_MAX_STAKE_BPS: u64 = 9_300;
