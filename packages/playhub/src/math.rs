pub mod bn;
pub mod helpers;
pub mod reward;
pub mod safe_math;
pub mod units;
