//! Big number types

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use uint::construct_uint;

use crate::error::{PlayError, PlayResult};

construct_uint! {
    /// 256-bit unsigned integer, the width of a token amount on chain.
    pub struct U256(4);
}

impl U256 {
    /// Convert to u128 if it fits.
    pub fn to_u128(self) -> Option<u128> {
        self.try_to_u128().ok()
    }

    /// Convert to u128
    pub fn try_to_u128(self) -> PlayResult<u128> {
        if self > U256::from(u128::MAX) {
            return Err(PlayError::Math);
        }
        Ok(self.as_u128())
    }

    /// Nearest f64. Loses precision above 2^53, so only use it for display.
    pub fn to_f64_lossy(self) -> f64 {
        self.to_string().parse::<f64>().unwrap_or(f64::INFINITY)
    }
}

#[cfg(test)]
mod test {
    use super::U256;

    #[test]
    fn to_u128() {
        assert_eq!(U256::from(42_u64).to_u128(), Some(42));
        assert_eq!(U256::from(u128::MAX).to_u128(), Some(u128::MAX));
        assert_eq!((U256::from(u128::MAX) + U256::one()).to_u128(), None);
    }

    #[test]
    fn to_f64_lossy() {
        assert_eq!(U256::from(1_500_u64).to_f64_lossy(), 1_500.0);
        assert_eq!(U256::zero().to_f64_lossy(), 0.0);
        assert!(U256::max_value().to_f64_lossy() > 1e77);
    }
}
