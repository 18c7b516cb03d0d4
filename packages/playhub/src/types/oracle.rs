use crate::{
    constants::ORACLE_PRICE_DECIMALS,
    error::PlayResult,
    math::{
        bn::U256,
        helpers::get_proportion_u256,
        units::{from_base_units, scale},
    },
};

/// PLAY price reported by the Oracle contract.
///
/// `price` is the value of one whole base token (token0) in quote tokens
/// (token1), with `ORACLE_PRICE_DECIMALS` fractional digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OraclePrice {
    pub price: U256,
    pub decimals0: u8,
    pub decimals1: u8,
}

impl OraclePrice {
    /// Quote-token base units worth `base_amount` base-token base units.
    pub fn quote(&self, base_amount: U256) -> PlayResult<U256> {
        let scaled = get_proportion_u256(base_amount, self.price, scale(ORACLE_PRICE_DECIMALS)?)?;
        get_proportion_u256(scaled, scale(self.decimals1)?, scale(self.decimals0)?)
    }

    pub fn display_price(&self) -> f64 {
        from_base_units(self.price, ORACLE_PRICE_DECIMALS)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::PlayError;

    #[test]
    fn quote_same_decimals() {
        let price = OraclePrice {
            price: U256::from(250_000_000_000_000_000_u128), // 0.25
            decimals0: 18,
            decimals1: 18,
        };
        assert_eq!(
            price.quote(U256::exp10(19)).unwrap(),
            U256::from(2_500_000_000_000_000_000_u128)
        );
        assert_eq!(price.display_price(), 0.25);
    }

    #[test]
    fn quote_to_six_decimal_token() {
        let price = OraclePrice {
            price: U256::exp10(18) * U256::from(2_u64),
            decimals0: 18,
            decimals1: 6,
        };
        assert_eq!(price.quote(U256::exp10(18)).unwrap(), U256::from(2_000_000_u64));
    }

    #[test]
    fn quote_with_oversized_decimals_is_an_error() {
        let price = OraclePrice {
            price: U256::exp10(18),
            decimals0: 18,
            decimals1: 80,
        };
        assert_eq!(price.quote(U256::exp10(18)), Err(PlayError::Math));
    }
}
