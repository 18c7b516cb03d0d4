use tracing::error;

use crate::error::{PlayError, PlayResult};
use crate::math::bn::U256;

pub trait SafeMath: Sized {
    fn safe_add(self, rhs: Self) -> PlayResult<Self>;
    fn safe_sub(self, rhs: Self) -> PlayResult<Self>;
    fn safe_mul(self, rhs: Self) -> PlayResult<Self>;
    fn safe_div(self, rhs: Self) -> PlayResult<Self>;
}

macro_rules! checked_impl {
    ($t:ty) => {
        impl SafeMath for $t {
            #[track_caller]
            #[inline(always)]
            fn safe_add(self, v: $t) -> PlayResult<$t> {
                match self.checked_add(v) {
                    Some(result) => Ok(result),
                    None => {
                        error!("Math error thrown at {}:{}", file!(), line!());
                        Err(PlayError::Math)
                    }
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_sub(self, v: $t) -> PlayResult<$t> {
                match self.checked_sub(v) {
                    Some(result) => Ok(result),
                    None => {
                        error!("Math error thrown at {}:{}", file!(), line!());
                        Err(PlayError::Math)
                    }
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_mul(self, v: $t) -> PlayResult<$t> {
                match self.checked_mul(v) {
                    Some(result) => Ok(result),
                    None => {
                        error!("Math error thrown at {}:{}", file!(), line!());
                        Err(PlayError::Math)
                    }
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_div(self, v: $t) -> PlayResult<$t> {
                match self.checked_div(v) {
                    Some(result) => Ok(result),
                    None => {
                        error!("Math error thrown at {}:{}", file!(), line!());
                        Err(PlayError::Math)
                    }
                }
            }
        }
    };
}

checked_impl!(U256);
checked_impl!(u128);
checked_impl!(u64);
