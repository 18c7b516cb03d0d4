#[doc(hidden)]
pub use tracing as __tracing;

#[macro_export]
macro_rules! validate {
    ($assert:expr, $err:expr) => {{
        if ($assert) {
            Ok(())
        } else {
            let error: $crate::error::PlayError = ($err).into();
            $crate::macros::__tracing::error!("Error {} thrown at {}:{}", error, file!(), line!());
            Err(error)
        }
    }};
    ($assert:expr, $err:expr, $($arg:tt)+) => {{
        if ($assert) {
            Ok(())
        } else {
            let error: $crate::error::PlayError = ($err).into();
            $crate::macros::__tracing::error!("Error {} thrown at {}:{}", error, file!(), line!());
            $crate::macros::__tracing::error!($($arg)+);
            Err(error)
        }
    }};
}

#[macro_export]
macro_rules! math_error {
    () => {{
        || {
            $crate::macros::__tracing::error!("Math error thrown at {}:{}", file!(), line!());
            $crate::error::PlayError::Math
        }
    }};
}

#[macro_export]
macro_rules! safe_increment {
    ($struct:expr, $value:expr) => {{
        $struct = $struct.checked_add($value).ok_or_else($crate::math_error!())?
    }};
}

#[macro_export]
macro_rules! safe_decrement {
    ($struct:expr, $value:expr) => {{
        $struct = $struct.checked_sub($value).ok_or_else($crate::math_error!())?
    }};
}
