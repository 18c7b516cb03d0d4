pub mod constants;
pub mod error;
pub mod macros;
pub mod math;
pub mod types;

pub use error::{PlayError, PlayResult};
pub use math::bn::U256;
