pub mod address;
pub mod oracle;
pub mod plan;
pub mod position;
pub mod value;

pub use address::{Address, TxHash};
pub use oracle::OraclePrice;
pub use plan::PlanId;
pub use position::{UserPosition, UserTotals};
pub use value::Value;
