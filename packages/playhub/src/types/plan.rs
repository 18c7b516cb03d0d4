use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlayError, ValidationError};

/// Reward tier selected by the user and recorded on chain per account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlanId {
    #[default]
    Plan0 = 0,
    Plan1 = 1,
    Plan2 = 2,
}

impl PlanId {
    pub const ALL: [PlanId; 3] = [PlanId::Plan0, PlanId::Plan1, PlanId::Plan2];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for PlanId {
    type Error = PlayError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PlanId::Plan0),
            1 => Ok(PlanId::Plan1),
            2 => Ok(PlanId::Plan2),
            other => Err(ValidationError::InvalidPlan(other).into()),
        }
    }
}

impl From<PlanId> for u8 {
    fn from(plan: PlanId) -> u8 {
        plan as u8
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plan {}", *self as u8)
    }
}
