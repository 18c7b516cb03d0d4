use crate::{
    error::{ContractError, PlayError, PlayResult},
    math::bn::U256,
    types::address::Address,
};

/// A decoded argument or return value of a contract call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Uint(U256),
    Bool(bool),
    Address(Address),
    Tuple(Vec<Value>),
    Array(Vec<Value>),
}

fn unexpected(function: &str) -> PlayError {
    ContractError::UnexpectedReturn {
        function: function.to_string(),
    }
    .into()
}

impl Value {
    pub fn uint(value: impl Into<U256>) -> Self {
        Value::Uint(value.into())
    }

    pub fn as_uint(&self, function: &str) -> PlayResult<U256> {
        match self {
            Value::Uint(v) => Ok(*v),
            _ => Err(unexpected(function)),
        }
    }

    pub fn as_u64(&self, function: &str) -> PlayResult<u64> {
        let v = self.as_uint(function)?;
        if v > U256::from(u64::MAX) {
            return Err(unexpected(function));
        }
        Ok(v.low_u64())
    }

    pub fn as_bool(&self, function: &str) -> PlayResult<bool> {
        match self {
            Value::Bool(v) => Ok(*v),
            _ => Err(unexpected(function)),
        }
    }

    pub fn as_address(&self, function: &str) -> PlayResult<Address> {
        match self {
            Value::Address(v) => Ok(*v),
            _ => Err(unexpected(function)),
        }
    }

    /// Fields of a tuple that must have exactly `len` members.
    pub fn as_tuple(&self, function: &str, len: usize) -> PlayResult<&[Value]> {
        match self {
            Value::Tuple(fields) if fields.len() == len => Ok(fields),
            _ => Err(unexpected(function)),
        }
    }

    pub fn as_array(&self, function: &str) -> PlayResult<&[Value]> {
        match self {
            Value::Array(items) => Ok(items),
            _ => Err(unexpected(function)),
        }
    }
}

impl From<U256> for Value {
    fn from(v: U256) -> Self {
        Value::Uint(v)
    }
}

impl From<Address> for Value {
    fn from(v: Address) -> Self {
        Value::Address(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
