//! The governance VM's stack value type.

use crate::ids::{Address, Hash};
use crate::governance::error::{GovernanceError, ValidationError};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U64(u64),
    I64(i64),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    Hash(Hash),
    Address(Address),
    Nil,
}

impl Value {
    pub fn as_u64(&self) -> Result<u64, GovernanceError> {
        match self {
            Value::U64(v) => Ok(*v),
            _ => Err(ValidationError::InvalidOperand.into()),
        }
    }

    pub fn as_i64(&self) -> Result<i64, GovernanceError> {
        match self {
            Value::I64(v) => Ok(*v),
            Value::U64(v) => Ok(*v as i64),
            _ => Err(ValidationError::InvalidOperand.into()),
        }
    }

    pub fn as_bool(&self) -> Result<bool, GovernanceError> {
        match self {
            Value::Bool(v) => Ok(*v),
            _ => Err(ValidationError::InvalidOperand.into()),
        }
    }

    pub fn as_str(&self) -> Result<&str, GovernanceError> {
        match self {
            Value::Str(v) => Ok(v.as_str()),
            _ => Err(ValidationError::InvalidOperand.into()),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], GovernanceError> {
        match self {
            Value::Bytes(v) => Ok(v.as_slice()),
            _ => Err(ValidationError::InvalidOperand.into()),
        }
    }

    pub fn as_hash(&self) -> Result<Hash, GovernanceError> {
        match self {
            Value::Hash(v) => Ok(*v),
            _ => Err(ValidationError::InvalidOperand.into()),
        }
    }

    pub fn as_address(&self) -> Result<Address, GovernanceError> {
        match self {
            Value::Address(v) => Ok(*v),
            _ => Err(ValidationError::InvalidOperand.into()),
        }
    }

    pub fn as_optional_address(&self) -> Result<Option<Address>, GovernanceError> {
        match self {
            Value::Address(v) => Ok(Some(*v)),
            Value::Nil => Ok(None),
            _ => Err(ValidationError::InvalidOperand.into()),
        }
    }
}
