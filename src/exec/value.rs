//! Runtime values produced by the executor.

use crate::instrument::unit::ValueType;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    /// Result of a function without a return type
    Unit,
}

impl Value {
    pub fn ty(&self) -> Option<ValueType> {
        match self {
            Value::Int(_) => Some(ValueType::Int),
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Unit => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Unit => f.write_str("()"),
        }
    }
}

impl FromStr for Value {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "()" => Ok(Value::Unit),
            other => other
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("'{}' is not an int, bool or ()", other)),
        }
    }
}
