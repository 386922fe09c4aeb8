//! Structured representation of one compiled unit.
//!
//! A unit holds the functions of a single owning type. Bodies are lists of
//! statements whose operands are already-evaluated values (literals or
//! variables), so a `return` has nothing left to compute once it is
//! reached. Units travel as JSON.

use crate::utils::error::UnitError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// All functions declared by one owning type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Owning type, used in synthesized labels and `Type::name` call targets
    pub type_name: String,

    #[serde(default)]
    pub functions: Vec<Function>,
}

/// Whether a function has an implicit receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    #[default]
    Static,
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Bool,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => f.write_str("int"),
            ValueType::Bool => f.write_str("bool"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: ValueType,
}

/// Profiling opt-in attached to a function declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Custom label; empty or missing means "synthesize one"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Marker {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,

    #[serde(default)]
    pub receiver: Receiver,

    #[serde(default)]
    pub params: Vec<Param>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<ValueType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,

    #[serde(default)]
    pub body: Vec<Stmt>,

    /// Set once probes have been injected; the instrumentor skips flagged functions
    #[serde(default, skip_serializing_if = "is_false")]
    pub instrumented: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receiver: Receiver::Static,
            params: Vec::new(),
            returns: None,
            marker: None,
            body: Vec::new(),
            instrumented: false,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Name plus parameter and return types, e.g. `clamp(int, int) -> int`
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| p.ty.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match self.returns {
            Some(ret) => format!("{}({}) -> {}", self.name, params, ret),
            None => format!("{}({})", self.name, params),
        }
    }
}

/// An already-evaluated value: a literal or a variable read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Int(i64),
    Bool(bool),
    Var(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Operand {
        value: Operand,
    },
    Binary {
        op: BinOp,
        lhs: Operand,
        rhs: Operand,
    },
    Not {
        operand: Operand,
    },
    /// `function` is `Type::name`, or a bare `name` in the caller's own type
    Call {
        function: String,
        #[serde(default)]
        args: Vec<Operand>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Stmt {
    Let {
        var: String,
        value: Expr,
    },
    If {
        cond: Operand,
        #[serde(default)]
        then: Vec<Stmt>,
        #[serde(default, rename = "else")]
        otherwise: Vec<Stmt>,
    },
    While {
        cond: Operand,
        #[serde(default)]
        body: Vec<Stmt>,
    },
    Loop {
        #[serde(default)]
        body: Vec<Stmt>,
    },
    Break,
    /// Normal exit
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Operand>,
    },
    /// Exceptional exit; unwinds to the nearest `try`
    Throw {
        message: String,
    },
    Try {
        #[serde(default)]
        body: Vec<Stmt>,
        #[serde(default)]
        handler: Vec<Stmt>,
    },
    /// Simulated work that lets `nanos` pass on the profiler clock
    Idle {
        nanos: u64,
    },
    Push {
        label: String,
    },
    Pop,
}

impl Unit {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            functions: Vec::new(),
        }
    }

    /// Decode and validate a unit
    ///
    /// # Errors
    /// * `UnitError::JsonError` - bytes are not a unit document
    /// * `UnitError::InvalidUnit` - see [`Unit::validate`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, UnitError> {
        let unit: Unit = serde_json::from_slice(bytes)?;
        unit.validate()?;
        Ok(unit)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, UnitError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Find a function by name and arity
    pub fn function(&self, name: &str, arity: usize) -> Option<&Function> {
        self.functions
            .iter()
            .find(|f| f.name == name && f.arity() == arity)
    }

    /// Structural checks: names present, no clashing overloads, and every
    /// `break` sits inside a loop.
    pub fn validate(&self) -> Result<(), UnitError> {
        if self.type_name.trim().is_empty() {
            return Err(UnitError::InvalidUnit("type name is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for function in &self.functions {
            if function.name.trim().is_empty() {
                return Err(UnitError::InvalidUnit(format!(
                    "{} declares a function with an empty name",
                    self.type_name
                )));
            }
            if !seen.insert((function.name.as_str(), function.arity())) {
                return Err(UnitError::InvalidUnit(format!(
                    "{} declares {} with {} parameter(s) more than once",
                    self.type_name,
                    function.name,
                    function.arity()
                )));
            }
            if has_stray_break(&function.body, 0) {
                return Err(UnitError::InvalidUnit(format!(
                    "{}::{} has a break outside of any loop",
                    self.type_name, function.name
                )));
            }
        }

        Ok(())
    }
}

fn has_stray_break(block: &[Stmt], loop_depth: usize) -> bool {
    block.iter().any(|stmt| match stmt {
        Stmt::Break => loop_depth == 0,
        Stmt::If { then, otherwise, .. } => {
            has_stray_break(then, loop_depth) || has_stray_break(otherwise, loop_depth)
        }
        Stmt::Try { body, handler } => {
            has_stray_break(body, loop_depth) || has_stray_break(handler, loop_depth)
        }
        Stmt::While { body, .. } | Stmt::Loop { body } => has_stray_break(body, loop_depth + 1),
        _ => false,
    })
}
