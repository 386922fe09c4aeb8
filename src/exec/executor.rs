//! Tree-walking executor for units.
//!
//! Stands in for the hosting runtime: it runs (instrumented or plain)
//! functions and routes their `push`/`pop` statements to a [`Profiler`].
//! A step budget keeps non-terminating code from hanging the caller, and a
//! depth limit on nested blocks and calls keeps deep input from exhausting
//! the native stack.

use super::value::Value;
use crate::instrument::unit::{BinOp, Expr, Function, Operand, Stmt, Unit};
use crate::profiler::{Clock, Profiler};
use crate::utils::config::{DEFAULT_MAX_STEPS, PATH_SEPARATOR};
use crate::utils::error::{ExecError, UnitError};
use log::debug;
use std::collections::HashMap;

/// Executor limits
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Statements (and loop iterations) allowed per top-level call
    pub max_steps: u64,

    /// Maximum nesting of blocks; every function body and every `if`,
    /// `while`, `loop` or `try` block counts as one level
    pub max_depth: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_depth: 256,
        }
    }
}

impl ExecConfig {
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// How a block finished
enum Flow {
    Normal,
    Break,
    Return(Value),
}

/// Function currently being evaluated
#[derive(Clone, Copy)]
struct Frame<'u> {
    unit: &'u Unit,
    function: &'u Function,
}

impl Frame<'_> {
    fn name(&self) -> String {
        format!("{}{}{}", self.unit.type_name, PATH_SEPARATOR, self.function.name)
    }
}

type Env = HashMap<String, Value>;

pub struct Executor<'u, 'p, C: Clock> {
    units: &'u [Unit],
    profiler: &'p mut Profiler<C>,
    config: ExecConfig,
    steps: u64,
    depth: usize,
}

impl<'u, 'p, C: Clock> Executor<'u, 'p, C> {
    pub fn new(units: &'u [Unit], profiler: &'p mut Profiler<C>) -> Self {
        Self {
            units,
            profiler,
            config: ExecConfig::default(),
            steps: 0,
            depth: 0,
        }
    }

    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    /// Steps spent by the last top-level call
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Call `target` (`Type::name`) with `args`.
    ///
    /// A `throw` escaping the function surfaces as `ExecError::Thrown`; any
    /// frames it had pushed stay open on the profiler.
    pub fn call(&mut self, target: &str, args: &[Value]) -> Result<Value, ExecError> {
        self.steps = 0;
        self.depth = 0;
        let frame = self.resolve(target, None, args.len())?;
        self.invoke(frame, args)
    }

    fn resolve(
        &self,
        target: &str,
        caller: Option<&Frame<'u>>,
        arity: usize,
    ) -> Result<Frame<'u>, ExecError> {
        let (type_name, name) = match target.rsplit_once(PATH_SEPARATOR) {
            Some((type_name, name)) => (type_name, name),
            None => match caller {
                Some(frame) => (frame.unit.type_name.as_str(), target),
                None => return Err(ExecError::UnknownFunction(target.to_string())),
            },
        };

        let unit = self
            .units
            .iter()
            .find(|unit| unit.type_name == type_name)
            .ok_or_else(|| ExecError::UnknownFunction(target.to_string()))?;

        if let Some(function) = unit.function(name, arity) {
            return Ok(Frame { unit, function });
        }

        match unit.functions.iter().find(|f| f.name == name) {
            Some(function) => Err(ExecError::ArityMismatch {
                function: format!("{}{}{}", type_name, PATH_SEPARATOR, name),
                expected: function.arity(),
                got: arity,
            }),
            None => Err(ExecError::UnknownFunction(target.to_string())),
        }
    }

    fn invoke(&mut self, frame: Frame<'u>, args: &[Value]) -> Result<Value, ExecError> {
        let function = frame.function;
        if args.len() != function.arity() {
            return Err(ExecError::ArityMismatch {
                function: frame.name(),
                expected: function.arity(),
                got: args.len(),
            });
        }
        let mut env = Env::with_capacity(function.params.len());
        for (param, arg) in function.params.iter().zip(args) {
            if arg.ty() != Some(param.ty) {
                return Err(ExecError::TypeMismatch {
                    function: frame.name(),
                    detail: format!("parameter '{}' expects {}, got {}", param.name, param.ty, arg),
                });
            }
            env.insert(param.name.clone(), *arg);
        }

        debug!("Calling {}", frame.name());
        let value = match self.exec_block(&frame, &function.body, &mut env)? {
            Flow::Return(value) => value,
            Flow::Normal => Value::Unit,
            Flow::Break => {
                return Err(UnitError::InvalidUnit(format!(
                    "{} has a break outside of any loop",
                    frame.name()
                ))
                .into())
            }
        };

        if let Some(expected) = function.returns {
            if value.ty() != Some(expected) {
                return Err(ExecError::TypeMismatch {
                    function: frame.name(),
                    detail: format!("declared return type {}, returned {}", expected, value),
                });
            }
        }
        Ok(value)
    }

    fn tick(&mut self) -> Result<(), ExecError> {
        self.steps += 1;
        if self.steps > self.config.max_steps {
            return Err(ExecError::StepLimitExceeded(self.config.max_steps));
        }
        Ok(())
    }

    fn exec_block(
        &mut self,
        frame: &Frame<'u>,
        block: &'u [Stmt],
        env: &mut Env,
    ) -> Result<Flow, ExecError> {
        if self.depth >= self.config.max_depth {
            return Err(ExecError::CallDepthExceeded(self.config.max_depth));
        }
        self.depth += 1;
        let flow = self.run_block(frame, block, env);
        self.depth -= 1;
        flow
    }

    fn run_block(
        &mut self,
        frame: &Frame<'u>,
        block: &'u [Stmt],
        env: &mut Env,
    ) -> Result<Flow, ExecError> {
        for stmt in block {
            self.tick()?;
            match stmt {
                Stmt::Let { var, value } => {
                    let value = self.eval(frame, value, env)?;
                    env.insert(var.clone(), value);
                }
                Stmt::If {
                    cond,
                    then,
                    otherwise,
                } => {
                    let branch = if self.condition(frame, cond, env)? {
                        then
                    } else {
                        otherwise
                    };
                    match self.exec_block(frame, branch, env)? {
                        Flow::Normal => {}
                        flow => return Ok(flow),
                    }
                }
                Stmt::While { cond, body } => {
                    while self.condition(frame, cond, env)? {
                        self.tick()?;
                        match self.exec_block(frame, body, env)? {
                            Flow::Normal => {}
                            Flow::Break => break,
                            flow @ Flow::Return(_) => return Ok(flow),
                        }
                    }
                }
                Stmt::Loop { body } => loop {
                    self.tick()?;
                    match self.exec_block(frame, body, env)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                },
                Stmt::Break => return Ok(Flow::Break),
                Stmt::Return { value } => {
                    let value = match value {
                        Some(operand) => self.operand(frame, operand, env)?,
                        None => Value::Unit,
                    };
                    return Ok(Flow::Return(value));
                }
                Stmt::Throw { message } => return Err(ExecError::Thrown(message.clone())),
                Stmt::Try { body, handler } => {
                    let flow = match self.exec_block(frame, body, env) {
                        Ok(flow) => flow,
                        Err(ExecError::Thrown(message)) => {
                            debug!("{} caught '{}'", frame.name(), message);
                            self.exec_block(frame, handler, env)?
                        }
                        Err(e) => return Err(e),
                    };
                    match flow {
                        Flow::Normal => {}
                        flow => return Ok(flow),
                    }
                }
                Stmt::Idle { nanos } => self.profiler.clock().idle(*nanos),
                Stmt::Push { label } => self.profiler.push(label),
                Stmt::Pop => {
                    self.profiler.pop()?;
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn eval(&mut self, frame: &Frame<'u>, expr: &'u Expr, env: &Env) -> Result<Value, ExecError> {
        match expr {
            Expr::Operand { value } => self.operand(frame, value, env),
            Expr::Not { operand } => match self.operand(frame, operand, env)? {
                Value::Bool(v) => Ok(Value::Bool(!v)),
                other => Err(mismatch(frame, format!("'not' expects bool, got {}", other))),
            },
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.operand(frame, lhs, env)?;
                let rhs = self.operand(frame, rhs, env)?;
                binary(frame, *op, lhs, rhs)
            }
            Expr::Call { function, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.operand(frame, arg, env))
                    .collect::<Result<Vec<_>, _>>()?;
                let callee = self.resolve(function, Some(frame), args.len())?;
                self.invoke(callee, &args)
            }
        }
    }

    fn operand(&self, frame: &Frame<'u>, operand: &Operand, env: &Env) -> Result<Value, ExecError> {
        match operand {
            Operand::Int(v) => Ok(Value::Int(*v)),
            Operand::Bool(v) => Ok(Value::Bool(*v)),
            Operand::Var(name) => env.get(name).copied().ok_or_else(|| ExecError::UnknownVariable {
                function: frame.name(),
                name: name.clone(),
            }),
        }
    }

    fn condition(&self, frame: &Frame<'u>, cond: &Operand, env: &Env) -> Result<bool, ExecError> {
        match self.operand(frame, cond, env)? {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch(frame, format!("condition must be bool, got {}", other))),
        }
    }
}

fn mismatch(frame: &Frame<'_>, detail: String) -> ExecError {
    ExecError::TypeMismatch {
        function: frame.name(),
        detail,
    }
}

fn binary(frame: &Frame<'_>, op: BinOp, lhs: Value, rhs: Value) -> Result<Value, ExecError> {
    let value = match (op, lhs, rhs) {
        (BinOp::Add, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(b)),
        (BinOp::Sub, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_sub(b)),
        (BinOp::Mul, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_mul(b)),
        (BinOp::Lt, Value::Int(a), Value::Int(b)) => Value::Bool(a < b),
        (BinOp::Le, Value::Int(a), Value::Int(b)) => Value::Bool(a <= b),
        (BinOp::Gt, Value::Int(a), Value::Int(b)) => Value::Bool(a > b),
        (BinOp::Ge, Value::Int(a), Value::Int(b)) => Value::Bool(a >= b),
        (BinOp::And, Value::Bool(a), Value::Bool(b)) => Value::Bool(a && b),
        (BinOp::Or, Value::Bool(a), Value::Bool(b)) => Value::Bool(a || b),
        (BinOp::Eq, a, b) if a.ty() == b.ty() => Value::Bool(a == b),
        (BinOp::Ne, a, b) if a.ty() == b.ty() => Value::Bool(a != b),
        (op, a, b) => {
            return Err(mismatch(
                frame,
                format!("{:?} is not defined for {} and {}", op, a, b),
            ))
        }
    };
    Ok(value)
}
