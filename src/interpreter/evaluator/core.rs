use std::{
    collections::HashMap,
    rc::Rc,
    time::Instant,
};

use crate::{
    ast::{Expr, Pos, Program, Stmt, UnaryOperator},
    error::RuntimeError,
    interpreter::{
        natives::NativeRegistry,
        value::core::{FunctionValue, Value},
    },
};

/// An out-of-band condition that unwinds the evaluation stack.
///
/// `return` is not an error: it is a control signal that unwinds exactly to
/// the nearest enclosing function application, or to the top-level program
/// boundary, where it becomes that boundary's result. Everything else that
/// unwinds is a genuine [`RuntimeError`]. Keeping the two in one enum lets
/// every evaluation step propagate both with `?` while forcing the
/// boundaries to distinguish them explicitly.
#[derive(Debug, PartialEq)]
pub enum Unwind {
    /// A `return` statement in flight, carrying the returned value.
    Return(Value),
    /// A runtime failure in flight.
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Self::Error(err)
    }
}

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or an
/// [`Unwind`] describing why evaluation stopped early.
pub type EvalResult<T> = Result<T, Unwind>;

/// Stores the runtime evaluation context.
///
/// This struct holds the interpreter state: the single flat environment
/// shared by the whole evaluation, the native function registry, the
/// collected print output, and the cooperative resource limits.
///
/// ## Usage
///
/// A `Context` is created per execution. The host seeds the environment
/// with injected variables, optionally configures limits, and calls
/// [`Context::run`]. A `Context` is exclusively owned by one execution;
/// nothing is shared between instances except the program cache and the
/// registry contents they were built from.
pub struct Context {
    /// The variable environment: one flat, mutable mapping shared by the
    /// whole evaluation. Calls and loops save and restore it; there is no
    /// nested scope chain.
    pub env:      HashMap<String, Value>,
    /// Registered native functions, looked up by name after the
    /// environment.
    pub natives:  NativeRegistry,
    /// Lines produced by `print`, in order.
    pub output:   Vec<String>,
    /// When true, `print` only collects output and does not write to
    /// stdout.
    pub silent:   bool,
    ops:          u64,
    max_ops:      u64,
    deadline:     Option<Instant>,
}

#[allow(clippy::new_without_default)]
impl Context {
    /// Creates a new evaluation context with an empty environment, the
    /// builtin native catalog, and no resource limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(NativeRegistry::with_builtins())
    }

    /// Creates a context around a prepared native registry.
    #[must_use]
    pub fn with_registry(natives: NativeRegistry) -> Self {
        Self { env: HashMap::new(),
               natives,
               output: Vec::new(),
               silent: false,
               ops: 0,
               max_ops: 0,
               deadline: None }
    }

    /// Configures the operation quota and resets the operation counter.
    ///
    /// A quota of 0 means unlimited.
    pub const fn set_max_ops(&mut self, max_ops: u64) {
        self.max_ops = max_ops;
        self.ops = 0;
    }

    /// Configures the absolute deadline. `None` means unlimited.
    pub const fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    /// Runs a parsed program to completion.
    ///
    /// Statements execute in source order. The final value is the value of
    /// the last executed expression statement, or the value carried by a
    /// `return` that reaches the program boundary. Printed lines accumulate
    /// in [`Context::output`].
    ///
    /// # Parameters
    /// - `program`: The program to execute.
    ///
    /// # Returns
    /// The program's final value.
    ///
    /// # Errors
    /// Returns the first [`RuntimeError`] raised by evaluation; execution
    /// does not resume after a failure.
    ///
    /// # Example
    /// ```
    /// use quill::interpreter::{
    ///     evaluator::core::Context,
    ///     lexer::tokenize,
    ///     parser::core::parse_program,
    /// };
    ///
    /// let tokens = tokenize("let x = 2; x * 21").unwrap();
    /// let program = parse_program(&tokens).unwrap();
    ///
    /// let mut context = Context::new();
    /// let value = context.run(&program).unwrap();
    /// assert_eq!(value.to_string(), "42");
    /// ```
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let mut last = Value::Null;

        for statement in &program.statements {
            match self.eval_statement(statement) {
                Ok(value) => {
                    if matches!(statement, Stmt::Expression { .. }) {
                        last = value;
                    }
                },
                Err(Unwind::Return(value)) => return Ok(value),
                Err(Unwind::Error(err)) => return Err(err),
            }
        }

        Ok(last)
    }

    /// Performs the cooperative limit check.
    ///
    /// Called on every statement and expression evaluation: increments the
    /// operation counter and compares it against the quota, then compares
    /// the wall clock against the deadline. Preemption is therefore
    /// node-granular; a native function that does unbounded internal work
    /// cannot be interrupted.
    pub(crate) fn check_limits(&mut self) -> Result<(), RuntimeError> {
        self.ops += 1;
        if self.max_ops > 0 && self.ops > self.max_ops {
            return Err(RuntimeError::OperationLimitExceeded { limit: self.max_ops });
        }
        if let Some(deadline) = self.deadline
           && Instant::now() > deadline
        {
            return Err(RuntimeError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Evaluates a single statement.
    ///
    /// Returns the value of expression statements (and of the executed
    /// branch of an `if`/block); declaration and loop statements yield
    /// null. A `return` statement never returns normally — it raises
    /// [`Unwind::Return`].
    ///
    /// # Errors
    /// Propagates limit violations and any runtime error from the
    /// statement's expressions.
    pub fn eval_statement(&mut self, statement: &Stmt) -> EvalResult<Value> {
        self.check_limits()?;

        match statement {
            Stmt::Let { name, value, .. } => {
                let value = self.eval(value)?;
                self.env.insert(name.clone(), value);
                Ok(Value::Null)
            },

            Stmt::Assign { name, value, pos } => {
                if !self.env.contains_key(name) {
                    return Err(RuntimeError::UndefinedVariable { name: name.clone(),
                                                                 pos:  *pos, }.into());
                }
                let value = self.eval(value)?;
                self.env.insert(name.clone(), value);
                Ok(Value::Null)
            },

            Stmt::If { condition,
                       then_branch,
                       else_branch,
                       .. } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval_statement(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.eval_statement(else_branch)
                } else {
                    Ok(Value::Null)
                }
            },

            Stmt::For { var,
                        iterable,
                        body,
                        pos, } => self.eval_for(var, iterable, body, *pos),

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                Err(Unwind::Return(value))
            },

            Stmt::Block { statements, .. } => {
                let mut last = Value::Null;
                for statement in statements {
                    last = self.eval_statement(statement)?;
                }
                Ok(last)
            },

            Stmt::Expression { expr, .. } => self.eval(expr),
        }
    }

    /// Evaluates an expression and returns the resulting value.
    ///
    /// This is the main evaluation dispatch: a single recursive match over
    /// the closed set of AST node kinds. Every call first performs the
    /// cooperative limit check.
    ///
    /// # Errors
    /// Propagates limit violations, type errors, and the `return` control
    /// signal from function bodies.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.check_limits()?;

        match expr {
            Expr::Number { value, .. } => Ok(Value::Number(*value)),
            Expr::Str { value, .. } => Ok(Value::Str(value.as_str().into())),
            Expr::Template { raw, pos } => self.eval_template(raw, *pos),
            Expr::Bool { value, .. } => Ok(Value::Bool(*value)),
            Expr::Null { .. } => Ok(Value::Null),

            Expr::Identifier { name, .. } => Ok(self.lookup(name)),

            Expr::Unary { op, expr, pos } => self.eval_unary(*op, expr, *pos),

            Expr::Binary { left,
                           op,
                           right,
                           pos, } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(Self::eval_binary(&left, *op, &right, *pos)?)
            },

            Expr::Elvis { left, right, .. } => {
                let left = self.eval(left)?;
                if left.is_null() {
                    self.eval(right)
                } else {
                    Ok(left)
                }
            },

            Expr::Call { callee, args, pos } => self.eval_call(callee, args, *pos),

            Expr::Member { object, name, pos } => self.eval_member(object, name, false, *pos),
            Expr::SafeMember { object, name, pos } => self.eval_member(object, name, true, *pos),
            Expr::Index { object, index, pos } => self.eval_index(object, index, *pos),

            Expr::Array { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval(element)?);
                }
                Ok(values.into())
            },

            Expr::Object { entries, .. } => {
                let mut map = HashMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = self.eval(value)?;
                    map.insert(key.clone(), value);
                }
                Ok(map.into())
            },

            Expr::Function { params, body, .. } => {
                // The captured environment is a value copy frozen at this
                // moment, not a reference to the live environment.
                Ok(Value::Function(Rc::new(FunctionValue { params:   params.clone(),
                                                           body:     Rc::new(body.clone()),
                                                           captured: self.env.clone(), })))
            },
        }
    }

    /// Resolves an identifier.
    ///
    /// Lookup order: the variable environment first, then the native
    /// registry. Unresolved identifiers evaluate to null, not an error.
    fn lookup(&self, name: &str) -> Value {
        if let Some(value) = self.env.get(name) {
            return value.clone();
        }
        if let Some(f) = self.natives.get(name) {
            return Value::Native { name: name.into(),
                                   f:    Rc::clone(f), };
        }
        Value::Null
    }

    /// Evaluates a unary operation.
    fn eval_unary(&mut self, op: UnaryOperator, expr: &Expr, pos: Pos) -> EvalResult<Value> {
        let value = self.eval(expr)?;
        match op {
            UnaryOperator::Negate => Ok(Value::Number(-value.as_number(pos)?)),
            UnaryOperator::Not => Ok(Value::Bool(!value.is_truthy())),
        }
    }

    /// Takes the collected print output, leaving the context's buffer
    /// empty.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}
