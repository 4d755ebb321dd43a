use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{Pos, Stmt},
    error::RuntimeError,
    interpreter::value::host::{HostObject, NativeFn},
};

/// Represents a runtime value in the interpreter.
///
/// This enum models all the possible types that can appear in expressions,
/// assignments, function returns, and conditional evaluations. Compound
/// values are reference-counted, so cloning a `Value` is always cheap.
#[derive(Clone)]
pub enum Value {
    /// The absence of a value. Unresolved identifiers evaluate to `Null`.
    Null,
    /// A boolean value (`true` or `false`).
    Bool(bool),
    /// A numeric value (double precision floating-point).
    Number(f64),
    /// A string value.
    Str(Rc<str>),
    /// An ordered array of `Value` elements.
    Array(Rc<Vec<Self>>),
    /// A string-keyed mapping of values. Insertion order is not preserved.
    Object(Rc<HashMap<String, Self>>),
    /// A function value created by a `fn` literal.
    Function(Rc<FunctionValue>),
    /// A native function: a builtin, a host-injected function, or a method
    /// bound to a host object.
    Native {
        /// The function's registered name, for error messages.
        name: Rc<str>,
        /// The underlying callable.
        f:    NativeFn,
    },
    /// An opaque reference to a host-bound object.
    Host(Rc<dyn HostObject>),
}

/// A function value: parameters, body, and a captured environment.
///
/// The captured environment is a full copy of the variable mapping taken at
/// the moment the `fn` literal was evaluated. It is NOT a reference to an
/// outer scope and is never mutated after capture: two function values
/// created before and after a variable mutation observe different captured
/// values for that variable.
pub struct FunctionValue {
    /// Ordered parameter names.
    pub params:   Vec<String>,
    /// The body statements, shared between clones of the value.
    pub body:     Rc<Vec<Stmt>>,
    /// The snapshot of variable bindings captured at creation time.
    pub captured: HashMap<String, Value>,
}

impl Value {
    /// Applies the truthiness rule used by conditionals and the logical
    /// operators.
    ///
    /// - null is false;
    /// - booleans are themselves;
    /// - a number is false only when it is exactly zero;
    /// - a string is false only when it is empty;
    /// - arrays, objects, functions, and host objects are always true.
    ///
    /// # Example
    /// ```
    /// use quill::interpreter::value::core::Value;
    ///
    /// assert!(!Value::Null.is_truthy());
    /// assert!(!Value::Number(0.0).is_truthy());
    /// assert!(Value::Number(-1.5).is_truthy());
    /// assert!(!Value::Str("".into()).is_truthy());
    /// assert!(Value::Array(vec![].into()).is_truthy());
    /// ```
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) | Self::Function(_) | Self::Native { .. }
            | Self::Host(_) => true,
        }
    }

    /// Returns `true` if the value is [`Null`](Self::Null).
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Coerces the value to a number for the arithmetic and relational
    /// operators.
    ///
    /// Numbers pass through; booleans coerce to `1` and `0`; strings that
    /// parse as numbers coerce to their numeric value. Everything else is a
    /// type error.
    ///
    /// # Parameters
    /// - `pos`: Source position for error reporting.
    ///
    /// # Errors
    /// Returns a [`RuntimeError::TypeError`] when the value has no numeric
    /// interpretation.
    pub fn as_number(&self, pos: Pos) -> Result<f64, RuntimeError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Self::Str(s) => {
                s.trim().parse().map_err(|_| RuntimeError::TypeError { details: format!("Cannot use string \"{s}\" as a number."),
                                                                       pos })
            },
            other => Err(RuntimeError::TypeError { details: format!("Cannot use {} as a number.",
                                                                    other.type_name()),
                                                   pos }),
        }
    }

    /// Returns a short name for the value's runtime type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Native { .. } => "function",
            Self::Host(host) => host.type_name(),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v.into())
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(Rc::new(v))
    }
}

impl From<HashMap<String, Self>> for Value {
    fn from(v: HashMap<String, Self>) -> Self {
        Self::Object(Rc::new(v))
    }
}

impl PartialEq for Value {
    /// Structural equality for data values, identity for callables and host
    /// objects.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Native { f: a, .. }, Self::Native { f: b, .. }) => Rc::ptr_eq(a, b),
            (Self::Host(a), Self::Host(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Array(a) => f.debug_tuple("Array").field(a).finish(),
            Self::Object(o) => f.debug_tuple("Object").field(o).finish(),
            Self::Function(func) => {
                write!(f, "Function(fn({}))", func.params.join(", "))
            },
            Self::Native { name, .. } => write!(f, "Native({name})"),
            Self::Host(host) => write!(f, "Host({})", host.type_name()),
        }
    }
}

impl std::fmt::Display for Value {
    /// Stringifies a value the way `print` and template interpolation do.
    ///
    /// Null renders as the literal text `null`. Whole numbers render
    /// without a decimal point. Object keys are sorted so that output is
    /// deterministic even though objects do not preserve insertion order.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Str(s) => write!(f, "{s}"),
            Self::Array(a) => {
                write!(f, "[")?;

                for (index, value) in a.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{value}")?;
                }

                write!(f, "]")
            },
            Self::Object(o) => {
                let mut keys: Vec<&String> = o.keys().collect();
                keys.sort();

                write!(f, "{{")?;
                for (index, key) in keys.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {}", o[*key])?;
                }
                write!(f, "}}")
            },
            Self::Function(func) => write!(f, "<fn({})>", func.params.join(", ")),
            Self::Native { name, .. } => write!(f, "<native {name}>"),
            Self::Host(host) => write!(f, "<{}>", host.type_name()),
        }
    }
}

/// Formats a number without a trailing `.0` when it is a whole value.
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
