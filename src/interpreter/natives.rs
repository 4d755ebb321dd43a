use std::{collections::HashMap, rc::Rc};

use crate::interpreter::value::{core::Value, host::NativeFn};

/// Type alias for builtin function handlers.
///
/// A builtin receives a slice of evaluated argument values and returns a
/// value, or an error message that is surfaced to the script unchanged.
/// All natives are variadic at the calling convention level; each one
/// checks its own arity.
type BuiltinFn = fn(&[Value]) -> Result<Value, String>;

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides a string name and a function pointer implementing
/// the builtin. The macro produces:
/// - `BuiltinDef` (internal metadata),
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => $func:expr
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name: &'static str,
            func: BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, func: $func },
            )*
        ];
        /// The names of all builtin native functions.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "print"    => print,
    "len"      => len,
    "upper"    => upper,
    "lower"    => lower,
    "trim"     => trim,
    "contains" => contains,
    "split"    => split,
    "join"     => join,
    "keys"     => keys,
    "values"   => values,
    "abs"      => abs,
    "floor"    => |args| unary_round("floor", args),
    "ceil"     => |args| unary_round("ceil", args),
    "round"    => |args| unary_round("round", args),
    "sqrt"     => sqrt,
    "min"      => |args| min_max("min", args),
    "max"      => |args| min_max("max", args),
    "number"   => number,
    "string"   => string,
    "range"    => range,
}

/// The native function registry: a mapping from names to variadic
/// callables.
///
/// The registry is pre-populated with the builtin catalog; host-injected
/// functions are registered on top and shadow builtins of the same name.
/// Lookup is the only operation the evaluator needs.
pub struct NativeRegistry {
    functions: HashMap<String, NativeFn>,
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl NativeRegistry {
    /// Creates a registry containing the builtin catalog.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut functions: HashMap<String, NativeFn> = HashMap::new();
        for def in BUILTIN_TABLE {
            let func = def.func;
            functions.insert(def.name.to_string(),
                             Rc::new(move |args: &[Value]| func(args)) as NativeFn);
        }
        Self { functions }
    }

    /// Registers a native function, replacing any existing one of the same
    /// name.
    pub fn register(&mut self, name: impl Into<String>, f: NativeFn) {
        self.functions.insert(name.into(), f);
    }

    /// Looks up a native function by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NativeFn> {
        self.functions.get(name)
    }

    /// Tests whether a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

/// Checks that a builtin received exactly `expected` arguments.
fn check_arity(name: &str, args: &[Value], expected: usize) -> Result<(), String> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(format!("{name} expects {expected} argument(s), got {}.", args.len()))
    }
}

/// Coerces a builtin argument to a number.
fn number_arg(name: &str, value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(format!("{name} expects a number, got {}.", other.type_name())),
    }
}

/// Coerces a builtin argument to a string slice.
fn string_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str, String> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(format!("{name} expects a string, got {}.", other.type_name())),
    }
}

/// Formats all arguments, joined by single spaces.
///
/// This is the native half of `print`: it only produces the text. The
/// evaluator appends the text to the collected output and writes it to
/// stdout unless the run is silent.
fn print(args: &[Value]) -> Result<Value, String> {
    let text = args.iter()
                   .map(std::string::ToString::to_string)
                   .collect::<Vec<_>>()
                   .join(" ");
    Ok(Value::Str(text.into()))
}

/// Returns the length of a string (in characters), array, or object.
fn len(args: &[Value]) -> Result<Value, String> {
    check_arity("len", args, 1)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::Array(a) => Ok(Value::Number(a.len() as f64)),
        Value::Object(o) => Ok(Value::Number(o.len() as f64)),
        other => Err(format!("len expects a string, array, or object, got {}.",
                             other.type_name())),
    }
}

/// Uppercases a string.
fn upper(args: &[Value]) -> Result<Value, String> {
    check_arity("upper", args, 1)?;
    Ok(Value::Str(string_arg("upper", &args[0])?.to_uppercase().into()))
}

/// Lowercases a string.
fn lower(args: &[Value]) -> Result<Value, String> {
    check_arity("lower", args, 1)?;
    Ok(Value::Str(string_arg("lower", &args[0])?.to_lowercase().into()))
}

/// Trims leading and trailing whitespace from a string.
fn trim(args: &[Value]) -> Result<Value, String> {
    check_arity("trim", args, 1)?;
    Ok(Value::Str(string_arg("trim", &args[0])?.trim().into()))
}

/// Tests whether a string contains a substring, or an array an element.
fn contains(args: &[Value]) -> Result<Value, String> {
    check_arity("contains", args, 2)?;
    match &args[0] {
        Value::Str(s) => {
            let needle = string_arg("contains", &args[1])?;
            Ok(Value::Bool(s.contains(needle)))
        },
        Value::Array(a) => Ok(Value::Bool(a.iter().any(|v| v == &args[1]))),
        other => Err(format!("contains expects a string or array, got {}.",
                             other.type_name())),
    }
}

/// Splits a string around a separator into an array of strings.
fn split(args: &[Value]) -> Result<Value, String> {
    check_arity("split", args, 2)?;
    let s = string_arg("split", &args[0])?;
    let sep = string_arg("split", &args[1])?;

    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::Str(c.to_string().into())).collect()
    } else {
        s.split(sep).map(|part| Value::Str(part.into())).collect()
    };
    Ok(parts.into())
}

/// Joins an array of values into a string with a separator.
fn join(args: &[Value]) -> Result<Value, String> {
    check_arity("join", args, 2)?;
    let Value::Array(a) = &args[0] else {
        return Err(format!("join expects an array, got {}.", args[0].type_name()));
    };
    let sep = string_arg("join", &args[1])?;

    let joined = a.iter()
                  .map(std::string::ToString::to_string)
                  .collect::<Vec<_>>()
                  .join(sep);
    Ok(Value::Str(joined.into()))
}

/// Returns an object's keys as a sorted array of strings.
///
/// Objects do not preserve insertion order, so the keys are sorted to keep
/// the result deterministic.
fn keys(args: &[Value]) -> Result<Value, String> {
    check_arity("keys", args, 1)?;
    let Value::Object(o) = &args[0] else {
        return Err(format!("keys expects an object, got {}.", args[0].type_name()));
    };

    let mut names: Vec<&String> = o.keys().collect();
    names.sort();
    Ok(names.into_iter()
            .map(|k| Value::Str(k.as_str().into()))
            .collect::<Vec<_>>()
            .into())
}

/// Returns an object's values, ordered by sorted key.
fn values(args: &[Value]) -> Result<Value, String> {
    check_arity("values", args, 1)?;
    let Value::Object(o) = &args[0] else {
        return Err(format!("values expects an object, got {}.", args[0].type_name()));
    };

    let mut names: Vec<&String> = o.keys().collect();
    names.sort();
    Ok(names.into_iter()
            .map(|k| o[k].clone())
            .collect::<Vec<_>>()
            .into())
}

/// Returns the absolute value of a number.
fn abs(args: &[Value]) -> Result<Value, String> {
    check_arity("abs", args, 1)?;
    Ok(Value::Number(number_arg("abs", &args[0])?.abs()))
}

/// Applies `floor`, `ceil`, or `round` to a number.
fn unary_round(name: &str, args: &[Value]) -> Result<Value, String> {
    check_arity(name, args, 1)?;
    let n = number_arg(name, &args[0])?;
    let result = match name {
        "floor" => n.floor(),
        "ceil" => n.ceil(),
        _ => n.round(),
    };
    Ok(Value::Number(result))
}

/// Returns the square root of a number.
fn sqrt(args: &[Value]) -> Result<Value, String> {
    check_arity("sqrt", args, 1)?;
    Ok(Value::Number(number_arg("sqrt", &args[0])?.sqrt()))
}

/// Returns the smallest or largest of one or more numbers.
fn min_max(name: &str, args: &[Value]) -> Result<Value, String> {
    if args.is_empty() {
        return Err(format!("{name} expects at least 1 argument."));
    }

    let mut best = number_arg(name, &args[0])?;
    for arg in &args[1..] {
        let n = number_arg(name, arg)?;
        best = if name == "min" { best.min(n) } else { best.max(n) };
    }
    Ok(Value::Number(best))
}

/// Converts a value to a number, or null when it has no numeric form.
fn number(args: &[Value]) -> Result<Value, String> {
    check_arity("number", args, 1)?;
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        Value::Str(s) => Ok(s.trim().parse().map_or(Value::Null, Value::Number)),
        _ => Ok(Value::Null),
    }
}

/// Converts any value to its string representation.
fn string(args: &[Value]) -> Result<Value, String> {
    check_arity("string", args, 1)?;
    Ok(Value::Str(args[0].to_string().into()))
}

/// Builds an array of consecutive integers.
///
/// `range(n)` counts from 0 up to (but excluding) `n`; `range(a, b)`
/// counts from `a` up to (but excluding) `b`. An empty range is allowed.
fn range(args: &[Value]) -> Result<Value, String> {
    let (start, end) = match args {
        [end] => (0.0, number_arg("range", end)?),
        [start, end] => (number_arg("range", start)?, number_arg("range", end)?),
        _ => return Err(format!("range expects 1 or 2 arguments, got {}.", args.len())),
    };

    let mut items = Vec::new();
    let mut current = start;
    while current < end {
        items.push(Value::Number(current));
        current += 1.0;
    }
    Ok(items.into())
}
