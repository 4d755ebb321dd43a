use std::rc::Rc;

use crate::{
    ast::{Expr, Pos, Stmt},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult, Unwind},
        value::{
            core::{FunctionValue, Value},
            host::NativeFn,
        },
    },
};

/// The higher-order array natives that need evaluator-level handling.
///
/// Their callback argument must be invoked through the same application
/// protocol as an ordinary user call, which a registry entry has no access
/// to, so these names are dispatched here instead.
const HIGHER_ORDER: [&str; 5] = ["map", "filter", "reduce", "find", "findIndex"];

impl Context {
    /// Evaluates a call expression.
    ///
    /// When the callee is a bare identifier, dispatch order is: a variable
    /// bound to that name, then the higher-order array natives, then
    /// `print`, then the native registry. Any other callee expression is
    /// evaluated and must produce a callable value.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotCallable`] when no callable target is
    /// found, naming the callee where statically known.
    pub(crate) fn eval_call(&mut self,
                            callee: &Expr,
                            args: &[Expr],
                            pos: Pos)
                            -> EvalResult<Value> {
        if let Expr::Identifier { name, .. } = callee {
            if let Some(value) = self.env.get(name) {
                let value = value.clone();
                let args = self.eval_args(args)?;
                return self.apply_value(&value, &args, Some(name.as_str()), pos);
            }

            if HIGHER_ORDER.contains(&name.as_str()) {
                let args = self.eval_args(args)?;
                return self.eval_higher_order(name, &args, pos);
            }

            if name == "print" {
                return self.eval_print(args, pos);
            }

            if let Some(f) = self.natives.get(name) {
                let f = Rc::clone(f);
                let args = self.eval_args(args)?;
                return Ok(call_native(name, &f, &args, pos)?);
            }

            return Err(RuntimeError::NotCallable { name: Some(name.clone()),
                                                   pos }.into());
        }

        let value = self.eval(callee)?;
        let args = self.eval_args(args)?;
        self.apply_value(&value, &args, None, pos)
    }

    /// Evaluates call arguments left to right.
    fn eval_args(&mut self, args: &[Expr]) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }
        Ok(values)
    }

    /// Invokes an already-evaluated value as a function.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotCallable`] when the value is neither a
    /// function value nor a native.
    pub(crate) fn apply_value(&mut self,
                              value: &Value,
                              args: &[Value],
                              name: Option<&str>,
                              pos: Pos)
                              -> EvalResult<Value> {
        match value {
            Value::Function(function) => {
                let function = Rc::clone(function);
                self.apply_function(&function, args)
            },
            Value::Native { name, f } => {
                let f = Rc::clone(f);
                Ok(call_native(name, &f, args, pos)?)
            },
            _ => Err(RuntimeError::NotCallable { name: name.map(str::to_string),
                                                 pos }.into()),
        }
    }

    /// Applies a function value to its arguments.
    ///
    /// The application protocol over the single shared environment:
    /// 1. snapshot the current environment;
    /// 2. merge the captured bindings in, overwriting live ones;
    /// 3. bind parameters positionally, missing trailing arguments bind to
    ///    null;
    /// 4. evaluate the body in order;
    /// 5. restore the snapshot unconditionally, including when the body
    ///    raised a return signal or an error.
    ///
    /// A `return` unwinding out of the body stops here and becomes the
    /// call's value; a body that completes without `return` yields the
    /// value of its last executed expression statement, the same rule the
    /// program boundary applies.
    pub(crate) fn apply_function(&mut self,
                                 function: &FunctionValue,
                                 args: &[Value])
                                 -> EvalResult<Value> {
        let snapshot = self.env.clone();

        for (name, value) in &function.captured {
            self.env.insert(name.clone(), value.clone());
        }
        for (index, param) in function.params.iter().enumerate() {
            let value = args.get(index).cloned().unwrap_or(Value::Null);
            self.env.insert(param.clone(), value);
        }

        let mut result = Ok(Value::Null);
        for statement in function.body.iter() {
            match self.eval_statement(statement) {
                Ok(value) => {
                    if matches!(statement, Stmt::Expression { .. }) {
                        result = Ok(value);
                    }
                },
                Err(Unwind::Return(value)) => {
                    result = Ok(value);
                    break;
                },
                Err(unwind) => {
                    result = Err(unwind);
                    break;
                },
            }
        }

        self.env = snapshot;
        result
    }

    /// Dispatches one of the higher-order array natives.
    ///
    /// The callback receives `(element, index)` arguments, or
    /// `(accumulator, element, index)` for `reduce`. `reduce`'s initial
    /// accumulator defaults to null when omitted; `find` and `findIndex`
    /// yield null and -1 when no element satisfies the predicate.
    fn eval_higher_order(&mut self, name: &str, args: &[Value], pos: Pos) -> EvalResult<Value> {
        let elements = match args.first() {
            Some(Value::Array(elements)) => Rc::clone(elements),
            Some(other) => {
                return Err(RuntimeError::TypeError { details: format!("{name} expects an array, got {}.",
                                                                      other.type_name()),
                                                     pos }.into())
            },
            None => {
                return Err(RuntimeError::TypeError { details: format!("{name} expects an array and a function."),
                                                     pos }.into())
            },
        };
        let callback = match args.get(1) {
            Some(callback @ (Value::Function(_) | Value::Native { .. })) => callback.clone(),
            _ => {
                return Err(RuntimeError::NotCallable { name: Some(name.to_string()),
                                                       pos }.into())
            },
        };

        match name {
            "map" => {
                let mut mapped = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    let call_args = [element.clone(), Value::Number(index as f64)];
                    mapped.push(self.apply_value(&callback, &call_args, Some(name), pos)?);
                }
                Ok(mapped.into())
            },

            "filter" => {
                let mut kept = Vec::new();
                for (index, element) in elements.iter().enumerate() {
                    let call_args = [element.clone(), Value::Number(index as f64)];
                    if self.apply_value(&callback, &call_args, Some(name), pos)?.is_truthy() {
                        kept.push(element.clone());
                    }
                }
                Ok(kept.into())
            },

            "reduce" => {
                let mut accumulator = args.get(2).cloned().unwrap_or(Value::Null);
                for (index, element) in elements.iter().enumerate() {
                    let call_args =
                        [accumulator, element.clone(), Value::Number(index as f64)];
                    accumulator = self.apply_value(&callback, &call_args, Some(name), pos)?;
                }
                Ok(accumulator)
            },

            "find" => {
                for (index, element) in elements.iter().enumerate() {
                    let call_args = [element.clone(), Value::Number(index as f64)];
                    if self.apply_value(&callback, &call_args, Some(name), pos)?.is_truthy() {
                        return Ok(element.clone());
                    }
                }
                Ok(Value::Null)
            },

            "findIndex" => {
                for (index, element) in elements.iter().enumerate() {
                    let call_args = [element.clone(), Value::Number(index as f64)];
                    if self.apply_value(&callback, &call_args, Some(name), pos)?.is_truthy() {
                        return Ok(Value::Number(index as f64));
                    }
                }
                Ok(Value::Number(-1.0))
            },

            _ => unreachable!(),
        }
    }

    /// Evaluates a `print` call.
    ///
    /// The registry's `print` native formats the arguments; the evaluator
    /// appends that text to the collected output and, unless the context is
    /// silent, writes it to stdout. The call itself yields null.
    fn eval_print(&mut self, args: &[Expr], pos: Pos) -> EvalResult<Value> {
        let f = match self.natives.get("print") {
            Some(f) => Rc::clone(f),
            None => {
                return Err(RuntimeError::NotCallable { name: Some("print".to_string()),
                                                       pos }.into())
            },
        };
        let args = self.eval_args(args)?;
        let text = call_native("print", &f, &args, pos)?.to_string();

        if !self.silent {
            println!("{text}");
        }
        self.output.push(text);
        Ok(Value::Null)
    }
}

/// Calls a native function, converting its string error into a positioned
/// runtime error.
fn call_native(name: &str,
               f: &NativeFn,
               args: &[Value],
               pos: Pos)
               -> Result<Value, RuntimeError> {
    f(args).map_err(|message| RuntimeError::Host { name: name.to_string(),
                                                   message,
                                                   pos })
}
