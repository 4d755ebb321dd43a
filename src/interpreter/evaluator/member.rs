use crate::{
    ast::{Expr, Pos},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::{core::Value, host::HostMember},
    },
};

impl Context {
    /// Evaluates member access, `object.name` or `object?.name`.
    ///
    /// A null receiver fails for `.` and yields null for `?.`. Data
    /// objects return the named field, or null when absent. Host objects
    /// resolve the member dynamically: a field becomes its value, a method
    /// becomes a callable bound to the receiver, and an unknown member
    /// becomes null. Any other receiver is a type error.
    pub(crate) fn eval_member(&mut self,
                              object: &Expr,
                              name: &str,
                              safe: bool,
                              pos: Pos)
                              -> EvalResult<Value> {
        let receiver = self.eval(object)?;

        match receiver {
            Value::Null => {
                if safe {
                    Ok(Value::Null)
                } else {
                    Err(RuntimeError::NullMemberAccess { name: name.to_string(),
                                                         pos }.into())
                }
            },

            Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),

            Value::Host(host) => match host.member(name) {
                Some(HostMember::Field(value)) => Ok(value),
                Some(HostMember::Method(f)) => Ok(Value::Native { name: name.into(),
                                                                  f }),
                None => Ok(Value::Null),
            },

            other => Err(RuntimeError::TypeError { details: format!("Cannot access member '{name}' of {}.",
                                                                    other.type_name()),
                                                   pos }.into()),
        }
    }

    /// Evaluates index access, `object[index]`.
    ///
    /// Arrays take a numeric index; out-of-range or non-numeric indices
    /// yield null. Objects take a string key; absent or non-string keys
    /// yield null. Any other receiver is a type error.
    pub(crate) fn eval_index(&mut self,
                             object: &Expr,
                             index: &Expr,
                             pos: Pos)
                             -> EvalResult<Value> {
        let receiver = self.eval(object)?;
        let index = self.eval(index)?;

        match receiver {
            Value::Array(elements) => {
                let Value::Number(n) = index else {
                    return Ok(Value::Null);
                };
                if n < 0.0 || n.fract() != 0.0 {
                    return Ok(Value::Null);
                }
                Ok(elements.get(n as usize).cloned().unwrap_or(Value::Null))
            },

            Value::Object(map) => {
                let Value::Str(key) = index else {
                    return Ok(Value::Null);
                };
                Ok(map.get(key.as_ref()).cloned().unwrap_or(Value::Null))
            },

            other => Err(RuntimeError::TypeError { details: format!("Cannot index into {}.",
                                                                    other.type_name()),
                                                   pos }.into()),
        }
    }
}
