use crate::{
    ast::{Expr, Pos, Stmt},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates a `for (name in iterable) { ... }` loop.
    ///
    /// The iterable must evaluate to an array; its elements are visited in
    /// order, with the loop variable bound into the single shared
    /// environment for each iteration. After the loop the variable's prior
    /// value is restored if it had one, or removed otherwise, even when the
    /// body raised an error or a return signal.
    pub(crate) fn eval_for(&mut self,
                           var: &str,
                           iterable: &Expr,
                           body: &[Stmt],
                           pos: Pos)
                           -> EvalResult<Value> {
        let elements = match self.eval(iterable)? {
            Value::Array(elements) => elements,
            other => {
                return Err(RuntimeError::TypeError { details: format!("Cannot iterate over {}; for-loops require an array.",
                                                                      other.type_name()),
                                                     pos }.into())
            },
        };

        let saved = self.env.get(var).cloned();

        let mut result = Ok(Value::Null);
        'iterations: for element in elements.iter() {
            self.env.insert(var.to_string(), element.clone());
            for statement in body {
                if let Err(unwind) = self.eval_statement(statement) {
                    result = Err(unwind);
                    break 'iterations;
                }
            }
        }

        match saved {
            Some(value) => self.env.insert(var.to_string(), value),
            None => self.env.remove(var),
        };

        result
    }
}
