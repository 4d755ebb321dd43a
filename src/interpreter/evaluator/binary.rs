use crate::{
    ast::{BinaryOperator, Pos},
    error::RuntimeError,
    interpreter::{evaluator::core::Context, value::core::Value},
};

impl Context {
    /// Applies a binary operator to two already-evaluated operands.
    ///
    /// Both operands are always evaluated before this is called; the
    /// logical operators do not short-circuit. `+` doubles as string
    /// concatenation whenever either operand is a string; the remaining
    /// arithmetic and relational operators coerce their operands with
    /// [`Value::as_number`]. Equality is structural and never fails.
    ///
    /// # Errors
    /// Returns a [`RuntimeError::TypeError`] when an arithmetic or
    /// relational operand has no numeric interpretation.
    pub(crate) fn eval_binary(left: &Value,
                              op: BinaryOperator,
                              right: &Value,
                              pos: Pos)
                              -> Result<Value, RuntimeError> {
        match op {
            BinaryOperator::Add => {
                if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                    let mut text = concat_text(left);
                    text.push_str(&concat_text(right));
                    Ok(text.into())
                } else {
                    Ok(Value::Number(left.as_number(pos)? + right.as_number(pos)?))
                }
            },
            BinaryOperator::Sub => Ok(Value::Number(left.as_number(pos)? - right.as_number(pos)?)),
            BinaryOperator::Mul => Ok(Value::Number(left.as_number(pos)? * right.as_number(pos)?)),
            BinaryOperator::Div => Ok(Value::Number(left.as_number(pos)? / right.as_number(pos)?)),
            BinaryOperator::Mod => Ok(Value::Number(left.as_number(pos)? % right.as_number(pos)?)),

            BinaryOperator::Equal => Ok(Value::Bool(left == right)),
            BinaryOperator::NotEqual => Ok(Value::Bool(left != right)),

            BinaryOperator::Less => Ok(Value::Bool(left.as_number(pos)? < right.as_number(pos)?)),
            BinaryOperator::LessEqual => {
                Ok(Value::Bool(left.as_number(pos)? <= right.as_number(pos)?))
            },
            BinaryOperator::Greater => {
                Ok(Value::Bool(left.as_number(pos)? > right.as_number(pos)?))
            },
            BinaryOperator::GreaterEqual => {
                Ok(Value::Bool(left.as_number(pos)? >= right.as_number(pos)?))
            },

            BinaryOperator::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
            BinaryOperator::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        }
    }
}

/// Renders a value for string concatenation. Unlike the display form used
/// by `print` and templates, null concatenates as the empty string.
fn concat_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
