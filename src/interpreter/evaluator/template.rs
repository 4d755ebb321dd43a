use crate::{
    ast::Pos,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        lexer::tokenize,
        parser::core::parse_complete_expression,
        value::core::Value,
    },
};

impl Context {
    /// Evaluates a string template.
    ///
    /// The raw body is scanned left to right; on `${`, a brace-depth-aware
    /// scan finds the matching `}`, and the enclosed text is lexed, parsed
    /// as a standalone expression, and evaluated in the current
    /// environment. The result is stringified into the output, with null
    /// rendering as the literal text `null`. All other characters are
    /// copied verbatim; a `$` not followed by `{` is literal.
    ///
    /// Interpolations are deliberately lazy: they are re-lexed and
    /// re-parsed on every evaluation of the template node.
    ///
    /// # Errors
    /// Returns a [`RuntimeError::TemplateError`] for unbalanced braces or a
    /// fragment that fails to lex or parse; evaluation errors inside a
    /// fragment propagate as themselves.
    pub(crate) fn eval_template(&mut self, raw: &str, pos: Pos) -> EvalResult<Value> {
        let mut text = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(start) = rest.find("${") {
            text.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];

            let close = matching_brace(after_open).ok_or(RuntimeError::TemplateError { details: "missing closing '}'.".to_string(),
                                                                                       pos })?;
            let fragment = &after_open[..close];

            let value = self.eval_fragment(fragment, pos)?;
            text.push_str(&value.to_string());

            rest = &after_open[close + 1..];
        }
        text.push_str(rest);

        Ok(text.into())
    }

    /// Lexes, parses, and evaluates one `${...}` fragment.
    fn eval_fragment(&mut self, fragment: &str, pos: Pos) -> EvalResult<Value> {
        let tokens =
            tokenize(fragment).map_err(|err| RuntimeError::TemplateError { details: err.to_string(),
                                                                           pos })?;
        let expr =
            parse_complete_expression(&tokens).map_err(|err| {
                                                  RuntimeError::TemplateError { details: err.to_string(),
                                                                                pos }
                                              })?;
        self.eval(&expr)
    }
}

/// Finds the byte offset of the `}` closing an interpolation, counting
/// nested `{`/`}` pairs. Returns `None` when the braces do not balance.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in text.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                if depth == 0 {
                    return Some(offset);
                }
                depth -= 1;
            },
            _ => {},
        }
    }
    None
}
