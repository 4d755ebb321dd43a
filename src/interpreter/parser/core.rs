use std::iter::Peekable;

use crate::{
    ast::{Expr, Pos, Program, Stmt},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{binary::parse_elvis, statement::parse_statement},
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a complete program from a token stream.
///
/// Statements are parsed in order until the stream is exhausted. Statement
/// terminators (`;`) are optional and consumed greedily between statements.
/// There is no error recovery: the first error aborts parsing.
///
/// # Parameters
/// - `tokens`: The token stream produced by
///   [`crate::interpreter::lexer::tokenize`].
///
/// # Returns
/// The parsed [`Program`].
///
/// # Errors
/// Returns a [`ParseError`] describing the first structural problem found.
///
/// # Example
/// ```
/// use quill::interpreter::{lexer::tokenize, parser::core::parse_program};
///
/// let tokens = tokenize("let x = 1; print(x)").unwrap();
/// let program = parse_program(&tokens).unwrap();
///
/// assert_eq!(program.statements.len(), 2);
/// ```
pub fn parse_program(tokens: &[(Token, Pos)]) -> ParseResult<Program> {
    let mut iter = tokens.iter().peekable();
    let mut statements = Vec::new();

    loop {
        while let Some((Token::Semicolon, _)) = iter.peek() {
            iter.next();
        }
        if iter.peek().is_none() {
            break;
        }
        statements.push(parse_statement(&mut iter)?);
    }

    Ok(Program { statements })
}

/// Parses a full expression.
///
/// This is the entry point for expression parsing. It begins at the
/// lowest-precedence level, the elvis operator, and recursively descends
/// through the precedence hierarchy.
///
/// It is public because the evaluator re-enters it for the `${...}`
/// sub-expressions inside string templates.
///
/// Grammar: `expression := elvis`
///
/// # Parameters
/// - `tokens`: Token iterator providing `(Token, Pos)` pairs.
///
/// # Returns
/// The parsed expression node.
///
/// # Errors
/// Propagates any [`ParseError`] from the precedence levels below.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    parse_elvis(tokens)
}

/// Parses a standalone expression and requires the stream to be fully
/// consumed.
///
/// Used for template interpolation fragments, where trailing tokens would
/// silently change meaning if ignored.
///
/// # Errors
/// Returns a [`ParseError`] if the expression is malformed or followed by
/// extra tokens.
pub fn parse_complete_expression(tokens: &[(Token, Pos)]) -> ParseResult<Expr> {
    let mut iter = tokens.iter().peekable();
    let expr = parse_expression(&mut iter)?;

    if let Some((token, pos)) = iter.peek() {
        return Err(ParseError::UnexpectedToken { message: format!("Unexpected {} after expression.", token.describe()),
                                                 pos:     *pos, });
    }

    Ok(expr)
}

/// Parses a brace-delimited block and returns its statements.
///
/// The opening `{` must be the next token. Semicolons between statements
/// are consumed greedily, and the block ends at the matching `}`.
///
/// # Parameters
/// - `tokens`: Token iterator positioned at `{`.
///
/// # Returns
/// The statements of the block and the position of the opening brace.
///
/// # Errors
/// Returns a [`ParseError`] if the braces do not balance or a statement
/// inside the block is malformed.
pub fn parse_block<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<(Vec<Stmt>, Pos)>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let open_pos = match tokens.next() {
        Some((Token::LBrace, pos)) => *pos,
        Some((token, pos)) => {
            return Err(ParseError::UnexpectedToken { message: format!("Expected '{{', found {}.", token.describe()),
                                                     pos:     *pos, });
        },
        None => return Err(ParseError::UnexpectedEndOfInput { pos: Pos::default() }),
    };

    let mut statements = Vec::new();
    loop {
        while let Some((Token::Semicolon, _)) = tokens.peek() {
            tokens.next();
        }
        match tokens.peek() {
            Some((Token::RBrace, _)) => {
                tokens.next();
                break;
            },
            Some(_) => statements.push(parse_statement(tokens)?),
            None => return Err(ParseError::UnexpectedEndOfInput { pos: open_pos }),
        }
    }

    Ok((statements, open_pos))
}
