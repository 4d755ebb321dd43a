use std::iter::Peekable;

use crate::{
    ast::{Expr, Pos, UnaryOperator},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, parse_block, parse_expression},
            utils::{expect_token, parse_comma_separated, parse_identifier},
        },
    },
};

/// Parses a unary expression.
///
/// Supports prefix operators:
/// - `-`   (numeric negation)
/// - `!`   (logical not)
/// - `not` (logical not, keyword spelling)
///
/// Unary operators are right-associative, so an input like `!-x` is parsed
/// as `!(-x)`.
///
/// If no unary operator is present, the function delegates to
/// [`parse_primary`] and then applies any postfix operators via
/// [`parse_postfix`].
///
/// Grammar:
/// ```text
///     unary := ("-" | "!" | "not") unary
///            | primary postfix*
/// ```
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
///
/// # Returns
/// An [`Expr::Unary`] or a primary expression possibly followed by postfixes.
pub(crate) fn parse_unary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    match tokens.peek() {
        Some((Token::Minus, pos)) => {
            let pos = *pos;
            tokens.next();
            let expr = parse_unary(tokens)?;
            Ok(Expr::Unary { op: UnaryOperator::Negate,
                             expr: Box::new(expr),
                             pos })
        },
        Some((Token::Bang | Token::Not, pos)) => {
            let pos = *pos;
            tokens.next();
            let expr = parse_unary(tokens)?;
            Ok(Expr::Unary { op: UnaryOperator::Not,
                             expr: Box::new(expr),
                             pos })
        },
        _ => {
            let primary = parse_primary(tokens)?;
            parse_postfix(tokens, primary)
        },
    }
}

/// Applies postfix operators to an already-parsed expression.
///
/// Postfix operators chain arbitrarily and bind tighter than any prefix or
/// binary operator:
///
/// - call: `expr(arg1, arg2, ...)`
/// - member access: `expr.name`
/// - null-safe member access: `expr?.name`
/// - index access: `expr[index]`
///
/// Grammar:
/// ```text
///     postfix := "(" arguments ")" | "." IDENT | "?." IDENT | "[" expression "]"
/// ```
fn parse_postfix<'a, I>(tokens: &mut Peekable<I>, mut expr: Expr) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    loop {
        match tokens.peek() {
            Some((Token::LParen, pos)) => {
                let pos = *pos;
                tokens.next();
                let args = parse_comma_separated(tokens, parse_expression, &Token::RParen)?;
                expr = Expr::Call { callee: Box::new(expr),
                                    args,
                                    pos };
            },
            Some((Token::Dot, pos)) => {
                let pos = *pos;
                tokens.next();
                let name = parse_identifier(tokens)?;
                expr = Expr::Member { object: Box::new(expr),
                                      name,
                                      pos };
            },
            Some((Token::SafeDot, pos)) => {
                let pos = *pos;
                tokens.next();
                let name = parse_identifier(tokens)?;
                expr = Expr::SafeMember { object: Box::new(expr),
                                          name,
                                          pos };
            },
            Some((Token::LBracket, pos)) => {
                let pos = *pos;
                tokens.next();
                let index = parse_expression(tokens)?;
                expect_token(tokens, &Token::RBracket)?;
                expr = Expr::Index { object: Box::new(expr),
                                     index: Box::new(index),
                                     pos };
            },
            _ => break,
        }
    }
    Ok(expr)
}

/// Parses a primary (atomic) expression.
///
/// Primary expressions form the base of the expression grammar and include:
/// - numeric, string, template, boolean, and null literals
/// - identifiers
/// - parenthesized expressions
/// - array literals (`[ ... ]`)
/// - object literals (`{ key: value, ... }`)
/// - function literals (`fn(params) { ... }`)
///
/// `fn` is not a lexer keyword; an identifier spelled `fn` followed by `(`
/// opens a function literal, anywhere else it is an ordinary identifier.
///
/// This function does not handle unary or postfix operators; it dispatches
/// on the leading token only.
fn parse_primary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    match tokens.next() {
        Some((Token::Number(value), pos)) => Ok(Expr::Number { value: *value,
                                                               pos:   *pos, }),
        Some((Token::Str(value), pos)) => Ok(Expr::Str { value: value.clone(),
                                                         pos:   *pos, }),
        Some((Token::Template(raw), pos)) => Ok(Expr::Template { raw: raw.clone(),
                                                                 pos: *pos, }),
        Some((Token::Bool(value), pos)) => Ok(Expr::Bool { value: *value,
                                                           pos:   *pos, }),
        Some((Token::Null, pos)) => Ok(Expr::Null { pos: *pos }),
        Some((Token::Identifier(name), pos)) => {
            if name == "fn"
               && let Some((Token::LParen, _)) = tokens.peek()
            {
                return parse_function_literal(tokens, *pos);
            }
            Ok(Expr::Identifier { name: name.clone(),
                                  pos:  *pos, })
        },
        Some((Token::LParen, _)) => {
            let expr = parse_expression(tokens)?;
            expect_token(tokens, &Token::RParen)?;
            Ok(expr)
        },
        Some((Token::LBracket, pos)) => {
            let pos = *pos;
            let elements = parse_comma_separated(tokens, parse_expression, &Token::RBracket)?;
            Ok(Expr::Array { elements, pos })
        },
        Some((Token::LBrace, pos)) => parse_object_literal(tokens, *pos),
        Some((tok, pos)) => {
            Err(ParseError::UnexpectedToken { message: format!("Expected an expression, found {}.",
                                                               tok.describe()),
                                              pos:     *pos, })
        },
        None => Err(ParseError::UnexpectedEndOfInput { pos: Pos::default() }),
    }
}

/// Parses a function literal after its `fn` identifier.
///
/// Grammar: `function := "fn" "(" (IDENT ("," IDENT)*)? ")" block`
///
/// The body is a mandatory brace-block.
fn parse_function_literal<'a, I>(tokens: &mut Peekable<I>, pos: Pos) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    tokens.next();

    let params = parse_comma_separated(tokens, parse_identifier, &Token::RParen)?;
    let (body, _) = parse_block(tokens)?;

    Ok(Expr::Function { params, body, pos })
}

/// Parses an object literal after its opening `{`.
///
/// Grammar: `object := "{" (IDENT ":" expression ("," IDENT ":" expression)*)? "}"`
///
/// Keys are bare identifiers, not arbitrary expressions or strings.
fn parse_object_literal<'a, I>(tokens: &mut Peekable<I>, pos: Pos) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let entries = parse_comma_separated(tokens,
                                        |tokens| {
                                            let key = parse_identifier(tokens)?;
                                            expect_token(tokens, &Token::Colon)?;
                                            let value = parse_expression(tokens)?;
                                            Ok((key, value))
                                        },
                                        &Token::RBrace)?;

    Ok(Expr::Object { entries, pos })
}
