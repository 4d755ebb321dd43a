use std::iter::Peekable;

use crate::{
    ast::{Pos, Stmt},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, parse_block, parse_expression},
            utils::{expect_token, parse_identifier},
        },
    },
};

/// Parses a single statement.
///
/// A statement may be one of:
/// - a variable declaration (`let x = ...`),
/// - an assignment (`x = ...`),
/// - an `if` statement with an optional `else` branch,
/// - a `for (name in iterable) { ... }` loop,
/// - a `return` statement,
/// - a brace-delimited block,
/// - an expression used as a statement.
///
/// Assignments are disambiguated from bare expression statements by a
/// one-token lookahead for `=` after an identifier. The `for` keyword is not
/// reserved by the lexer; it is recognized here by literal text when it
/// opens a loop header.
///
/// # Parameters
/// - `tokens`: Token iterator containing `(Token, Pos)` pairs.
///
/// # Returns
/// A parsed [`Stmt`] node.
///
/// # Errors
/// Returns a `ParseError` if no statement form matches the input.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    // Lookaheads are computed up front; a match guard cannot re-borrow the
    // iterator while the peeked token is live.
    let loop_header = is_loop_header(tokens);
    let object_literal = starts_object_literal(tokens);

    match tokens.peek() {
        Some((Token::Let, _)) => parse_let(tokens),
        Some((Token::If, _)) => parse_if(tokens),
        Some((Token::Return, _)) => parse_return(tokens),
        Some((Token::LBrace, _)) if !object_literal => {
            let (statements, pos) = parse_block(tokens)?;
            Ok(Stmt::Block { statements, pos })
        },
        Some((Token::Identifier(name), _)) if name == "for" && loop_header => parse_for(tokens),
        Some((Token::Identifier(_), _)) => {
            if let Some(statement) = parse_assignment(tokens)? {
                return Ok(statement);
            }
            parse_expression_statement(tokens)
        },
        Some(_) => parse_expression_statement(tokens),
        None => Err(ParseError::UnexpectedEndOfInput { pos: Pos::default() }),
    }
}

/// Tests whether the token under the cursor opens a `for (...)` header.
///
/// `for` is only special positionally, so `for` followed by anything other
/// than `(` falls through to ordinary expression parsing.
fn is_loop_header<'a, I>(tokens: &Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut lookahead = tokens.clone();
    lookahead.next();
    matches!(lookahead.peek(), Some((Token::LParen, _)))
}

/// Tests whether a leading `{` opens an object literal rather than a block.
///
/// A `{` followed by `}` or by an `IDENT :` entry is an object literal used
/// as an expression statement; any other content is a statement block.
fn starts_object_literal<'a, I>(tokens: &Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut lookahead = tokens.clone();
    if !matches!(lookahead.next(), Some((Token::LBrace, _))) {
        return false;
    }
    match lookahead.next() {
        Some((Token::RBrace, _)) => true,
        Some((Token::Identifier(_), _)) => {
            matches!(lookahead.next(), Some((Token::Colon, _)))
        },
        _ => false,
    }
}

/// Parses a variable declaration of the form `let <identifier> = <expr>`.
fn parse_let<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let pos = match tokens.next() {
        Some((Token::Let, pos)) => *pos,
        _ => unreachable!(),
    };

    let name = parse_identifier(tokens)?;
    expect_token(tokens, &Token::Equals)?;
    let value = parse_expression(tokens)?;

    Ok(Stmt::Let { name, value, pos })
}

/// Parses an assignment `<identifier> = <expr>` if one is present.
///
/// The function performs a one-token lookahead: if the next token is an
/// identifier and the token after it is `=`, an assignment is parsed.
/// Otherwise nothing is consumed and `Ok(None)` is returned so the caller
/// can fall back to an expression statement.
fn parse_assignment<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Option<Stmt>>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut lookahead = tokens.clone();
    lookahead.next();

    if let Some((Token::Equals, _)) = lookahead.peek() {
        let (name, pos) = if let Some((Token::Identifier(n), pos)) = tokens.next() {
            (n.clone(), *pos)
        } else {
            unreachable!()
        };
        tokens.next();

        let value = parse_expression(tokens)?;
        return Ok(Some(Stmt::Assign { name, value, pos }));
    }

    Ok(None)
}

/// Parses an `if` statement with an optional `else` branch.
///
/// Syntax:
/// ```text
///     if (<condition>) <branch>
///     if (<condition>) <branch> else <branch>
/// ```
/// A branch is either a brace-block or a single statement, so chained
/// `else if` falls out naturally.
fn parse_if<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let pos = match tokens.next() {
        Some((Token::If, pos)) => *pos,
        _ => unreachable!(),
    };

    expect_token(tokens, &Token::LParen)?;
    let condition = parse_expression(tokens)?;
    expect_token(tokens, &Token::RParen)?;

    let then_branch = Box::new(parse_statement(tokens)?);

    let else_branch = if let Some((Token::Else, _)) = tokens.peek() {
        tokens.next();
        Some(Box::new(parse_statement(tokens)?))
    } else {
        None
    };

    Ok(Stmt::If { condition,
                  then_branch,
                  else_branch,
                  pos })
}

/// Parses a `for (name in iterable) { ... }` loop.
///
/// The `in` separator, like `for` itself, is matched by identifier text
/// rather than as a lexer keyword. The body must be a brace-block.
fn parse_for<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let pos = match tokens.next() {
        Some((Token::Identifier(_), pos)) => *pos,
        _ => unreachable!(),
    };

    expect_token(tokens, &Token::LParen)?;
    let var = parse_identifier(tokens)?;

    match tokens.next() {
        Some((Token::Identifier(kw), _)) if kw == "in" => {},
        Some((tok, pos)) => {
            return Err(ParseError::UnexpectedToken { message: format!("Expected 'in' after loop variable, found {}.",
                                                                      tok.describe()),
                                                     pos:     *pos, });
        },
        None => return Err(ParseError::UnexpectedEndOfInput { pos }),
    }

    let iterable = parse_expression(tokens)?;
    expect_token(tokens, &Token::RParen)?;

    let (body, _) = parse_block(tokens)?;

    Ok(Stmt::For { var,
                   iterable,
                   body,
                   pos })
}

/// Parses a `return` statement with an optional value expression.
///
/// The value is omitted when the statement ends immediately: at a `;`, a
/// closing `}`, or the end of input. `return` without a value returns null.
fn parse_return<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let pos = match tokens.next() {
        Some((Token::Return, pos)) => *pos,
        _ => unreachable!(),
    };

    let value = match tokens.peek() {
        None | Some((Token::Semicolon | Token::RBrace, _)) => None,
        Some(_) => Some(parse_expression(tokens)?),
    };

    Ok(Stmt::Return { value, pos })
}

/// Parses a bare expression statement.
fn parse_expression_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let pos = tokens.peek().map_or_else(Pos::default, |(_, pos)| *pos);
    let expr = parse_expression(tokens)?;

    Ok(Stmt::Expression { expr, pos })
}
