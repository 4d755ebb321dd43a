use std::iter::Peekable;

use crate::{
    ast::{BinaryOperator, Expr, Pos},
    interpreter::{
        lexer::Token,
        parser::{core::ParseResult, unary::parse_unary},
    },
};

/// Parses elvis expressions, the lowest precedence level.
///
/// The rule is: `elvis := logical_or ("?:" logical_or)*`
///
/// Elvis associates left, which is observationally identical to right
/// association for this operator.
///
/// # Parameters
/// - `tokens`: Token stream with position information.
///
/// # Returns
/// An [`Expr::Elvis`] chain or the underlying logical-or expression.
pub fn parse_elvis<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut left = parse_logical_or(tokens)?;
    while let Some((Token::Elvis, pos)) = tokens.peek() {
        let pos = *pos;
        tokens.next();
        let right = parse_logical_or(tokens)?;
        left = Expr::Elvis { left: Box::new(left),
                             right: Box::new(right),
                             pos };
    }
    Ok(left)
}

/// Parses logical-or expressions.
///
/// Both the symbolic `||` and the keyword `or` spelling are accepted.
///
/// The rule is: `logical_or := logical_and (("||" | "or") logical_and)*`
pub fn parse_logical_or<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut left = parse_logical_and(tokens)?;
    while let Some((Token::OrOr | Token::Or, pos)) = tokens.peek() {
        let pos = *pos;
        tokens.next();
        let right = parse_logical_and(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op: BinaryOperator::Or,
                              right: Box::new(right),
                              pos };
    }
    Ok(left)
}

/// Parses logical-and expressions.
///
/// Both the symbolic `&&` and the keyword `and` spelling are accepted.
///
/// The rule is: `logical_and := equality (("&&" | "and") equality)*`
pub fn parse_logical_and<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut left = parse_equality(tokens)?;
    while let Some((Token::AndAnd | Token::And, pos)) = tokens.peek() {
        let pos = *pos;
        tokens.next();
        let right = parse_equality(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op: BinaryOperator::And,
                              right: Box::new(right),
                              pos };
    }
    Ok(left)
}

/// Parses equality expressions.
///
/// The rule is: `equality := relational (("==" | "!=") relational)*`
pub fn parse_equality<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut left = parse_relational(tokens)?;
    loop {
        let (op, pos) = match tokens.peek() {
            Some((Token::EqualEqual, pos)) => (BinaryOperator::Equal, *pos),
            Some((Token::BangEqual, pos)) => (BinaryOperator::NotEqual, *pos),
            _ => break,
        };
        tokens.next();
        let right = parse_relational(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op,
                              right: Box::new(right),
                              pos };
    }
    Ok(left)
}

/// Parses relational expressions.
///
/// The rule is: `relational := additive (("<" | "<=" | ">" | ">=") additive)*`
pub fn parse_relational<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut left = parse_additive(tokens)?;
    loop {
        let (op, pos) = match tokens.peek() {
            Some((Token::Less, pos)) => (BinaryOperator::Less, *pos),
            Some((Token::LessEqual, pos)) => (BinaryOperator::LessEqual, *pos),
            Some((Token::Greater, pos)) => (BinaryOperator::Greater, *pos),
            Some((Token::GreaterEqual, pos)) => (BinaryOperator::GreaterEqual, *pos),
            _ => break,
        };
        tokens.next();
        let right = parse_additive(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op,
                              right: Box::new(right),
                              pos };
    }
    Ok(left)
}

/// Parses addition and subtraction expressions.
///
/// Handles left-associative binary operators: `+` and `-`.
///
/// The rule is: `additive := multiplicative (("+" | "-") multiplicative)*`
pub fn parse_additive<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut left = parse_multiplicative(tokens)?;
    loop {
        let (op, pos) = match tokens.peek() {
            Some((Token::Plus, pos)) => (BinaryOperator::Add, *pos),
            Some((Token::Minus, pos)) => (BinaryOperator::Sub, *pos),
            _ => break,
        };
        tokens.next();
        let right = parse_multiplicative(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op,
                              right: Box::new(right),
                              pos };
    }
    Ok(left)
}

/// Parses multiplication-level expressions.
///
/// Handles left-associative operators: `*`, `/`, and `%`.
///
/// The rule is: `multiplicative := unary (("*" | "/" | "%") unary)*`
pub fn parse_multiplicative<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Pos)> + Clone
{
    let mut left = parse_unary(tokens)?;
    loop {
        let (op, pos) = match tokens.peek() {
            Some((Token::Star, pos)) => (BinaryOperator::Mul, *pos),
            Some((Token::Slash, pos)) => (BinaryOperator::Div, *pos),
            Some((Token::Percent, pos)) => (BinaryOperator::Mod, *pos),
            _ => break,
        };
        tokens.next();
        let right = parse_unary(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op,
                              right: Box::new(right),
                              pos };
    }
    Ok(left)
}
