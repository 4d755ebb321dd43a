/// Entry points: whole programs and standalone expressions.
pub mod core;
/// Statement-level parsing (`let`, assignment, `if`, `for`, `return`,
/// blocks, expression statements).
pub mod statement;
/// Binary operator precedence climbing, from elvis down to multiplicative.
pub mod binary;
/// Unary, postfix, and primary expressions.
pub mod unary;
/// Shared parsing helpers.
pub mod utils;
