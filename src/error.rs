/// Lexing and parsing errors.
///
/// Defines all error types that can occur while turning source text into an
/// AST. Lex errors cover malformed character streams (bad characters,
/// unterminated strings); parse errors cover malformed token streams
/// (unexpected tokens, missing delimiters). Both carry source positions.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation: type
/// errors, undefined-variable assignments, resource-limit violations, and
/// errors propagated from host-supplied functions.
pub mod runtime_error;

pub use parse_error::{LexError, ParseError};
pub use runtime_error::RuntimeError;
