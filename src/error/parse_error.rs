use crate::ast::Pos;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while scanning source text.
pub enum LexError {
    /// Encountered a character the lexer does not recognize.
    UnexpectedCharacter {
        /// The offending text.
        text: String,
        /// Where the character was found.
        pos:  Pos,
    },
    /// A string literal was opened but never closed.
    UnterminatedString {
        /// Position of the opening quote.
        pos: Pos,
    },
    /// A string template was opened but never closed.
    UnterminatedTemplate {
        /// Position of the opening backtick.
        pos: Pos,
    },
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedCharacter { text, pos } => {
                write!(f, "Error on {pos}: Unexpected character '{text}'.")
            },

            Self::UnterminatedString { pos } => {
                write!(f, "Error on {pos}: Unterminated string literal.")
            },

            Self::UnterminatedTemplate { pos } => {
                write!(f, "Error on {pos}: Unterminated string template.")
            },
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while parsing a token stream.
///
/// There is no error recovery: parsing aborts at the first error.
pub enum ParseError {
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// What was expected and what was found instead.
        message: String,
        /// The source position of the offending token.
        pos:     Pos,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// The position of the last consumed token.
        pos: Pos,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { message, pos } => {
                write!(f, "Error on {pos}: {message}")
            },

            Self::UnexpectedEndOfInput { pos } => {
                write!(f, "Error on {pos}: Unexpected end of input.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
