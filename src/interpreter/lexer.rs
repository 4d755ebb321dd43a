use logos::Logos;

use crate::{ast::Pos, error::LexError};

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
///
/// Note that `fn`, `for`, and `in` are deliberately absent: they lex as
/// ordinary [`Token::Identifier`] tokens and the parser recognizes them by
/// their literal text. Existing scripts rely on this, so the keyword table
/// stays as-is.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\f\n]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    /// Numeric literal tokens, such as `42` or `3.14`.
    /// No exponent form, no leading dot, no separators.
    #[regex(r"[0-9]+(\.[0-9]+)?", parse_number)]
    Number(f64),
    /// String literal tokens, delimited by `"` or `'`, with escapes already
    /// processed.
    #[regex(r#""([^"\\\n]|\\.)*""#, unescape)]
    #[regex(r"'([^'\\\n]|\\.)*'", unescape)]
    Str(String),
    /// A string template, delimited by backticks.
    ///
    /// The payload is the raw, unescaped template body; `${...}`
    /// interpolations are not parsed by the lexer.
    #[regex(r"`[^`]*`", template_body)]
    Template(String),
    /// Boolean literal tokens, `true` or `false`.
    #[token("true", parse_bool)]
    #[token("false", parse_bool)]
    Bool(bool),
    /// `null`
    #[token("null")]
    Null,
    /// `let`
    #[token("let")]
    Let,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `return`
    #[token("return")]
    Return,
    /// `and`
    #[token("and")]
    And,
    /// `or`
    #[token("or")]
    Or,
    /// `not`
    #[token("not")]
    Not,
    /// Identifier tokens; variable or function names such as `x` or `user`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `&&`
    #[token("&&")]
    AndAnd,
    /// `||`
    #[token("||")]
    OrOr,
    /// `!`
    #[token("!")]
    Bang,
    /// `?.`
    #[token("?.")]
    SafeDot,
    /// `?:`
    #[token("?:")]
    Elvis,
    /// `=`
    #[token("=")]
    Equals,
    /// `.`
    #[token(".")]
    Dot,
    /// `,`
    #[token(",")]
    Comma,
    /// `:`
    #[token(":")]
    Colon,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
}

impl Token {
    /// Returns a short human-readable description of the token, used in
    /// parse error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number '{n}'"),
            Self::Str(s) => format!("string \"{s}\""),
            Self::Template(_) => "string template".to_string(),
            Self::Bool(b) => format!("'{b}'"),
            Self::Identifier(name) => format!("'{name}'"),
            Self::Null => "'null'".to_string(),
            Self::Let => "'let'".to_string(),
            Self::If => "'if'".to_string(),
            Self::Else => "'else'".to_string(),
            Self::Return => "'return'".to_string(),
            Self::And => "'and'".to_string(),
            Self::Or => "'or'".to_string(),
            Self::Not => "'not'".to_string(),
            Self::Plus => "'+'".to_string(),
            Self::Minus => "'-'".to_string(),
            Self::Star => "'*'".to_string(),
            Self::Slash => "'/'".to_string(),
            Self::Percent => "'%'".to_string(),
            Self::EqualEqual => "'=='".to_string(),
            Self::BangEqual => "'!='".to_string(),
            Self::LessEqual => "'<='".to_string(),
            Self::GreaterEqual => "'>='".to_string(),
            Self::Less => "'<'".to_string(),
            Self::Greater => "'>'".to_string(),
            Self::AndAnd => "'&&'".to_string(),
            Self::OrOr => "'||'".to_string(),
            Self::Bang => "'!'".to_string(),
            Self::SafeDot => "'?.'".to_string(),
            Self::Elvis => "'?:'".to_string(),
            Self::Equals => "'='".to_string(),
            Self::Dot => "'.'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Colon => "':'".to_string(),
            Self::Semicolon => "';'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
            Self::LBracket => "'['".to_string(),
            Self::RBracket => "']'".to_string(),
        }
    }
}

/// Tokenizes a complete source string.
///
/// Produces the ordered token stream consumed by the parser. Whitespace and
/// `//` line comments are skipped in place; every returned token carries the
/// position of its first character.
///
/// # Parameters
/// - `source`: The source text to scan.
///
/// # Returns
/// The token stream as `(Token, Pos)` pairs.
///
/// # Errors
/// Returns a [`LexError`] for unrecognized characters and for string
/// literals or templates left open at end of input. A lone `&` or `|` is an
/// error; they only combine to `&&` and `||`.
///
/// # Example
/// ```
/// use quill::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize("let x = 1").unwrap();
/// assert_eq!(tokens[0].0, Token::Let);
/// assert_eq!(tokens[3].0, Token::Number(1.0));
/// assert_eq!(tokens[3].1.column, 9);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<(Token, Pos)>, LexError> {
    let line_starts = line_starts(source);
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(token) = lexer.next() {
        let pos = pos_at(&line_starts, lexer.span().start);
        match token {
            Ok(tok) => tokens.push((tok, pos)),
            Err(()) => {
                let slice = lexer.slice();
                return Err(match slice.chars().next() {
                    Some('"' | '\'') => LexError::UnterminatedString { pos },
                    Some('`') => LexError::UnterminatedTemplate { pos },
                    _ => LexError::UnexpectedCharacter { text: slice.to_string(),
                                                         pos },
                });
            },
        }
    }

    Ok(tokens)
}

/// Computes the byte offset of the start of every line in `source`.
fn line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (offset, byte) in source.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(offset + 1);
        }
    }
    starts
}

/// Maps a byte offset back to a one-based line and column.
fn pos_at(line_starts: &[usize], offset: usize) -> Pos {
    let line = line_starts.partition_point(|&start| start <= offset);
    Pos { line,
          column: offset - line_starts[line - 1] + 1, }
}

/// Parses a numeric literal from the current token slice.
fn parse_number(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Parses a boolean literal from the current token slice.
fn parse_bool(lex: &logos::Lexer<Token>) -> Option<bool> {
    match lex.slice() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Strips the quotes from a string literal and processes its escapes.
///
/// Supported escapes are `\n`, `\t`, `\r`, `\\`, `\"`, and `\'`. A
/// backslash before any other character keeps that character as-is.
fn unescape(lex: &logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    let body = &slice[1..slice.len() - 1];

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {},
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Strips the backticks from a template token, keeping the body raw.
fn template_body(lex: &logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}
