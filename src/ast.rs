/// A position in the source text, used for error reporting.
///
/// Both fields are one-based. The lexer attaches a `Pos` to every token it
/// produces, and the parser copies it into the AST nodes it builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    /// The source line, starting at 1.
    pub line:   usize,
    /// The source column, starting at 1.
    pub column: usize,
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// An abstract syntax tree (AST) node representing an expression.
///
/// `Expr` covers all expression forms of the language, from literals and
/// identifiers to calls, member access, array and object literals, and
/// function literals. Nodes are immutable trees: each node exclusively owns
/// its children.
///
/// String templates are the one deliberate exception to "fully parsed": an
/// `Expr::Template` keeps the raw template text, and `${...}` fragments are
/// re-lexed and re-parsed every time the template is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal (all numbers are `f64`).
    Number {
        /// The literal value.
        value: f64,
        /// Position in the source code.
        pos:   Pos,
    },
    /// A string literal with escapes already processed.
    Str {
        /// The literal text.
        value: String,
        /// Position in the source code.
        pos:   Pos,
    },
    /// A string template, stored as its raw body.
    Template {
        /// The raw, unparsed template body.
        raw: String,
        /// Position in the source code.
        pos: Pos,
    },
    /// A boolean literal: `true` or `false`.
    Bool {
        /// The literal value.
        value: bool,
        /// Position in the source code.
        pos:   Pos,
    },
    /// The `null` literal.
    Null {
        /// Position in the source code.
        pos: Pos,
    },
    /// Reference to a variable or registered function by name.
    Identifier {
        /// The referenced name.
        name: String,
        /// Position in the source code.
        pos:  Pos,
    },
    /// A unary operation (`-x`, `!x`, `not x`).
    Unary {
        /// The unary operator to apply.
        op:   UnaryOperator,
        /// The operand expression.
        expr: Box<Self>,
        /// Position in the source code.
        pos:  Pos,
    },
    /// A binary operation (arithmetic, comparison, logical).
    Binary {
        /// Left operand.
        left:  Box<Self>,
        /// The operator.
        op:    BinaryOperator,
        /// Right operand.
        right: Box<Self>,
        /// Position in the source code.
        pos:   Pos,
    },
    /// The elvis operator `a ?: b`.
    ///
    /// Unlike the logical operators, elvis short-circuits: the right side is
    /// only evaluated when the left side is null.
    Elvis {
        /// The preferred operand.
        left:  Box<Self>,
        /// The fallback operand.
        right: Box<Self>,
        /// Position in the source code.
        pos:   Pos,
    },
    /// A call expression, `callee(arg1, arg2, ...)`.
    Call {
        /// The expression being called.
        callee: Box<Self>,
        /// Arguments, evaluated left to right.
        args:   Vec<Self>,
        /// Position in the source code.
        pos:    Pos,
    },
    /// Member access, `object.name`. Fails on a null receiver.
    Member {
        /// The receiver expression.
        object: Box<Self>,
        /// The member name.
        name:   String,
        /// Position in the source code.
        pos:    Pos,
    },
    /// Null-safe member access, `object?.name`. Yields null on a null
    /// receiver instead of failing.
    SafeMember {
        /// The receiver expression.
        object: Box<Self>,
        /// The member name.
        name:   String,
        /// Position in the source code.
        pos:    Pos,
    },
    /// Index access, `object[index]`.
    Index {
        /// The receiver expression.
        object: Box<Self>,
        /// The index expression.
        index:  Box<Self>,
        /// Position in the source code.
        pos:    Pos,
    },
    /// Array literal, `[a, b, c]`.
    Array {
        /// Element expressions, evaluated left to right.
        elements: Vec<Self>,
        /// Position in the source code.
        pos:      Pos,
    },
    /// Object literal, `{key: value, ...}`. Keys are bare identifiers.
    Object {
        /// Key/value pairs, evaluated left to right.
        entries: Vec<(String, Self)>,
        /// Position in the source code.
        pos:     Pos,
    },
    /// Function literal, `fn(a, b) { ... }`.
    ///
    /// A function literal is itself an expression, so it can be passed
    /// directly as a call argument.
    Function {
        /// Ordered parameter names.
        params: Vec<String>,
        /// The body statements.
        body:   Vec<Stmt>,
        /// Position in the source code.
        pos:    Pos,
    },
}

impl Expr {
    /// Gets the source position from `self`.
    ///
    /// ## Example
    /// ```
    /// use quill::ast::{Expr, Pos};
    ///
    /// let expr = Expr::Identifier { name: "x".to_string(),
    ///                               pos:  Pos { line: 5, column: 1 }, };
    ///
    /// assert_eq!(expr.pos().line, 5);
    /// ```
    #[must_use]
    pub const fn pos(&self) -> Pos {
        match self {
            Self::Number { pos, .. }
            | Self::Str { pos, .. }
            | Self::Template { pos, .. }
            | Self::Bool { pos, .. }
            | Self::Null { pos }
            | Self::Identifier { pos, .. }
            | Self::Unary { pos, .. }
            | Self::Binary { pos, .. }
            | Self::Elvis { pos, .. }
            | Self::Call { pos, .. }
            | Self::Member { pos, .. }
            | Self::SafeMember { pos, .. }
            | Self::Index { pos, .. }
            | Self::Array { pos, .. }
            | Self::Object { pos, .. }
            | Self::Function { pos, .. } => *pos,
        }
    }
}

/// Represents a statement.
///
/// Statements are the units a program is made of; a [`Program`] is an
/// ordered sequence of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A variable declaration using `let`.
    Let {
        /// The name of the variable.
        name:  String,
        /// The initial value of the variable.
        value: Expr,
        /// Position in the source code.
        pos:   Pos,
    },
    /// An assignment to an already-declared variable.
    Assign {
        /// The name of the variable.
        name:  String,
        /// The value being assigned.
        value: Expr,
        /// Position in the source code.
        pos:   Pos,
    },
    /// An `if` statement with an optional `else` branch.
    ///
    /// Each branch is a single statement; brace-blocks parse into
    /// [`Stmt::Block`].
    If {
        /// The condition, tested for truthiness.
        condition:   Expr,
        /// Statement executed when the condition is truthy.
        then_branch: Box<Self>,
        /// Statement executed otherwise, if present.
        else_branch: Option<Box<Self>>,
        /// Position in the source code.
        pos:         Pos,
    },
    /// A `for (name in iterable) { ... }` loop over an array.
    For {
        /// The loop variable name.
        var:      String,
        /// The expression producing the iterated array.
        iterable: Expr,
        /// The loop body.
        body:     Vec<Self>,
        /// Position in the source code.
        pos:      Pos,
    },
    /// A `return` statement with an optional value.
    Return {
        /// The returned expression; `return` alone returns null.
        value: Option<Expr>,
        /// Position in the source code.
        pos:   Pos,
    },
    /// A brace-delimited block of statements.
    Block {
        /// The statements inside the block.
        statements: Vec<Self>,
        /// Position in the source code.
        pos:        Pos,
    },
    /// A standalone expression evaluated for its value.
    Expression {
        /// The expression to evaluate.
        expr: Expr,
        /// Position in the source code.
        pos:  Pos,
    },
}

/// The root of a parsed program: an ordered sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// The top-level statements, executed in source order.
    pub statements: Vec<Stmt>,
}

/// Represents a binary operator.
///
/// Binary operators include arithmetic, comparison, and logical operators.
/// The logical operators evaluate both operands unconditionally; only the
/// elvis operator (a distinct [`Expr::Elvis`] node) short-circuits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,
    /// Equal to (`==`)
    Equal,
    /// Not equal to (`!=`)
    NotEqual,
    /// Less than (`<`)
    Less,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    Greater,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Logical and (`&&` or `and`)
    And,
    /// Logical or (`||` or `or`)
    Or,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        };
        write!(f, "{operator}")
    }
}

/// Represents a unary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation (e.g. `-x`).
    Negate,
    /// Logical NOT (`!x` or `not x`).
    Not,
}
