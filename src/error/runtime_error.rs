use crate::ast::Pos;

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can be raised during evaluation.
pub enum RuntimeError {
    /// Assigned to a variable that was never declared with `let`.
    ///
    /// Reading an undeclared name is not an error (it yields null); only
    /// assignment requires a prior declaration.
    UndefinedVariable {
        /// The name of the variable.
        name: String,
        /// The source position where the error occurred.
        pos:  Pos,
    },
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// The source position where the error occurred.
        pos:     Pos,
    },
    /// Accessed a member of a null value.
    NullMemberAccess {
        /// The member name that was looked up.
        name: String,
        /// The source position where the error occurred.
        pos:  Pos,
    },
    /// Called a value that is not a function.
    NotCallable {
        /// The callee name, where statically known.
        name: Option<String>,
        /// The source position where the error occurred.
        pos:  Pos,
    },
    /// The operation quota was exceeded.
    OperationLimitExceeded {
        /// The configured quota.
        limit: u64,
    },
    /// The configured deadline passed during evaluation.
    DeadlineExceeded,
    /// A string template contained a malformed interpolation.
    TemplateError {
        /// Details about the malformed fragment.
        details: String,
        /// The source position of the template.
        pos:     Pos,
    },
    /// A host-supplied native function or bound method failed.
    ///
    /// The host's message is surfaced unchanged.
    Host {
        /// The failing function's name.
        name:    String,
        /// The message reported by the host function.
        message: String,
        /// The source position of the call.
        pos:     Pos,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedVariable { name, pos } => {
                write!(f, "Error on {pos}: Assignment to undefined variable '{name}'. Declare it with 'let' first.")
            },

            Self::TypeError { details, pos } => {
                write!(f, "Error on {pos}: {details}")
            },

            Self::NullMemberAccess { name, pos } => {
                write!(f, "Error on {pos}: Cannot access member '{name}' of null.")
            },

            Self::NotCallable { name, pos } => match name {
                Some(name) => write!(f, "Error on {pos}: '{name}' is not a function."),
                None => write!(f, "Error on {pos}: Value is not a function."),
            },

            Self::OperationLimitExceeded { limit } => {
                write!(f, "Operation limit exceeded: the script performed more than {limit} operations.")
            },

            Self::DeadlineExceeded => {
                write!(f, "Execution timed out: the configured deadline passed.")
            },

            Self::TemplateError { details, pos } => {
                write!(f, "Error on {pos}: Invalid template interpolation: {details}")
            },

            Self::Host { name, message, pos } => {
                write!(f, "Error on {pos}: Function '{name}' failed: {message}")
            },
        }
    }
}

impl std::error::Error for RuntimeError {}
