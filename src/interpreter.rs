/// Converts source text into tokens.
///
/// The lexer is the first stage of the pipeline. It produces a flat stream
/// of tokens with source positions, skipping whitespace and comments, and
/// rejects malformed input such as unterminated strings or stray characters.
pub mod lexer;

/// Converts tokens into an abstract syntax tree.
///
/// A recursive-descent parser with explicit precedence climbing. The
/// expression entry point is also re-entered by the evaluator for the
/// sub-expressions inside string templates.
pub mod parser;

/// Walks the AST and produces values.
///
/// The evaluator owns the single flat environment, enforces the cooperative
/// operation quota and deadline on every node, and implements the
/// snapshot/merge/restore call protocol that gives functions their
/// capture-by-value closure semantics.
pub mod evaluator;

/// The dynamic runtime value domain.
///
/// Defines [`value::core::Value`] and the host-interop surface: native
/// functions and the [`value::host::HostObject`] capability that exposes
/// external objects' fields and methods to scripts.
pub mod value;

/// The native function registry and builtin catalog.
pub mod natives;

/// The parsed-program cache.
///
/// A bounded LRU map from source text to parsed [`crate::ast::Program`],
/// with hash-collision verification, shared process-wide.
pub mod cache;
