//! # quill
//!
//! quill is an embeddable expression and scripting language written in Rust.
//! It lexes, parses, and evaluates small scripts with support for variables,
//! functions, string templates, host-object interop, and cooperative
//! execution limits (operation quotas and deadlines).

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::Arc,
    time::{Duration, Instant},
};

use once_cell::sync::Lazy;

use crate::{
    ast::Program,
    interpreter::{
        cache::ProgramCache,
        evaluator::core::Context,
        lexer::tokenize,
        natives::NativeRegistry,
        parser::core::parse_program,
        value::{core::Value, host::NativeFn},
    },
};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` and `Stmt` types that represent the
/// syntactic structure of source code as a tree. The AST is built by the
/// parser and traversed by the evaluator.
///
/// # Responsibilities
/// - Defines expression and statement types for all language constructs.
/// - Attaches metadata (such as source locations) to AST nodes for error
///   reporting.
/// - Enables extensible and robust handling of parsed code.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing, parsing,
/// or evaluating code. It standardizes error reporting and carries detailed
/// information about failures, including error kinds, descriptions, and
/// source locations for debugging and user feedback.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches source positions and detailed messages for context.
/// - Supports integration with standard error handling traits and reporting
///   utilities.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations, the program cache, error handling, and all supporting
/// infrastructure to provide a complete runtime for script execution. It
/// exposes the building blocks the public [`Script`] API is built on.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, cache, and
///   value types.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;

/// Capacity of the process-wide program cache.
const CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(128).unwrap();

/// The shared, process-wide cache of parsed programs.
///
/// Scripts opt in per run via [`Script::use_cache`].
static PROGRAM_CACHE: Lazy<ProgramCache> = Lazy::new(|| ProgramCache::new(CACHE_CAPACITY));

/// The outcome of running a [`Script`].
///
/// A successful run carries the printed lines, the final value, and an empty
/// error sequence. A failed run carries a single error message, an empty
/// output sequence (output collected before the failure is not surfaced),
/// and a null value.
#[derive(Debug)]
pub struct Execution {
    /// Lines produced by `print`, in order.
    pub output: Vec<String>,
    /// The final value: the value of the last expression statement, or the
    /// value of a `return` that reached the program boundary.
    pub value:  Value,
    /// Error messages; empty on success, a single message on failure.
    pub errors: Vec<String>,
}

/// A configurable script execution: source text plus injected variables,
/// native functions, and resource limits.
///
/// `Script` is the crate's main entry point. Configure it with the builder
/// methods and call [`Script::run`]; every failure mode is caught at this
/// boundary and converted into an error message in the returned
/// [`Execution`] rather than a panic or a raised error.
///
/// # Example
/// ```
/// use quill::Script;
///
/// let result = Script::new("let x = 10; let y = 20; print(x + y)").silent(true)
///                                                                 .run();
///
/// assert_eq!(result.output, vec!["30"]);
/// assert!(result.errors.is_empty());
/// ```
pub struct Script {
    source:     String,
    variables:  HashMap<String, Value>,
    functions:  Vec<(String, NativeFn)>,
    silent:     bool,
    use_cache:  bool,
    max_ops:    u64,
    timeout_ms: u64,
}

impl Script {
    /// Creates a script from its source text, with no injected bindings, no
    /// resource limits, caching off, and output written to stdout.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self { source:     source.into(),
               variables:  HashMap::new(),
               functions:  Vec::new(),
               silent:     false,
               use_cache:  false,
               max_ops:    0,
               timeout_ms: 0, }
    }

    /// Injects a variable binding, visible to the script under `name`.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Registers a native function under `name`.
    ///
    /// The function is synchronous and variadic; a returned `Err` fails the
    /// calling script with the given message.
    #[must_use]
    pub fn function(mut self, name: impl Into<String>, f: NativeFn) -> Self {
        self.functions.push((name.into(), f));
        self
    }

    /// Suppresses writing printed lines to stdout. Output is still
    /// collected into [`Execution::output`].
    #[must_use]
    pub const fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Enables the shared program cache for this run.
    #[must_use]
    pub const fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Limits the run to `max_ops` node evaluations. 0 means unlimited.
    #[must_use]
    pub const fn max_ops(mut self, max_ops: u64) -> Self {
        self.max_ops = max_ops;
        self
    }

    /// Limits the run to `timeout_ms` milliseconds of wall-clock time,
    /// checked cooperatively between node evaluations. 0 means unlimited.
    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Runs the script to completion.
    ///
    /// Lexing, parsing, and evaluation failures are all converted into a
    /// single error message in the returned [`Execution`]; a `return`
    /// reaching the program boundary is not a failure — it supplies the
    /// final value.
    ///
    /// # Example
    /// ```
    /// use quill::Script;
    ///
    /// let result = Script::new("print(`${name}!`)").variable("name", "world")
    ///                                              .silent(true)
    ///                                              .run();
    ///
    /// assert_eq!(result.output, vec!["world!"]);
    /// ```
    #[must_use]
    pub fn run(self) -> Execution {
        let program = match self.resolve_program() {
            Ok(program) => program,
            Err(message) => return Execution::failure(message),
        };

        let mut registry = NativeRegistry::with_builtins();
        for (name, f) in self.functions {
            registry.register(name, f);
        }

        let mut context = Context::with_registry(registry);
        context.env = self.variables;
        context.silent = self.silent;
        context.set_max_ops(self.max_ops);
        if self.timeout_ms > 0 {
            context.set_deadline(Some(Instant::now() + Duration::from_millis(self.timeout_ms)));
        }

        match context.run(&program) {
            Ok(value) => Execution { output: context.take_output(),
                                     value,
                                     errors: Vec::new(), },
            Err(err) => Execution::failure(err.to_string()),
        }
    }

    /// Resolves the parsed program, consulting the shared cache when
    /// enabled.
    fn resolve_program(&self) -> Result<Arc<Program>, String> {
        if self.use_cache
           && let Some(program) = PROGRAM_CACHE.get(&self.source)
        {
            return Ok(program);
        }

        let tokens = tokenize(&self.source).map_err(|err| err.to_string())?;
        let program = Arc::new(parse_program(&tokens).map_err(|err| err.to_string())?);

        if self.use_cache {
            PROGRAM_CACHE.put(&self.source, Arc::clone(&program));
        }

        Ok(program)
    }
}

impl Execution {
    fn failure(message: String) -> Self {
        Self { output: Vec::new(),
               value:  Value::Null,
               errors: vec![message], }
    }
}

/// Runs a source string with default settings and returns the outcome.
///
/// A convenience wrapper around [`Script`] for hosts that need no injected
/// bindings or limits.
///
/// # Examples
/// ```
/// use quill::eval;
///
/// let result = eval("let x = 2; x * 3");
/// assert_eq!(result.value.to_string(), "6");
///
/// // Example with an intentional error (assignment without declaration).
/// let result = eval("x = 1");
/// assert_eq!(result.errors.len(), 1);
/// ```
#[must_use]
pub fn eval(source: &str) -> Execution {
    Script::new(source).run()
}
