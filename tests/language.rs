use std::{
    num::NonZeroUsize,
    rc::Rc,
    sync::Arc,
    time::{Duration, Instant},
};

use quill::{
    interpreter::{
        cache::ProgramCache,
        evaluator::core::Context,
        lexer::tokenize,
        parser::core::parse_program,
        value::{
            core::Value,
            host::{HostMember, HostObject},
        },
    },
    Execution, Script,
};

fn run(src: &str) -> Execution {
    Script::new(src).silent(true).run()
}

fn assert_output(src: &str, expected: &[&str]) {
    let result = run(src);
    assert!(result.errors.is_empty(),
            "Script failed: {:?}\n{src}",
            result.errors);
    assert_eq!(result.output, expected, "{src}");
}

fn assert_value(src: &str, expected: &str) {
    let result = run(src);
    assert!(result.errors.is_empty(),
            "Script failed: {:?}\n{src}",
            result.errors);
    assert_eq!(result.value.to_string(), expected, "{src}");
}

fn assert_failure(src: &str, fragment: &str) {
    let result = run(src);
    assert_eq!(result.errors.len(), 1, "Script should fail: {src}");
    assert!(result.errors[0].contains(fragment),
            "Error '{}' should mention '{fragment}'",
            result.errors[0]);
    assert!(result.output.is_empty(),
            "Failed runs must not surface output: {src}");
    assert_eq!(result.value, Value::Null);
}

#[test]
fn arithmetic_and_final_value() {
    assert_value("1 + 2 * 3", "7");
    assert_value("(1 + 2) * 3", "9");
    assert_value("10 % 3", "1");
    assert_value("-4 + 1", "-3");
    assert_value("let x = 10; let y = 20; x + y", "30");
    assert_value("7 / 2", "3.5");
}

#[test]
fn declarations_and_assignment() {
    assert_value("let x = 1; x = x + 1; x", "2");
    assert_value("let x = 1; { x = 5 } x", "5");
    assert_failure("y = 1", "undefined variable 'y'");
}

#[test]
fn unresolved_identifiers_read_as_null() {
    assert_value("missing", "null");
    assert_output("print(missing == null)", &["true"]);
}

#[test]
fn string_concatenation() {
    assert_value("\"foo\" + \"bar\"", "foobar");
    assert_value("\"n = \" + 42", "n = 42");
    // A null operand concatenates as empty text, unlike its printed form.
    assert_value("\"x\" + null", "x");
    assert_value("null + \"x\"", "x");
    assert_failure("[] + 1", "as a number");
}

#[test]
fn numeric_coercion() {
    assert_value("true + true", "2");
    assert_value("\"3\" * \"4\"", "12");
    // A string operand makes `+` concatenate; the numeric coercion of
    // strings applies to the other arithmetic operators.
    assert_value("\" 5 \" + 1", " 5 1");
    assert_value("\" 5 \" - 0", "5");
    assert_failure("\"abc\" - 1", "as a number");
}

#[test]
fn equality_is_structural() {
    assert_output("print(5 == 5); print(5 == \"5\")", &["true", "false"]);
    assert_value("[1, [2]] == [1, [2]]", "true");
    assert_value("{a: 1} == {a: 1}", "true");
    assert_value("{a: 1} == {a: 2}", "false");
    assert_value("null == null", "true");
    assert_value("1 != 2", "true");
}

#[test]
fn relational_operators() {
    assert_output("print(5 > 3); print(5 == 5)", &["true", "true"]);
    assert_value("2 <= 2", "true");
    assert_value("\"10\" > 9", "true");
}

#[test]
fn logical_operators_do_not_short_circuit() {
    // Both sides always evaluate: the prints on the right-hand side run
    // even when the left side already decides the result.
    assert_output("let t = false && print(\"ran\"); print(t)",
                  &["ran", "false"]);
    assert_output("let t = true || print(\"ran\"); print(t)",
                  &["ran", "true"]);
    assert_value("1 and \"x\"", "true");
    assert_value("0 or \"\"", "false");
    assert_value("not 0", "true");
    assert_value("!\"text\"", "false");
}

#[test]
fn elvis_short_circuits() {
    assert_output("print(1 ?: print(\"skipped\"))", &["1"]);
    assert_value("null ?: \"fallback\"", "fallback");
    // Falsy non-null values are kept; elvis tests for null, not truthiness.
    assert_value("0 ?: 5", "0");
    assert_value("\"\" ?: \"x\"", "");
}

#[test]
fn truthiness() {
    assert_value("if (null) { 1 } else { 2 }", "null");
    assert_output("if (0) { print(\"a\") } else { print(\"b\") }", &["b"]);
    assert_output("if (\"\") { print(\"a\") } else { print(\"b\") }", &["b"]);
    assert_output("if ([]) { print(\"a\") }", &["a"]);
    assert_output("if ({}) { print(\"a\") }", &["a"]);
    assert_output("if (-0.5) { print(\"a\") }", &["a"]);
}

#[test]
fn if_else_chains() {
    assert_output("let x = 2; if (x == 1) { print(\"one\") } else if (x == 2) { print(\"two\") } else { print(\"many\") }",
                  &["two"]);
}

#[test]
fn safe_member_and_elvis_together() {
    assert_output("let user = null; print(user?.name ?: \"Anonymous\")",
                  &["Anonymous"]);
}

#[test]
fn member_access() {
    assert_value("let o = {a: 1, b: {c: 2}}; o.b.c", "2");
    assert_value("let o = {a: 1}; o.missing", "null");
    assert_value("let o = null; o?.a", "null");
    assert_failure("let o = null; o.a", "member 'a' of null");
    assert_failure("let n = 5; n.a", "member 'a'");
}

#[test]
fn index_access() {
    assert_value("[10, 20, 30][1]", "20");
    assert_value("[10][5]", "null");
    assert_value("[10][-1]", "null");
    assert_value("[10][0.5]", "null");
    assert_value("let o = {a: 1}; o[\"a\"]", "1");
    assert_value("let o = {a: 1}; o[\"b\"]", "null");
    assert_value("let o = {a: 1}; o[0]", "null");
    assert_failure("5[0]", "Cannot index");
}

#[test]
fn functions_and_returns() {
    assert_value("let f = fn(a, b) { return a + b }; f(1, 2)", "3");
    // A body without return yields its last expression statement's value;
    // return alone yields null; missing trailing arguments bind to null.
    assert_value("let f = fn() { 1 + 1 }; f()", "2");
    assert_value("let f = fn(a, b) { a + b }; f(1, 2)", "3");
    assert_value("let f = fn() { let x = 1 }; f()", "null");
    assert_value("let f = fn() { return }; f()", "null");
    assert_value("let f = fn(a) { return a == null }; f()", "true");
    assert_value("let f = fn(n) { if (n > 0) { return \"pos\" } return \"other\" }; f(3)",
                 "pos");
}

#[test]
fn return_at_program_boundary_is_the_final_value() {
    assert_value("let x = 1; return x + 1; print(\"unreached\")", "2");
    let result = run("return 7");
    assert!(result.errors.is_empty());
    assert_eq!(result.value.to_string(), "7");
}

#[test]
fn closures_capture_by_value_at_creation() {
    // The captured environment is a frozen copy: mutation after creation
    // is invisible to the function.
    assert_value("let x = 1; let f = fn() { return x }; x = 2; f()", "1");
    // Two functions created around a mutation observe different values.
    assert_value("let x = 1; let a = fn() { return x }; x = 2; let b = fn() { return x }; a() + b()",
                 "3");
}

#[test]
fn calls_restore_the_environment() {
    // Parameters and captured bindings shadow live ones only for the
    // duration of the call.
    assert_value("let x = 10; let f = fn(x) { return x * 2 }; f(1) + x", "12");
    assert_value("let f = fn() { let inner = 1 }; f(); inner", "null");
    // Restoration also happens when the body fails.
    let result = run("let x = 1; let f = fn(x) { return {} - 1 }; f(9)");
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn functions_as_arguments() {
    assert_value("let twice = fn(f, v) { return f(f(v)) }; twice(fn(n) { return n + 1 }, 0)",
                 "2");
    assert_value("map([1, 2], fn(n) { return n * 10 })[1]", "20");
}

#[test]
fn for_loops() {
    assert_output("for (n in [1, 2]) { print(n) }", &["1", "2"]);
    assert_output("let total = 0; for (n in [1, 2, 3]) { total = total + n } print(total)",
                  &["6"]);
    assert_failure("for (n in 5) { print(n) }", "iterate");
}

#[test]
fn for_loop_variable_restoration() {
    // A shadowed variable gets its prior value back after the loop.
    assert_output("let n = 100; for (n in [1, 2]) { print(n) } print(n)",
                  &["1", "2", "100"]);
    // A fresh loop variable is removed entirely.
    assert_value("for (n in [1, 2]) { n } n", "null");
}

#[test]
fn higher_order_natives() {
    assert_value("map([1, 2, 3], fn(n) { return n * 2 })", "[2, 4, 6]");
    assert_value("map([\"a\", \"b\"], fn(v, i) { return i })", "[0, 1]");
    assert_value("filter([1, 2, 3, 4], fn(n) { return n % 2 == 0 })", "[2, 4]");
    assert_output("let arr=[1,2,3,4]; print(reduce(arr, fn(acc,x){acc+x}, 0))",
                  &["10"]);
    // Without an initial accumulator, reduce starts from null; string
    // concatenation treats that null as empty text.
    assert_value("reduce([\"a\", \"b\"], fn(acc, x) { return acc + x })", "ab");
    assert_value("find([1, 2, 3], fn(n) { return n > 1 })", "2");
    assert_value("find([1, 2, 3], fn(n) { return n > 9 })", "null");
    assert_value("findIndex([1, 2, 3], fn(n) { return n > 2 })", "2");
    assert_value("findIndex([1, 2, 3], fn(n) { return n > 9 })", "-1");
    assert_failure("map(5, fn(n) { return n })", "expects an array");
    assert_failure("map([1], 5)", "not a function");
}

#[test]
fn builtin_functions() {
    assert_value("len(\"abc\") + len([1, 2])", "5");
    assert_value("upper(\"ab\") + lower(\"CD\")", "ABcd");
    assert_value("trim(\"  x  \")", "x");
    assert_value("contains(\"hello\", \"ell\")", "true");
    assert_value("contains([1, 2], 2)", "true");
    assert_value("join(split(\"a,b,c\", \",\"), \"-\")", "a-b-c");
    assert_value("keys({b: 1, a: 2})", "[a, b]");
    assert_value("abs(-3) + floor(1.9) + ceil(1.1) + round(2.5)", "9");
    assert_value("sqrt(16)", "4");
    assert_value("min(3, 1, 2)", "1");
    assert_value("max(3, 1, 2)", "3");
    assert_value("number(\"12\") + 1", "13");
    assert_value("string(12) + \"!\"", "12!");
    assert_value("range(1, 4)", "[1, 2, 3]");
    assert_failure("len(5)", "len");
}

#[test]
fn print_yields_null_and_formats_values() {
    assert_output("let v = print(\"a\", 1, null); print(v)", &["a 1 null", "null"]);
    assert_output("print([1, \"x\", [true]])", &["[1, x, [true]]"]);
    assert_output("print({b: 2, a: 1})", &["{a: 1, b: 2}"]);
}

#[test]
fn string_templates() {
    assert_output("let name = \"world\"; print(`hello ${name}!`)",
                  &["hello world!"]);
    assert_value("let x = 3; `${x} + ${x} = ${x + x}`", "3 + 3 = 6");
    // Brace-depth-aware scanning: the object literal's braces nest.
    assert_value("`${{a: 1}.a}`", "1");
    assert_value("let v = null; `v is ${v}`", "v is null");
    // A dollar sign without a brace is literal text.
    assert_value("`cost: 5$`", "cost: 5$");
    assert_failure("`${1 + `", "template");
    assert_failure("`${]}`", "template");
}

#[test]
fn templates_evaluate_in_the_current_environment() {
    assert_output("let t = fn(n) { return `n=${n}` }; print(t(1)); print(t(2))",
                  &["n=1", "n=2"]);
}

#[test]
fn comments_are_skipped() {
    assert_value("// leading\nlet x = 1 // trailing\nx", "1");
}

#[test]
fn lex_and_parse_errors_carry_positions() {
    assert_failure("let x = @", "line 1");
    assert_failure("\"unterminated", "nterminated string");
    assert_failure("`unterminated", "Unterminated string template");
    assert_failure("let = 5", "line 1");
    assert_failure("let x = (1 + 2", "line 1");
    assert_failure("let x = 1\nlet y = ]", "line 2");
}

#[test]
fn injected_variables_and_functions() {
    let result = Script::new("print(`${greeting}, ${double(n)}`)").variable("greeting", "hi")
                                                                  .variable("n", 21.0)
                                                                  .function("double",
                                                                            Rc::new(|args| {
                                                                                let n = match args.first() {
                                                                                    Some(Value::Number(n)) => *n,
                                                                                    _ => return Err("double expects a number.".to_string()),
                                                                                };
                                                                                Ok(Value::Number(n * 2.0))
                                                                            }))
                                                                  .silent(true)
                                                                  .run();
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.output, vec!["hi, 42"]);
}

#[test]
fn host_function_errors_are_surfaced() {
    let result = Script::new("boom()").function("boom",
                                                Rc::new(|_| Err("it broke".to_string())))
                                      .silent(true)
                                      .run();
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("'boom'"));
    assert!(result.errors[0].contains("it broke"));
}

#[test]
fn injected_variables_shadow_natives() {
    let result = Script::new("len(\"abc\")").variable("len", 5.0).silent(true).run();
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("'len' is not a function"));
}

struct Greeter {
    name: String,
}

impl HostObject for Greeter {
    fn type_name(&self) -> &str {
        "Greeter"
    }

    fn member(self: Rc<Self>, name: &str) -> Option<HostMember> {
        match name {
            "name" => Some(HostMember::Field(Value::Str(self.name.as_str().into()))),
            "greet" => {
                let receiver = Rc::clone(&self);
                Some(HostMember::Method(Rc::new(move |args| {
                    let whom = args.first().map_or_else(|| "you".to_string(), ToString::to_string);
                    Ok(format!("{} greets {whom}", receiver.name).into())
                })))
            },
            _ => None,
        }
    }
}

#[test]
fn host_objects_expose_fields_and_bound_methods() {
    let greeter = Value::Host(Rc::new(Greeter { name: "Ada".to_string() }));

    let result = Script::new("print(g.name); print(g.greet(\"Bob\")); print(g.unknown)")
        .variable("g", greeter)
        .silent(true)
        .run();
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.output, vec!["Ada", "Ada greets Bob", "null"]);
}

#[test]
fn operation_quota() {
    let src = "let total = 0; for (n in [1, 2, 3]) { total = total + n } total";

    // Generous quota: completes normally.
    let result = Script::new(src).max_ops(10_000).silent(true).run();
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.value.to_string(), "6");

    // Tiny quota: fails with the limit in the message.
    let result = Script::new(src).max_ops(5).silent(true).run();
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Operation limit exceeded"));
    assert!(result.errors[0].contains('5'));
    assert_eq!(result.value, Value::Null);
    assert!(result.output.is_empty());
}

#[test]
fn operation_quota_boundary_is_exact() {
    let src = "1";
    // "1" costs two operations: the statement and the literal.
    let ok = Script::new(src).max_ops(2).silent(true).run();
    assert!(ok.errors.is_empty(), "{:?}", ok.errors);

    let exceeded = Script::new(src).max_ops(1).silent(true).run();
    assert_eq!(exceeded.errors.len(), 1);
}

#[test]
fn zero_limits_mean_unlimited() {
    let result = Script::new("let x = 0; for (n in range(0, 200)) { x = x + n } x")
        .max_ops(0)
        .timeout_ms(0)
        .silent(true)
        .run();
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn past_deadline_fails_immediately() {
    let tokens = tokenize("1 + 1").unwrap();
    let program = parse_program(&tokens).unwrap();

    let past = Instant::now().checked_sub(Duration::from_secs(1))
                             .unwrap_or_else(Instant::now);
    let mut context = Context::new();
    context.set_deadline(Some(past));

    let err = context.run(&program).unwrap_err();
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn program_cache_hits_and_verifies_sources() {
    let cache = ProgramCache::new(NonZeroUsize::new(4).unwrap());
    let source = "let x = 1; x";
    let program = Arc::new(parse_program(&tokenize(source).unwrap()).unwrap());

    assert!(cache.get(source).is_none());
    cache.put(source, Arc::clone(&program));

    let hit = cache.get(source).expect("cached program");
    assert!(Arc::ptr_eq(&hit, &program));
    assert!(cache.get("let x = 2; x").is_none());
    assert_eq!(cache.len(), 1);
}

#[test]
fn program_cache_evicts_least_recently_used() {
    let cache = ProgramCache::new(NonZeroUsize::new(2).unwrap());
    let parse = |src: &str| Arc::new(parse_program(&tokenize(src).unwrap()).unwrap());

    cache.put("a", parse("1"));
    cache.put("b", parse("2"));

    // Touch "a" so "b" is the least recently used, then overflow.
    assert!(cache.get("a").is_some());
    cache.put("c", parse("3"));

    assert!(cache.get("a").is_some());
    assert!(cache.get("b").is_none());
    assert!(cache.get("c").is_some());
}

#[test]
fn program_cache_misses_leave_recency_untouched() {
    let cache = ProgramCache::new(NonZeroUsize::new(2).unwrap());
    let parse = |src: &str| Arc::new(parse_program(&tokenize(src).unwrap()).unwrap());

    cache.put("a", parse("1"));
    cache.put("b", parse("2"));

    // A miss must not bump anything: "a" stays least recently used and is
    // the entry evicted by the next insert.
    assert!(cache.get("z").is_none());
    cache.put("c", parse("3"));

    assert!(cache.get("a").is_none());
    assert!(cache.get("b").is_some());
    assert!(cache.get("c").is_some());
}

#[test]
fn cached_runs_match_uncached_runs() {
    let src = "let x = 2; x * 21";
    let uncached = Script::new(src).silent(true).run();
    let first = Script::new(src).use_cache(true).silent(true).run();
    let second = Script::new(src).use_cache(true).silent(true).run();

    assert_eq!(uncached.value.to_string(), "42");
    assert_eq!(first.value.to_string(), "42");
    assert_eq!(second.value.to_string(), "42");
}

#[test]
fn parsing_is_deterministic() {
    let src = "let x = [1, {a: `${1 + 1}`}]; if (x) { print(x) }";
    let first = parse_program(&tokenize(src).unwrap()).unwrap();
    let second = parse_program(&tokenize(src).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn fn_and_for_remain_usable_as_identifiers() {
    // `fn`, `for`, and `in` are recognized by spelling at specific spots,
    // not reserved by the lexer, so they still work as plain names.
    assert_value("let in = 5; in", "5");
    assert_value("let fn = 1; fn + 1", "2");
    assert_value("let for = 2; for * 2", "4");
}

#[test]
fn object_literals_at_statement_position() {
    // A `{` followed by `}` or an `IDENT :` entry opens an object literal
    // expression statement, not a block.
    assert_value("{a: 1} == {a: 1}", "true");
    assert_value("{} == {}", "true");
    assert_value("{a: 1}.a", "1");
    // Anything else inside the braces is still a statement block.
    assert_value("let x = 1; { x = 5 } x", "5");
    assert_value("let x = 2; { x } ", "null");
}

#[test]
fn implicit_function_body_values() {
    assert_value("let add = fn(a, b) { a + b }; add(20, 22)", "42");
    // Declarations and loops do not contribute a body value.
    assert_value("let f = fn() { 1; let x = 2 }; f()", "1");
    // An explicit return still wins over later statements.
    assert_value("let f = fn() { return 1; 2 }; f()", "1");
}

#[test]
fn statement_semicolons_are_optional() {
    assert_value("let x = 1\nlet y = 2\nx + y", "3");
    assert_value(";;let x = 1;; x;;", "1");
}
