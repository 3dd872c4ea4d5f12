//! Whole-program scenarios through the public `analyze` entry point

use minic_front::sema::{Category, DataType};
use minic_front::{analyze, CompileError};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn reject(source: &str) -> CompileError {
    init_logging();
    match analyze(source) {
        Ok(_) => panic!("expected {:?} to be rejected", source),
        Err(err) => err,
    }
}

#[rstest]
#[case::widening("int i; double d; void main() { d = i; }")]
#[case::narrowing("int i; double d; void main() { i = d; }")]
#[case::short_from_long("short s; long l; void main() { s = l; }")]
#[case::char_into_int("char c; int i; void main() { i = c; }")]
#[case::char_literal("char c; void main() { c = 'a'; }")]
#[case::escaped_char("char c; void main() { c = '\\n'; }")]
#[case::hex_and_shift("int i; void main() { i = 0xFF << 2 | 1; }")]
#[case::comments("// header\nint x; // trailing\nvoid main() { x = 1; }")]
#[case::initializer_sees_itself("int x = x;")]
#[case::while_body_block("int n; void main() { while (n > 0) { n = n - 1; } }")]
#[case::call_before_and_after("void f(int a) { } void main() { f(1); f(2 + 3); }")]
fn test_accepted_programs(#[case] source: &str) {
    init_logging();
    assert!(analyze(source).is_ok(), "rejected: {}", source);
}

#[rstest]
#[case::double_into_char("char c; void main() { c = 1.5; }")]
#[case::int_into_char("char c; void main() { c = 1; }")]
#[case::modulo_double("int i; double d; void main() { i = d % 2; }")]
#[case::shift_double("int i; void main() { i = 1.0 << 2; }")]
#[case::bitwise_double("int i; void main() { i = 1 | 2.0; }")]
fn test_type_errors(#[case] source: &str) {
    assert!(reject(source).is_semantic());
}

#[test]
fn test_function_used_as_value() {
    let err = reject("void f() { }\nint x;\nvoid main() { x = f; }");
    assert!(err.is_semantic());
    assert_eq!(err.lexeme(), "f");
    assert_eq!(err.line(), 3);
}

#[test]
fn test_assign_to_function() {
    let err = reject("void f() { }\nvoid main() { f = 1; }");
    assert!(err.is_semantic());
    assert!(err.message().contains("cannot assign"));
}

#[test]
fn test_call_arity_and_types() {
    let source = "void f(int a, double b) { }\nvoid main() {\n";

    let err = reject(&format!("{source}  f(1);\n}}"));
    assert!(err.message().contains("wrong number of arguments"));

    let err = reject(&format!("{source}  f(1, 2.0, 3);\n}}"));
    assert!(err.message().contains("too many arguments"));

    let err = reject(&format!("{source}  f(1, 2);\n}}"));
    assert!(err.message().contains("type mismatch for argument 2"));
    assert_eq!(err.line(), 3);

    init_logging();
    assert!(analyze(&format!("{source}  f(1, 2.0);\n}}")).is_ok());
}

#[test]
fn test_call_to_variable() {
    let err = reject("int x; void main() { x(1); }");
    assert!(err.is_semantic());
    assert!(err.message().contains("is not a function"));
}

#[test]
fn test_identifier_overflow() {
    let long_name = "a".repeat(101);
    let err = reject(&format!("int {long_name};"));
    assert!(err.is_lexical());
    assert_eq!(err.lexeme(), long_name);

    init_logging();
    assert!(analyze(&format!("int {};", "a".repeat(100))).is_ok());
}

#[test]
fn test_lookahead_is_transparent() {
    let source = "int x;\nvoid g(int a) { }\nvoid main() {\n  x = 1;\n  g(1);\n  x = 1.5 +;\n}";
    let err = reject(source);
    assert!(err.is_syntax());
    assert_eq!(err.line(), 6);
    assert_eq!(err.lexeme(), ";");
}

#[test]
fn test_shadowing_and_redeclaration() {
    init_logging();
    let analysis = analyze("int x; void main() { double x; { char x; x = 'c'; } x = 1.5; }").unwrap();
    let scopes = analysis.scopes();
    assert_eq!(scopes.symbol_count(), 4);
    let mut shadows = Vec::new();
    let mut pending = vec![scopes.global()];
    while let Some(scope) = pending.pop() {
        for id in scopes.symbols_in(scope) {
            let symbol = scopes.symbol(id);
            if symbol.name == "x" {
                shadows.push((scopes.depth(scope), symbol.category(), symbol.ty));
            }
        }
        pending.extend(scopes.children_of(scope));
    }
    assert_eq!(
        shadows,
        vec![
            (0, Category::Variable, DataType::Int),
            (1, Category::Variable, DataType::Double),
            (2, Category::Variable, DataType::Char),
        ]
    );

    let err = reject("int x; double x;");
    assert!(err.is_semantic());
    assert_eq!(err.message(), "redeclaration of variable 'x'");

    let err = reject("void f() { }\nvoid f() { }");
    assert_eq!(err.message(), "redeclaration of function 'f'");
    assert_eq!(err.line(), 2);

    let err = reject("void f(int a, int a) { }");
    assert_eq!(err.message(), "redeclaration of parameter 'a'");

    let err = reject("void f(int a) { int a; }");
    assert!(err.is_semantic());
}

#[rstest]
#[case::variable_then_function("int f;\nvoid f() { }", "redeclaration of function 'f'")]
#[case::function_then_variable("void f() { }\nint f;", "redeclaration of variable 'f'")]
#[case::main_as_variable("void main() { }\ndouble main;", "redeclaration of variable 'main'")]
fn test_function_and_variable_share_namespace(#[case] source: &str, #[case] message: &str) {
    let err = reject(source);
    assert!(err.is_semantic());
    assert_eq!(err.message(), message);
    assert_eq!(err.line(), 2);
}

#[test]
fn test_undeclared_names() {
    let err = reject("void main() { y = 1; }");
    assert_eq!(err.message(), "use of undeclared variable 'y'");

    let err = reject("int x; void main() { x = y; }");
    assert_eq!(err.message(), "use of undeclared identifier 'y'");

    let err = reject("void main() { g(); }");
    assert_eq!(err.message(), "call to undeclared function 'g'");

    // Blocks close their scope.
    let err = reject("void main() { { int t; } t = 1; }");
    assert!(err.is_semantic());
}

#[rstest]
#[case::hex_without_digits("int x = 0x;", "0x")]
#[case::bad_suffix("int x = 1.5e;", "1.5e")]
#[case::unterminated_char("char c = 'ab';", "'a")]
#[case::stray_symbol("int x = 1 ! 2;", "!")]
fn test_lexical_errors(#[case] source: &str, #[case] lexeme: &str) {
    let err = reject(source);
    assert!(err.is_lexical(), "{err}");
    assert_eq!(err.lexeme(), lexeme);
}

#[test]
fn test_error_line_numbers() {
    let err = reject("int x;\n\n\nvoid main() {\n  x = ;\n}");
    assert!(err.is_syntax());
    assert_eq!(err.line(), 5);
    assert_eq!(
        err.to_string(),
        "Syntax error on line 5 near ';': expected an operand (variable, constant or parenthesized expression)"
    );
}
