//! Parser integration tests

mod common;

use common::{assert_eq, parse, parse_errors, parse_ok};
use ember_runtime::ast::{Expression, PrefixExpression, Statement, VersionedProgram};
use ember_runtime::{Lexer, ParseError, Parser, Precedence, Span, Token, TokenKind, TokenSource};
use rstest::rstest;

#[rstest]
#[case("let x = 5;", "x", "5")]
#[case("let y = true;", "y", "true")]
#[case("let foobar = y;", "foobar", "y")]
#[case("let f = fn(a) { a };", "f", "fn(a) a")]
fn test_let_statement_binds_name(#[case] source: &str, #[case] name: &str, #[case] value: &str) {
    let program = parse_ok(source);
    assert_eq!(program.statements.len(), 1);
    let statement = &program.statements[0];
    assert_eq!(statement.token_literal(), "let");

    match statement {
        Statement::Let(let_stmt) => {
            assert_eq!(let_stmt.name.value, name);
            assert_eq!(let_stmt.name.token.literal, name);
            assert_eq!(let_stmt.value.to_string(), value);
        }
        other => panic!("Expected let statement, got {:?}", other),
    }
}

#[rstest]
#[case("let = 5;", "expected next token to be IDENT, got =")]
#[case("let x 5;", "expected next token to be =, got INT")]
#[case("let 838383;", "expected next token to be IDENT, got INT")]
#[case("if (x { 1 }", "expected next token to be ), got {")]
#[case("fn(x y) { x }", "expected next token to be ), got IDENT")]
#[case("[1, 2", "expected next token to be ], got EOF")]
#[case("a[1", "expected next token to be ], got EOF")]
#[case("+1;", "no prefix parse function for +")]
#[case("let a = @;", "no prefix parse function for ILLEGAL")]
fn test_first_error_message(#[case] source: &str, #[case] expected: &str) {
    let errors = parse_errors(source);
    assert!(!errors.is_empty(), "no errors for {:?}", source);
    assert_eq!(errors[0], expected);
}

#[test]
fn test_recovery_keeps_statements_around_bad_token() {
    let (program, errors) = parse("let a = 1; let b = @; let c = 3;");
    assert_eq!(errors.len(), 1);
    let names: Vec<String> = program
        .statements
        .iter()
        .filter_map(|s| match s {
            Statement::Let(let_stmt) => Some(let_stmt.name.value.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn test_errors_are_ordered_by_position() {
    let (_program, errors) = parse("let = 1;\nlet y 2;\n)");
    let starts: Vec<usize> = errors.iter().map(|e| e.span().start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
    assert!(errors.len() >= 3);
}

#[test]
fn test_invalid_integer_is_a_parse_error() {
    let (program, errors) = parse("let big = 9223372036854775808;");
    assert!(program.statements.is_empty());
    assert_eq!(
        errors,
        vec![ParseError::InvalidInteger {
            literal: "9223372036854775808".to_string(),
            span: Span::new(10, 29),
        }]
    );
}

#[test]
fn test_max_integer_literal_parses() {
    let program = parse_ok("9223372036854775807;");
    assert_eq!(program.to_string(), "9223372036854775807");
}

#[test]
fn test_deep_nesting_is_reported_not_overflowed() {
    let source = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
    let (_program, errors) = parse(&source);
    assert!(errors
        .iter()
        .any(|e| matches!(e, ParseError::NestingTooDeep { max_depth: 256, .. })));
}

#[test]
fn test_deep_prefix_chain_is_bounded() {
    let source = format!("{}1", "-".repeat(5000));
    let mut parser = Parser::new(Lexer::new(source.as_str())).with_max_depth(64);
    let (_program, errors) = parser.parse();
    assert!(!errors.is_empty());
    for error in &errors {
        assert_eq!(error.to_string(), "expression nesting exceeds maximum depth of 64");
    }
}

fn nesting_errors(errors: &[ParseError]) -> usize {
    errors
        .iter()
        .filter(|e| matches!(e, ParseError::NestingTooDeep { .. }))
        .count()
}

#[test]
fn test_long_infix_chain_is_bounded() {
    let source = format!("1{}", " + 1".repeat(100_000));
    let (_program, errors) = parse(&source);
    assert!(nesting_errors(&errors) > 0);
}

#[test]
fn test_long_call_chain_is_bounded() {
    let source = format!("let f = fn() {{ f }}; f{}", "()".repeat(5000));
    let (program, errors) = parse(&source);
    assert!(nesting_errors(&errors) > 0);
    // The definition before the chain survives
    assert_eq!(program.statements[0].token_literal(), "let");
}

#[test]
fn test_infix_chain_within_limit_parses() {
    let source = format!("1{}", " + 1".repeat(30));
    let mut parser = Parser::new(Lexer::new(source.as_str())).with_max_depth(64);
    let (program, errors) = parser.parse();
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn test_chain_depth_resets_between_statements() {
    let statement = format!("1{};", " + 1".repeat(30));
    let source = statement.repeat(10);
    let mut parser = Parser::new(Lexer::new(source.as_str())).with_max_depth(64);
    let (program, errors) = parser.parse();
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(program.statements.len(), 10);
}

#[test]
fn test_hand_built_token_vector() {
    // let x = 1 + 2;  with no source text behind it
    let tokens = vec![
        Token::synthetic(TokenKind::Let, "let"),
        Token::synthetic(TokenKind::Ident, "x"),
        Token::synthetic(TokenKind::Assign, "="),
        Token::synthetic(TokenKind::Int, "1"),
        Token::synthetic(TokenKind::Plus, "+"),
        Token::synthetic(TokenKind::Int, "2"),
        Token::synthetic(TokenKind::Semicolon, ";"),
    ];
    let mut parser = Parser::new(tokens.into_iter());
    let (program, errors) = parser.parse();
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(program.to_string(), "let x = (1 + 2);");
}

fn parse_unary_plus<S: TokenSource>(parser: &mut Parser<S>) -> Option<Expression> {
    let token = parser.cur_token().clone();
    parser.next_token();
    let right = parser.parse_expression(Precedence::Prefix)?;
    Some(Expression::Prefix(PrefixExpression {
        operator: token.literal.clone(),
        token,
        right: Box::new(right),
    }))
}

#[test]
fn test_register_prefix_extends_grammar() {
    let mut parser = Parser::new(Lexer::new("+a * b"));
    parser.register_prefix(TokenKind::Plus, parse_unary_plus);
    let (program, errors) = parser.parse();
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(program.to_string(), "((+a) * b)");
}

#[test]
fn test_register_infix_overrides_precedence() {
    // Re-register `+` to bind tighter than `*`
    let mut parser = Parser::new(Lexer::new("a * b + c"));
    parser.register_infix(TokenKind::Plus, Precedence::Index, Parser::parse_infix_expression);
    let (program, errors) = parser.parse();
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(program.to_string(), "(a * (b + c))");
}

#[test]
fn test_if_without_else() {
    let program = parse_ok("if (x < y) { x }");
    match &program.statements[0] {
        Statement::Expression(stmt) => match &stmt.expression {
            Expression::If(if_expr) => {
                assert_eq!(if_expr.condition.to_string(), "(x < y)");
                assert_eq!(if_expr.consequence.to_string(), "x");
                assert!(if_expr.alternative.is_none());
            }
            other => panic!("Expected if expression, got {:?}", other),
        },
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_program_display() {
    let program = parse_ok("let add = fn(a, b) { return a + b; }; add(1, 2 * 3);");
    insta::assert_snapshot!(program.to_string(), @"let add = fn(a, b) return (a + b);;add(1, (2 * 3))");
}

#[test]
fn test_ast_json_round_trip() {
    let program = parse_ok("let xs = [1, \"two\", true]; xs[0];");
    let json = VersionedProgram::new(program.clone()).to_json().unwrap();
    let restored = VersionedProgram::from_json(&json).unwrap();
    assert_eq!(restored.program, program);
}
