//! Integration tests for the lexer + parser pipeline
//! Tests AST shape and error locations for target-function expressions

use riemann_ast::{BinaryOp, Expr, ExprError};
use riemann_lexer::{Lexer, Token};
use riemann_parser::Parser;

fn parse(source: &str) -> Expr {
    Parser::new(source).unwrap().parse().unwrap().node
}

fn parse_err(source: &str) -> ExprError {
    match Parser::new(source) {
        Ok(parser) => parser.parse().unwrap_err(),
        Err(err) => err,
    }
}

#[test]
fn test_lexer_tokens_feed_parser() {
    let tokens = Lexer::new("2*sin(x) # wave").tokenize();
    let kinds: Vec<Token> = tokens.iter().map(|t| t.token.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            Token::Number,
            Token::Star,
            Token::Ident,
            Token::Lparen,
            Token::Ident,
            Token::Rparen,
            Token::Eof,
        ]
    );

    let parser = Parser::new("2*sin(x) # wave").unwrap();
    assert_eq!(parser.tokens().len(), tokens.len());
    assert_eq!(parser.parse().unwrap().node.to_string(), "(2 * sin(x))");
}

#[test]
fn test_operator_precedence() {
    assert_eq!(parse("2 + 3 * x").to_string(), "(2 + (3 * x))");
    assert_eq!(parse("x - 1 - 2").to_string(), "((x - 1) - 2)");
    assert_eq!(parse("x / 2 * 3").to_string(), "((x / 2) * 3)");
    assert_eq!(parse("(2 + 3) * x").to_string(), "((2 + 3) * x)");
}

#[test]
fn test_power_binds_tighter_than_negation() {
    assert_eq!(parse("-x^2").to_string(), "(-(x ^ 2))");
    assert_eq!(parse("2^3^x").to_string(), "(2 ^ (3 ^ x))");
}

#[test]
fn test_constants_and_calls() {
    let expr = parse("e^x + log10(pi)");
    let Expr::Binary { op, left, right } = expr else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(left.node.to_string(), "(e ^ x)");
    assert_eq!(right.node.to_string(), "log10(pi)");
}

#[test]
fn test_multiline_plugin_text() {
    let source = "# damped wave\nexp(-x) *\n  cos(2 * pi * x)\n";
    let expr = parse(source);
    assert_eq!(expr.to_string(), "(exp((-x)) * cos(((2 * pi) * x)))");
}

#[test]
fn test_error_location_on_second_line() {
    let err = parse_err("x +\n  * 2");
    assert!(matches!(err, ExprError::Syntax { line: 2, column: 3, .. }), "{err}");
    assert!(err.to_string().starts_with("<expr>:2:3: ERR_SYNTAX"));
}

#[test]
fn test_unknown_names_and_functions() {
    let err = parse_err("y + 1");
    assert!(matches!(err, ExprError::UnknownName { ref name, .. } if name == "y"));

    let err = parse_err("2 * gamma(x)");
    assert!(matches!(err, ExprError::UnknownFunction { ref name, column: 5, .. } if name == "gamma"));
}

#[test]
fn test_filename_in_errors() {
    let err = Parser::new_with_filename("sin(x", "wave.fn")
        .unwrap()
        .parse()
        .unwrap_err();
    assert!(err.to_string().starts_with("wave.fn:1:"), "{err}");
}

#[test]
fn test_unexpected_character() {
    let err = parse_err("x $ 2");
    assert!(err.to_string().contains("Unexpected character"), "{err}");
}
