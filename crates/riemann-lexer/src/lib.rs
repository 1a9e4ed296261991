//! Lexical analysis for Riemann target-function expressions
//!
//! Tokenizes expressions in `x` using logos. Whitespace, newlines and
//! `#` comments are skipped so plugin files may span several lines.

use logos::Logos;
use riemann_ast::Span;

/// Expression tokens
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
pub enum Token {
    /// Numeric literal: 42, 2.5, .5, 1e-3
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    Number,

    /// Identifier: x, pi, sin, log10
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,

    #[token("(")]
    Lparen,

    #[token(")")]
    Rparen,

    /// Comment to end of line (ignored)
    #[regex(r"#[^\n]*", logos::skip)]
    Comment,

    /// Whitespace and newlines (ignored)
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Whitespace,

    /// End of input
    Eof,

    /// Lexer error
    Error,
}

/// Token with location information
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub text: String,
}

/// Lexer that produces tokens with spans
pub struct Lexer<'input> {
    lexer: logos::Lexer<'input, Token>,
    input: &'input str,
}

impl<'input> Lexer<'input> {
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self {
            lexer: Token::lexer(input),
            input,
        }
    }

    /// Get the next token with span information
    pub fn next_token(&mut self) -> SpannedToken {
        match self.lexer.next() {
            Some(Ok(token)) => {
                let span = self.lexer.span();
                let text = self.input[span.clone()].to_string();
                SpannedToken {
                    token,
                    span: Span::new(span.start, span.end),
                    text,
                }
            }
            Some(Err(())) => {
                let span = self.lexer.span();
                let text = self.input[span.clone()].to_string();
                SpannedToken {
                    token: Token::Error,
                    span: Span::new(span.start, span.end),
                    text,
                }
            }
            None => SpannedToken {
                token: Token::Eof,
                span: Span::new(self.input.len(), self.input.len()),
                text: String::new(),
            },
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.token == Token::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
