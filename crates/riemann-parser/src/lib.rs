//! Recursive-descent parser for Riemann target-function expressions
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | power
//! power   := primary ('^' unary)?
//! primary := NUMBER | IDENT | IDENT '(' expr ')' | '(' expr ')'
//! ```
//!
//! `^` is right-associative and binds tighter than unary minus, so `-x^2`
//! is `-(x^2)` and `2^-x` is accepted. Trees deeper than [`MAX_DEPTH`] are
//! rejected as syntax errors.

use riemann_ast::{BinaryOp, Constant, Expr, ExprError, Function, SourceMap, Span, Spanned};
use riemann_lexer::{Lexer, SpannedToken, Token};

/// Deepest expression tree, and deepest nesting of parentheses, calls and
/// unary minus, that `parse` accepts
pub const MAX_DEPTH: usize = 256;

pub struct Parser {
    source_map: SourceMap,
    filename: String,
    tokens: Vec<SpannedToken>,
}

impl Parser {
    /// Create a new parser for the given input
    ///
    /// # Errors
    ///
    /// Returns `ExprError` if there are lexical errors in the input
    pub fn new(input: &str) -> Result<Self, ExprError> {
        Self::new_with_filename(input, "<expr>")
    }

    /// Create a new parser for the given input with a filename
    ///
    /// # Errors
    ///
    /// Returns `ExprError` if there are lexical errors in the input
    pub fn new_with_filename(input: &str, filename: &str) -> Result<Self, ExprError> {
        let source_map = SourceMap::new(input);

        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize();

        if let Some(token) = tokens.iter().find(|token| token.token == Token::Error) {
            return Err(ExprError::syntax(
                format!("Unexpected character: {}", token.text),
                token.span,
                &source_map,
                filename,
            ));
        }

        Ok(Self {
            source_map,
            filename: filename.to_string(),
            tokens,
        })
    }

    /// Parse the input into an expression AST
    ///
    /// # Errors
    ///
    /// Returns `ExprError` on syntax errors, unknown names or unknown functions
    pub fn parse(&self) -> Result<Spanned<Expr>, ExprError> {
        let mut cursor = Cursor {
            parser: self,
            pos: 0,
            nesting: 0,
        };
        let Node { expr, .. } = cursor.expr()?;
        let trailing = cursor.peek();
        if trailing.token != Token::Eof {
            return Err(cursor.syntax_error(
                format!("Unexpected '{}' after expression", trailing.text),
                trailing.span,
            ));
        }
        Ok(expr)
    }

    /// Get access to the source map for error reporting
    #[must_use]
    pub const fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Get access to the filename
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Get access to the tokens (useful for debugging)
    #[must_use]
    pub fn tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }
}

/// Parsed subtree and its height
struct Node {
    expr: Spanned<Expr>,
    depth: usize,
}

impl Node {
    const fn leaf(expr: Spanned<Expr>) -> Self {
        Self { expr, depth: 1 }
    }
}

/// Position within the token stream of a single `parse` call
struct Cursor<'p> {
    parser: &'p Parser,
    pos: usize,
    /// Active `unary` frames
    nesting: usize,
}

impl<'p> Cursor<'p> {
    // The token list always ends with Eof, and `advance` never moves past it.
    fn peek(&self) -> &'p SpannedToken {
        &self.parser.tokens[self.pos]
    }

    fn advance(&mut self) -> &'p SpannedToken {
        let token = &self.parser.tokens[self.pos];
        if token.token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> Option<&'p SpannedToken> {
        if &self.peek().token == expected {
            Some(self.advance())
        } else {
            None
        }
    }

    fn syntax_error(&self, message: String, span: Span) -> ExprError {
        ExprError::syntax(
            message,
            span,
            &self.parser.source_map,
            &self.parser.filename,
        )
    }

    fn unexpected(&self, token: &SpannedToken, wanted: &str) -> ExprError {
        let found = if token.token == Token::Eof {
            "end of input".to_string()
        } else {
            format!("'{}'", token.text)
        };
        self.syntax_error(format!("Expected {wanted}, found {found}"), token.span)
    }

    fn too_deep(&self, span: Span) -> ExprError {
        self.syntax_error(
            format!("Expression nested too deeply (limit {MAX_DEPTH})"),
            span,
        )
    }

    fn node(&self, expr: Spanned<Expr>, depth: usize) -> Result<Node, ExprError> {
        if depth > MAX_DEPTH {
            return Err(self.too_deep(expr.span));
        }
        Ok(Node { expr, depth })
    }

    fn binary(&self, op: BinaryOp, left: Node, right: Node) -> Result<Node, ExprError> {
        let depth = 1 + left.depth.max(right.depth);
        let span = left.expr.span.merge(right.expr.span);
        let expr = Expr::Binary {
            op,
            left: Box::new(left.expr),
            right: Box::new(right.expr),
        };
        self.node(Spanned::new(expr, span), depth)
    }

    fn expr(&mut self) -> Result<Node, ExprError> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek().token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.term()?;
            left = self.binary(op, left, right)?;
        }
    }

    fn term(&mut self) -> Result<Node, ExprError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek().token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.unary()?;
            left = self.binary(op, left, right)?;
        }
    }

    // Every recursive path of the grammar passes through here.
    fn unary(&mut self) -> Result<Node, ExprError> {
        if self.nesting >= MAX_DEPTH {
            return Err(self.too_deep(self.peek().span));
        }
        self.nesting += 1;
        let result = self.negation();
        self.nesting -= 1;
        result
    }

    fn negation(&mut self) -> Result<Node, ExprError> {
        if let Some(minus) = self.eat(&Token::Minus) {
            let operand = self.unary()?;
            let span = minus.span.merge(operand.expr.span);
            let expr = Expr::Neg(Box::new(operand.expr));
            return self.node(Spanned::new(expr, span), operand.depth + 1);
        }
        self.power()
    }

    fn power(&mut self) -> Result<Node, ExprError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret).is_some() {
            let exponent = self.unary()?;
            return self.binary(BinaryOp::Pow, base, exponent);
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Node, ExprError> {
        let token = self.advance();
        match token.token {
            Token::Number => {
                let value: f64 = token.text.parse().map_err(|_| {
                    self.syntax_error(format!("Invalid number '{}'", token.text), token.span)
                })?;
                Ok(Node::leaf(Spanned::new(Expr::Number(value), token.span)))
            }
            Token::Ident if self.peek().token == Token::Lparen => self.call(token),
            Token::Ident => self.name(token),
            Token::Lparen => {
                let inner = self.expr()?;
                let close = self.peek();
                if self.eat(&Token::Rparen).is_none() {
                    return Err(self.unexpected(close, "')'"));
                }
                Ok(Node {
                    expr: Spanned::new(inner.expr.node, token.span.merge(close.span)),
                    depth: inner.depth,
                })
            }
            _ => Err(self.unexpected(token, "an expression")),
        }
    }

    fn name(&self, token: &SpannedToken) -> Result<Node, ExprError> {
        if token.text == "x" {
            return Ok(Node::leaf(Spanned::new(Expr::Variable, token.span)));
        }
        Constant::from_name(&token.text)
            .map(|constant| Node::leaf(Spanned::new(Expr::Constant(constant), token.span)))
            .ok_or_else(|| {
                ExprError::unknown_name(
                    token.text.clone(),
                    token.span,
                    &self.parser.source_map,
                    &self.parser.filename,
                )
            })
    }

    fn call(&mut self, name: &SpannedToken) -> Result<Node, ExprError> {
        let function = Function::from_name(&name.text).ok_or_else(|| {
            ExprError::unknown_function(
                name.text.clone(),
                name.span,
                &self.parser.source_map,
                &self.parser.filename,
            )
        })?;
        self.advance(); // '('
        let argument = self.expr()?;
        let close = self.peek();
        if self.eat(&Token::Rparen).is_none() {
            return Err(self.unexpected(close, "')' to close the call"));
        }
        let span = name.span.merge(close.span);
        let expr = Expr::Call {
            function,
            argument: Box::new(argument.expr),
        };
        self.node(Spanned::new(expr, span), argument.depth + 1)
    }
}
