//! Abstract Syntax Tree definitions for Riemann target-function expressions
//!
//! Every AST node preserves location information for error reporting.

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Smallest span covering both `self` and `other`
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Line and column position in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Convert byte span to line/column positions
pub struct SourceMap {
    line_starts: Vec<usize>,
}

impl SourceMap {
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(pos + 1);
            }
        }
        Self { line_starts }
    }

    #[must_use]
    pub fn position(&self, byte_offset: usize) -> Position {
        match self.line_starts.binary_search(&byte_offset) {
            Ok(line) => Position::new(line + 1, 1),
            Err(line) => {
                let line_start = self.line_starts[line - 1];
                Position::new(line, byte_offset - line_start + 1)
            }
        }
    }

    #[must_use]
    pub fn span_to_positions(&self, span: Span) -> (Position, Position) {
        (self.position(span.start), self.position(span.end))
    }
}

/// AST node with location information
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    #[must_use]
    pub const fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Named mathematical constant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Self::Pi),
            "e" => Some(Self::E),
            _ => None,
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
        }
    }
}

/// One-argument function callable from an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Log2,
    Sqrt,
    Abs,
    Floor,
    Ceil,
}

impl Function {
    pub const ALL: [Self; 17] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
        Self::Sinh,
        Self::Cosh,
        Self::Tanh,
        Self::Exp,
        Self::Ln,
        Self::Log10,
        Self::Log2,
        Self::Sqrt,
        Self::Abs,
        Self::Floor,
        Self::Ceil,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|function| function.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Log10 => "log10",
            Self::Log2 => "log2",
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
        }
    }
}

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// a + b
    Add,
    /// a - b
    Sub,
    /// a * b
    Mul,
    /// a / b
    Div,
    /// a ^ b (right-associative)
    Pow,
}

impl BinaryOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }
}

/// An expression in the single variable `x`
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal: 2.5, 1e-3
    Number(f64),
    /// The integration variable `x`
    Variable,
    /// Named constant: pi, e
    Constant(Constant),
    /// Negation: -expr
    Neg(Box<Spanned<Expr>>),
    /// Binary operation: left op right
    Binary {
        op: BinaryOp,
        left: Box<Spanned<Expr>>,
        right: Box<Spanned<Expr>>,
    },
    /// Function call: sin(expr)
    Call {
        function: Function,
        argument: Box<Spanned<Expr>>,
    },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Variable => f.write_str("x"),
            Self::Constant(Constant::Pi) => f.write_str("pi"),
            Self::Constant(Constant::E) => f.write_str("e"),
            Self::Neg(operand) => write!(f, "(-{})", operand.node),
            Self::Binary { op, left, right } => {
                write!(f, "({} {} {})", left.node, op.symbol(), right.node)
            }
            Self::Call { function, argument } => {
                write!(f, "{}({})", function.name(), argument.node)
            }
        }
    }
}

/// Error types with location information
#[derive(thiserror::Error, Debug)]
pub enum ExprError {
    #[error("{filename}:{line}:{column}: ERR_SYNTAX: {message}")]
    Syntax {
        message: String,
        span: Span,
        filename: String,
        line: usize,
        column: usize,
    },

    #[error("{filename}:{line}:{column}: ERR_UNKNOWN_NAME: {name} is not the variable x or a known constant")]
    UnknownName {
        name: String,
        span: Span,
        filename: String,
        line: usize,
        column: usize,
    },

    #[error("{filename}:{line}:{column}: ERR_UNKNOWN_FUNCTION: {name} is not a known function")]
    UnknownFunction {
        name: String,
        span: Span,
        filename: String,
        line: usize,
        column: usize,
    },
}

impl ExprError {
    #[must_use]
    pub fn syntax(message: String, span: Span, source_map: &SourceMap, filename: &str) -> Self {
        let pos = source_map.position(span.start);
        Self::Syntax {
            message,
            span,
            filename: filename.to_string(),
            line: pos.line,
            column: pos.column,
        }
    }

    #[must_use]
    pub fn unknown_name(name: String, span: Span, source_map: &SourceMap, filename: &str) -> Self {
        let pos = source_map.position(span.start);
        Self::UnknownName {
            name,
            span,
            filename: filename.to_string(),
            line: pos.line,
            column: pos.column,
        }
    }

    #[must_use]
    pub fn unknown_function(
        name: String,
        span: Span,
        source_map: &SourceMap,
        filename: &str,
    ) -> Self {
        let pos = source_map.position(span.start);
        Self::UnknownFunction {
            name,
            span,
            filename: filename.to_string(),
            line: pos.line,
            column: pos.column,
        }
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Syntax { span, .. }
            | Self::UnknownName { span, .. }
            | Self::UnknownFunction { span, .. } => *span,
        }
    }
}
