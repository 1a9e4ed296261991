//! Expression evaluation
//!
//! Walks the AST for every sample. Sub-expressions that do not mention `x`
//! are folded to numbers once at compile time.

use riemann_ast::{BinaryOp, Expr, ExprError, Function, Spanned};
use riemann_core::TargetFunction;
use riemann_parser::Parser;

/// A parsed expression in `x`, ready to be sampled from many threads
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    expr: Spanned<Expr>,
}

impl CompiledExpression {
    /// Parse and fold `source`; `filename` is used in error messages
    ///
    /// # Errors
    ///
    /// Returns `ExprError` if `source` is not a valid expression
    pub fn compile(source: &str, filename: &str) -> Result<Self, ExprError> {
        let parser = Parser::new_with_filename(source, filename)?;
        let expr = fold_constants(parser.parse()?);
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn expr(&self) -> &Spanned<Expr> {
        &self.expr
    }

    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        eval_expr(&self.expr.node, x)
    }
}

impl TargetFunction for CompiledExpression {
    fn evaluate(&self, x: f64) -> f64 {
        self.eval(x)
    }
}

fn eval_expr(expr: &Expr, x: f64) -> f64 {
    match expr {
        Expr::Number(value) => *value,
        Expr::Variable => x,
        Expr::Constant(constant) => constant.value(),
        Expr::Neg(operand) => -eval_expr(&operand.node, x),
        Expr::Binary { op, left, right } => {
            apply_binary(*op, eval_expr(&left.node, x), eval_expr(&right.node, x))
        }
        Expr::Call { function, argument } => apply_function(*function, eval_expr(&argument.node, x)),
    }
}

fn apply_binary(op: BinaryOp, left: f64, right: f64) -> f64 {
    match op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => left / right,
        BinaryOp::Pow => left.powf(right),
    }
}

fn apply_function(function: Function, value: f64) -> f64 {
    match function {
        Function::Sin => value.sin(),
        Function::Cos => value.cos(),
        Function::Tan => value.tan(),
        Function::Asin => value.asin(),
        Function::Acos => value.acos(),
        Function::Atan => value.atan(),
        Function::Sinh => value.sinh(),
        Function::Cosh => value.cosh(),
        Function::Tanh => value.tanh(),
        Function::Exp => value.exp(),
        Function::Ln => value.ln(),
        Function::Log10 => value.log10(),
        Function::Log2 => value.log2(),
        Function::Sqrt => value.sqrt(),
        Function::Abs => value.abs(),
        Function::Floor => value.floor(),
        Function::Ceil => value.ceil(),
    }
}

fn is_constant(expr: &Expr) -> bool {
    matches!(expr, Expr::Number(_) | Expr::Constant(_))
}

/// Replace every `x`-free subtree with its value
fn fold_constants(expr: Spanned<Expr>) -> Spanned<Expr> {
    let Spanned { node, span } = expr;
    let node = match node {
        Expr::Neg(operand) => {
            let operand = fold_constants(*operand);
            if is_constant(&operand.node) {
                Expr::Number(-eval_expr(&operand.node, 0.0))
            } else {
                Expr::Neg(Box::new(operand))
            }
        }
        Expr::Binary { op, left, right } => {
            let left = fold_constants(*left);
            let right = fold_constants(*right);
            if is_constant(&left.node) && is_constant(&right.node) {
                Expr::Number(apply_binary(
                    op,
                    eval_expr(&left.node, 0.0),
                    eval_expr(&right.node, 0.0),
                ))
            } else {
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
        }
        Expr::Call { function, argument } => {
            let argument = fold_constants(*argument);
            if is_constant(&argument.node) {
                Expr::Number(apply_function(function, eval_expr(&argument.node, 0.0)))
            } else {
                Expr::Call {
                    function,
                    argument: Box::new(argument),
                }
            }
        }
        leaf => leaf,
    };
    Spanned::new(node, span)
}
