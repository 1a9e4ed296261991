//! Riemann - parallel left-rectangle integration
//!
//! Facade over the workspace crates. Most users need [`Integrator`],
//! [`IntegrationRequest`] and [`FunctionRegistry`].

pub use riemann_ast as ast;
pub use riemann_core::{
    ErrorKind, IntegrateError, Integration, IntegrationRequest, Integrator, IntegratorConfig,
    TargetFunction, ThreadCount,
};
pub use riemann_functions::{
    CompiledExpression, FunctionRegistry, FunctionSource, RegistryConfig, ResolveError,
};
pub use riemann_lexer as lexer;
pub use riemann_parser as parser;
