//! Target functions for the Riemann integrator
//!
//! Resolves a function name to a [`TargetFunction`]: built-in table,
//! expression plugin files, or an inline expression in `x`.

mod builtin;
mod eval;
mod registry;

pub use builtin::{builtin, builtin_names};
pub use eval::CompiledExpression;
pub use registry::{
    FunctionRegistry, FunctionSource, PLUGIN_EXTENSION, RegistryConfig, ResolveError, Resolved,
};
pub use riemann_core::TargetFunction;
