//! Integration tests for the function registry + integration driver
//! Tests resolved target functions integrated across threads

use std::fs;
use std::sync::Arc;

use riemann_core::{ErrorKind, IntegrateError, IntegrationRequest, Integrator, ThreadCount};
use riemann_functions::{
    CompiledExpression, FunctionRegistry, FunctionSource, RegistryConfig, TargetFunction,
};
use tempfile::TempDir;

fn integrate(
    function: &dyn TargetFunction,
    start: f64,
    end: f64,
    steps: u64,
    threads: usize,
) -> Result<f64, IntegrateError> {
    let request = IntegrationRequest::new(function, start, end)
        .with_step_count(steps)
        .with_thread_count(ThreadCount::from(threads));
    Integrator::new().integrate(&request).map(|result| result.value)
}

fn registry() -> FunctionRegistry {
    FunctionRegistry::new(RegistryConfig::default())
}

#[test]
fn test_builtin_constant_is_exact() {
    let resolved = registry().resolve("one").unwrap();
    assert_eq!(resolved.source, FunctionSource::Builtin);

    let value = integrate(resolved.function.as_ref(), 5.0, 10.0, 1024, 1).unwrap();
    assert_eq!(value, 5.0);
}

#[test]
fn test_identity_on_four_threads() {
    let resolved = registry().resolve("x").unwrap();
    let value = integrate(resolved.function.as_ref(), 0.0, 2.0, 2_000_000, 4).unwrap();
    assert!((value - 2.0).abs() < 1e-3);
}

#[test]
fn test_thread_counts_agree() {
    let resolved = registry().resolve("sin(x) * x").unwrap();
    assert_eq!(resolved.source, FunctionSource::Inline);

    let single = integrate(resolved.function.as_ref(), 0.0, 3.0, 100_000, 1).unwrap();
    for threads in [2, 4, 8] {
        let parallel = integrate(resolved.function.as_ref(), 0.0, 3.0, 100_000, threads).unwrap();
        assert!((single - parallel).abs() < 2e-3, "{threads}: {single} vs {parallel}");
    }
}

#[test]
fn test_expression_matches_builtin() {
    let builtin = registry().resolve("gauss").unwrap();
    let inline = CompiledExpression::compile("exp(-x^2)", "<test>").unwrap();

    let a = integrate(builtin.function.as_ref(), -3.0, 3.0, 60_000, 2).unwrap();
    let b = integrate(&inline, -3.0, 3.0, 60_000, 2).unwrap();
    assert!((a - b).abs() < 1e-9);
    assert!((a - std::f64::consts::PI.sqrt()).abs() < 1e-3);
}

#[test]
fn test_plugin_file_integrated() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("parabola.fn"), "3 * x^2  # derivative of x^3\n").unwrap();
    let registry = FunctionRegistry::new(RegistryConfig::with_plugin_dir(dir.path()));

    let resolved = registry.resolve("parabola").unwrap();
    assert_eq!(
        resolved.source,
        FunctionSource::Plugin(dir.path().join("parabola.fn"))
    );
    let value = integrate(resolved.function.as_ref(), 0.0, 2.0, 1_000_000, 4).unwrap();
    assert!((value - 8.0).abs() < 1e-3);
}

#[test]
fn test_registered_function_shadows_builtin() {
    let mut registry = registry();
    registry.register("square", |_: f64| 2.0);

    let resolved = registry.resolve("square").unwrap();
    assert_eq!(resolved.source, FunctionSource::Registered);
    let value = integrate(resolved.function.as_ref(), 0.0, 4.0, 256, 2).unwrap();
    assert_eq!(value, 8.0);
}

#[test]
fn test_resolved_function_shared_between_runs() {
    let resolved = registry().resolve("cube").unwrap();
    let shared = Arc::clone(&resolved.function);

    let left = integrate(shared.as_ref(), -1.0, 0.0, 10_000, 2).unwrap();
    let right = integrate(resolved.function.as_ref(), 0.0, 1.0, 10_000, 2).unwrap();
    assert!((left + right).abs() < 1e-3);
}

#[test]
fn test_empty_interval_is_convergence_error() {
    let resolved = registry().resolve("x").unwrap();
    let err = integrate(resolved.function.as_ref(), 1.0, 1.0, 1000, 4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Convergence);
}

#[test]
fn test_unresolvable_name() {
    let err = registry().resolve("nonexistent_fn").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PluginLoad);
    assert!(err.to_string().contains("nonexistent_fn"));
}

#[test]
fn test_facade_reexports() {
    let registry = riemann::FunctionRegistry::new(riemann::RegistryConfig::default());
    let resolved = registry.resolve("one").unwrap();
    let request = riemann::IntegrationRequest::new(resolved.function.as_ref(), 0.0, 3.0)
        .with_step_count(3)
        .with_thread_count(riemann::ThreadCount::single());
    let integration = riemann::Integrator::new().integrate(&request).unwrap();
    assert_eq!(integration.value, 3.0);
    assert_eq!(integration.threads, 1);
}
