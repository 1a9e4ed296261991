use std::collections::BTreeMap;

use once_cell::sync::Lazy;

type Builtin = fn(f64) -> f64;

static BUILTINS: Lazy<BTreeMap<&'static str, Builtin>> = Lazy::new(|| {
    let table: [(&'static str, Builtin); 13] = [
        ("x", |x: f64| x),
        ("one", |_: f64| 1.0),
        ("square", |x: f64| x * x),
        ("cube", |x: f64| x * x * x),
        ("sin", f64::sin),
        ("cos", f64::cos),
        ("tan", f64::tan),
        ("exp", f64::exp),
        ("ln", f64::ln),
        ("sqrt", f64::sqrt),
        ("abs", f64::abs),
        ("gauss", |x: f64| (-x * x).exp()),
        ("inverse", |x: f64| 1.0 / x),
    ];
    table.into_iter().collect()
});

/// Look up a compiled-in function by name
#[must_use]
pub fn builtin(name: &str) -> Option<Builtin> {
    BUILTINS.get(name).copied()
}

/// Names of all compiled-in functions, sorted
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.keys().copied()
}
