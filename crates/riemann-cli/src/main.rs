//! Riemann CLI
//!
//! Integrates a function over `[start, end]` with the left rectangles
//! method on a configurable number of threads.

mod args;

use std::io::{self, IsTerminal};
use std::process;

use anyhow::Context;
use args::Options;
use clap::error::ErrorKind as ClapErrorKind;
use riemann_core::{ErrorKind, IntegrateError, Integration, IntegrationRequest, Integrator};
use riemann_functions::{FunctionRegistry, RegistryConfig, ResolveError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Process exit statuses, sysexits style
mod exit {
    pub const OK: i32 = 0;
    pub const USAGE: i32 = 64;
    pub const DATAERR: i32 = 65;
    pub const SOFTWARE: i32 = 70;
    pub const OSERR: i32 = 71;
}

fn main() {
    init_logging();

    let options = match args::parse_from(std::env::args_os()) {
        Ok(options) => options,
        Err(err) => {
            let code = match err.kind() {
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => exit::OK,
                _ => exit::USAGE,
            };
            let _ = err.print();
            process::exit(code);
        }
    };
    debug!(?options, "parsed command line");

    match run(&options) {
        Ok(integration) => {
            println!("{}", render(&options, &integration));
            if options.verbose {
                eprintln!("Took {:.6} s", integration.elapsed.as_secs_f64());
            }
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(exit_code(&err));
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(options: &Options) -> anyhow::Result<Integration> {
    let config = options
        .plugin_dir
        .clone()
        .map_or_else(RegistryConfig::beside_executable, RegistryConfig::with_plugin_dir);
    let registry = FunctionRegistry::new(config);
    let resolved = registry.resolve(&options.function)?;

    let request = IntegrationRequest::new(resolved.function.as_ref(), options.start, options.end)
        .with_step_count(options.steps)
        .with_thread_count(options.threads);
    let integration = Integrator::new()
        .integrate(&request)
        .with_context(|| format!("integrating '{}'", options.function.trim()))?;
    Ok(integration)
}

/// Significant digits of the plain result line
const PLAIN_PRECISION: usize = 6;

/// The stdout line for a successful run
fn render(options: &Options, integration: &Integration) -> String {
    if options.json {
        serde_json::json!({
            "result": integration.value,
            "threads": integration.threads,
            "steps": integration.step_count,
            "elapsed_s": integration.elapsed.as_secs_f64(),
        })
        .to_string()
    } else {
        format_general(integration.value, PLAIN_PRECISION)
    }
}

/// `printf("%g")` formatting: `precision` significant digits, trailing zeros
/// dropped, exponent notation outside `1e-4 <= |value| < 10^precision`
fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    let kind = err.chain().find_map(|cause| {
        cause
            .downcast_ref::<IntegrateError>()
            .map(IntegrateError::kind)
            .or_else(|| cause.downcast_ref::<ResolveError>().map(ResolveError::kind))
    });
    match kind {
        Some(ErrorKind::InvalidArguments) => exit::USAGE,
        Some(ErrorKind::Convergence) => exit::DATAERR,
        Some(ErrorKind::ResourceExhaustion) => exit::OSERR,
        Some(ErrorKind::PluginLoad | ErrorKind::WorkerFailure) | None => exit::SOFTWARE,
    }
}
