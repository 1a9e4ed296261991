//! Command-line definition and option parsing

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use riemann_core::{DEFAULT_STEP_COUNT, ThreadCount};

/// Values used when a flag is not given
pub struct Defaults {
    pub steps: u64,
    pub threads: usize,
}

pub const DEFAULTS: Defaults = Defaults {
    steps: DEFAULT_STEP_COUNT,
    threads: 1,
};

/// Upper bound on `-t`; larger requests are a usage error
pub const MAX_THREADS: usize = 65_536;

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub function: String,
    pub start: f64,
    pub end: f64,
    pub steps: u64,
    pub threads: ThreadCount,
    pub verbose: bool,
    pub json: bool,
    pub plugin_dir: Option<PathBuf>,
}

pub fn command() -> Command {
    Command::new("riemann")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Integrate a function using the left rectangles method")
        .after_help(
            "FUNCTION is a built-in name (x, one, square, cube, sin, cos, tan, exp, ln, sqrt, \
             abs, gauss, inverse), the name of a plugin file <plugin-dir>/FUNCTION.fn holding an \
             expression in x, or an inline expression such as 'x^2 + 1'.",
        )
        .arg_required_else_help(true)
        .arg(
            Arg::new("function")
                .short('F')
                .long("function")
                .value_name("FUNCTION")
                .help("Function to integrate")
                .required(true)
                .num_args(1),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("THREADS")
                .help(format!(
                    "Number of worker threads, 0 picks one per CPU [default: {}]",
                    DEFAULTS.threads
                ))
                .allow_negative_numbers(true)
                .value_parser(parse_threads),
        )
        .arg(
            Arg::new("steps")
                .short('n')
                .long("steps")
                .value_name("STEPS")
                .help(format!(
                    "Number of integration steps [default: {}]",
                    DEFAULTS.steps
                ))
                .allow_negative_numbers(true)
                .value_parser(parse_steps),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Report the measured execution time on stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the result as a JSON object")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("plugin-dir")
                .long("plugin-dir")
                .value_name("DIR")
                .help("Directory searched for FUNCTION.fn plugins [default: executable directory]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("start")
                .value_name("START")
                .help("Start of the integration interval")
                .required(true)
                .allow_negative_numbers(true)
                .value_parser(parse_bound)
                .index(1),
        )
        .arg(
            Arg::new("end")
                .value_name("END")
                .help("End of the integration interval")
                .required(true)
                .allow_negative_numbers(true)
                .value_parser(parse_bound)
                .index(2),
        )
}

/// Parse `args` (including the program name)
///
/// # Errors
///
/// Returns the clap error for malformed input, `--help` and `--version`
pub fn parse_from<I, T>(args: I) -> Result<Options, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    Ok(options_from(&matches))
}

fn options_from(matches: &ArgMatches) -> Options {
    let threads = matches
        .get_one::<usize>("threads")
        .copied()
        .unwrap_or(DEFAULTS.threads);
    Options {
        function: matches
            .get_one::<String>("function")
            .cloned()
            .unwrap_or_default(),
        start: matches.get_one::<f64>("start").copied().unwrap_or_default(),
        end: matches.get_one::<f64>("end").copied().unwrap_or_default(),
        steps: matches
            .get_one::<u64>("steps")
            .copied()
            .unwrap_or(DEFAULTS.steps),
        threads: ThreadCount::from(threads),
        verbose: matches.get_flag("verbose"),
        json: matches.get_flag("json"),
        plugin_dir: matches.get_one::<PathBuf>("plugin-dir").cloned(),
    }
}

/// Finite number, float notation accepted
fn parse_number(value: &str) -> Result<f64, String> {
    let number: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("Wrong argument '{value}'"))?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(format!("Wrong argument '{value}': not a finite number"))
    }
}

fn parse_bound(value: &str) -> Result<f64, String> {
    parse_number(value)
}

/// Counts accept `1e6`; the fractional part is dropped
fn parse_steps(value: &str) -> Result<u64, String> {
    let steps = parse_number(value)?.trunc();
    if steps < 1.0 {
        return Err(format!("Wrong argument '{value}': step count must be positive"));
    }
    Ok(steps as u64)
}

fn parse_threads(value: &str) -> Result<usize, String> {
    let threads = parse_number(value)?.trunc();
    if threads < 0.0 {
        return Err(format!("Wrong argument '{value}': thread count can not be negative"));
    }
    if threads > MAX_THREADS as f64 {
        return Err(format!(
            "Wrong argument '{value}': at most {MAX_THREADS} threads are supported"
        ));
    }
    Ok(threads as usize)
}
