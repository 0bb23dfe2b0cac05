//! # Tierwise CLI
//!
//! Evaluates one cart snapshot and prints the discount directives.
//!
//! ## Usage
//! ```bash
//! # Read the evaluation input from a file
//! tierwise --input cart.json
//!
//! # Or from stdin, with the full evaluation record
//! cat cart.json | tierwise --explain --pretty
//!
//! # Price-anchored model, segment inferred from prices
//! TIERWISE_MODEL=price TIERWISE_CLASSIFIER=price-ratio tierwise -i cart.json
//! ```
//!
//! stdout carries only the result JSON; logs go to stderr (`RUST_LOG`).

mod config;

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tierwise_core::{DiscountOutput, Engine, EvaluationInput};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

/// Parsed command line options.
#[derive(Debug, Default)]
struct Options {
    input: Option<PathBuf>,
    explain: bool,
    pretty: bool,
}

fn main() -> Result<()> {
    let Some(options) = parse_args(env::args().skip(1))? else {
        print_help();
        return Ok(());
    };

    init_tracing();

    let config = CliConfig::from_env();
    info!(
        model = %config.settings.model,
        classifier = ?config.classifier,
        "configuration loaded"
    );

    let raw = match &options.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    let input: EvaluationInput =
        serde_json::from_str(&raw).context("input is not a valid evaluation document")?;
    debug!(lines = input.lines.len(), "input parsed");

    let engine = Engine::new(config.build_classifier(), config.settings.clone());
    let evaluation = engine.evaluate(&input);
    info!(
        status = ?evaluation.status,
        discounts = evaluation.discounts.len(),
        diagnostics = evaluation.diagnostics.len(),
        "evaluation complete"
    );

    let output = if options.explain {
        render(&evaluation, options.pretty)?
    } else {
        render(&DiscountOutput::from(evaluation), options.pretty)?
    };
    println!("{}", output);
    Ok(())
}

/// Returns `None` when help was requested.
fn parse_args<I>(args: I) -> Result<Option<Options>>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--input" | "-i" => {
                let path = args.next().context("--input requires a path")?;
                options.input = Some(PathBuf::from(path));
            }
            "--explain" | "-e" => options.explain = true,
            "--pretty" | "-p" => options.pretty = true,
            "--help" | "-h" => return Ok(None),
            other => anyhow::bail!("unknown argument '{}' (try --help)", other),
        }
    }

    Ok(Some(options))
}

fn print_help() {
    println!("Tierwise - aggregate-quantity volume discounts");
    println!();
    println!("Usage: tierwise [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -i, --input <PATH>   Evaluation input JSON (default: stdin)");
    println!("  -e, --explain        Print the full evaluation record");
    println!("  -p, --pretty         Pretty-print the output");
    println!("  -h, --help           Show this help message");
    println!();
    println!("Environment:");
    println!("  TIERWISE_MODEL           percent | price (default: percent)");
    println!("  TIERWISE_CLASSIFIER      identity | price-ratio (default: identity)");
    println!("  TIERWISE_LABEL           Discount label title");
    println!("  TIERWISE_BASE_TOLERANCE  Derive ratio bands from basePercent ± N%");
    println!("  RUST_LOG                 Log filter (default: info,tierwise_core=debug,tierwise=debug)");
}

fn render<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

/// Initializes the tracing subscriber for logging.
///
/// Log level can be controlled via `RUST_LOG` environment variable:
/// - `RUST_LOG=debug` - Show debug logs
/// - `RUST_LOG=tierwise_core=trace` - Trace the engine only
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tierwise_core=debug,tierwise=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        let options = parse_args(args(&[])).unwrap().unwrap();
        assert!(options.input.is_none());
        assert!(!options.explain);
        assert!(!options.pretty);
    }

    #[test]
    fn test_parse_args_flags() {
        let options = parse_args(args(&["-i", "cart.json", "--explain", "-p"]))
            .unwrap()
            .unwrap();
        assert_eq!(options.input, Some(PathBuf::from("cart.json")));
        assert!(options.explain);
        assert!(options.pretty);
    }

    #[test]
    fn test_parse_args_help_and_errors() {
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
        assert!(parse_args(args(&["--input"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }
}
