//! texskel: print the structure of LaTeX documents.
//!
//! # Usage
//!
//! ```bash
//! # Feature lines of ./main.tex
//! texskel
//!
//! # Outline of several chapters, four threads, report every failure
//! texskel chapters/*.tex --format outline --jobs 4 --keep-going
//!
//! # Full page with a custom vocabulary and template
//! texskel thesis.tex --vocabulary book.yaml --format page --template page.html
//! ```

mod batch;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use texskel_core::Vocabulary;
use texskel_outline::{OutlineOptions, default_template};

use batch::{BatchOptions, parse_all};
use output::{Format, error_report, render};

/// Print the structure of LaTeX documents
#[derive(Parser, Debug)]
#[command(name = "texskel")]
#[command(version, about, long_about = None)]
struct Args {
    /// LaTeX documents to parse
    #[arg(default_value = "./main.tex")]
    paths: Vec<PathBuf>,

    /// Vocabulary file (.yaml, .yml or .json) replacing the built-in keys
    #[arg(long, value_name = "FILE")]
    vocabulary: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Lines)]
    format: Format,

    /// Page template for `--format page`
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Maximum number of worker threads
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Report every document instead of stopping at the first failure
    #[arg(long)]
    keep_going: bool,

    /// Print the effective vocabulary as YAML and exit
    #[arg(long)]
    print_vocabulary: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one document failed to parse.
fn run(args: &Args) -> Result<bool> {
    let vocabulary = match &args.vocabulary {
        Some(path) => Vocabulary::load(path)
            .with_context(|| format!("Failed to load vocabulary {}", path.display()))?,
        None => Vocabulary::default(),
    };

    if args.print_vocabulary {
        let yaml = serde_yaml::to_string(&vocabulary).context("Failed to serialize vocabulary")?;
        print!("{}", yaml);
        return Ok(true);
    }

    let template = match &args.template {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?,
        None => default_template().to_string(),
    };
    let options = OutlineOptions::from_vocabulary(&vocabulary);

    let batch = parse_all(
        &args.paths,
        &vocabulary,
        &BatchOptions {
            max_threads: args.jobs,
            continue_on_error: args.keep_going,
        },
    );

    let banner = args.format.has_banner() && args.paths.len() > 1;
    let mut all_ok = true;
    for result in &batch.results {
        match &result.outcome {
            Ok(document) => {
                if banner {
                    println!("==> {} <==", result.path.display());
                }
                print!("{}", render(args.format, document, &options, &template)?);
            }
            Err(err) => {
                all_ok = false;
                eprintln!("error: {}", error_report(&result.path, err));
            }
        }
    }

    if batch.stats.failed > 0 {
        log::info!(
            "{} of {} document(s) failed",
            batch.stats.failed,
            batch.stats.total
        );
    }
    Ok(all_ok)
}
