//! MiniC syntax and semantic checker
//!
//! Usage: minic [OPTIONS] <input>

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser as ClapParser;
use minic_front::{analyze_with, read_source, AnalyzeConfig, DiagnosticReporter};

#[derive(ClapParser, Debug)]
#[command(name = "minic")]
#[command(author = "MiniC Team")]
#[command(version = "0.1.0")]
#[command(about = "Lexical, syntax and semantic checker for MiniC", long_about = None)]
struct Args {
    /// Input source file
    #[arg(required = true)]
    input: PathBuf,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump the scope tree after a successful analysis
    #[arg(long)]
    dump_scopes: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(true) => println!("Syntax analysis finished successfully."),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the program was rejected and the diagnostic already shown
fn run(args: &Args) -> anyhow::Result<bool> {
    let source = read_source(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(filename, source.clone());

    if args.verbose {
        eprintln!("Checking {}", args.input.display());
    }

    let config = AnalyzeConfig {
        dump_tokens: args.dump_tokens,
        dump_scopes: args.dump_scopes,
        verbose: args.verbose,
    };

    match analyze_with(&source, &config) {
        Ok(_) => Ok(true),
        Err(e) => {
            reporter.report_error(file_id, &e);
            Ok(false)
        }
    }
}
