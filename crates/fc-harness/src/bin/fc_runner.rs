//! CLI for checking a lint fixture corpus.
//!
//! # Usage
//!
//! ```bash
//! # Check the corpus under ./fixtures
//! cargo run -p fc-harness --features cli --bin fc-runner -- fixtures
//!
//! # JSON report to a file, one rule disabled
//! cargo run -p fc-harness --features cli --bin fc-runner -- fixtures \
//!     --format json --output report.json --disable C-03-04
//!
//! # List the built-in rules
//! cargo run -p fc-harness --features cli --bin fc-runner -- --list-rules
//! ```
//!
//! Exits 0 when every classified fixture matched, 1 on any mismatch or
//! evaluator fault, 2 when the run could not start.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fc_harness::logging::init_logging;
use fc_harness::{run_config, ConfigLoader, HarnessError, OutputFormat, Report, RunConfig};

#[derive(Debug, Parser)]
#[command(name = "fc-runner", version, about = "Check lint fixtures against rule evaluators")]
struct Args {
    /// Corpus root (overrides the configured root)
    root: Option<PathBuf>,

    /// Configuration file (default: ./conformance.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Concurrent evaluations
    #[arg(short, long)]
    workers: Option<usize>,

    /// Leave a built-in rule unregistered (repeatable)
    #[arg(long = "disable", value_name = "RULE")]
    disabled: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the built-in rules and exit
    #[arg(long)]
    list_rules: bool,
}

impl Args {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(ref root) = self.root {
            config.root = root.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
        config.disabled_rules.extend(self.disabled.iter().cloned());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if args.list_rules {
        print_rules();
        return ExitCode::SUCCESS;
    }

    let mut loader = ConfigLoader::new();
    if let Some(ref path) = args.config {
        loader = loader.with_config_path(path);
    }
    let mut config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    args.apply(&mut config);

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error: {}", e);
        return ExitCode::from(2);
    }

    let report = match run_config(&config).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    if let Err(e) = emit(&report, config.format, args.output) {
        eprintln!("Error: {}", e);
        return ExitCode::from(2);
    }

    ExitCode::from(report.exit_code())
}

fn emit(report: &Report, format: OutputFormat, output: Option<PathBuf>) -> Result<(), HarnessError> {
    let rendered = match format {
        OutputFormat::Text => report.format_text(),
        OutputFormat::Json => report.to_json()?,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, rendered).map_err(|source| HarnessError::Write { path, source })?;
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn print_rules() {
    println!("{:<10} {:<8} {:<50} Tool", "Rule", "Lang", "Title");
    for rule in fc_rules::builtin_rules() {
        println!(
            "{:<10} {:<8} {:<50} {}",
            rule.id,
            format!("{:?}", rule.language),
            rule.title,
            rule.tool
        );
    }
}
