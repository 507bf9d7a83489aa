use std::{
    io::{self, BufRead},
    process::ExitCode,
};

use clap::Parser;
use pollyscript::{
    config::Options, declarations::namespace::Namespace, diagnostics::render,
    evaluator::Evaluator,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pollyscript")]
#[command(about = "Evaluates pollyscript commands against one session")]
#[command(version)]
struct Cli {
    /// Commands to evaluate in order; lines are read from stdin when none
    /// are given
    commands: Vec<String>,

    /// Verbose output, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Skip constant folding
    #[arg(long)]
    no_fold: bool,

    /// Largest list a range may produce
    #[arg(long, default_value_t = 10_000)]
    max_list_size: usize,

    /// Deepest allowed nesting of calls
    #[arg(long, default_value_t = 64)]
    max_call_depth: usize,

    /// Deepest allowed nesting of expressions
    #[arg(long, default_value_t = 256)]
    max_nesting_depth: usize,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            max_list_size: self.max_list_size,
            max_call_depth: self.max_call_depth,
            max_nesting_depth: self.max_nesting_depth,
            fold_constants: !self.no_fold,
            ..Options::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let evaluator = Evaluator::new(cli.options());
    let mut namespace = evaluator.namespace();
    let mut failed = false;

    if cli.commands.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(error) => {
                    warn!(error = %error, "failed to read stdin");
                    return ExitCode::FAILURE;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            failed |= !run(&evaluator, &line, &mut namespace);
        }
    } else {
        for command in &cli.commands {
            failed |= !run(&evaluator, command, &mut namespace);
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Evaluates one command, printing its values or the rendered error.
fn run(evaluator: &Evaluator, command: &str, namespace: &mut Namespace) -> bool {
    match evaluator.evaluate(command, namespace) {
        Ok(values) => {
            for value in values {
                println!("{}", value);
            }
            true
        }
        Err(error) => {
            info!(kind = ?error.kind(), "command failed");
            eprintln!("{}", render(&error, command));
            false
        }
    }
}
