// src/main.rs
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mt_report::report::{self, ReportKind, RunOptions};
use mt_report::utils;
use mt_report::{AppError, Destination};

/// Command Line Interface for the Strategy Tester report parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Report file: UTF-16LE HTML for orders/deals/header, XML spreadsheet for opt
    #[arg(short, long)]
    input: PathBuf,

    /// What to extract: "orders", "deals", "header" or "opt"
    #[arg(short = 't', long = "type")]
    report_type: Option<String>,

    /// Output file (optional, prints to stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the CSV column header row
    #[arg(long)]
    include_titles: bool,

    /// Debug mode - save an annotated copy of the decoded report here
    #[arg(long)]
    debug_html: Option<PathBuf>,
}

fn execute(args: Args) -> Result<(), AppError> {
    let kind = args.report_type.as_deref().and_then(|t| t.parse::<ReportKind>().ok());
    if args.debug_html.is_some() && kind.is_some_and(|k| !k.reads_html()) {
        tracing::warn!("--debug-html only applies to HTML reports, ignoring it for opt");
    }

    let options = RunOptions {
        include_titles: args.include_titles,
        destination: match &args.output {
            Some(path) => Destination::file(path),
            None => Destination::Buffer,
        },
        debug_html: args.debug_html,
    };

    if let Some(rendered) = report::run(&args.input, args.report_type.as_deref(), &options)? {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

fn main() -> ExitCode {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting processing for args: {:?}", args);

    // 3. Extract and write; only this layer decides the exit status
    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Run failed: {:?}", e);
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
