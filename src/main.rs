use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use sales_etl::aggregate::add_revenue;
use sales_etl::logging::{self, LogFormat};
use sales_etl::pipeline::{self, PipelineOptions};
use sales_etl::report::format_currency;
use sales_etl::{Result, SynonymTable};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    logging::init(level, cli.log_format.into())?;

    match cli.command {
        Command::Run(args) => execute_run(args),
    }
}

fn execute_run(args: RunArgs) -> Result<()> {
    let synonyms = match &args.synonyms {
        Some(path) => SynonymTable::from_path(path)?,
        None => SynonymTable::default(),
    };

    let options = PipelineOptions {
        inputs: args.inputs,
        output_dir: (!args.no_export).then_some(args.output_dir),
        database: args.db,
        synonyms,
    };
    let report = pipeline::run(&options)?;

    let revenue = report
        .summary
        .iter()
        .fold(Decimal::ZERO, |total, row| add_revenue(total, row.total_revenue));
    println!(
        "{} file(s) loaded, {} failed; {} of {} rows kept; {} monthly rows, {} total",
        report.files_loaded,
        report.files_failed.len(),
        report.cleaned.len(),
        report.rows_combined,
        report.summary.len(),
        format_currency(revenue),
    );
    for path in &report.exports {
        println!("wrote {}", path.display());
    }
    if report.rows_stored > 0 {
        println!("stored {} row(s) in the database", report.rows_stored);
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile point-of-sale exports into monthly store summaries."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line layout.
    #[arg(long, value_enum, default_value_t = LogFormatKind::Text, global = true)]
    log_format: LogFormatKind,
}

#[derive(Subcommand)]
enum Command {
    /// Load, clean and aggregate sales files, then export and store the summary.
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Sales export files (CSV, XLSX or JSON).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory receiving the summary reports.
    #[arg(long, default_value = "reports")]
    output_dir: PathBuf,

    /// Skip writing report files.
    #[arg(long)]
    no_export: bool,

    /// SQLite database to upsert the monthly summary into.
    #[arg(long)]
    db: Option<PathBuf>,

    /// TOML file replacing the column synonym lists.
    #[arg(long)]
    synonyms: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogFormatKind {
    Text,
    Json,
}

impl From<LogFormatKind> for LogFormat {
    fn from(kind: LogFormatKind) -> Self {
        match kind {
            LogFormatKind::Text => LogFormat::Text,
            LogFormatKind::Json => LogFormat::Json,
        }
    }
}
