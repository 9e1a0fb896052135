//! CLI entry point for `sqlmark`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use sqlmark::executor::{self, SqliteExecutor};
use sqlmark::output::formatter::{self, OutputOptions};
use sqlmark::parser::{extract_setup_and_queries, split_statements};
use sqlmark::source;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "sqlmark",
    about = "Run the labelled queries of an annotated SQL script and export each result to CSV and Excel"
)]
struct Cli {
    /// Annotated SQL file: setup statements, then `-- Q<n>` marked queries
    #[arg(long)]
    solved_sql: PathBuf,

    /// Schema and seed data, run before the annotated file's setup
    #[arg(long)]
    dataset_sql: Option<PathBuf>,

    /// SQLite database file (`:memory:` for a throwaway database)
    #[arg(long, default_value = ":memory:")]
    database: String,

    /// Output directory for CSV files, manifest, and report
    #[arg(long, default_value = "csv_results")]
    csv_dir: PathBuf,

    /// Skip the dataset file and the setup statements
    #[arg(long)]
    skip_setup: bool,

    /// Also write an `.xlsx` workbook with one sheet per query
    #[arg(long)]
    excel_out: Option<PathBuf>,

    /// Name CSV files after the query label instead of the bare key
    #[arg(long)]
    named_files: bool,

    /// Only print the extracted setup statements and queries as JSON
    #[arg(long)]
    list: bool,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let solved_text = match source::read_text(&cli.solved_sql) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };
    let script = extract_setup_and_queries(&solved_text);

    tracing::debug!(
        setup = script.setup.len(),
        queries = script.queries.len(),
        "Extracted annotated script"
    );

    if cli.list {
        match serde_json::to_string_pretty(&script) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error encoding extraction: {e}");
                process::exit(2);
            }
        }
        return;
    }

    let mut db = match SqliteExecutor::open(&cli.database) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    if cli.skip_setup {
        tracing::info!(">> Skipping setup (--skip-setup)");
    } else {
        if let Some(path) = &cli.dataset_sql {
            let dataset_text = match source::read_text(path) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(2);
                }
            };
            tracing::info!(">> Running dataset schema & seed ...");
            let summary = executor::run_statements(&mut db, &split_statements(&dataset_text), true);
            tracing::info!(succeeded = summary.succeeded, failed = summary.failed, "Dataset done");
        }
        tracing::info!(">> Running setup statements ...");
        let summary = executor::run_statements(&mut db, &script.setup, true);
        tracing::info!(succeeded = summary.succeeded, failed = summary.failed, "Setup done");
    }

    let outcomes = executor::run_queries(&mut db, &script.queries);
    let options = OutputOptions {
        named_files: cli.named_files,
    };
    if let Err(e) = formatter::write_output(&cli.csv_dir, &outcomes, options) {
        eprintln!("Error writing output: {e}");
        process::exit(2);
    }
    if let Some(path) = &cli.excel_out {
        match formatter::write_workbook(path, &outcomes) {
            Ok(sheets) => tracing::info!(sheets = sheets.len(), ">> Excel: {}", path.display()),
            Err(e) => {
                eprintln!("Error writing output: {e}");
                process::exit(2);
            }
        }
    }
    tracing::info!(">> Done. Results in {}", cli.csv_dir.display());

    if outcomes.iter().any(|o| o.result.is_err()) {
        process::exit(1);
    }
}
