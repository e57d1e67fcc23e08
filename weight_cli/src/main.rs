use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use weight_core::backup::{self, backup_file_name};
use weight_core::csv_format::{self, csv_file_name, TEMPLATE_FILE_NAME};
use weight_core::*;

#[derive(Parser)]
#[command(name = "weigh")]
#[command(about = "Personal weight log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a weight, replacing any weight already logged for that date
    Log {
        #[arg(allow_negative_numbers = true)]
        weight: f64,

        /// Date of the measurement (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Change the date and/or weight of an entry
    Edit {
        /// Date of the entry to edit (YYYY-MM-DD)
        #[arg(value_name = "DATE")]
        old_date: String,

        /// New weight
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,

        /// Move the entry to this date; an entry already there is overwritten
        #[arg(long = "date", value_name = "NEW_DATE")]
        new_date: Option<String>,
    },

    /// Delete the entry for a date
    Delete { date: String },

    /// Show all entries, newest first (default)
    List,

    /// Show summary statistics
    Stats,

    /// Export the log as a JSON backup or CSV
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Output file, defaults to a dated name in the current directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a CSV template for manual data entry
    Template {
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write only the header row
        #[arg(long)]
        no_example: bool,
    },

    /// Replace the whole log with a JSON backup
    Restore {
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Merge entries from a CSV file; duplicate dates are replaced
    Import {
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    weight_core::logging::init_for_verbosity(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            // 2 for bad input or import files, 1 for storage failures
            if e.is_user_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let unit = config.display.unit.as_str();
    tracing::debug!("Using data directory {:?}", data_dir);

    let mut tracker = Tracker::open(JsonFileStore::in_dir(&data_dir))?;

    match cli.command {
        Some(Commands::Log { weight, date }) => {
            let date = date.unwrap_or_else(|| today().to_string());
            let outcome = tracker.log_or_update(&date, weight)?;
            println!("✓ {}", outcome.change.describe(unit));
        }
        Some(Commands::Edit {
            old_date,
            weight,
            new_date,
        }) => {
            let new_date = new_date.unwrap_or_else(|| old_date.clone());
            let outcome = tracker.edit_entry(&old_date, &new_date, weight)?;
            println!("✓ {}", outcome.change.describe(unit));
        }
        Some(Commands::Delete { date }) => {
            let outcome = tracker.delete_entry(&date)?;
            match outcome.change {
                Change::NotFound { .. } => println!("{}", outcome.change.describe(unit)),
                _ => println!("✓ {}", outcome.change.describe(unit)),
            }
        }
        Some(Commands::List) | None => cmd_list(tracker.snapshot(), unit),
        Some(Commands::Stats) => cmd_stats(&tracker, unit),
        Some(Commands::Export { format, output }) => cmd_export(tracker.snapshot(), format, output)?,
        Some(Commands::Template { output, no_example }) => {
            let path = output.unwrap_or_else(|| PathBuf::from(TEMPLATE_FILE_NAME));
            let example = (config.csv.template_example && !no_example).then(today);
            csv_format::export_template(&path, example)?;
            println!("✓ Wrote CSV template to {}", path.display());
            println!("  Fill it with your data and run `weigh import` to add it.");
        }
        Some(Commands::Restore { file, yes }) => {
            let pending = PendingImport::restore(backup::read_backup(&file)?);
            apply_import(&mut tracker, pending, yes, unit)?;
        }
        Some(Commands::Import { file, yes }) => {
            let pending = PendingImport::merge(csv_format::read_csv(&file)?);
            apply_import(&mut tracker, pending, yes, unit)?;
        }
    }

    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn cmd_list(store: &LogStore, unit: &str) {
    if store.is_empty() {
        println!("No weights logged yet.");
        return;
    }

    println!("{:<12} {:>10}", "Date", "Weight");
    println!("─────────────────────────");
    for entry in store.chronological().iter().rev() {
        println!(
            "{:<12} {:>10}",
            entry.date().to_string(),
            format!("{:.1} {}", entry.weight(), unit)
        );
    }

    if let Some(latest) = store.latest_logged() {
        println!();
        println!("Last logged: {} {}", latest.weight(), unit);
    }
}

fn cmd_stats<P: LogPersistence>(tracker: &Tracker<P>, unit: &str) {
    let count = tracker.snapshot().len();
    if count == 0 {
        println!("No weights logged yet.");
        return;
    }

    let summary = tracker.compute_stats();
    println!("Entries:  {}", count);
    println!("Average:  {:.1} {}", summary.average, unit);
    println!("Lowest:   {:.1} {}", summary.min, unit);
    println!("Highest:  {:.1} {}", summary.max, unit);
    println!("First:    {:.1} {}", summary.first, unit);
    println!("Latest:   {:.1} {}", summary.last, unit);
    println!("Change:   {:+.1} {}", summary.change, unit);
}

fn cmd_export(store: &LogStore, format: ExportFormat, output: Option<PathBuf>) -> Result<()> {
    if store.is_empty() {
        println!("Nothing to export - the log is empty.");
        return Ok(());
    }

    let path = output.unwrap_or_else(|| match format {
        ExportFormat::Json => PathBuf::from(backup_file_name(today())),
        ExportFormat::Csv => PathBuf::from(csv_file_name(today())),
    });

    match format {
        ExportFormat::Json => backup::export_backup(&path, store.entries())?,
        ExportFormat::Csv => csv_format::export_csv(&path, store.entries())?,
    }

    println!("✓ Exported {} entries to {}", store.len(), path.display());
    Ok(())
}

fn apply_import<P: LogPersistence>(
    tracker: &mut Tracker<P>,
    pending: PendingImport,
    yes: bool,
    unit: &str,
) -> Result<()> {
    let question = pending.confirmation_prompt(tracker.snapshot().len());
    if !yes && !confirm(&question)? {
        tracing::info!("Import declined, {} entries discarded", pending.entries().len());
        println!("Cancelled - your data is unchanged.");
        return Ok(());
    }

    let outcome = tracker.commit(pending)?;
    println!("✓ {}", outcome.change.describe(unit));
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
