use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, macros::format_description};

use finance_tracker::{
    initialize_db, logging::setup_logging, recurring::project_recurring_transactions,
    timezone::{DEFAULT_TIMEZONE, local_today},
};

/// Create this month's copy of every recurring transaction.
///
/// Running the command again in the same month does not create duplicates.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database.
    #[arg(long, short)]
    db_path: String,

    /// Show what would be created without writing to the database.
    #[arg(long)]
    dry_run: bool,

    /// Generate for the month containing this date (YYYY-MM-DD) instead of today.
    #[arg(long, value_parser = parse_date)]
    date: Option<Date>,

    /// The canonical time zone used to work out today's date, e.g. "Pacific/Auckland".
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,
}

fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        eprintln!("No database found at {db_path:#?}.");
        exit(1);
    }

    let current_date = match args.date {
        Some(date) => date,
        None => local_today(&args.timezone)?,
    };

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    let report = project_recurring_transactions(current_date, args.dry_run, &connection)?;

    print!("{report}");

    if report.failed_count() > 0 {
        exit(1);
    }

    Ok(())
}
