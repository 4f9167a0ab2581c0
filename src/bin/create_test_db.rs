use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;

use finance_tracker::{
    calendar::first_day_of_month,
    category::{CategoryKind, CategoryName, Color, NewCategory, create_category},
    initialize_db,
    loyalty_card::{NewLoyaltyCard, create_loyalty_card},
    timezone::{DEFAULT_TIMEZONE, local_today},
    transaction::{Transaction, create_transaction},
    user::create_user,
};

/// A utility for creating a test database for finance_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let user = create_user("test", "test@example.com", &conn)?;

    println!("Creating categories...");
    let salary = create_category(
        NewCategory::global(CategoryName::new("Salary")?, CategoryKind::Income)
            .color(Color::new("#10B981")?),
        &conn,
    )?;
    let groceries = create_category(
        NewCategory::global(CategoryName::new("Groceries")?, CategoryKind::Expense)
            .color(Color::new("#F59E0B")?),
        &conn,
    )?;
    let rent = create_category(
        NewCategory::personal(CategoryName::new("Rent")?, CategoryKind::Expense, user.id)
            .color(Color::new("#EF4444")?),
        &conn,
    )?;
    let subscriptions = create_category(
        NewCategory::personal(
            CategoryName::new("Subscriptions")?,
            CategoryKind::Expense,
            user.id,
        ),
        &conn,
    )?;

    println!("Creating recurring transactions...");
    let last_month = first_day_of_month(local_today(DEFAULT_TIMEZONE)?)
        .previous_day()
        .ok_or("could not work out last month")?;

    let recurring = [
        (&salary, Decimal::new(300000, 2), 25, "Salary"),
        (&rent, Decimal::new(-85000, 2), 1, "Monthly Rent"),
        (&subscriptions, Decimal::new(-1299, 2), 31, "Streaming"),
    ];

    for (category, amount, day, description) in recurring {
        let date = last_month.replace_day(day).unwrap_or(last_month);
        create_transaction(
            Transaction::build(user.id, category.id, amount, date)
                .description(description)
                .recurring(true),
            &conn,
        )?;
    }

    create_transaction(
        Transaction::build(user.id, groceries.id, Decimal::new(-4550, 2), last_month)
            .description("Weekly shop")
            .notes("Test notes"),
        &conn,
    )?;

    println!("Creating loyalty cards...");
    for (store_name, card_number) in [("Conad", "8001234567890"), ("Library", "LIB-42")] {
        create_loyalty_card(
            NewLoyaltyCard {
                owner: user.id,
                store_name: store_name.to_owned(),
                card_number: card_number.to_owned(),
                notes: String::new(),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
