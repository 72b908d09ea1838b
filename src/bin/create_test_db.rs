use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, Time};

use pennywise::{
    CategoryName, LedgerConfig, NewBudget, NewCategory, Transaction, TransactionType, UserId,
    create_ledger,
};

/// A utility for creating a test database for the JSON API server of pennywise.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The user ID to create the sample data for.
    #[arg(long, default_value_t = 1)]
    user_id: i64,
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
    let ledger = create_ledger(conn, LedgerConfig::default())?;
    let user_id = UserId::new(args.user_id);

    println!("Creating categories...");
    let salary = ledger.create_category(
        user_id,
        NewCategory {
            name: CategoryName::new("Salary")?,
            category_type: TransactionType::Income,
        },
    )?;
    let groceries = ledger.create_category(
        user_id,
        NewCategory {
            name: CategoryName::new("Groceries")?,
            category_type: TransactionType::Expense,
        },
    )?;

    let today = OffsetDateTime::now_utc().date();
    let month_start = today.replace_day(1)?;

    println!("Creating budget...");
    ledger.create_budget(
        user_id,
        NewBudget {
            category_id: groceries.id,
            amount: 400.0,
            start_date: month_start,
            end_date: month_start + Duration::days(30),
        },
    )?;

    println!("Creating transactions...");
    ledger.record_transaction(
        user_id,
        Transaction::build(2500.0, TransactionType::Income)
            .category_id(Some(salary.id))
            .description("Pay day")
            .timestamp(month_start.with_time(Time::MIDNIGHT).assume_utc()),
    )?;

    for (days, amount) in [(0, 85.2), (3, 42.5), (7, 120.0)] {
        let date = month_start + Duration::days(days);
        if date > today {
            break;
        }

        ledger.record_transaction(
            user_id,
            Transaction::build(amount, TransactionType::Expense)
                .category_id(Some(groceries.id))
                .description("Supermarket")
                .timestamp(date.with_time(Time::MIDNIGHT).assume_utc()),
        )?;
    }

    println!("Success!");

    Ok(())
}
