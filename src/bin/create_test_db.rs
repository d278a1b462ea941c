use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use money_tracker::{
    CardDraft, CardType, CategoryDraft, CategoryName, Color, Expiry, ReferentialPolicy, Store,
    TransactionDraft,
};

/// A utility for creating a test database for the money_tracker web server.
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
    let connection = Connection::open(output_path)?;
    let mut store = Store::new(connection, ReferentialPolicy::default())?;

    println!("Creating test cards, categories and purchases...");

    let mut work = store.begin()?;

    let groceries = work.save(CategoryDraft::new(
        CategoryName::new("Groceries")?,
        Color::rgb(52, 199, 89),
    ))?;
    let fuel = work.save(CategoryDraft::new(
        CategoryName::new("Fuel")?,
        Color::rgb(255, 149, 0),
    ))?;
    let dining = work.save(CategoryDraft::new(CategoryName::new("Dining")?, Color::RED))?;

    let visa = work.save(CardDraft {
        id: None,
        name: "Visa Gold".to_owned(),
        number: "4111 1111 1111 1111".to_owned(),
        card_type: CardType::Visa,
        limit: 150_000,
        expiry: Expiry::new(9, 2029)?,
        color: Color::BLUE,
    })?;
    let mir = work.save(CardDraft {
        id: None,
        name: "Mir Classic".to_owned(),
        number: "2200 0000 0000 0000".to_owned(),
        card_type: CardType::Mir,
        limit: 50_000,
        expiry: Expiry::new(3, 2031)?,
        color: Color::PURPLE,
    })?;

    let purchases = [
        (visa.id, "Supermarket", 2_345.60, date!(2025 - 01 - 04), vec![groceries.id]),
        (visa.id, "Petrol station", 3_100.00, date!(2025 - 01 - 06), vec![fuel.id]),
        (visa.id, "Cafe", 640.00, date!(2025 - 01 - 06), vec![dining.id]),
        (visa.id, "Market", 980.25, date!(2025 - 01 - 11), vec![groceries.id, dining.id]),
        (mir.id, "Bakery", 215.50, date!(2025 - 01 - 02), vec![groceries.id]),
        (mir.id, "Car wash", 700.00, date!(2025 - 01 - 09), vec![]),
    ];

    for (card_id, name, amount, date, categories) in purchases {
        work.save(TransactionDraft {
            card_id,
            name: name.to_owned(),
            amount,
            date,
            photo: None,
            categories,
        })?;
    }

    work.commit()?;

    println!("Success!");

    Ok(())
}
