use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal_macros::dec;
use time::{Duration, OffsetDateTime};

use billfold::{
    CategoryIcon, CategoryName, Color, Email, LabelName, Money, NewBudget, NewCategory,
    NewTransaction, NewUser, NewWallet, PasswordHash, TransactionDescription, User,
    ValidatedPassword, WalletName, create_budget, create_category, create_label,
    create_transaction, create_user, create_wallet, initialize_db,
};

/// A utility for creating a demo database for the billfold server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// The password shared by every demo user.
const DEMO_PASSWORD: &str = "test";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    for (first_name, last_name, email) in [
        ("Alice", "Jones", "alice@example.com"),
        ("Bob", "Smith", "bob@example.com"),
    ] {
        println!("Creating demo user {email}...");
        let user = create_user(
            NewUser {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                email: Email::new(email)?,
                password_hash: PasswordHash::new(
                    ValidatedPassword::new_unchecked(DEMO_PASSWORD),
                    PasswordHash::DEFAULT_COST,
                )?,
            },
            &connection,
        )?;

        seed_user_data(&user, &mut connection)?;
    }

    println!("Success! Log in with any demo email and the password '{DEMO_PASSWORD}'.");

    Ok(())
}

/// Give `user` a couple of wallets, categories and labels, a budget for this
/// month and a month of transactions.
fn seed_user_data(user: &User, connection: &mut Connection) -> Result<(), Box<dyn Error>> {
    let cash = create_wallet(
        NewWallet {
            name: WalletName::new("Cash")?,
            initial_balance: Money::opening_balance(dec!(250))?,
            color: Color::Green,
            is_active: true,
        },
        user.id,
        connection,
    )?;
    let bank = create_wallet(
        NewWallet {
            name: WalletName::new("Everyday Account")?,
            initial_balance: Money::opening_balance(dec!(2500))?,
            color: Color::Blue,
            is_active: true,
        },
        user.id,
        connection,
    )?;

    let groceries = create_category(
        NewCategory {
            name: CategoryName::new("Groceries")?,
            color: Color::Green,
            icon: CategoryIcon::ShoppingCart,
        },
        user.id,
        connection,
    )?;
    let transport = create_category(
        NewCategory {
            name: CategoryName::new("Transport")?,
            color: Color::Navy,
            icon: CategoryIcon::Bus,
        },
        user.id,
        connection,
    )?;
    let salary = create_category(
        NewCategory {
            name: CategoryName::new("Salary")?,
            color: Color::Gold,
            icon: CategoryIcon::Briefcase,
        },
        user.id,
        connection,
    )?;

    let weekly = create_label(LabelName::new("Weekly")?, user.id, connection)?;
    let commute = create_label(LabelName::new("Commute")?, user.id, connection)?;

    let today = OffsetDateTime::now_utc().date();

    create_budget(
        NewBudget {
            amount: Money::positive_amount(dec!(400))?,
            month: today.month(),
            year: today.year(),
            category_id: groceries.id,
            wallet_id: bank.id,
        },
        user.id,
        connection,
    )?;

    create_transaction(
        NewTransaction {
            amount: Money::positive_amount(dec!(3200))?,
            description: TransactionDescription::new("Monthly pay")?,
            date: today - Duration::days(28),
            is_expense: false,
            category_id: salary.id,
            wallet_id: bank.id,
            label_ids: Vec::new(),
        },
        user.id,
        connection,
    )?;

    for week in 0..4 {
        create_transaction(
            NewTransaction {
                amount: Money::positive_amount(dec!(82.45) + dec!(7.10) * rust_decimal::Decimal::from(week))?,
                description: TransactionDescription::new("Supermarket")?,
                date: today - Duration::days(7 * week),
                is_expense: true,
                category_id: groceries.id,
                wallet_id: bank.id,
                label_ids: vec![weekly.id],
            },
            user.id,
            connection,
        )?;
    }

    for day in [2, 5, 9, 12] {
        create_transaction(
            NewTransaction {
                amount: Money::positive_amount(dec!(4.20))?,
                description: TransactionDescription::new("Bus fare")?,
                date: today - Duration::days(day),
                is_expense: true,
                category_id: transport.id,
                wallet_id: cash.id,
                label_ids: vec![commute.id],
            },
            user.id,
            connection,
        )?;
    }

    Ok(())
}
