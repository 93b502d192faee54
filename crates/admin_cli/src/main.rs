use std::error::Error;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use engine::{Engine, NewUser};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "family_money_admin")]
#[command(about = "Admin utilities for Family Money (schema, demo data, balances)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:family_money.db?mode=rwc"
    )]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations and exit.
    Migrate,
    /// Fill an empty database with a demo household.
    Seed(SeedArgs),
    /// Report accounts whose balance disagrees with their transactions.
    CheckBalances,
    /// Rewrite every balance from the transaction history.
    RecomputeBalances,
    User(User),
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Day whose month receives the sample budgets and transactions.
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    full_name: Option<String>,
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Migrate => {
            println!("database is up to date");
        }
        Command::Seed(args) => {
            let today = args.today.unwrap_or_else(|| Local::now().date_naive());
            if engine.seed_demo_data(today).await? {
                println!("seed data created");
            } else {
                println!("database already has data, skipping seed");
            }
        }
        Command::CheckBalances => {
            let drifts = engine.check_balances().await?;
            if drifts.is_empty() {
                println!("all balances are consistent");
                return Ok(());
            }
            for drift in &drifts {
                println!(
                    "{} ({}): stored {} expected {}",
                    drift.name, drift.account_id, drift.stored_balance, drift.expected_balance
                );
            }
            std::process::exit(1);
        }
        Command::RecomputeBalances => {
            let repaired = engine.recompute_balances().await?;
            for drift in &repaired {
                println!(
                    "{} ({}): {} -> {}",
                    drift.name, drift.account_id, drift.stored_balance, drift.expected_balance
                );
            }
            println!("repaired {} account(s)", repaired.len());
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let mut cmd = NewUser::new(args.username, args.email);
            cmd.full_name = args.full_name;
            let user = engine.new_user(cmd).await?;
            println!("created user: {} ({})", user.username, user.id);
        }
    }

    Ok(())
}
