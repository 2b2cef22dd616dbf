use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, SplitResult};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

mod prompt;

#[derive(Parser, Debug)]
#[command(name = "warikan_admin")]
#[command(about = "Admin utilities for Warikan (bootstrap users/events, run settlements)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./warikan.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Event(Event),
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
    display_name: Option<String>,
}

#[derive(Args, Debug)]
struct Event {
    #[command(subcommand)]
    command: EventCommand,
}

#[derive(Subcommand, Debug)]
enum EventCommand {
    /// Create an event owned by `--owner`.
    Create(EventCreateArgs),
    /// Add a member to an event, acting as its owner.
    AddMember(EventAddMemberArgs),
    /// Compute the settlement of an event and store it.
    Settle(EventSettleArgs),
}

#[derive(Args, Debug)]
struct EventCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct EventAddMemberArgs {
    #[arg(long)]
    event: String,
    #[arg(long)]
    owner: String,
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct EventSettleArgs {
    #[arg(long)]
    event: String,
    /// Member performing the operation.
    #[arg(long = "as")]
    member: String,
    /// Only print the plan, do not store it.
    #[arg(long)]
    preview: bool,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn print_split(result: &SplitResult) {
    println!("balances:");
    for entry in &result.balances {
        println!("  {:<20} {:>12.2}", entry.name, entry.balance);
    }
    if result.transactions.is_empty() {
        println!("nothing to settle");
        return;
    }
    println!("transfers:");
    for transfer in &result.transactions {
        println!(
            "  {} -> {}: {:.2}",
            transfer.from, transfer.to, transfer.amount
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt::new_password()?;
            engine
                .new_user(&args.username, &password, args.display_name.as_deref())
                .await?;
            println!("created user: {}", args.username);
        }
        Command::Event(Event {
            command: EventCommand::Create(args),
        }) => {
            let event = engine.new_event(&args.name, &args.owner).await?;
            println!("created event: {} ({})", event.name, event.id);
        }
        Command::Event(Event {
            command: EventCommand::AddMember(args),
        }) => {
            let member = engine
                .add_event_member(&args.event, &args.username, &args.owner)
                .await?;
            println!("added member: {} ({})", member.name, member.id);
        }
        Command::Event(Event {
            command: EventCommand::Settle(args),
        }) => {
            let result = if args.preview {
                engine.preview_split(&args.event, &args.member).await?
            } else {
                engine.confirm_settlement(&args.event, &args.member).await?
            };
            print_split(&result);
        }
    }

    Ok(())
}
