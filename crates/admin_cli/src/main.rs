use std::{error::Error, io::Write};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, Money, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
        pub role: String,
        pub full_name: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "mawaddah_admin")]
#[command(about = "Admin utilities for Mawaddah (bootstrap users, fund the system wallet, run fulfillment)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./mawaddah.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Wallet(Wallet),
    /// Run one fulfillment pass over approved appeals.
    Fulfill,
    /// Expire approved appeals whose expiry date has passed.
    Expire,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// One of: user, donor, recipient, shura, admin.
    #[arg(long, default_value = "user")]
    role: String,
    #[arg(long)]
    full_name: Option<String>,
}

#[derive(Args, Debug)]
struct Wallet {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Credit the system wallet.
    Fund(WalletFundArgs),
    /// Print the system wallet balance.
    Balance,
}

#[derive(Args, Debug)]
struct WalletFundArgs {
    /// Amount in rupees, e.g. "1000" or "1000.50".
    #[arg(long)]
    amount: String,
    /// Admin username to attribute the credit to (defaults to System).
    #[arg(long)]
    actor: Option<String>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            if Role::try_from(args.role.as_str()).is_err() {
                eprintln!("invalid role: {}", args.role);
                std::process::exit(2);
            }

            let password = prompt_password_twice()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
                role: Set(args.role.clone()),
                full_name: Set(args.full_name),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {} ({})", args.username, args.role);
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in users::Entity::find().all(&db).await? {
                println!("{} ({})", user.username, user.role);
            }
        }
        Command::Wallet(Wallet {
            command: WalletCommand::Fund(args),
        }) => {
            let amount: Money = match args.amount.parse() {
                Ok(amount) => amount,
                Err(err) => {
                    eprintln!("invalid amount: {err}");
                    std::process::exit(2);
                }
            };

            let engine = Engine::builder().database(db.clone()).build().await?;
            let balance = engine
                .fund_system_wallet(amount.minor(), args.actor.as_deref(), None)
                .await?;
            println!("system wallet balance: {}", Money::new(balance));
        }
        Command::Wallet(Wallet {
            command: WalletCommand::Balance,
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let balance = engine.system_wallet_balance().await?;
            println!("system wallet balance: {}", Money::new(balance));
        }
        Command::Fulfill => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let report = engine.fulfill_approved_appeals().await?;
            println!(
                "fulfilled {} appeal(s), skipped {}, remaining balance {}",
                report.fulfilled.len(),
                report.skipped.len(),
                Money::new(report.remaining_balance_minor)
            );
        }
        Command::Expire => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let expired = engine.expire_due_appeals(Utc::now()).await?;
            println!("expired {} appeal(s)", expired.len());
        }
    }

    Ok(())
}
