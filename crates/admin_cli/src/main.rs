use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, ErrorKind, NewUser, VaultRole};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Parser, Debug)]
#[command(name = "tally_admin")]
#[command(about = "Admin utilities for Tally (bootstrap users/vaults)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./tally.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Vault(Vault),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user. The password is read from the terminal.
    Create(UserCreateArgs),
    /// List every user.
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Vault {
    #[command(subcommand)]
    command: VaultCommand,
}

#[derive(Subcommand, Debug)]
enum VaultCommand {
    /// Create a vault owned by an existing user.
    Create(VaultCreateArgs),
    /// Add an existing user to a vault as editor.
    AddUser(VaultAddUserArgs),
}

#[derive(Args, Debug)]
struct VaultCreateArgs {
    /// Email of the owner.
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct VaultAddUserArgs {
    /// Email of a vault owner, acting as inviter.
    #[arg(long)]
    owner: String,
    /// Email of the user to add.
    #[arg(long)]
    user: String,
    #[arg(long)]
    vault_id: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn print_line(message: &str) -> CliResult<()> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

fn prompt_password(prompt: &str) -> CliResult<String> {
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

/// Ask twice, up to three attempts.
fn prompt_new_password() -> CliResult<String> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.chars().count() < MIN_PASSWORD_LEN {
            print_line(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            ))?;
            continue;
        }

        let second = prompt_password("Confirm password: ")?;
        if first == second {
            return Ok(first);
        }
        print_line("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Resolve a user id from an email, exiting when unknown.
async fn user_id(engine: &Engine, email: &str) -> CliResult<String> {
    match engine.users().find_one_by_email(email).await {
        Ok(user) => Ok(user.id),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            eprintln!("user not found: {email}");
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build();

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_new_password()?;
            let created = engine
                .users()
                .create_one(NewUser {
                    first_name: args.first_name,
                    last_name: args.last_name,
                    email: args.email.clone(),
                    password,
                })
                .await;
            match created {
                Ok(id) => println!("created user: {} ({id})", args.email),
                Err(err) if err.kind() == ErrorKind::Conflict => {
                    eprintln!("user already exists: {}", args.email);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in engine.users().find_all().await? {
                println!(
                    "{}\t{}\t{} {}",
                    user.id, user.email, user.first_name, user.last_name
                );
            }
        }
        Command::Vault(Vault {
            command: VaultCommand::Create(args),
        }) => {
            let owner_id = user_id(&engine, &args.owner).await?;
            let vault_id = engine.vaults().create_one(&owner_id, &args.name).await?;
            println!("created vault: {} ({vault_id})", args.name);
        }
        Command::Vault(Vault {
            command: VaultCommand::AddUser(args),
        }) => {
            let owner_id = user_id(&engine, &args.owner).await?;
            let invitee_id = user_id(&engine, &args.user).await?;
            engine
                .vaults()
                .add_user(&owner_id, &invitee_id, &args.vault_id, VaultRole::Editor)
                .await?;
            println!("added {} to vault {} as editor", args.user, args.vault_id);
        }
    }

    Ok(())
}
