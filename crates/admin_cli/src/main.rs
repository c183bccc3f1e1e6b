use std::{
    error::Error,
    io::{self, Write},
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};
use engine::{Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::Database;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

const PASSWORD_ATTEMPTS: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "vending_admin")]
#[command(about = "Manage logins and tea bags of the vending cost server")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./vending.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Server logins.
    #[command(subcommand)]
    User(UserCommand),
    /// Tea bags of a user, priced per bag.
    #[command(subcommand)]
    TeaBag(TeaBagCommand),
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a login; the password is asked twice on the terminal.
    Create(UsernameArgs),
    List,
}

#[derive(Args, Debug)]
struct UsernameArgs {
    #[arg(long)]
    username: String,
}

#[derive(Subcommand, Debug)]
enum TeaBagCommand {
    Add(TeaBagAddArgs),
    List(OwnerArgs),
}

#[derive(Args, Debug)]
struct TeaBagAddArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
    /// Euros per bag.
    #[arg(long, allow_negative_numbers = true)]
    cost: f64,
}

#[derive(Args, Debug)]
struct OwnerArgs {
    #[arg(long)]
    owner: String,
}

/// Restores the terminal when the prompt ends, even on error.
struct RawMode;

impl RawMode {
    fn enable() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn notice(out: &mut impl Write, message: &str) -> CliResult<()> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Reads one line from the terminal, echoing `*` per character.
fn read_masked(label: &str) -> CliResult<String> {
    let _raw = RawMode::enable()?;
    let mut out = io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(label)
    )?;

    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };
        let control = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Enter => break,
            KeyCode::Char('c') if control => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !control => {
                secret.push(ch);
                execute!(out, Print('*'))?;
            }
            KeyCode::Backspace => {
                if secret.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(' '), cursor::MoveLeft(1))?;
                }
            }
            _ => {}
        }
    }
    execute!(out, Print("\r\n"))?;
    Ok(secret)
}

fn new_password(username: &str) -> CliResult<String> {
    let mut out = io::stderr();
    for _ in 0..PASSWORD_ATTEMPTS {
        let password = read_masked(&format!("Password for {username}: "))?;
        if password.is_empty() {
            notice(&mut out, "Password must not be empty.")?;
            continue;
        }
        if read_masked("Repeat password: ")? == password {
            return Ok(password);
        }
        notice(&mut out, "Passwords do not match.")?;
    }
    Err("no password set".into())
}

async fn connect(database_url: &str) -> CliResult<Engine> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

/// Runs one command, writing its report to `out`. `user create` prompts on
/// the terminal for the password.
async fn execute(engine: &Engine, command: Command, out: &mut impl Write) -> CliResult<()> {
    match command {
        Command::User(UserCommand::Create(args)) => {
            if engine.user_exists(&args.username).await? {
                return Err(EngineError::ExistingKey(args.username).into());
            }
            let password = new_password(args.username.trim())?;
            let username = engine.create_user(&args.username, &password).await?;
            writeln!(out, "created user: {username}")?;
        }
        Command::User(UserCommand::List) => {
            for username in engine.list_users().await? {
                writeln!(out, "{username}")?;
            }
        }
        Command::TeaBag(TeaBagCommand::Add(args)) => {
            if !engine.user_exists(&args.owner).await? {
                return Err(EngineError::KeyNotFound(format!("user {}", args.owner)).into());
            }
            let id = engine
                .upsert_tea_bag(args.owner.trim(), None, &args.name, args.cost)
                .await?;
            writeln!(out, "added tea bag: {} ({id})", args.name.trim())?;
        }
        Command::TeaBag(TeaBagCommand::List(args)) => {
            for tea_bag in engine.list_tea_bags(args.owner.trim()).await? {
                writeln!(
                    out,
                    "{}\t€{:.2}\t{}",
                    tea_bag.name, tea_bag.cost_per_unit, tea_bag.id
                )?;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match connect(&cli.database_url).await {
        Ok(engine) => execute(&engine, cli.command, &mut io::stdout()).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            // Rejected input exits with 2, everything else with 1.
            match err.downcast_ref::<EngineError>() {
                Some(EngineError::Database(_)) | None => ExitCode::FAILURE,
                Some(_) => ExitCode::from(2),
            }
        }
    }
}
