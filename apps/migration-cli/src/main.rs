use clap::{Parser, ValueEnum};
use migration::{count_applied_migrations, migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database};
use tracing::{error, info};

#[derive(Clone, Copy, ValueEnum)]
enum Command {
    Up,
    Down,
    Fresh,
    Status,
}

impl From<Command> for MigrationCommand {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Up => MigrationCommand::Up,
            Command::Down => MigrationCommand::Down,
            Command::Fresh => MigrationCommand::Fresh,
            Command::Status => MigrationCommand::Status,
        }
    }
}

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "Quiz database migration tool")]
struct Args {
    /// Migration command to run
    #[arg(value_enum)]
    command: Command,

    /// Target database; in-memory SQLite is rejected since it would vanish
    /// with the process.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_env_filter("migration=info,migration_cli=info,sqlx=warn")
        .init();

    let args = Args::parse();
    if args.database_url.contains(":memory:") || args.database_url.contains("mode=memory") {
        error!("in-memory SQLite is not supported for CLI migrations");
        std::process::exit(2);
    }

    let mut opts = ConnectOptions::new(args.database_url.clone());
    opts.max_connections(1).sqlx_logging(false);
    let db = match Database::connect(opts).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "cannot connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = migrate(&db, args.command.into()).await {
        error!(error = %e, "migration failed");
        std::process::exit(1);
    }

    match count_applied_migrations(&db).await {
        Ok(applied) => info!(applied, "done"),
        Err(e) => error!(error = %e, "could not read migration table"),
    }
}
