use budget_sync::args::{Args, CacheCommand, Command};
use budget_sync::commands::{self, App};
use budget_sync::error::error_type;
use budget_sync::{assets, Config, Mode, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match error_type(&e) {
                Some(kind) => error!("Exiting with {kind} error: {e:#}"),
                None => error!("Exiting with error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().budget_home().path();

    // This allows for running the program without a remote service or network. When
    // BUDGET_SYNC_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Testing,
    // otherwise it will be Mode::Live.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.api_url(), init_args.origin())
                .await?
                .print()
        }

        Command::Categories => commands::categories().print(),

        Command::Cache(cache_args) => {
            let config = Config::load(home).await?;
            let mut manager = assets::asset_cache(&config, mode);
            match cache_args.command() {
                CacheCommand::Update => commands::cache_update(&mut manager).await?.print(),
                CacheCommand::Status => commands::cache_status(&mut manager).await?.print(),
                CacheCommand::Fetch(fetch_args) => {
                    commands::cache_fetch(&mut manager, fetch_args.locator(), fetch_args.output())
                        .await?
                        .print()
                }
            }
        }

        command => {
            let app = App::new(Config::load(home).await?, mode)?;
            match command {
                Command::Register(a) => commands::register(&app, a.name(), a.email(), a.password())
                    .await?
                    .print(),
                Command::Login(a) => commands::login(&app, a.email(), a.password())
                    .await?
                    .print(),
                Command::Logout => commands::logout(&app).await?.print(),
                Command::Add(a) => commands::add(
                    &app,
                    a.transaction_type(),
                    a.amount(),
                    a.category(),
                    a.date(),
                )
                .await?
                .print(),
                Command::Dashboard => commands::dashboard(&app).await?.print(),
                Command::Report(a) => commands::report(&app, a.month()).await?.print(),
                Command::Settings(a) => commands::settings(&app, a.theme(), a.notifications())
                    .await?
                    .print(),
                Command::Clear => commands::clear(&app).await?.print(),
                Command::Reset => commands::reset(&app).await?.print(),
                Command::Init(_) | Command::Categories | Command::Cache(_) => {}
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the log level for the library and the binary only.
            EnvFilter::new(format!(
                "budget_sync={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
